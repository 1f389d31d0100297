//! Persisted domain records produced by command execution.
//!
//! # Responsibility
//! - Define the note/task/reminder/template shapes persisted by storage.
//! - Provide constructors that apply creation-time defaults.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - Constructors never perform I/O; timestamps are injected by callers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier for every persisted domain object.
pub type ItemId = Uuid;

/// Category of a persisted or staged domain object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Note,
    Task,
    Reminder,
    Template,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
            Self::Reminder => "reminder",
            Self::Template => "template",
        }
    }
}

/// Free-form note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: ItemId,
    pub title: String,
    pub content: String,
    /// Structured field values for template-backed notes; empty for plain
    /// voice notes.
    pub fields: BTreeMap<String, String>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            fields: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Actionable task record with a scheduled date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub scheduled_date: DateTime<Local>,
    pub created_at: DateTime<Local>,
    pub profession: String,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        scheduled_date: DateTime<Local>,
        profession: impl Into<String>,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            is_completed: false,
            scheduled_date,
            created_at: now,
            profession: profession.into(),
        }
    }
}

/// Reminder record; `notification_id` is set once a notification has been
/// scheduled for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub date_time: DateTime<Local>,
    pub is_completed: bool,
    pub created_at: DateTime<Local>,
    pub profession: String,
    pub notification_id: Option<String>,
}

impl Reminder {
    pub fn new(
        title: impl Into<String>,
        date_time: DateTime<Local>,
        profession: impl Into<String>,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            date_time,
            is_completed: false,
            created_at: now,
            profession: profession.into(),
            notification_id: None,
        }
    }
}

/// One input field of a custom note template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Synthetic id, `field_1`, `field_2`, ... in declaration order.
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    pub options: Option<Vec<String>>,
}

/// Custom note template record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub fields: Vec<TemplateField>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Template {
    pub fn new(
        name: impl Into<String>,
        fields: Vec<TemplateField>,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}
