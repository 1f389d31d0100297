//! Multi-step execution plan model.
//!
//! # Responsibility
//! - Define the plan-step shape shared by the planner, the LLM wire format
//!   and the executor.
//! - Enforce the stable search-last execution order.
//!
//! # Invariants
//! - Every `search` step sorts after every non-search step, so creations
//!   are visible to searches within the same plan.
//! - Among same-class steps the originally proposed `step` order is kept.

use crate::model::command::{Intent, IntentParams, VoiceCommand};
use serde::{Deserialize, Serialize};

/// Priority class for creation steps.
pub const PRIORITY_CREATE: u8 = 1;
/// Priority class for search steps.
pub const PRIORITY_SEARCH: u8 = 2;

/// Atomic action type inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Template,
    Task,
    Reminder,
    Note,
    Search,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Task => "task",
            Self::Reminder => "reminder",
            Self::Note => "note",
            Self::Search => "search",
        }
    }

    pub fn is_search(self) -> bool {
        matches!(self, Self::Search)
    }

    /// Declared priority class: 1 for creations, 2 for searches.
    pub fn default_priority(self) -> u8 {
        if self.is_search() {
            PRIORITY_SEARCH
        } else {
            PRIORITY_CREATE
        }
    }
}

/// Template field description as carried on the plan wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFieldSpec {
    pub name: String,
    #[serde(rename = "type", default = "default_field_kind")]
    pub kind: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

fn default_field_kind() -> String {
    "text".to_string()
}

/// Action-specific parameters of one plan step.
///
/// The LLM wire format carries one loose `parameters` object per step; this
/// struct accepts any subset of the known keys and the executor validates
/// the required ones per step type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        default,
        rename = "dueDate",
        alias = "due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<TemplateFieldSpec>>,
}

/// One atomic action inside a multi-step plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based sequence number as originally proposed.
    pub step: u32,
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Human-readable description for logging/preview; never machine-parsed.
    #[serde(default)]
    pub action: String,
    #[serde(default, rename = "parameters")]
    pub params: StepParams,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    PRIORITY_CREATE
}

impl PlanStep {
    /// Builds a step with the kind's default priority class.
    pub fn new(step: u32, kind: StepKind, action: impl Into<String>, params: StepParams) -> Self {
        Self {
            step,
            kind,
            action: action.into(),
            params,
            priority: kind.default_priority(),
        }
    }

    /// Projects a single-intent command onto one plan step.
    ///
    /// Returns `None` for `show_help`/`unknown`, which are not executable
    /// actions.
    pub fn from_command(command: &VoiceCommand) -> Option<Self> {
        let (kind, action, params) = match (&command.intent, &command.params) {
            (Intent::Search, IntentParams::Search { query }) => (
                StepKind::Search,
                String::from("Search stored items"),
                StepParams {
                    query: Some(query.clone()),
                    ..StepParams::default()
                },
            ),
            (Intent::CreateNote, IntentParams::Note { content, title }) => (
                StepKind::Note,
                String::from("Create a note"),
                StepParams {
                    content: Some(content.clone()),
                    title: title.clone(),
                    ..StepParams::default()
                },
            ),
            (Intent::SetReminder, IntentParams::Reminder { title, time }) => (
                StepKind::Reminder,
                String::from("Set a reminder"),
                StepParams {
                    title: Some(title.clone()),
                    time: time.clone(),
                    ..StepParams::default()
                },
            ),
            (Intent::CreateTask, IntentParams::Task { title, due_date }) => (
                StepKind::Task,
                String::from("Create a task"),
                StepParams {
                    title: Some(title.clone()),
                    due_date: due_date.clone(),
                    ..StepParams::default()
                },
            ),
            _ => return None,
        };

        Some(Self::new(1, kind, action, params))
    }
}

/// Returns the steps in effective execution order.
///
/// Stable: search steps move after all non-search steps regardless of their
/// declared `priority`, and same-class steps keep their proposed order.
pub fn sorted_for_execution(steps: &[PlanStep]) -> Vec<PlanStep> {
    let mut ordered = steps.to_vec();
    ordered.sort_by_key(|step| step.kind.is_search());
    ordered
}

#[cfg(test)]
mod tests {
    use super::{sorted_for_execution, PlanStep, StepKind, StepParams};

    fn step(step: u32, kind: StepKind) -> PlanStep {
        PlanStep::new(step, kind, "test", StepParams::default())
    }

    #[test]
    fn search_steps_sort_last() {
        let steps = vec![
            step(1, StepKind::Search),
            step(2, StepKind::Task),
            step(3, StepKind::Reminder),
        ];
        let ordered = sorted_for_execution(&steps);
        let kinds: Vec<_> = ordered.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Task, StepKind::Reminder, StepKind::Search]
        );
    }

    #[test]
    fn same_class_steps_keep_proposed_order() {
        let steps = vec![
            step(1, StepKind::Search),
            step(2, StepKind::Note),
            step(3, StepKind::Search),
            step(4, StepKind::Task),
        ];
        let ordered = sorted_for_execution(&steps);
        let ids: Vec<_> = ordered.iter().map(|s| s.step).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn declared_priority_does_not_override_kind() {
        let mut search = step(1, StepKind::Search);
        search.priority = 1;
        let steps = vec![search, step(2, StepKind::Note)];
        let ordered = sorted_for_execution(&steps);
        assert_eq!(ordered.last().map(|s| s.kind), Some(StepKind::Search));
    }

    #[test]
    fn step_deserializes_from_llm_wire_shape() {
        let json = r#"{
            "step": 1,
            "type": "task",
            "action": "Create the review task",
            "parameters": {"title": "review contract", "dueDate": "friday"},
            "priority": 1
        }"#;
        let parsed: PlanStep = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, StepKind::Task);
        assert_eq!(parsed.params.title.as_deref(), Some("review contract"));
        assert_eq!(parsed.params.due_date.as_deref(), Some("friday"));
    }
}
