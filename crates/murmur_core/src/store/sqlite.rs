//! SQLite-backed store implementation.
//!
//! # Responsibility
//! - Map note/task/reminder/template records onto the SQLite schema.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths use upsert semantics keyed on `id`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::item::{ItemId, Note, Reminder, Task, Template, TemplateField};
use crate::store::{Store, StoreError, StoreResult};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use uuid::Uuid;

/// SQLite store borrowing an already-bootstrapped connection.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Wraps a connection previously opened via [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl Store for SqliteStore<'_> {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, fields_json, created_at, updated_at
             FROM notes ORDER BY created_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, is_completed, scheduled_date, created_at, profession
             FROM tasks ORDER BY created_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn list_reminders(&self) -> StoreResult<Vec<Reminder>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, date_time, is_completed, created_at, profession,
                    notification_id
             FROM reminders ORDER BY created_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut reminders = Vec::new();
        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }
        Ok(reminders)
    }

    fn list_templates(&self) -> StoreResult<Vec<Template>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, fields_json, created_at, updated_at
             FROM templates ORDER BY created_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }
        Ok(templates)
    }

    fn save_note(&self, note: &Note) -> StoreResult<()> {
        let fields_json = serde_json::to_string(&note.fields)
            .map_err(|err| StoreError::InvalidData(format!("note fields encode: {err}")))?;
        self.conn.execute(
            "INSERT INTO notes (id, title, content, fields_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                fields_json = excluded.fields_json,
                updated_at = excluded.updated_at;",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                fields_json,
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn save_task(&self, task: &Task) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, description, is_completed, scheduled_date,
                                created_at, profession)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                is_completed = excluded.is_completed,
                scheduled_date = excluded.scheduled_date,
                profession = excluded.profession;",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                i64::from(task.is_completed),
                task.scheduled_date.to_rfc3339(),
                task.created_at.to_rfc3339(),
                task.profession.as_str(),
            ],
        )?;
        Ok(())
    }

    fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO reminders (id, title, description, date_time, is_completed,
                                    created_at, profession, notification_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                date_time = excluded.date_time,
                is_completed = excluded.is_completed,
                profession = excluded.profession,
                notification_id = excluded.notification_id;",
            params![
                reminder.id.to_string(),
                reminder.title.as_str(),
                reminder.description.as_str(),
                reminder.date_time.to_rfc3339(),
                i64::from(reminder.is_completed),
                reminder.created_at.to_rfc3339(),
                reminder.profession.as_str(),
                reminder.notification_id.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn save_template(&self, template: &Template) -> StoreResult<()> {
        let fields_json = serde_json::to_string(&template.fields)
            .map_err(|err| StoreError::InvalidData(format!("template fields encode: {err}")))?;
        self.conn.execute(
            "INSERT INTO templates (id, name, description, fields_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                fields_json = excluded.fields_json,
                updated_at = excluded.updated_at;",
            params![
                template.id.to_string(),
                template.name.as_str(),
                template.description.as_str(),
                fields_json,
                template.created_at.to_rfc3339(),
                template.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let fields_text: String = row.get("fields_json")?;
    let fields: BTreeMap<String, String> = serde_json::from_str(&fields_text)
        .map_err(|err| StoreError::InvalidData(format!("note fields decode: {err}")))?;

    Ok(Note {
        id: parse_id(row, "id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        fields,
        created_at: parse_datetime(row, "created_at")?,
        updated_at: parse_datetime(row, "updated_at")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    Ok(Task {
        id: parse_id(row, "id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed: parse_flag(row, "is_completed")?,
        scheduled_date: parse_datetime(row, "scheduled_date")?,
        created_at: parse_datetime(row, "created_at")?,
        profession: row.get("profession")?,
    })
}

fn parse_reminder_row(row: &Row<'_>) -> StoreResult<Reminder> {
    Ok(Reminder {
        id: parse_id(row, "id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        date_time: parse_datetime(row, "date_time")?,
        is_completed: parse_flag(row, "is_completed")?,
        created_at: parse_datetime(row, "created_at")?,
        profession: row.get("profession")?,
        notification_id: row.get("notification_id")?,
    })
}

fn parse_template_row(row: &Row<'_>) -> StoreResult<Template> {
    let fields_text: String = row.get("fields_json")?;
    let fields: Vec<TemplateField> = serde_json::from_str(&fields_text)
        .map_err(|err| StoreError::InvalidData(format!("template fields decode: {err}")))?;

    Ok(Template {
        id: parse_id(row, "id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        fields,
        created_at: parse_datetime(row, "created_at")?,
        updated_at: parse_datetime(row, "updated_at")?,
    })
}

fn parse_id(row: &Row<'_>, column: &str) -> StoreResult<ItemId> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{text}` in {column}")))
}

fn parse_datetime(row: &Row<'_>, column: &str) -> StoreResult<DateTime<Local>> {
    let text: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|parsed| parsed.with_timezone(&Local))
        .map_err(|_| StoreError::InvalidData(format!("invalid timestamp `{text}` in {column}")))
}

fn parse_flag(row: &Row<'_>, column: &str) -> StoreResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}
