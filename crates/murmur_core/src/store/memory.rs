//! In-memory store for tests and transient sessions.
//!
//! # Responsibility
//! - Provide the full `Store` contract without any I/O.
//!
//! # Invariants
//! - Saves are idempotent on `id`: a second save with the same id replaces
//!   the stored item.

use crate::model::item::{ItemId, Note, Reminder, Task, Template};
use crate::store::{Store, StoreResult};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct State {
    notes: Vec<Note>,
    tasks: Vec<Task>,
    reminders: Vec<Reminder>,
    templates: Vec<Template>,
}

/// Volatile storage backed by vectors behind one mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, id_of: impl Fn(&T) -> ItemId) {
    let id = id_of(&item);
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

impl Store for MemoryStore {
    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        Ok(self.with_state(|state| state.notes.clone()))
    }

    fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.with_state(|state| state.tasks.clone()))
    }

    fn list_reminders(&self) -> StoreResult<Vec<Reminder>> {
        Ok(self.with_state(|state| state.reminders.clone()))
    }

    fn list_templates(&self) -> StoreResult<Vec<Template>> {
        Ok(self.with_state(|state| state.templates.clone()))
    }

    fn save_note(&self, note: &Note) -> StoreResult<()> {
        self.with_state(|state| upsert(&mut state.notes, note.clone(), |n| n.id));
        Ok(())
    }

    fn save_task(&self, task: &Task) -> StoreResult<()> {
        self.with_state(|state| upsert(&mut state.tasks, task.clone(), |t| t.id));
        Ok(())
    }

    fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()> {
        self.with_state(|state| upsert(&mut state.reminders, reminder.clone(), |r| r.id));
        Ok(())
    }

    fn save_template(&self, template: &Template) -> StoreResult<()> {
        self.with_state(|state| upsert(&mut state.templates, template.clone(), |t| t.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::model::item::Note;
    use crate::store::Store;
    use chrono::Local;

    #[test]
    fn save_is_idempotent_on_id() {
        let store = MemoryStore::new();
        let now = Local::now();
        let mut note = Note::new("Title", "v1", now);
        store.save_note(&note).unwrap();

        note.content = "v2".to_string();
        store.save_note(&note).unwrap();

        let notes = store.list_notes().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "v2");
    }
}
