//! Preview staging for user-confirmed execution.
//!
//! # Responsibility
//! - Hold candidate domain objects between preview and confirmation.
//! - Track user edits against the originally produced data for diffing.
//!
//! # Invariants
//! - Cancelling a session discards every staged item with no side effect.
//! - Confirmation persists surviving items one by one; a failing item never
//!   blocks its siblings.

use crate::exec::persist_item;
use crate::model::item::{ItemKind, Note, Reminder, Task, Template};
use crate::notify::NotificationScheduler;
use crate::store::Store;
use log::info;

/// Fully formed candidate domain object.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemData {
    Note(Note),
    Task(Task),
    Reminder(Reminder),
    Template(Template),
}

impl ItemData {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Note(_) => ItemKind::Note,
            Self::Task(_) => ItemKind::Task,
            Self::Reminder(_) => ItemKind::Reminder,
            Self::Template(_) => ItemKind::Template,
        }
    }

    /// Display title; the template name doubles as its title.
    pub fn title(&self) -> &str {
        match self {
            Self::Note(note) => &note.title,
            Self::Task(task) => &task.title,
            Self::Reminder(reminder) => &reminder.title,
            Self::Template(template) => &template.name,
        }
    }

    fn set_title(&mut self, title: &str) {
        match self {
            Self::Note(note) => note.title = title.to_string(),
            Self::Task(task) => task.title = title.to_string(),
            Self::Reminder(reminder) => reminder.title = title.to_string(),
            Self::Template(template) => template.name = title.to_string(),
        }
    }

    fn set_content(&mut self, content: &str) {
        match self {
            Self::Note(note) => note.content = content.to_string(),
            Self::Task(task) => task.description = content.to_string(),
            Self::Reminder(reminder) => reminder.description = content.to_string(),
            Self::Template(template) => template.description = content.to_string(),
        }
    }
}

/// One staged-but-not-committed item.
///
/// `original` is frozen at staging time so the UI can diff user edits.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewItem {
    data: ItemData,
    original: ItemData,
}

impl PreviewItem {
    pub fn new(data: ItemData) -> Self {
        let original = data.clone();
        Self { data, original }
    }

    pub fn data(&self) -> &ItemData {
        &self.data
    }

    pub fn original(&self) -> &ItemData {
        &self.original
    }

    pub fn kind(&self) -> ItemKind {
        self.data.kind()
    }

    pub fn is_edited(&self) -> bool {
        self.data != self.original
    }

    pub fn set_title(&mut self, title: &str) {
        self.data.set_title(title);
    }

    pub fn set_content(&mut self, content: &str) {
        self.data.set_content(content);
    }

    /// Edits one template field in place.
    ///
    /// Returns `false` when the item is not a template or the index is out
    /// of range.
    pub fn set_template_field(
        &mut self,
        index: usize,
        label: Option<&str>,
        kind: Option<&str>,
        options: Option<Vec<String>>,
    ) -> bool {
        let ItemData::Template(template) = &mut self.data else {
            return false;
        };
        let Some(field) = template.fields.get_mut(index) else {
            return false;
        };

        if let Some(label) = label {
            field.label = label.to_string();
        }
        if let Some(kind) = kind {
            field.kind = kind.to_string();
        }
        if let Some(options) = options {
            field.options = Some(options);
        }
        true
    }

    fn into_data(self) -> ItemData {
        self.data
    }
}

/// Result of confirming a preview session.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConfirmReport {
    pub saved: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

/// Staged items awaiting user confirmation.
#[derive(Debug, Default)]
pub struct PreviewSession {
    items: Vec<PreviewItem>,
}

impl PreviewSession {
    pub fn new(items: Vec<PreviewItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[PreviewItem] {
        &self.items
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut PreviewItem> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes one staged item before confirmation.
    pub fn remove(&mut self, index: usize) -> Option<PreviewItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Discards every staged item. No side effects.
    pub fn cancel(self) -> usize {
        let discarded = self.items.len();
        info!("event=preview_cancel module=exec status=ok discarded={discarded}");
        discarded
    }

    /// Persists every surviving item; failures are recorded per item and do
    /// not abort the rest.
    pub fn confirm<S: Store, N: NotificationScheduler>(
        self,
        store: &S,
        notifier: &N,
    ) -> ConfirmReport {
        let mut report = ConfirmReport::default();

        for (index, item) in self.items.into_iter().enumerate() {
            let kind = item.kind();
            let mut data = item.into_data();
            match persist_item(store, notifier, &mut data) {
                Ok(()) => report.saved += 1,
                Err(err) => {
                    report.failed += 1;
                    report
                        .errors
                        .push(format!("item {} ({}): {err}", index + 1, kind.as_str()));
                }
            }
        }

        info!(
            "event=preview_confirm module=exec status=done saved={} failed={}",
            report.saved, report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemData, PreviewItem, PreviewSession};
    use crate::model::item::{Note, Reminder, Template, TemplateField};
    use crate::notify::{NotificationScheduler, NullScheduler};
    use crate::store::{MemoryStore, Store};
    use chrono::{DateTime, Local};
    use std::sync::Mutex;

    struct RecordingScheduler {
        scheduled: Mutex<Vec<String>>,
    }

    impl RecordingScheduler {
        fn new() -> Self {
            Self {
                scheduled: Mutex::new(Vec::new()),
            }
        }
    }

    impl NotificationScheduler for RecordingScheduler {
        fn schedule(&self, title: &str, _body: &str, _when: DateTime<Local>) -> Option<String> {
            let mut scheduled = self.scheduled.lock().unwrap();
            scheduled.push(title.to_string());
            Some(format!("ntf_{}", scheduled.len()))
        }
    }

    fn staged_note() -> PreviewItem {
        PreviewItem::new(ItemData::Note(Note::new("Title", "Body", Local::now())))
    }

    #[test]
    fn edits_are_visible_against_the_frozen_original() {
        let mut item = staged_note();
        assert!(!item.is_edited());

        item.set_title("Renamed");
        assert!(item.is_edited());
        assert_eq!(item.data().title(), "Renamed");
        assert_eq!(item.original().title(), "Title");
    }

    #[test]
    fn template_field_edit_applies_only_in_range() {
        let now = Local::now();
        let template = Template::new(
            "Intake",
            vec![TemplateField {
                id: "field_1".to_string(),
                label: "Name".to_string(),
                kind: "text".to_string(),
                required: false,
                options: None,
            }],
            now,
        );
        let mut item = PreviewItem::new(ItemData::Template(template));

        assert!(item.set_template_field(0, Some("Full name"), None, None));
        assert!(!item.set_template_field(5, Some("nope"), None, None));
        assert!(item.is_edited());
    }

    #[test]
    fn cancel_discards_without_persisting() {
        let store = MemoryStore::new();
        let session = PreviewSession::new(vec![staged_note(), staged_note()]);
        assert_eq!(session.cancel(), 2);
        assert!(store.list_notes().unwrap().is_empty());
    }

    #[test]
    fn removed_items_are_not_persisted_on_confirm() {
        let store = MemoryStore::new();
        let mut session = PreviewSession::new(vec![staged_note(), staged_note()]);
        session.remove(0).expect("item should be removable");

        let report = session.confirm(&store, &NullScheduler);
        assert_eq!(report.saved, 1);
        assert_eq!(store.list_notes().unwrap().len(), 1);
    }

    #[test]
    fn confirm_schedules_reminder_notifications_before_saving() {
        let store = MemoryStore::new();
        let scheduler = RecordingScheduler::new();
        let reminder = Reminder::new("Call back", Local::now(), "general", Local::now());
        let session = PreviewSession::new(vec![PreviewItem::new(ItemData::Reminder(reminder))]);

        let report = session.confirm(&store, &scheduler);
        assert_eq!(report.saved, 1);

        let stored = store.list_reminders().unwrap();
        assert_eq!(stored[0].notification_id.as_deref(), Some("ntf_1"));
    }

    #[test]
    fn duplicate_template_fails_that_item_but_not_siblings() {
        let now = Local::now();
        let store = MemoryStore::new();
        store
            .save_template(&Template::new("Intake", Vec::new(), now))
            .unwrap();

        let duplicate = PreviewItem::new(ItemData::Template(Template::new(
            "intake",
            Vec::new(),
            now,
        )));
        let session = PreviewSession::new(vec![duplicate, staged_note()]);

        let report = session.confirm(&store, &NullScheduler);
        assert_eq!(report.saved, 1);
        assert_eq!(report.failed, 1);
        assert!(report.errors[0].contains("already exists"));
        assert_eq!(store.list_notes().unwrap().len(), 1);
    }
}
