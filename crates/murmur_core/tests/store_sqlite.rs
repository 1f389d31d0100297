use chrono::{Local, TimeZone};
use murmur_core::db::migrations::latest_version;
use murmur_core::db::open_db_in_memory;
use murmur_core::{Note, Reminder, SqliteStore, Store, Task, Template, TemplateField};

fn reference_time() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap()
}

#[test]
fn migrations_set_user_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn note_round_trips_including_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let now = reference_time();
    let mut note = Note::new("Intake", "first visit", now);
    note.fields
        .insert("severity".to_string(), "low".to_string());
    store.save_note(&note).unwrap();

    let listed = store.list_notes().unwrap();
    assert_eq!(listed, vec![note]);
}

#[test]
fn task_and_reminder_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let now = reference_time();

    let task = Task::new("file paperwork", now, "nurse", now);
    store.save_task(&task).unwrap();
    assert_eq!(store.list_tasks().unwrap(), vec![task]);

    let mut reminder = Reminder::new("call back", now, "nurse", now);
    reminder.notification_id = Some("ntf_7".to_string());
    store.save_reminder(&reminder).unwrap();
    assert_eq!(store.list_reminders().unwrap(), vec![reminder]);
}

#[test]
fn template_round_trips_with_field_schemas() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let now = reference_time();

    let template = Template::new(
        "Patient intake",
        vec![TemplateField {
            id: "field_1".to_string(),
            label: "Name".to_string(),
            kind: "text".to_string(),
            required: false,
            options: Some(vec!["a".to_string(), "b".to_string()]),
        }],
        now,
    );
    store.save_template(&template).unwrap();

    assert_eq!(store.list_templates().unwrap(), vec![template]);
}

#[test]
fn save_is_idempotent_on_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let now = reference_time();

    let mut note = Note::new("Title", "v1", now);
    store.save_note(&note).unwrap();

    note.content = "v2".to_string();
    store.save_note(&note).unwrap();

    let listed = store.list_notes().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, "v2");
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("murmur.db");
    let now = reference_time();

    {
        let conn = murmur_core::db::open_db(&path).unwrap();
        let store = SqliteStore::new(&conn);
        store
            .save_note(&Note::new("persisted", "across reopen", now))
            .unwrap();
    }

    let conn = murmur_core::db::open_db(&path).unwrap();
    let store = SqliteStore::new(&conn);
    let listed = store.list_notes().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "persisted");
}
