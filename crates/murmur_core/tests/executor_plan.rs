use chrono::{DateTime, Duration, Local, TimeZone};
use murmur_core::{
    CommandExecutor, ItemKind, MemoryStore, NotificationScheduler, NullScheduler, PlanStep,
    PreviewSession, StepKind, StepParams, Store, Template, TemplateFieldSpec, VoiceConfig,
};
use std::sync::Mutex;

fn reference_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap()
}

fn step(seq: u32, kind: StepKind, params: StepParams) -> PlanStep {
    PlanStep::new(seq, kind, "test step", params)
}

fn note_params(content: &str) -> StepParams {
    StepParams {
        content: Some(content.to_string()),
        ..StepParams::default()
    }
}

fn task_params(title: &str) -> StepParams {
    StepParams {
        title: Some(title.to_string()),
        ..StepParams::default()
    }
}

fn search_params(query: &str) -> StepParams {
    StepParams {
        query: Some(query.to_string()),
        ..StepParams::default()
    }
}

struct CountingScheduler {
    count: Mutex<u32>,
}

impl CountingScheduler {
    fn new() -> Self {
        Self {
            count: Mutex::new(0),
        }
    }
}

impl NotificationScheduler for CountingScheduler {
    fn schedule(&self, _title: &str, _body: &str, _when: DateTime<Local>) -> Option<String> {
        let mut count = self.count.lock().unwrap();
        *count += 1;
        Some(format!("ntf_{count}"))
    }
}

#[test]
fn search_step_runs_last_and_sees_items_created_by_the_same_plan() {
    let store = MemoryStore::new();
    let config = VoiceConfig::default();
    let executor = CommandExecutor::new(&store, &NullScheduler, &config);

    // Search is declared first; the executor must still run it last.
    let steps = vec![
        step(1, StepKind::Search, search_params("standup")),
        step(2, StepKind::Task, task_params("standup prep")),
        step(3, StepKind::Note, note_params("standup notes from monday")),
    ];

    let outcome = executor.commit_plan(&steps, reference_time());

    assert!(outcome.success);
    assert_eq!(outcome.counts.succeeded, 3);
    assert_eq!(outcome.counts.tasks, 1);
    assert_eq!(outcome.counts.notes, 1);
    assert_eq!(outcome.counts.searches, 1);

    let hit_kinds: Vec<ItemKind> = outcome.hits.iter().map(|hit| hit.item.kind()).collect();
    assert!(hit_kinds.contains(&ItemKind::Task));
    assert!(hit_kinds.contains(&ItemKind::Note));
}

#[test]
fn failing_step_does_not_abort_siblings_and_is_reported() {
    let now = reference_time();
    let store = MemoryStore::new();
    store
        .save_template(&Template::new("Intake", Vec::new(), now))
        .unwrap();
    let config = VoiceConfig::default();
    let executor = CommandExecutor::new(&store, &NullScheduler, &config);

    let steps = vec![
        step(
            1,
            StepKind::Template,
            StepParams {
                name: Some("intake".to_string()),
                ..StepParams::default()
            },
        ),
        step(2, StepKind::Task, task_params("file the paperwork")),
        step(3, StepKind::Note, note_params("call log for tuesday")),
    ];

    let outcome = executor.commit_plan(&steps, now);

    assert!(outcome.success);
    assert_eq!(outcome.counts.failed, 1);
    assert_eq!(outcome.counts.succeeded, 2);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("template"));
    assert!(outcome.errors[0].contains("already exists"));
    assert!(outcome.message.contains("step(s) failed"));

    assert_eq!(store.list_tasks().unwrap().len(), 1);
    assert_eq!(store.list_notes().unwrap().len(), 1);
    assert_eq!(store.list_templates().unwrap().len(), 1);
}

#[test]
fn template_fields_get_synthetic_sequential_ids() {
    let store = MemoryStore::new();
    let config = VoiceConfig::default();
    let executor = CommandExecutor::new(&store, &NullScheduler, &config);

    let fields = vec![
        TemplateFieldSpec {
            name: "Patient name".to_string(),
            kind: "text".to_string(),
            options: None,
        },
        TemplateFieldSpec {
            name: "Severity".to_string(),
            kind: "select".to_string(),
            options: Some(vec!["low".to_string(), "high".to_string()]),
        },
    ];
    let steps = vec![step(
        1,
        StepKind::Template,
        StepParams {
            name: Some("Patient intake".to_string()),
            fields: Some(fields),
            ..StepParams::default()
        },
    )];

    let outcome = executor.commit_plan(&steps, reference_time());
    assert!(outcome.success);

    let templates = store.list_templates().unwrap();
    assert_eq!(templates[0].fields.len(), 2);
    assert_eq!(templates[0].fields[0].id, "field_1");
    assert_eq!(templates[0].fields[1].id, "field_2");
    assert!(!templates[0].fields[0].required);
    assert_eq!(
        templates[0].fields[1].options.as_deref(),
        Some(["low".to_string(), "high".to_string()].as_slice())
    );
}

#[test]
fn preview_then_confirm_persists_edited_survivors() {
    let now = reference_time();
    let store = MemoryStore::new();
    let scheduler = CountingScheduler::new();
    let config = VoiceConfig::default();
    let executor = CommandExecutor::new(&store, &scheduler, &config);

    let steps = vec![
        step(1, StepKind::Note, note_params("quarterly numbers draft")),
        step(2, StepKind::Task, task_params("send the numbers")),
        step(
            3,
            StepKind::Reminder,
            StepParams {
                title: Some("follow up with finance".to_string()),
                time: Some("tomorrow 3pm".to_string()),
                ..StepParams::default()
            },
        ),
    ];

    let outcome = executor.preview_plan(&steps, now);
    assert_eq!(outcome.staged.len(), 3);
    // Preview schedules nothing and persists nothing.
    assert_eq!(*scheduler.count.lock().unwrap(), 0);
    assert!(store.list_notes().unwrap().is_empty());

    let mut session = PreviewSession::new(outcome.staged);
    session
        .item_mut(0)
        .expect("note should be staged")
        .set_title("Q3 numbers");
    session.remove(1).expect("task should be removable");

    let report = session.confirm(&store, &scheduler);
    assert_eq!(report.saved, 2);
    assert_eq!(report.failed, 0);

    let notes = store.list_notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Q3 numbers");
    assert!(store.list_tasks().unwrap().is_empty());

    let reminders = store.list_reminders().unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].notification_id.as_deref(), Some("ntf_1"));
    assert_eq!(
        reminders[0].date_time.date_naive(),
        now.date_naive() + Duration::days(1)
    );

    assert_eq!(*scheduler.count.lock().unwrap(), 1);
}

#[test]
fn cancelled_preview_leaves_no_trace() {
    let store = MemoryStore::new();
    let config = VoiceConfig::default();
    let executor = CommandExecutor::new(&store, &NullScheduler, &config);

    let outcome = executor.preview_plan(
        &[
            step(1, StepKind::Note, note_params("throwaway")),
            step(2, StepKind::Task, task_params("never happens")),
        ],
        reference_time(),
    );

    let session = PreviewSession::new(outcome.staged);
    assert_eq!(session.cancel(), 2);

    assert!(store.list_notes().unwrap().is_empty());
    assert!(store.list_tasks().unwrap().is_empty());
}
