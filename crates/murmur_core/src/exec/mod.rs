//! Command execution: construction, staging and persistence of domain
//! actions.
//!
//! # Responsibility
//! - Turn single intents or ordered plans into domain objects.
//! - Enforce the search-after-creation execution order.
//! - Record per-step failures without aborting sibling steps.
//!
//! # Invariants
//! - Preview mode performs no persistence or notification side effects.
//! - Commit mode schedules the reminder notification before persisting, so
//!   the stored reminder carries its `notification_id`.
//! - A plan is successful when at least one step succeeded.

use crate::config::VoiceConfig;
use crate::help;
use crate::model::command::{Intent, VoiceCommand};
use crate::model::item::{ItemKind, Note, Reminder, Task, Template, TemplateField};
use crate::model::plan::{sorted_for_execution, PlanStep, StepKind, StepParams};
use crate::nlp::parser::{DEFAULT_DUE_DATE, DEFAULT_REMINDER_TIME};
use crate::nlp::time::parse_time_at;
use crate::notify::NotificationScheduler;
use crate::search::{search_store, SearchHit};
use crate::store::{Store, StoreError};
use chrono::{DateTime, Local};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod preview;

pub use preview::{ConfirmReport, ItemData, PreviewItem, PreviewSession};

/// Maximum characters of content used for a derived note title.
const DERIVED_TITLE_CHARS: usize = 50;

pub type ExecResult<T> = Result<T, ExecError>;

/// Execution-layer error; step-level failures never abort sibling steps.
#[derive(Debug)]
pub enum ExecError {
    /// Note content was blank at the executor boundary.
    EmptyContent,
    /// Search query was blank at the executor boundary.
    EmptyQuery,
    /// Step lacks its required title/name input.
    MissingTitle { kind: StepKind },
    /// A template with the same name already exists (case-insensitive).
    DuplicateTemplate { name: String },
    /// Parser and planner both returned `unknown`.
    Understanding { original: String },
    Store(StoreError),
}

impl ExecError {
    /// User-facing guidance for understanding failures: the original
    /// transcript plus example commands.
    pub fn guidance(&self) -> Option<String> {
        match self {
            Self::Understanding { original } => {
                Some(help::understanding_failure_text(original))
            }
            _ => None,
        }
    }
}

impl Display for ExecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content is empty"),
            Self::EmptyQuery => write!(f, "search query is empty"),
            Self::MissingTitle { kind } => match kind {
                StepKind::Template => write!(f, "template step is missing a name"),
                other => write!(f, "{} step is missing a title", other.as_str()),
            },
            Self::DuplicateTemplate { name } => {
                write!(f, "a template named \"{name}\" already exists")
            }
            Self::Understanding { original } => {
                write!(f, "could not understand \"{original}\"")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ExecError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Per-type success counters plus the overall succeeded/failed tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounts {
    pub notes: u32,
    pub tasks: u32,
    pub reminders: u32,
    pub templates: u32,
    pub searches: u32,
    pub succeeded: u32,
    pub failed: u32,
}

impl StepCounts {
    pub fn attempted(&self) -> u32 {
        self.succeeded + self.failed
    }

    fn record_success(&mut self, kind: ItemKind) {
        self.succeeded += 1;
        match kind {
            ItemKind::Note => self.notes += 1,
            ItemKind::Task => self.tasks += 1,
            ItemKind::Reminder => self.reminders += 1,
            ItemKind::Template => self.templates += 1,
        }
    }
}

/// Aggregate result of one preview or commit run.
#[derive(Debug, Default)]
pub struct PlanOutcome {
    /// True when at least one step succeeded.
    pub success: bool,
    pub message: String,
    /// Candidate items staged in preview mode, pending confirmation.
    pub staged: Vec<PreviewItem>,
    /// Items persisted in commit mode.
    pub created: Vec<ItemData>,
    /// Pooled search results, best first.
    pub hits: Vec<SearchHit>,
    pub counts: StepCounts,
    /// Human-readable per-step error messages.
    pub errors: Vec<String>,
}

enum StepOutput {
    Item(ItemData),
    Hits(Vec<SearchHit>, String),
}

/// Executes single intents or ordered plans against the collaborators.
pub struct CommandExecutor<'a, S: Store, N: NotificationScheduler> {
    store: &'a S,
    notifier: &'a N,
    config: &'a VoiceConfig,
}

impl<'a, S: Store, N: NotificationScheduler> CommandExecutor<'a, S, N> {
    pub fn new(store: &'a S, notifier: &'a N, config: &'a VoiceConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Stages one command without side effects.
    pub fn preview_command(
        &self,
        command: &VoiceCommand,
        now: DateTime<Local>,
    ) -> ExecResult<PlanOutcome> {
        self.run_command(command, now, false)
    }

    /// Executes one command, persisting its effects.
    pub fn commit_command(
        &self,
        command: &VoiceCommand,
        now: DateTime<Local>,
    ) -> ExecResult<PlanOutcome> {
        self.run_command(command, now, true)
    }

    /// Stages an ordered plan without side effects.
    pub fn preview_plan(&self, steps: &[PlanStep], now: DateTime<Local>) -> PlanOutcome {
        self.run_plan(steps, now, false)
    }

    /// Executes an ordered plan, persisting its effects.
    pub fn commit_plan(&self, steps: &[PlanStep], now: DateTime<Local>) -> PlanOutcome {
        self.run_plan(steps, now, true)
    }

    fn run_command(
        &self,
        command: &VoiceCommand,
        now: DateTime<Local>,
        commit: bool,
    ) -> ExecResult<PlanOutcome> {
        match command.intent {
            Intent::ShowHelp => Ok(help_outcome()),
            Intent::Unknown => Err(ExecError::Understanding {
                original: command.original_text.clone(),
            }),
            _ => {
                let step = PlanStep::from_command(command).ok_or_else(|| {
                    ExecError::Understanding {
                        original: command.original_text.clone(),
                    }
                })?;
                Ok(self.run_plan(&[step], now, commit))
            }
        }
    }

    fn run_plan(&self, steps: &[PlanStep], now: DateTime<Local>, commit: bool) -> PlanOutcome {
        let ordered = sorted_for_execution(steps);
        let mut outcome = PlanOutcome::default();
        let mut found_query = None;

        // Steps run strictly sequentially: search steps depend on earlier
        // persisted effects.
        for step in &ordered {
            match self.run_step(step, now, commit) {
                Ok(StepOutput::Item(data)) => {
                    outcome.counts.record_success(data.kind());
                    if commit {
                        outcome.created.push(data);
                    } else {
                        outcome.staged.push(PreviewItem::new(data));
                    }
                }
                Ok(StepOutput::Hits(hits, query)) => {
                    outcome.counts.succeeded += 1;
                    outcome.counts.searches += 1;
                    found_query = Some(query);
                    outcome.hits.extend(hits);
                }
                Err(err) => {
                    outcome.counts.failed += 1;
                    warn!(
                        "event=plan_step module=exec status=error step={} kind={} error={}",
                        step.step,
                        step.kind.as_str(),
                        err
                    );
                    outcome
                        .errors
                        .push(format!("step {} ({}): {err}", step.step, step.kind.as_str()));
                }
            }
        }

        outcome.success = outcome.counts.succeeded > 0;
        outcome.message = build_message(
            commit,
            &outcome.counts,
            outcome.hits.len(),
            found_query.as_deref(),
        );
        info!(
            "event=plan_exec module=exec status=done mode={} steps={} ok={} failed={}",
            if commit { "commit" } else { "preview" },
            ordered.len(),
            outcome.counts.succeeded,
            outcome.counts.failed
        );
        outcome
    }

    fn run_step(
        &self,
        step: &PlanStep,
        now: DateTime<Local>,
        commit: bool,
    ) -> ExecResult<StepOutput> {
        match step.kind {
            StepKind::Note => {
                let note = self.build_note(&step.params, now)?;
                if commit {
                    self.store.save_note(&note)?;
                }
                Ok(StepOutput::Item(ItemData::Note(note)))
            }
            StepKind::Task => {
                let task = self.build_task(&step.params, now)?;
                if commit {
                    self.store.save_task(&task)?;
                }
                Ok(StepOutput::Item(ItemData::Task(task)))
            }
            StepKind::Reminder => {
                let mut reminder = self.build_reminder(&step.params, now)?;
                if commit {
                    reminder.notification_id = self.notifier.schedule(
                        &reminder.title,
                        notification_body(&reminder),
                        reminder.date_time,
                    );
                    self.store.save_reminder(&reminder)?;
                }
                Ok(StepOutput::Item(ItemData::Reminder(reminder)))
            }
            StepKind::Template => {
                let template = self.build_template(&step.params, now)?;
                if commit {
                    self.store.save_template(&template)?;
                }
                Ok(StepOutput::Item(ItemData::Template(template)))
            }
            StepKind::Search => {
                let query = step
                    .params
                    .query
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or("");
                if query.is_empty() {
                    return Err(ExecError::EmptyQuery);
                }
                let hits = search_store(self.store, query)?;
                Ok(StepOutput::Hits(hits, query.to_string()))
            }
        }
    }

    fn build_note(&self, params: &StepParams, now: DateTime<Local>) -> ExecResult<Note> {
        let content = params.content.as_deref().map(str::trim).unwrap_or("");
        if content.is_empty() {
            return Err(ExecError::EmptyContent);
        }

        let title = match params.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => derive_note_title(content),
        };
        Ok(Note::new(title, content, now))
    }

    fn build_task(&self, params: &StepParams, now: DateTime<Local>) -> ExecResult<Task> {
        let title = required_title(params, StepKind::Task)?;
        let due_date = params
            .due_date
            .as_deref()
            .map(str::trim)
            .filter(|due| !due.is_empty())
            .unwrap_or(DEFAULT_DUE_DATE);
        Ok(Task::new(
            title,
            parse_time_at(due_date, now),
            &self.config.profession,
            now,
        ))
    }

    fn build_reminder(&self, params: &StepParams, now: DateTime<Local>) -> ExecResult<Reminder> {
        let title = required_title(params, StepKind::Reminder)?;
        let time = params
            .time
            .as_deref()
            .map(str::trim)
            .filter(|time| !time.is_empty())
            .unwrap_or(DEFAULT_REMINDER_TIME);
        Ok(Reminder::new(
            title,
            parse_time_at(time, now),
            &self.config.profession,
            now,
        ))
    }

    fn build_template(&self, params: &StepParams, now: DateTime<Local>) -> ExecResult<Template> {
        let name = params
            .name
            .as_deref()
            .or(params.title.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ExecError::MissingTitle {
                kind: StepKind::Template,
            })?;

        ensure_unique_template_name(self.store, name, None)?;

        let fields = params
            .fields
            .clone()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, spec)| TemplateField {
                id: format!("field_{}", index + 1),
                label: spec.name,
                kind: spec.kind,
                required: false,
                options: spec.options,
            })
            .collect();
        Ok(Template::new(name, fields, now))
    }
}

/// Rejects a template name that collides case-insensitively with a stored
/// template other than `exclude` itself.
pub(crate) fn ensure_unique_template_name<S: Store>(
    store: &S,
    name: &str,
    exclude: Option<crate::model::item::ItemId>,
) -> ExecResult<()> {
    let collision = store
        .list_templates()?
        .into_iter()
        .any(|existing| existing.name.eq_ignore_ascii_case(name) && Some(existing.id) != exclude);
    if collision {
        return Err(ExecError::DuplicateTemplate {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Persists one staged/constructed item, scheduling the reminder
/// notification first when one is still missing.
pub(crate) fn persist_item<S: Store, N: NotificationScheduler>(
    store: &S,
    notifier: &N,
    data: &mut ItemData,
) -> ExecResult<()> {
    match data {
        ItemData::Note(note) => store.save_note(note)?,
        ItemData::Task(task) => store.save_task(task)?,
        ItemData::Reminder(reminder) => {
            if reminder.notification_id.is_none() {
                reminder.notification_id = notifier.schedule(
                    &reminder.title,
                    notification_body(reminder),
                    reminder.date_time,
                );
            }
            store.save_reminder(reminder)?;
        }
        ItemData::Template(template) => {
            ensure_unique_template_name(store, &template.name, Some(template.id))?;
            store.save_template(template)?;
        }
    }
    Ok(())
}

fn notification_body(reminder: &Reminder) -> &str {
    if reminder.description.is_empty() {
        "Reminder"
    } else {
        &reminder.description
    }
}

fn required_title(params: &StepParams, kind: StepKind) -> ExecResult<String> {
    params
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .ok_or(ExecError::MissingTitle { kind })
}

/// Title derivation for notes without an explicit one: first 50 chars of
/// content, with an ellipsis when truncated.
fn derive_note_title(content: &str) -> String {
    let mut title: String = content.chars().take(DERIVED_TITLE_CHARS).collect();
    if content.chars().count() > DERIVED_TITLE_CHARS {
        title.push('…');
    }
    title
}

fn help_outcome() -> PlanOutcome {
    PlanOutcome {
        success: true,
        message: help::help_text(),
        ..PlanOutcome::default()
    }
}

fn build_message(
    commit: bool,
    counts: &StepCounts,
    hit_count: usize,
    found_query: Option<&str>,
) -> String {
    let mut parts = Vec::new();
    push_part(&mut parts, counts.notes, "note");
    push_part(&mut parts, counts.tasks, "task");
    push_part(&mut parts, counts.reminders, "reminder");
    push_part(&mut parts, counts.templates, "template");

    let mut message = String::new();
    if !parts.is_empty() {
        let verb = if commit { "Created" } else { "Staged" };
        message.push_str(&format!("{verb} {}.", parts.join(", ")));
    }
    if counts.searches > 0 {
        if !message.is_empty() {
            message.push(' ');
        }
        match found_query {
            Some(query) => {
                message.push_str(&format!("Found {hit_count} results for \"{query}\"."))
            }
            None => message.push_str(&format!("Found {hit_count} results.")),
        }
    }
    if counts.failed > 0 {
        if !message.is_empty() {
            message.push(' ');
        }
        message.push_str(&format!("{} step(s) failed.", counts.failed));
    }
    if message.is_empty() {
        message.push_str("Nothing was executed.");
    }
    message
}

fn push_part(parts: &mut Vec<String>, count: u32, noun: &str) {
    if count == 0 {
        return;
    }
    if count == 1 {
        parts.push(format!("1 {noun}"));
    } else {
        parts.push(format!("{count} {noun}s"));
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandExecutor, ExecError};
    use crate::config::VoiceConfig;
    use crate::model::plan::{PlanStep, StepKind, StepParams};
    use crate::notify::NullScheduler;
    use crate::store::MemoryStore;
    use chrono::Local;

    fn step(seq: u32, kind: StepKind, params: StepParams) -> PlanStep {
        PlanStep::new(seq, kind, "test step", params)
    }

    #[test]
    fn note_title_is_derived_and_truncated_at_fifty_chars() {
        let store = MemoryStore::new();
        let config = VoiceConfig::default();
        let executor = CommandExecutor::new(&store, &NullScheduler, &config);

        let long_content = "a".repeat(60);
        let outcome = executor.preview_plan(
            &[step(
                1,
                StepKind::Note,
                StepParams {
                    content: Some(long_content),
                    ..StepParams::default()
                },
            )],
            Local::now(),
        );

        assert!(outcome.success);
        let staged = &outcome.staged[0];
        assert_eq!(staged.data().title().chars().count(), 51);
        assert!(staged.data().title().ends_with('…'));
    }

    #[test]
    fn blank_note_content_fails_with_empty_content() {
        let store = MemoryStore::new();
        let config = VoiceConfig::default();
        let executor = CommandExecutor::new(&store, &NullScheduler, &config);

        let outcome = executor.preview_plan(
            &[step(
                1,
                StepKind::Note,
                StepParams {
                    content: Some("   ".to_string()),
                    ..StepParams::default()
                },
            )],
            Local::now(),
        );

        assert!(!outcome.success);
        assert_eq!(outcome.counts.failed, 1);
        assert!(outcome.errors[0].contains("content is empty"));
    }

    #[test]
    fn blank_search_query_fails_with_empty_query() {
        let store = MemoryStore::new();
        let config = VoiceConfig::default();
        let executor = CommandExecutor::new(&store, &NullScheduler, &config);

        let outcome = executor.preview_plan(
            &[step(1, StepKind::Search, StepParams::default())],
            Local::now(),
        );

        assert!(!outcome.success);
        assert!(outcome.errors[0].contains("query is empty"));
    }

    #[test]
    fn understanding_failure_carries_guidance() {
        let err = ExecError::Understanding {
            original: "blorp".to_string(),
        };
        let guidance = err.guidance().expect("guidance should exist");
        assert!(guidance.contains("blorp"));
    }
}
