//! End-to-end voice-command pipeline.
//!
//! # Responsibility
//! - Compose normalizer, parser, planner and executor into the one-way
//!   transcript-to-action flow.
//!
//! # Invariants
//! - One utterance is processed fully before the next; plan steps never run
//!   concurrently.
//! - Diagnostics log lengths, intents and counts, never transcript text or
//!   parsed parameter values.

use crate::config::VoiceConfig;
use crate::exec::{CommandExecutor, ExecResult, PlanOutcome};
use crate::llm::{GeminiPlanner, LanguagePlanner};
use crate::model::command::VoiceCommand;
use crate::nlp::normalizer::{normalize, FuzzyOutcome};
use crate::nlp::parser;
use crate::notify::NotificationScheduler;
use crate::planner::{CommandPlanner, PlannedCommand};
use crate::store::Store;
use chrono::{DateTime, Local};
use log::info;
use std::time::Instant;

/// Everything one pipeline run produced, stage by stage.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub fuzzy: FuzzyOutcome,
    pub command: VoiceCommand,
    pub result: PlanOutcome,
}

/// Transcript-to-action pipeline over pluggable collaborators.
pub struct VoicePipeline<S: Store, L: LanguagePlanner, N: NotificationScheduler> {
    store: S,
    llm: Option<L>,
    notifier: N,
    config: VoiceConfig,
}

impl<S: Store, N: NotificationScheduler> VoicePipeline<S, GeminiPlanner, N> {
    /// Pipeline with no LLM collaborator; everything runs locally.
    pub fn regex_only(store: S, notifier: N) -> Self {
        Self {
            store,
            llm: None,
            notifier,
            config: VoiceConfig::regex(),
        }
    }
}

impl<S: Store, L: LanguagePlanner, N: NotificationScheduler> VoicePipeline<S, L, N> {
    pub fn new(store: S, llm: Option<L>, notifier: N, config: VoiceConfig) -> Self {
        Self {
            store,
            llm,
            notifier,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Runs the pipeline in preview mode: staged items, no side effects.
    pub fn preview(&self, transcript: &str) -> ExecResult<PipelineOutcome> {
        self.preview_at(transcript, Local::now())
    }

    /// Preview anchored to an explicit reference time.
    pub fn preview_at(
        &self,
        transcript: &str,
        now: DateTime<Local>,
    ) -> ExecResult<PipelineOutcome> {
        self.run(transcript, now, false)
    }

    /// Runs the pipeline in commit mode: effects are persisted.
    pub fn commit(&self, transcript: &str) -> ExecResult<PipelineOutcome> {
        self.commit_at(transcript, Local::now())
    }

    /// Commit anchored to an explicit reference time.
    pub fn commit_at(
        &self,
        transcript: &str,
        now: DateTime<Local>,
    ) -> ExecResult<PipelineOutcome> {
        self.run(transcript, now, true)
    }

    fn run(
        &self,
        transcript: &str,
        now: DateTime<Local>,
        commit: bool,
    ) -> ExecResult<PipelineOutcome> {
        let started_at = Instant::now();

        let fuzzy = normalize(transcript);
        let cleaned = if fuzzy.changed() {
            Some(fuzzy.cleaned_text.clone())
        } else {
            None
        };
        let command =
            parser::parse(&fuzzy.cleaned_text).with_origin(transcript.to_string(), cleaned);

        let planner = CommandPlanner::new(self.llm.as_ref());
        let planned = planner.plan(&command, &self.config);

        let executor = CommandExecutor::new(&self.store, &self.notifier, &self.config);
        let result = match &planned {
            PlannedCommand::Single(single) => {
                if commit {
                    executor.commit_command(single, now)?
                } else {
                    executor.preview_command(single, now)?
                }
            }
            PlannedCommand::Multi(steps) => {
                if commit {
                    executor.commit_plan(steps, now)
                } else {
                    executor.preview_plan(steps, now)
                }
            }
        };

        let command = match planned {
            PlannedCommand::Single(single) => single,
            PlannedCommand::Multi(_) => command,
        };

        info!(
            "event=pipeline module=pipeline status=ok mode={} transcript_chars={} intent={} ok={} failed={} duration_ms={}",
            if commit { "commit" } else { "preview" },
            transcript.chars().count(),
            command.intent.as_str(),
            result.counts.succeeded,
            result.counts.failed,
            started_at.elapsed().as_millis()
        );

        Ok(PipelineOutcome {
            fuzzy,
            command,
            result,
        })
    }
}
