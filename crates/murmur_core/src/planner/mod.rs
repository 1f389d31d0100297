//! Command planner: local passthrough or LLM escalation.
//!
//! # Responsibility
//! - Decide per utterance whether to trust the pattern parser's result or
//!   escalate to the language-model collaborator for a multi-step plan.
//!
//! # Invariants
//! - Help requests are short-circuited lexically before any LLM call.
//! - Every collaborator failure downgrades silently to the regex path;
//!   planning never raises.
//! - LLM single-action results below the confidence gate are discarded in
//!   favor of the local parse.

use crate::config::{VoiceConfig, VoiceMethod};
use crate::llm::{LanguagePlanner, LlmError};
use crate::model::command::{Intent, IntentParams, VoiceCommand};
use crate::model::plan::{PlanStep, StepKind, StepParams};
use crate::nlp::parser;
use log::{info, warn};

/// Minimum LLM confidence required to supersede the local parse.
const LLM_CONFIDENCE_GATE: f64 = 0.6;

/// Planner decision: one command or an ordered multi-step plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedCommand {
    Single(VoiceCommand),
    Multi(Vec<PlanStep>),
}

/// Plans execution for parsed commands, optionally consulting an LLM.
pub struct CommandPlanner<'a, L: LanguagePlanner> {
    llm: Option<&'a L>,
}

impl<'a, L: LanguagePlanner> CommandPlanner<'a, L> {
    pub fn new(llm: Option<&'a L>) -> Self {
        Self { llm }
    }

    /// Decides how the given command should execute.
    pub fn plan(&self, command: &VoiceCommand, config: &VoiceConfig) -> PlannedCommand {
        // Capability questions are answered locally; a network round-trip
        // would buy nothing.
        if command.intent == Intent::ShowHelp
            || parser::is_help_request(&command.original_text.to_lowercase())
        {
            return PlannedCommand::Single(
                VoiceCommand::new(
                    Intent::ShowHelp,
                    IntentParams::None,
                    command.original_text.clone(),
                )
                .with_confidence(0.95),
            );
        }

        let llm = match (config.method, self.llm) {
            (VoiceMethod::Gemini, Some(llm)) => llm,
            _ => return passthrough(command),
        };

        match llm.plan_complex(&command.original_text, config) {
            Ok(response) if response.is_complex_command && response.execution_plan.len() > 1 => {
                info!(
                    "event=plan module=planner status=ok path=complex steps={}",
                    response.execution_plan.len()
                );
                PlannedCommand::Multi(response.execution_plan)
            }
            Ok(_) => self.plan_direct(llm, command, config),
            Err(err) => {
                downgrade("complex", &err);
                passthrough(command)
            }
        }
    }

    fn plan_direct(
        &self,
        llm: &L,
        command: &VoiceCommand,
        config: &VoiceConfig,
    ) -> PlannedCommand {
        match llm.plan_direct(&command.original_text, config) {
            Ok(response) if response.confidence >= LLM_CONFIDENCE_GATE => {
                match response.tasks.len() {
                    0 => passthrough(command),
                    1 => {
                        let action = &response.tasks[0];
                        match command_from_action(action.kind, &action.params, command) {
                            Some(single) => {
                                info!("event=plan module=planner status=ok path=direct");
                                PlannedCommand::Single(
                                    single.with_confidence(response.confidence),
                                )
                            }
                            None => passthrough(command),
                        }
                    }
                    // Several proposed actions are promoted to a plan so the
                    // tail is not discarded.
                    _ => PlannedCommand::Multi(
                        response
                            .tasks
                            .into_iter()
                            .enumerate()
                            .map(|(index, action)| {
                                PlanStep::new(
                                    index as u32 + 1,
                                    action.kind,
                                    "proposed action",
                                    action.params,
                                )
                            })
                            .collect(),
                    ),
                }
            }
            Ok(response) => {
                info!(
                    "event=plan module=planner status=fallback reason=low_confidence confidence={:.2}",
                    response.confidence
                );
                passthrough(command)
            }
            Err(err) => {
                downgrade("direct", &err);
                passthrough(command)
            }
        }
    }
}

/// Regex path: use the command as-is, with one last-chance re-parse of the
/// original transcript when the incoming intent is `unknown`.
fn passthrough(command: &VoiceCommand) -> PlannedCommand {
    if command.intent == Intent::Unknown {
        let reparsed = parser::parse(&command.original_text)
            .with_origin(command.original_text.clone(), command.cleaned_text.clone());
        return PlannedCommand::Single(reparsed);
    }
    PlannedCommand::Single(command.clone())
}

fn downgrade(path: &str, err: &LlmError) {
    warn!("event=plan module=planner status=downgrade path={path} error={err}");
}

/// Builds a single-intent command out of one LLM-proposed action.
fn command_from_action(
    kind: StepKind,
    params: &StepParams,
    source: &VoiceCommand,
) -> Option<VoiceCommand> {
    let intent_params = match kind {
        StepKind::Search => IntentParams::Search {
            query: params.query.clone()?,
        },
        StepKind::Note => IntentParams::Note {
            content: params.content.clone()?,
            title: params.title.clone(),
        },
        StepKind::Reminder => IntentParams::Reminder {
            title: params.title.clone()?,
            time: params.time.clone(),
        },
        StepKind::Task => IntentParams::Task {
            title: params.title.clone()?,
            due_date: params.due_date.clone(),
        },
        // A lone template action still executes as a one-step plan; there
        // is no single-intent projection for it.
        StepKind::Template => return None,
    };

    let intent = match kind {
        StepKind::Search => Intent::Search,
        StepKind::Note => Intent::CreateNote,
        StepKind::Reminder => Intent::SetReminder,
        StepKind::Task => Intent::CreateTask,
        StepKind::Template => return None,
    };

    Some(
        VoiceCommand::new(intent, intent_params, source.original_text.clone())
            .with_origin(source.original_text.clone(), source.cleaned_text.clone()),
    )
}
