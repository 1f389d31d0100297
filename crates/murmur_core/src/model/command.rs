//! Parsed voice-command model.
//!
//! # Responsibility
//! - Define the closed intent set and the per-intent parameter union.
//! - Keep the verbatim transcript available for audit and error messaging.
//!
//! # Invariants
//! - `Intent::Unknown` is a valid terminal state, never an error.
//! - A `VoiceCommand` is never mutated after the parser returns it;
//!   later enrichment supersedes it with a new value.

use serde::{Deserialize, Serialize};

/// Closed set of domain actions an utterance can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Search,
    CreateNote,
    SetReminder,
    CreateTask,
    ShowHelp,
    Unknown,
}

impl Intent {
    /// Stable lowercase name used in logging and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::CreateNote => "create_note",
            Self::SetReminder => "set_reminder",
            Self::CreateTask => "create_task",
            Self::ShowHelp => "show_help",
            Self::Unknown => "unknown",
        }
    }
}

/// Typed per-intent parameters.
///
/// Replaces the loose string-keyed parameter bag of the original design with
/// a union that the executor can match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentParams {
    Search {
        query: String,
    },
    Note {
        content: String,
        /// Explicit title when one was provided; otherwise the executor
        /// derives one from content.
        title: Option<String>,
    },
    Reminder {
        title: String,
        time: Option<String>,
    },
    Task {
        title: String,
        due_date: Option<String>,
    },
    None,
}

/// Parsed representation of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCommand {
    pub intent: Intent,
    pub params: IntentParams,
    /// Verbatim transcript, always retained.
    pub original_text: String,
    /// Normalizer rewrite, present only when normalization changed the text.
    pub cleaned_text: Option<String>,
    /// Parse reliability in `0..=1`, used only as a threshold gate.
    pub confidence: Option<f64>,
}

impl VoiceCommand {
    /// Builds a command carrying intent and parameters for the given text.
    pub fn new(intent: Intent, params: IntentParams, text: impl Into<String>) -> Self {
        Self {
            intent,
            params,
            original_text: text.into(),
            cleaned_text: None,
            confidence: None,
        }
    }

    /// Safe-default command for text the parser could not classify.
    pub fn unknown(text: impl Into<String>) -> Self {
        Self::new(Intent::Unknown, IntentParams::None, text)
    }

    /// Returns a superseding copy re-anchored to the raw transcript.
    ///
    /// `cleaned` should be `Some` only when normalization actually changed
    /// something.
    pub fn with_origin(mut self, original: impl Into<String>, cleaned: Option<String>) -> Self {
        self.original_text = original.into();
        self.cleaned_text = cleaned;
        self
    }

    /// Returns a superseding copy with the given confidence estimate.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Intent, IntentParams, VoiceCommand};

    #[test]
    fn unknown_is_a_valid_terminal_state() {
        let cmd = VoiceCommand::unknown("gibberish input");
        assert_eq!(cmd.intent, Intent::Unknown);
        assert_eq!(cmd.params, IntentParams::None);
        assert_eq!(cmd.original_text, "gibberish input");
        assert!(cmd.confidence.is_none());
    }

    #[test]
    fn with_origin_supersedes_without_mutating_params() {
        let cmd = VoiceCommand::new(
            Intent::Search,
            IntentParams::Search {
                query: "contracts".into(),
            },
            "Search for: contracts.",
        );
        let enriched = cmd
            .clone()
            .with_origin("umm search for contracts", Some("Search for: contracts.".into()));
        assert_eq!(enriched.params, cmd.params);
        assert_eq!(enriched.original_text, "umm search for contracts");
        assert_eq!(enriched.cleaned_text.as_deref(), Some("Search for: contracts."));
    }

    #[test]
    fn intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::CreateNote).unwrap();
        assert_eq!(json, "\"create_note\"");
    }
}
