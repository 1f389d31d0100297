//! Language-model planning collaborator contracts.
//!
//! # Responsibility
//! - Define the planning interface and its JSON wire shapes.
//! - Extract the first balanced JSON object from free-form model output.
//!
//! # Invariants
//! - Collaborators signal unavailability through `LlmError`, never by
//!   panicking; callers downgrade to the local regex path.

use crate::config::VoiceConfig;
use crate::model::plan::{PlanStep, StepKind, StepParams};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod gemini;

pub use gemini::GeminiPlanner;

pub type LlmResult<T> = Result<T, LlmError>;

/// Collaborator-level failure; always recoverable by falling back locally.
#[derive(Debug)]
pub enum LlmError {
    /// Missing key/network; the collaborator cannot be used at all.
    Unavailable(String),
    /// The call was made but transport failed or timed out.
    Transport(String),
    /// The call succeeded but the response carried no usable JSON.
    Malformed(String),
}

impl Display for LlmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "planner unavailable: {message}"),
            Self::Transport(message) => write!(f, "planner transport failure: {message}"),
            Self::Malformed(message) => write!(f, "planner response malformed: {message}"),
        }
    }
}

impl Error for LlmError {}

/// Multi-step plan response.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplexPlanResponse {
    #[serde(rename = "isComplexCommand")]
    pub is_complex_command: bool,
    #[serde(default, rename = "executionPlan")]
    pub execution_plan: Vec<PlanStep>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// One proposed action in a direct (single-shot) response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectAction {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, rename = "parameters")]
    pub params: StepParams,
}

/// Direct single-action response with a confidence score.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tasks: Vec<DirectAction>,
    #[serde(default)]
    pub confidence: f64,
}

/// Planning interface over an external language model.
pub trait LanguagePlanner {
    /// Asks for a multi-step execution plan for the transcript.
    fn plan_complex(
        &self,
        transcript: &str,
        config: &VoiceConfig,
    ) -> LlmResult<ComplexPlanResponse>;

    /// Asks for a single intent + parameters with a confidence score.
    fn plan_direct(&self, transcript: &str, config: &VoiceConfig) -> LlmResult<DirectResponse>;
}

/// Returns the first balanced `{...}` block in `text`, if any.
///
/// String literals and escapes are honored, so braces inside JSON strings
/// do not unbalance the scan.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{extract_json_block, ComplexPlanResponse, DirectResponse};

    #[test]
    fn extracts_first_balanced_block_from_prose() {
        let text = "Sure! Here is the plan:\n```json\n{\"isComplexCommand\": true}\n``` done";
        assert_eq!(extract_json_block(text), Some("{\"isComplexCommand\": true}"));
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let text = r#"{"reasoning": "use {curly} braces", "isComplexCommand": false}"#;
        assert_eq!(extract_json_block(text), Some(text));
    }

    #[test]
    fn text_without_json_yields_none() {
        assert_eq!(extract_json_block("no json here"), None);
        assert_eq!(extract_json_block("{ unterminated"), None);
    }

    #[test]
    fn complex_plan_parses_from_wire_json() {
        let json = r#"{
            "isComplexCommand": true,
            "executionPlan": [
                {"step": 1, "type": "note", "action": "a", "parameters": {"content": "x"}, "priority": 1},
                {"step": 2, "type": "search", "action": "b", "parameters": {"query": "x"}, "priority": 2}
            ],
            "reasoning": "two actions requested"
        }"#;
        let parsed: ComplexPlanResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.is_complex_command);
        assert_eq!(parsed.execution_plan.len(), 2);
    }

    #[test]
    fn direct_response_tolerates_missing_fields() {
        let parsed: DirectResponse = serde_json::from_str("{}").unwrap();
        assert!(!parsed.success);
        assert!(parsed.tasks.is_empty());
        assert_eq!(parsed.confidence, 0.0);
    }
}
