//! Voice-processing configuration.
//!
//! # Responsibility
//! - Carry the interpretation method, language and profession explicitly
//!   through planner/executor calls.
//!
//! # Invariants
//! - Configuration is passed by value/reference, never read from ambient
//!   global state.

use serde::{Deserialize, Serialize};

/// Interpretation backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMethod {
    /// Local pattern matching only; no network calls.
    Regex,
    /// Escalate to the Gemini planning collaborator when available.
    Gemini,
}

/// Per-call processing configuration threaded into planner and executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub method: VoiceMethod,
    /// BCP-47 language tag of the transcript; forwarded to the LLM prompt.
    pub language: String,
    /// User profession, stamped onto created tasks/reminders and forwarded
    /// to the LLM prompt for domain-aware planning.
    pub profession: String,
}

impl VoiceConfig {
    pub fn regex() -> Self {
        Self {
            method: VoiceMethod::Regex,
            ..Self::default()
        }
    }

    pub fn gemini() -> Self {
        Self {
            method: VoiceMethod::Gemini,
            ..Self::default()
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            method: VoiceMethod::Regex,
            language: "en".to_string(),
            profession: "general".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{VoiceConfig, VoiceMethod};

    #[test]
    fn default_config_uses_local_method() {
        let config = VoiceConfig::default();
        assert_eq!(config.method, VoiceMethod::Regex);
        assert_eq!(config.language, "en");
    }
}
