//! Gemini-backed planning collaborator.
//!
//! # Responsibility
//! - Send transcripts to the Gemini generateContent endpoint and decode the
//!   JSON plan out of the model's free-form reply.
//!
//! # Invariants
//! - A missing API key is `LlmError::Unavailable`, decided before any
//!   network activity.
//! - Transcripts are sent verbatim to the model but never logged.

use crate::config::VoiceConfig;
use crate::llm::{
    extract_json_block, ComplexPlanResponse, DirectResponse, LanguagePlanner, LlmError, LlmResult,
};
use log::{info, warn};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Planner talking to the Gemini HTTP API.
pub struct GeminiPlanner {
    api_key: Option<String>,
    model: String,
}

impl GeminiPlanner {
    /// Creates a planner; `api_key = None` makes every call unavailable.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Reads the API key from `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GEMINI_API_KEY").ok())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(&self, prompt: &str) -> LlmResult<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(LlmError::Unavailable("no API key configured".to_string()));
        };

        let url = format!(
            "{ENDPOINT_BASE}/{model}:generateContent?key={api_key}",
            model = self.model
        );
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": 0.1}
        });
        let payload = serde_json::to_vec(&body)
            .map_err(|err| LlmError::Malformed(format!("request encode: {err}")))?;

        let mut resp = ureq::post(&url)
            .header("Content-Type", "application/json")
            .send(&payload)
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        let body_str = resp
            .body_mut()
            .read_to_string()
            .map_err(|err| LlmError::Transport(err.to_string()))?;
        let json: serde_json::Value = serde_json::from_str(&body_str)
            .map_err(|err| LlmError::Malformed(format!("response decode: {err}")))?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(LlmError::Malformed("empty model reply".to_string()));
        }

        info!(
            "event=llm_call module=llm status=ok model={} reply_chars={}",
            self.model,
            text.len()
        );
        Ok(text)
    }
}

impl LanguagePlanner for GeminiPlanner {
    fn plan_complex(
        &self,
        transcript: &str,
        config: &VoiceConfig,
    ) -> LlmResult<ComplexPlanResponse> {
        let reply = self.generate(&complex_prompt(transcript, config))?;
        let block = extract_json_block(&reply).ok_or_else(|| {
            warn!("event=llm_plan module=llm status=malformed kind=complex");
            LlmError::Malformed("no JSON object in reply".to_string())
        })?;
        serde_json::from_str(block)
            .map_err(|err| LlmError::Malformed(format!("complex plan decode: {err}")))
    }

    fn plan_direct(&self, transcript: &str, config: &VoiceConfig) -> LlmResult<DirectResponse> {
        let reply = self.generate(&direct_prompt(transcript, config))?;
        let block = extract_json_block(&reply).ok_or_else(|| {
            warn!("event=llm_plan module=llm status=malformed kind=direct");
            LlmError::Malformed("no JSON object in reply".to_string())
        })?;
        serde_json::from_str(block)
            .map_err(|err| LlmError::Malformed(format!("direct plan decode: {err}")))
    }
}

fn complex_prompt(transcript: &str, config: &VoiceConfig) -> String {
    format!(
        "You convert a voice transcript into an execution plan for a note-taking \
assistant. The speaker is a {profession}; the transcript language is {language}.\n\
Respond with exactly one JSON object:\n\
{{\n\
  \"isComplexCommand\": bool,\n\
  \"executionPlan\": [\n\
    {{\"step\": 1, \"type\": \"template|task|reminder|note|search\",\n\
      \"action\": \"short description\",\n\
      \"parameters\": {{\"content|title|time|dueDate|query|name|fields\": \"...\"}},\n\
      \"priority\": 1}}\n\
  ],\n\
  \"reasoning\": \"one sentence\"\n\
}}\n\
Use priority 1 for creations and 2 for searches. Set isComplexCommand to true \
only when the transcript asks for more than one action.\n\
Transcript: {transcript}",
        profession = config.profession,
        language = config.language,
    )
}

fn direct_prompt(transcript: &str, config: &VoiceConfig) -> String {
    format!(
        "You classify one voice command for a note-taking assistant. The speaker \
is a {profession}; the transcript language is {language}.\n\
Respond with exactly one JSON object:\n\
{{\n\
  \"success\": bool,\n\
  \"tasks\": [{{\"type\": \"template|task|reminder|note|search\", \"parameters\": {{}}}}],\n\
  \"confidence\": 0.0\n\
}}\n\
Transcript: {transcript}",
        profession = config.profession,
        language = config.language,
    )
}

#[cfg(test)]
mod tests {
    use super::GeminiPlanner;
    use crate::config::VoiceConfig;
    use crate::llm::{LanguagePlanner, LlmError};

    #[test]
    fn missing_key_is_unavailable_without_network() {
        let planner = GeminiPlanner::new(None);
        let err = planner
            .plan_complex("create a note", &VoiceConfig::default())
            .unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
        assert!(!planner.is_available());
    }
}
