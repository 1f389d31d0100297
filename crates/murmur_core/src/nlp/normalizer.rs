//! Fuzzy speech normalizer.
//!
//! # Responsibility
//! - Strip filler tokens from raw transcripts with word-boundary matching.
//! - Restructure loose speech into a canonical imperative sentence using an
//!   ordered first-match-wins pattern list.
//!
//! # Invariants
//! - Never fails; worst case returns the input minimally reformatted.
//! - Every edit is journaled to `suggested_changes` in application order.

use crate::model::command::Intent;
use once_cell::sync::Lazy;
use regex::Regex;

/// Confidence assigned when a restructuring pattern matched.
const MATCHED_CONFIDENCE: f64 = 0.8;
/// Confidence when only filler stripping applied.
const DEFAULT_CONFIDENCE: f64 = 0.5;

static FILLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:you know|i mean|sort of|kind of|i guess|basically|actually|um+|uh+|er+m*|hmm+|like)\b",
    )
    .expect("valid filler regex")
});
static MULTI_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([,.!?])").expect("valid punct-spacing regex"));

static SEARCH_REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:can you |could you |please )?(?:search(?: for)?|look(?: for| up)?|find(?: me)?)\s+(?P<what>.+)$",
    )
    .expect("valid search restructure regex")
});
static NOTE_REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:i (?:want|need) to |please |can you )?(?:make|create|take|write)\s+(?:a |some )?notes?\s*(?:about|on|saying|that says?|:)?\s*(?P<what>.+)$",
    )
    .expect("valid note restructure regex")
});
static REMINDER_REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:please )?remind me\s+(?:to\s+)?(?P<what>.+?)\s+(?P<when>in \d+ (?:minutes?|hours?)|tomorrow(?: at \d{1,2}(?::\d{2})?\s*(?:am|pm)?)?|at \d{1,2}(?::\d{2})?\s*(?:am|pm))\s*[.!?]?$",
    )
    .expect("valid reminder restructure regex")
});
static OBLIGATION_REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:so )?i (?:need|have|want) to\s+(?P<what>.+)$")
        .expect("valid obligation restructure regex")
});

/// Output of one normalization pass; ephemeral per utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyOutcome {
    pub original_text: String,
    pub cleaned_text: String,
    /// Best-effort guess, advisory only; the parser stays authoritative.
    pub detected_intent: Intent,
    pub confidence: f64,
    /// Ordered, append-only journal of human-readable edit descriptions.
    pub suggested_changes: Vec<String>,
}

impl FuzzyOutcome {
    /// Whether normalization produced something different from the input.
    pub fn changed(&self) -> bool {
        self.cleaned_text != self.original_text
    }
}

/// Rewrites a raw transcript into canonical imperative text.
pub fn normalize(text: &str) -> FuzzyOutcome {
    let mut changes = Vec::new();
    let stripped = strip_fillers(text, &mut changes);

    let mut detected = Intent::Unknown;
    let mut confidence = DEFAULT_CONFIDENCE;
    let mut cleaned = stripped.clone();

    if let Some((intent, rewritten, description)) = restructure(&stripped) {
        detected = intent;
        confidence = MATCHED_CONFIDENCE;
        cleaned = rewritten;
        changes.push(description);
    }

    FuzzyOutcome {
        original_text: text.to_string(),
        cleaned_text: finalize(&cleaned),
        detected_intent: detected,
        confidence,
        suggested_changes: changes,
    }
}

fn strip_fillers(text: &str, changes: &mut Vec<String>) -> String {
    for found in FILLER_RE.find_iter(text) {
        changes.push(format!("Removed filler \"{}\"", found.as_str()));
    }

    let without = FILLER_RE.replace_all(text, " ");
    let collapsed = MULTI_SPACE_RE.replace_all(&without, " ");
    let respaced = SPACE_BEFORE_PUNCT_RE.replace_all(&collapsed, "$1");
    respaced.trim().to_string()
}

/// Tries the ordered restructuring patterns; the first match wins.
fn restructure(text: &str) -> Option<(Intent, String, String)> {
    if let Some(caps) = SEARCH_REQUEST_RE.captures(text) {
        let what = trim_tail(&caps["what"]);
        return Some((
            Intent::Search,
            format!("Search for: {what}."),
            "Restructured as a search request".to_string(),
        ));
    }

    if let Some(caps) = NOTE_REQUEST_RE.captures(text) {
        let what = trim_tail(&caps["what"]);
        return Some((
            Intent::CreateNote,
            format!("Create note: {what}."),
            "Restructured as a note".to_string(),
        ));
    }

    if let Some(caps) = REMINDER_REQUEST_RE.captures(text) {
        let what = trim_tail(&caps["what"]);
        let when = caps["when"].trim();
        return Some((
            Intent::SetReminder,
            format!("Set reminder: {what} {when}."),
            "Restructured as a reminder".to_string(),
        ));
    }

    if let Some(caps) = OBLIGATION_REQUEST_RE.captures(text) {
        let what = trim_tail(&caps["what"]);
        return Some((
            Intent::CreateTask,
            format!("Create task: {what}."),
            "Restructured as a task".to_string(),
        ));
    }

    None
}

fn trim_tail(text: &str) -> &str {
    text.trim().trim_end_matches(['.', '!', '?', ','])
}

/// Capitalization and terminal punctuation pass.
fn finalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(trimmed.len() + 1);
    let mut capitalize_next = true;
    for ch in trimmed.chars() {
        if capitalize_next && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            capitalize_next = false;
            continue;
        }
        if matches!(ch, '.' | '!' | '?') {
            capitalize_next = true;
        }
        out.push(ch);
    }

    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}
