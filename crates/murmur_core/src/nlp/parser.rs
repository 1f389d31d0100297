//! Pattern-based intent classifier.
//!
//! # Responsibility
//! - Map canonical or raw text to one intent plus typed parameters.
//! - Keep classification pure: no I/O, no failures, `unknown` as the safe
//!   terminal state.
//!
//! # Invariants
//! - Pattern families are tried in fixed precedence order: help, compound
//!   note, simple note, search, reminder, task. First match returns.
//! - Within a family, patterns form an ordered list; first match wins with
//!   no scoring or backtracking.

use crate::model::command::{Intent, IntentParams, VoiceCommand};
use once_cell::sync::Lazy;
use regex::Regex;

const HELP_CONFIDENCE: f64 = 0.95;
const COMPOUND_NOTE_CONFIDENCE: f64 = 0.9;
const NOTE_CONFIDENCE: f64 = 0.8;
const SEARCH_CONFIDENCE: f64 = 0.9;
const REMINDER_CONFIDENCE: f64 = 0.85;
const TASK_CONFIDENCE: f64 = 0.85;

/// Default reminder time when the utterance names none.
pub const DEFAULT_REMINDER_TIME: &str = "tomorrow 9am";
/// Default task due date when the utterance names none.
pub const DEFAULT_DUE_DATE: &str = "tomorrow";

const HELP_PHRASES: &[&str] = &[
    "what can you do",
    "what can i say",
    "show me help",
    "show help",
    "how does this work",
    "what do you understand",
];

static COMPOUND_NOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bcreate\s+(?:a\s+)?note\s+title[:,]?\s+(?P<title>.+?)(?:\s+and\s+description\s+(?:write\s+)?(?P<desc>.+))?$",
    )
    .expect("valid compound note regex")
});

static NOTE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:create|make|add|start)\s+(?:a\s+)?(?:new\s+)?notes?[:,]?\s*(?:about\s+|on\s+|saying\s+|that says\s+)?(?P<content>.+)$",
        r"(?i)^notes?\s+(?:to\s+self[:,]?\s+)?(?P<content>.+)$",
        r"(?i)^(?:please\s+)?(?:write|take)\s+(?:down\s+)?(?:a\s+)?notes?[:,]?\s*(?:about\s+|on\s+|saying\s+)?(?P<content>.+)$",
        r"(?i)^(?:please\s+)?write\s+down\s+(?P<content>.+)$",
        r"(?i)^record\s+(?:that\s+)?(?P<content>.+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid note regex"))
    .collect()
});

static SEARCH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bsearch\s+(?:for[:,]?\s+)?(?P<query>.+)$",
        r"(?i)^(?:please\s+|can you\s+)?find\s+(?:me\s+)?(?P<query>.+)$",
        r"(?i)\blook\s+for\s+(?P<query>.+)$",
        r"(?i)^show\s+me\s+(?P<query>.+)$",
        r"(?i)^where\s+(?:is|are)\s+(?P<query>.+)$",
        r"(?i)^get\s+me\s+(?P<query>.+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid search regex"))
    .collect()
});

static REMINDER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bset\s+(?:a\s+)?reminder[:,]?\s*(?:for\s+|to\s+|about\s+)?(?P<title>.+)$",
        r"(?i)\bremind\s+me\s+(?:to\s+|about\s+|of\s+)?(?P<title>.+)$",
        r"(?i)\bcreate\s+(?:a\s+)?reminder[:,]?\s*(?:for\s+|to\s+|about\s+)?(?P<title>.+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid reminder regex"))
    .collect()
});

static TASK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bcreate\s+(?:a\s+)?(?:new\s+)?task[:,]?\s+(?P<title>.+)$",
        r"(?i)\bnew\s+task[:,]?\s+(?P<title>.+)$",
        r"(?i)\badd\s+(?:a\s+)?task[:,]?\s+(?P<title>.+)$",
        r"(?i)\bmake\s+(?:a\s+)?task[:,]?\s+(?P<title>.+)$",
        r"(?i)^i\s+(?:need|have)\s+to\s+(?P<title>.+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid task regex"))
    .collect()
});

/// Trailing temporal expression, matched against original-case text.
static TIME_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\s+at)?\s+(?P<time>tomorrow(?:\s+(?:at\s+)?\d{1,2}(?::\d{2})?\s*(?:am|pm)?)?|today|tonight|in\s+\d+\s+(?:minutes?|hours?)|at\s+\d{1,2}(?::\d{2})?\s*(?:am|pm)?|\d{1,2}(?::\d{2})?\s*(?:am|pm))\s*[.!?]?\s*$",
    )
    .expect("valid time tail regex")
});

static DUE_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:due|by)\s+(?P<due>.+?)\s*[.!?]?\s*$").expect("valid due tail regex")
});

/// Classifies one utterance. Pure; never fails.
pub fn parse(text: &str) -> VoiceCommand {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return VoiceCommand::unknown(text);
    }

    let lower = trimmed.to_lowercase();

    if is_help_request(&lower) {
        return VoiceCommand::new(Intent::ShowHelp, IntentParams::None, text)
            .with_confidence(HELP_CONFIDENCE);
    }

    if let Some(command) = parse_compound_note(trimmed, text) {
        return command;
    }
    if let Some(command) = parse_note(trimmed, text) {
        return command;
    }
    if let Some(command) = parse_search(trimmed, text) {
        return command;
    }
    if let Some(command) = parse_reminder(trimmed, text) {
        return command;
    }
    if let Some(command) = parse_task(trimmed, text) {
        return command;
    }

    VoiceCommand::unknown(text)
}

/// Lexical help/capability detection, shared with the planner short-circuit.
pub fn is_help_request(lower_text: &str) -> bool {
    HELP_PHRASES
        .iter()
        .any(|phrase| lower_text.contains(phrase))
}

fn parse_compound_note(trimmed: &str, original: &str) -> Option<VoiceCommand> {
    let caps = COMPOUND_NOTE_RE.captures(trimmed)?;
    let title = clean_capture(&caps["title"]);
    if title.is_empty() {
        return None;
    }

    let content = match caps.name("desc").map(|m| clean_capture(m.as_str())) {
        Some(desc) if !desc.is_empty() => format!("{title}\n\n{desc}"),
        _ => title,
    };

    Some(
        VoiceCommand::new(
            Intent::CreateNote,
            IntentParams::Note {
                content,
                title: None,
            },
            original,
        )
        .with_confidence(COMPOUND_NOTE_CONFIDENCE),
    )
}

fn parse_note(trimmed: &str, original: &str) -> Option<VoiceCommand> {
    for pattern in NOTE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };
        let content = clean_capture(&caps["content"]);
        if content.is_empty() {
            continue;
        }
        return Some(
            VoiceCommand::new(
                Intent::CreateNote,
                IntentParams::Note {
                    content,
                    title: None,
                },
                original,
            )
            .with_confidence(NOTE_CONFIDENCE),
        );
    }
    None
}

fn parse_search(trimmed: &str, original: &str) -> Option<VoiceCommand> {
    for pattern in SEARCH_PATTERNS.iter() {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };
        let query = strip_leading_articles(&clean_capture(&caps["query"])).to_string();
        if query.is_empty() {
            continue;
        }
        return Some(
            VoiceCommand::new(Intent::Search, IntentParams::Search { query }, original)
                .with_confidence(SEARCH_CONFIDENCE),
        );
    }
    None
}

fn parse_reminder(trimmed: &str, original: &str) -> Option<VoiceCommand> {
    for pattern in REMINDER_PATTERNS.iter() {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };
        let raw_title = clean_capture(&caps["title"]);
        if raw_title.is_empty() {
            continue;
        }

        // Time is re-extracted from the original-case capture, not from a
        // lowercased copy.
        let (title, time) = split_time_tail(&raw_title);
        let time = time.unwrap_or_else(|| DEFAULT_REMINDER_TIME.to_string());

        return Some(
            VoiceCommand::new(
                Intent::SetReminder,
                IntentParams::Reminder {
                    title,
                    time: Some(time),
                },
                original,
            )
            .with_confidence(REMINDER_CONFIDENCE),
        );
    }
    None
}

fn parse_task(trimmed: &str, original: &str) -> Option<VoiceCommand> {
    for pattern in TASK_PATTERNS.iter() {
        let Some(caps) = pattern.captures(trimmed) else {
            continue;
        };
        let raw_title = clean_capture(&caps["title"]);
        if raw_title.is_empty() {
            continue;
        }

        let (after_due, due_date) = split_due_tail(&raw_title);
        let (title, embedded_time) = match due_date {
            Some(_) => (after_due, None),
            None => {
                let (title, time) = split_time_tail(&after_due);
                (title, time)
            }
        };
        let due_date = due_date
            .or(embedded_time)
            .unwrap_or_else(|| DEFAULT_DUE_DATE.to_string());

        let title = strip_leading_filler_preposition(&title).to_string();
        if title.is_empty() {
            continue;
        }

        return Some(
            VoiceCommand::new(
                Intent::CreateTask,
                IntentParams::Task {
                    title,
                    due_date: Some(due_date),
                },
                original,
            )
            .with_confidence(TASK_CONFIDENCE),
        );
    }
    None
}

/// Splits a trailing temporal expression off the text, if one is present.
fn split_time_tail(text: &str) -> (String, Option<String>) {
    match TIME_TAIL_RE.captures(text) {
        Some(caps) => {
            let time = caps["time"].trim().to_string();
            let full = caps.get(0).map_or(0, |m| m.start());
            let head = text[..full].trim().to_string();
            if head.is_empty() {
                // Whole text was temporal; keep it as title rather than
                // producing an empty one.
                (text.to_string(), None)
            } else {
                (head, Some(time))
            }
        }
        None => (text.to_string(), None),
    }
}

/// Splits an explicit "due X" / "by X" suffix off the text.
fn split_due_tail(text: &str) -> (String, Option<String>) {
    match DUE_TAIL_RE.captures(text) {
        Some(caps) => {
            let due = caps["due"].trim().to_string();
            let start = caps.get(0).map_or(0, |m| m.start());
            let head = text[..start].trim().to_string();
            if head.is_empty() {
                (text.to_string(), None)
            } else {
                (head, Some(due))
            }
        }
        None => (text.to_string(), None),
    }
}

fn clean_capture(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?', ','])
        .trim()
        .to_string()
}

fn strip_leading_articles(text: &str) -> &str {
    let mut rest = text.trim();
    loop {
        let lower = rest.to_lowercase();
        let stripped = ["the ", "my ", "all ", "a ", "an ", "some "]
            .iter()
            .find(|article| lower.starts_with(**article))
            .map(|article| rest[article.len()..].trim_start());
        match stripped {
            Some(next) if !next.is_empty() => rest = next,
            _ => return rest,
        }
    }
}

/// Drops a redundant leading preposition left over from task phrasing.
fn strip_leading_filler_preposition(text: &str) -> &str {
    let lower = text.to_lowercase();
    for prefix in ["for ", "to "] {
        if lower.starts_with(prefix) {
            return text[prefix.len()..].trim_start();
        }
    }
    text
}
