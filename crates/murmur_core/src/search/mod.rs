//! Relevance-scored search over stored items.
//!
//! # Responsibility
//! - Clean spoken queries of command-verb prefixes and determiners.
//! - Score notes, tasks and reminders into one ranked result pool.
//!
//! # Invariants
//! - Relevance is lower-is-better: 0 is a perfect match. Easy to invert by
//!   accident; tests pin the direction.
//! - Result ordering is deterministic: ascending score, stable within ties.

use crate::model::item::{ItemKind, Note, Reminder, Task};
use crate::store::{Store, StoreResult};

const PHRASE_IN_BODY_SCORE: f64 = 0.1;
const PHRASE_IN_TITLE_SCORE: f64 = 0.2;
const MULTI_TERM_BASE_SCORE: f64 = 0.3;
const SINGLE_TERM_SCORE: f64 = 0.4;
const MIN_TERM_COVERAGE: f64 = 0.7;
const TASK_QUERY_BOOST: f64 = 0.1;

const COMMAND_PREFIXES: &[&str] = &[
    "search for",
    "search",
    "find me",
    "find",
    "look for",
    "show me",
    "where is",
    "where are",
    "get me",
];
const DETERMINERS: &[&str] = &["all", "my", "the"];

/// One matched item; the item value is a read-only snapshot owned by the
/// result, never written back.
#[derive(Debug, Clone, PartialEq)]
pub enum FoundItem {
    Note(Note),
    Task(Task),
    Reminder(Reminder),
}

impl FoundItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Note(_) => ItemKind::Note,
            Self::Task(_) => ItemKind::Task,
            Self::Reminder(_) => ItemKind::Reminder,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Note(note) => &note.title,
            Self::Task(task) => &task.title,
            Self::Reminder(reminder) => &reminder.title,
        }
    }

    fn body(&self) -> &str {
        match self {
            Self::Note(note) => &note.content,
            Self::Task(task) => &task.description,
            Self::Reminder(reminder) => &reminder.description,
        }
    }
}

/// One search match with its lower-is-better relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub item: FoundItem,
    pub relevance: f64,
}

/// Strips command-verb prefixes and leading determiners, lowercased.
pub fn clean_query(raw: &str) -> String {
    let mut cleaned = raw.trim().to_lowercase();
    cleaned = cleaned
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_string();

    for prefix in COMMAND_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with(' ') {
                cleaned = rest.trim_start().to_string();
                break;
            }
        }
    }

    loop {
        let before = cleaned.len();
        for determiner in DETERMINERS {
            if let Some(rest) = cleaned.strip_prefix(determiner) {
                if rest.starts_with(' ') {
                    cleaned = rest.trim_start().to_string();
                }
            }
        }
        if cleaned.len() == before {
            break;
        }
    }

    cleaned
}

/// Searches notes, tasks and reminders, pooled and sorted best-first.
pub fn search_store<S: Store>(store: &S, raw_query: &str) -> StoreResult<Vec<SearchHit>> {
    let query = clean_query(raw_query);
    let terms = tokenize(&query);
    let boost_tasks = raw_query.to_lowercase().contains("task");

    let mut hits = Vec::new();

    for note in store.list_notes()? {
        let item = FoundItem::Note(note);
        if let Some(score) = score_item(&query, &terms, &item) {
            hits.push(SearchHit {
                item,
                relevance: score,
            });
        }
    }

    for task in store.list_tasks()? {
        let item = FoundItem::Task(task);
        if let Some(mut score) = score_item(&query, &terms, &item) {
            if boost_tasks {
                score -= TASK_QUERY_BOOST;
            }
            hits.push(SearchHit {
                item,
                relevance: score,
            });
        }
    }

    for reminder in store.list_reminders()? {
        let item = FoundItem::Reminder(reminder);
        if let Some(score) = score_item(&query, &terms, &item) {
            hits.push(SearchHit {
                item,
                relevance: score,
            });
        }
    }

    hits.sort_by(|a, b| {
        a.relevance
            .partial_cmp(&b.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(hits)
}

/// Whitespace tokens longer than one character.
fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

fn score_item(query: &str, terms: &[String], item: &FoundItem) -> Option<f64> {
    if query.is_empty() {
        return None;
    }

    let title = item.title().to_lowercase();
    let body = item.body().to_lowercase();

    if body.contains(query) {
        return Some(PHRASE_IN_BODY_SCORE);
    }
    if title.contains(query) {
        return Some(PHRASE_IN_TITLE_SCORE);
    }

    let haystack = format!("{title} {body}");
    if terms.len() > 1 {
        let matched = terms
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .count();
        let coverage = matched as f64 / terms.len() as f64;
        if coverage >= MIN_TERM_COVERAGE {
            return Some(MULTI_TERM_BASE_SCORE + (1.0 - coverage) * 0.2);
        }
        return None;
    }

    if let [term] = terms {
        if haystack.contains(term.as_str()) {
            return Some(SINGLE_TERM_SCORE);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{clean_query, search_store};
    use crate::model::item::{ItemKind, Note, Task};
    use crate::store::{MemoryStore, Store};
    use chrono::Local;

    fn seeded_store() -> MemoryStore {
        let now = Local::now();
        let store = MemoryStore::new();
        store
            .save_note(&Note::new("Patient Notes Jan", "intake summaries", now))
            .unwrap();
        store
            .save_task(&Task::new("File patient paperwork and notes", now, "general", now))
            .unwrap();
        store
            .save_note(&Note::new("Groceries", "milk eggs bread", now))
            .unwrap();
        store
    }

    #[test]
    fn clean_query_strips_prefix_and_determiners() {
        assert_eq!(clean_query("search for all my patient notes"), "patient notes");
        assert_eq!(clean_query("show me the tasks"), "tasks");
        assert_eq!(clean_query("find budget"), "budget");
    }

    #[test]
    fn title_phrase_match_beats_multi_term_match() {
        let store = seeded_store();
        let hits = search_store(&store, "search for patient notes").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item.kind(), ItemKind::Note);
        assert_eq!(hits[1].item.kind(), ItemKind::Task);
        assert!(hits[0].relevance < hits[1].relevance);
    }

    #[test]
    fn low_coverage_multi_term_query_does_not_match() {
        let store = seeded_store();
        let hits = search_store(&store, "search for patient paperwork shredder").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn task_mention_in_query_boosts_task_results() {
        let now = Local::now();
        let store = MemoryStore::new();
        store
            .save_note(&Note::new("open tasks list", "carried over from monday", now))
            .unwrap();
        store
            .save_task(&Task::new("open tasks list", now, "general", now))
            .unwrap();

        let hits = search_store(&store, "show me open tasks").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item.kind(), ItemKind::Task);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let store = seeded_store();
        let hits = search_store(&store, "search for   ").unwrap();
        assert!(hits.is_empty());
    }
}
