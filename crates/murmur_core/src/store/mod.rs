//! Storage collaborator contracts.
//!
//! # Responsibility
//! - Define the key-value style persistence interface the executor talks
//!   to, decoupled from any storage engine.
//!
//! # Invariants
//! - Every save is idempotent on the item `id` (upsert semantics).
//! - Implementations provide atomic per-item operations; no cross-item
//!   transactions are assumed or required.

use crate::db::DbError;
use crate::model::item::{Note, Reminder, Task, Template};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence-layer error.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Persisted state failed to decode back into a domain object.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence interface consumed by execution and search.
pub trait Store {
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
    fn list_tasks(&self) -> StoreResult<Vec<Task>>;
    fn list_reminders(&self) -> StoreResult<Vec<Reminder>>;
    fn list_templates(&self) -> StoreResult<Vec<Template>>;

    fn save_note(&self, note: &Note) -> StoreResult<()>;
    fn save_task(&self, task: &Task) -> StoreResult<()>;
    fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()>;
    fn save_template(&self, template: &Template) -> StoreResult<()>;
}
