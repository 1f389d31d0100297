//! Core voice-command interpretation for Murmur.
//! This crate is the single source of truth for transcript-to-action
//! behavior: normalization, intent parsing, planning, execution and search.

pub mod config;
pub mod db;
pub mod exec;
pub mod help;
pub mod llm;
pub mod logging;
pub mod model;
pub mod nlp;
pub mod notify;
pub mod pipeline;
pub mod planner;
pub mod search;
pub mod store;

pub use config::{VoiceConfig, VoiceMethod};
pub use exec::{
    CommandExecutor, ConfirmReport, ExecError, ExecResult, ItemData, PlanOutcome, PreviewItem,
    PreviewSession, StepCounts,
};
pub use llm::{
    ComplexPlanResponse, DirectAction, DirectResponse, GeminiPlanner, LanguagePlanner, LlmError,
    LlmResult,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::command::{Intent, IntentParams, VoiceCommand};
pub use model::item::{ItemId, ItemKind, Note, Reminder, Task, Template, TemplateField};
pub use model::plan::{sorted_for_execution, PlanStep, StepKind, StepParams, TemplateFieldSpec};
pub use nlp::normalizer::{normalize, FuzzyOutcome};
pub use nlp::parser::parse;
pub use nlp::time::{parse_time, parse_time_at};
pub use notify::{NotificationScheduler, NullScheduler};
pub use pipeline::{PipelineOutcome, VoicePipeline};
pub use planner::{CommandPlanner, PlannedCommand};
pub use search::{clean_query, search_store, FoundItem, SearchHit};
pub use store::{MemoryStore, SqliteStore, Store, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
