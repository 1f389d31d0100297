//! Capability help catalogue.
//!
//! # Responsibility
//! - Provide the fixed list of example utterances shown for `show_help`
//!   and for commands the pipeline could not understand.

/// Example commands the interpreter is known to handle.
pub const EXAMPLE_COMMANDS: &[&str] = &[
    "Create a note about the team meeting",
    "Note to self: order more supplies",
    "Create a task to review the contract by friday",
    "Remind me to call the pharmacy tomorrow at 3pm",
    "Set a reminder for the staff meeting in 2 hours",
    "Create a template called patient intake",
    "Search for patient notes",
    "Show me my tasks",
];

/// Renders the help answer returned for `show_help`.
pub fn help_text() -> String {
    let mut out = String::from("You can say things like:\n");
    for example in EXAMPLE_COMMANDS {
        out.push_str("  - ");
        out.push_str(example);
        out.push('\n');
    }
    out
}

/// Renders the guidance shown when an utterance could not be understood.
pub fn understanding_failure_text(original: &str) -> String {
    format!(
        "I didn't understand \"{original}\". Try one of:\n{}",
        EXAMPLE_COMMANDS
            .iter()
            .map(|example| format!("  - {example}"))
            .collect::<Vec<_>>()
            .join("\n")
    )
}
