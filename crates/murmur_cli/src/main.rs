//! CLI probe for the voice-command pipeline.
//!
//! # Responsibility
//! - Run one transcript through the pipeline in preview mode against an
//!   in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use murmur_core::{MemoryStore, NullScheduler, VoicePipeline};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("murmur_core version={}", murmur_core::core_version());
        eprintln!("usage: murmur_cli <transcript words...>");
        std::process::exit(2);
    }

    let transcript = args.join(" ");
    let pipeline = VoicePipeline::regex_only(MemoryStore::new(), NullScheduler);

    match pipeline.preview(&transcript) {
        Ok(outcome) => {
            println!("cleaned={}", outcome.fuzzy.cleaned_text);
            println!("intent={}", outcome.command.intent.as_str());
            for change in &outcome.fuzzy.suggested_changes {
                println!("change={change}");
            }
            for item in &outcome.result.staged {
                println!(
                    "staged kind={} title={}",
                    item.kind().as_str(),
                    item.data().title()
                );
            }
            for hit in &outcome.result.hits {
                println!(
                    "hit kind={} title={} relevance={:.2}",
                    hit.item.kind().as_str(),
                    hit.item.title(),
                    hit.relevance
                );
            }
            println!("message={}", outcome.result.message);
        }
        Err(err) => {
            println!("error={err}");
            if let Some(guidance) = err.guidance() {
                println!("{guidance}");
            }
            std::process::exit(1);
        }
    }
}
