//! Console garden.
//!
//! Usage: `garden [config.toml]`. Type feelings, or `/help` for commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use garden_core::storage::{InMemoryBackend, KeyValueBackend, SqliteBackend};
use garden_core::{Garden, GardenRng, MemoryRecord};
use garden_host::hooks::{self, ConsoleAction, HELP};
use garden_host::{ControlEvent, GardenHost, HostConfig, HostHandle, Outcome, telemetry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => HostConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => HostConfig::default(),
    };
    telemetry::init_tracing(&config.garden.logging);

    let backend: Arc<dyn KeyValueBackend> = match &config.host.database {
        Some(path) => Arc::new(
            SqliteBackend::open(path)
                .with_context(|| format!("opening database {}", path.display()))?,
        ),
        None => Arc::new(InMemoryBackend::new()),
    };
    let rng = config
        .host
        .seed
        .map_or_else(GardenRng::from_entropy, GardenRng::seeded);
    let garden = Garden::open(config.garden.clone(), backend, Box::new(rng), Utc::now());
    let host = GardenHost::spawn(garden, &config.host);

    let printer = tokio::spawn(print_messages(host.watch()));
    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match hooks::parse_line(&line) {
            Ok(action) => action,
            Err(e) => {
                println!("  {e}");
                continue;
            }
        };
        match action {
            ConsoleAction::Nothing => {}
            ConsoleAction::Help => println!("{HELP}"),
            ConsoleAction::Quit => break,
            ConsoleAction::ListMemories => {
                for (i, record) in memories(&host).await?.iter().enumerate() {
                    println!(
                        "  {:>2}. [{}] {} ({}, {})",
                        i + 1,
                        record.emotion.primary,
                        record.text,
                        record.emotion.primary.description(),
                        record.age_label(Utc::now())
                    );
                }
            }
            ConsoleAction::RecallIndex(n) => {
                let listed = memories(&host).await?;
                match listed.get(n - 1) {
                    Some(record) => {
                        host.send(ControlEvent::Recall(record.id)).await?;
                    }
                    None => println!("  no memory number {n}"),
                }
            }
            ConsoleAction::Event(event) => report(host.send(event).await?),
        }
    }

    let garden = host.shutdown().await?;
    printer.abort();
    info!(memories = garden.memories().len(), "goodbye");
    Ok(())
}

async fn memories(host: &HostHandle) -> Result<Vec<MemoryRecord>> {
    match host.send(ControlEvent::ListMemories).await? {
        Outcome::Memories(records) => Ok(records),
        _ => Ok(Vec::new()),
    }
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::Submitted(Some(sub)) => println!(
            "  ({}, intensity {:.2}) {}",
            sub.verdict.primary, sub.verdict.intensity, sub.record.reflection
        ),
        Outcome::ToolUsed(None) => println!("  that tool is not ready yet"),
        Outcome::Lightning(false) => println!("  the sky is still flashing"),
        _ => {}
    }
}

/// Print each new garden message once.
async fn print_messages(mut snapshots: tokio::sync::watch::Receiver<garden_core::GardenSnapshot>) {
    let mut last: Option<String> = None;
    while snapshots.changed().await.is_ok() {
        let text = snapshots.borrow_and_update().message.as_ref().map(|m| m.text.clone());
        if text != last {
            if let Some(text) = &text {
                println!("  ~ {text}");
            }
            last = text;
        }
    }
}
