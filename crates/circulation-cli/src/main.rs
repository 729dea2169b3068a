use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use circulation_core::impls::InMemoryRecordStore;
use circulation_core::{
    BorrowRequest, CirculationBuilder, CirculationError, CirculationService, Item, RecordId,
};

mod settings;
mod telemetry;

#[derive(Parser)]
#[command(name = "circulation", about = "Circulation lifecycle demo over an in-memory store")]
struct Cli {
    /// Settings file, without extension
    #[arg(long, default_value = "circulation")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk one item through every status
    Demo,
    /// Race several borrowers for the same item
    Race {
        #[arg(long, default_value_t = 8)]
        borrowers: usize,
    },
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn log_item(step: &str, item: &Item) {
    info!(
        step,
        id = %item.id(),
        status = ?item.status(),
        borrower = item.borrower(),
        location = item.location().map(RecordId::as_str),
        "item updated"
    );
}

fn demo(service: &CirculationService) -> Result<()> {
    let main = service.create_location(
        Some(RecordId::from("loc-main")),
        object(json!({ "name": "Main library" })),
    )?;
    let annex = service.create_location(
        Some(RecordId::from("loc-annex")),
        object(json!({ "name": "Annex" })),
    )?;
    info!(main = %main.id(), annex = %annex.id(), "locations created");

    let item = service.create_item(
        None,
        object(json!({
            "title": "The Left Hand of Darkness",
            "circulation": { "location": main.id() }
        })),
    )?;
    log_item("create", &item);
    let id = item.id().clone();

    let due = Utc::now() + Duration::days(14);
    log_item("borrow", &service.borrow(&id, BorrowRequest::new("alice").due(due))?);
    info!(id = %id, overdue = service.overdue(&id)?, "due date checked");

    match service.borrow(&id, "bob") {
        Err(err) if err.is_invalid_action() => warn!(id = %id, error = %err, "second borrow rejected"),
        Err(err) => return Err(err.into()),
        Ok(_) => bail!("second borrow of {id} unexpectedly succeeded"),
    }

    log_item("return", &service.return_(&id, Some("alice"))?);
    log_item("transfer", &service.transfer(&id, annex.id())?);
    log_item("receive", &service.receive(&id)?);
    log_item("borrow", &service.borrow(&id, "carol")?);
    log_item("mark_lost", &service.mark_lost(&id)?);
    log_item("found", &service.found(&id)?);

    Ok(())
}

async fn race(service: Arc<CirculationService>, borrowers: usize) -> Result<()> {
    if borrowers == 0 {
        bail!("--borrowers must be at least 1");
    }
    let item = service.create_item(None, Map::new())?;
    let id = item.id().clone();
    info!(id = %id, borrowers, "starting race");

    let mut handles = Vec::with_capacity(borrowers);
    for n in 0..borrowers {
        let service = Arc::clone(&service);
        let id = id.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            service.borrow(&id, format!("user-{n}"))
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.context("borrower task panicked")? {
            Ok(item) => {
                winners += 1;
                info!(id = %id, borrower = item.borrower(), "borrow won");
            }
            Err(err @ CirculationError::InvalidTransition { .. }) => {
                info!(id = %id, error = %err, "borrow lost");
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(id = %id, winners, losers = borrowers - winners, "race finished");
    if winners != 1 {
        bail!("expected exactly one winner, got {winners}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_telemetry(cli.json_logs)?;

    let config = settings::load(&cli.config)?;
    info!(
        return_check = ?config.return_check,
        disabled = ?config.disabled_operations,
        "settings loaded"
    );

    let service = CirculationBuilder::new()
        .store(Arc::new(InMemoryRecordStore::new()))
        .config(config)
        .build()?;

    match cli.command {
        Command::Demo => demo(&service),
        Command::Race { borrowers } => race(Arc::new(service), borrowers).await,
    }
}
