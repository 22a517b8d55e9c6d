//! tripsync: trip lists with a spreadsheet mirror.
//!
//! Usage:
//!   tripsync serve [--ephemeral]   JSON-lines session on stdin/stdout
//!   tripsync show <list>           print a locally stored list
//!   tripsync sync                  reconcile once and report
//!   tripsync config                print an example config.toml

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use tripsync::config::Config;
use tripsync::model::{ChecklistEntry, ItineraryEntry, ListKey, WishlistEntry};
use tripsync::rpc;
use tripsync::storage::{HttpRemote, LocalStore, MemoryStore, RedbStore, RemoteStore};
use tripsync::sync::SyncCoordinator;

const USAGE: &str = "Usage:
  tripsync serve [--ephemeral]
  tripsync show <itinerary|checklist|wishlist>
  tripsync sync
  tripsync config";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tripsync=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("serve") => serve(args.iter().any(|a| a == "--ephemeral")).await,
        Some("show") => show(args.get(2).map(String::as_str)),
        Some("sync") => sync_once().await,
        Some("config") => {
            print!("{}", Config::example_config());
            Ok(())
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config: {:#}, using defaults", e);
            Config::default()
        }
    }
}

fn open_local(config: &Config, ephemeral: bool) -> Result<Arc<dyn LocalStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let path = config.storage.database_path()?;
    let store = RedbStore::open(&path, &config.storage.key_prefix)?;
    tracing::info!("Local lists at {}", path.display());
    Ok(Arc::new(store))
}

fn open_remote(config: &Config) -> Option<Arc<dyn RemoteStore>> {
    let endpoint = config.remote.resolved_endpoint()?;
    match HttpRemote::new(&endpoint, config.remote.timeout()) {
        Ok(remote) => {
            tracing::info!("Remote mirror at {}", remote.endpoint());
            Some(Arc::new(remote))
        }
        Err(e) => {
            tracing::warn!("Remote mirror disabled: {:#}", e);
            None
        }
    }
}

fn open_session(config: &Config, ephemeral: bool, with_remote: bool) -> Result<SyncCoordinator> {
    let local = open_local(config, ephemeral)?;
    let remote = if with_remote { open_remote(config) } else { None };
    Ok(SyncCoordinator::open(local, remote, config.sync.seed_policy))
}

fn emit(value: &Value) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn reconciled_event(sync: &SyncCoordinator, report: &tripsync::sync::ReconcileReport) -> Value {
    json!({"event": "reconciled", "report": report, "state": sync.state()})
}

async fn serve(ephemeral: bool) -> Result<()> {
    let config = load_config();
    let mut sync = open_session(&config, ephemeral, true)?;

    // Commands keep being served while the startup fetch is pending
    let mut fetch = sync.begin_reconcile();
    let mut reconciling = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            outcome = &mut fetch, if reconciling => {
                reconciling = false;
                let report = sync.finish_reconcile(outcome).await;
                emit(&reconciled_event(&sync, &report))?;
            }
            line = lines.next_line() => {
                let line = match line.context("Failed to read stdin")? {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                let resp = match serde_json::from_str::<Value>(&line) {
                    Ok(cmd) => rpc::handle(&mut sync, &config.trip, &cmd),
                    Err(e) => json!({"error": e.to_string()}),
                };
                emit(&resp)?;
            }
        }
    }

    // Reconciliation is never cancelled, even when input ends first
    if reconciling {
        let report = sync.finish_reconcile(fetch.await).await;
        emit(&reconciled_event(&sync, &report))?;
    }
    sync.flush().await;
    Ok(())
}

fn show(list: Option<&str>) -> Result<()> {
    let key: ListKey = list
        .context("Usage: tripsync show <itinerary|checklist|wishlist>")?
        .parse()?;
    let config = load_config();
    let sync = open_session(&config, false, false)?;

    let rendered = match key {
        ListKey::Itinerary => serde_json::to_string_pretty(sync.list::<ItineraryEntry>())?,
        ListKey::Checklist => serde_json::to_string_pretty(sync.list::<ChecklistEntry>())?,
        ListKey::Wishlist => serde_json::to_string_pretty(sync.list::<WishlistEntry>())?,
    };
    println!("{rendered}");
    Ok(())
}

async fn sync_once() -> Result<()> {
    let config = load_config();
    let mut sync = open_session(&config, false, true)?;

    let report = sync.reconcile().await;
    sync.flush().await;

    println!("{}", serde_json::to_string_pretty(&reconciled_event(&sync, &report))?);
    Ok(())
}
