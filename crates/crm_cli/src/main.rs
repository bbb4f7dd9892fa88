//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured store and print collection counts.
//! - Verify `crm_core` wiring without any UI runtime.
//!
//! Usage: `crm_cli [config.toml]`

use crm_core::{
    core_version, init_from_config, CrmConfig, EntityStore, PipelineSummary, SqliteKeyValueStore,
};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("crm_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => CrmConfig::load(path).map_err(|err| err.to_string())?,
        None => CrmConfig::default(),
    };
    init_from_config(&config.logging)?;

    let backend = match &config.storage.db_path {
        Some(path) => SqliteKeyValueStore::open(path),
        None => SqliteKeyValueStore::open_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    let store = EntityStore::open_with(backend, config.storage.store_options())
        .map_err(|err| err.to_string())?;
    info!("event=cli_run module=cli status=ok");

    println!("crm_core version={}", core_version());
    for corrupt in &store.load_report().corrupt {
        println!(
            "recovered {} (backup at {}): {}",
            corrupt.key, corrupt.backup_key, corrupt.error
        );
    }
    println!(
        "contacts={} tasks={} messages={} call_logs={} emails={} meetings={} proposals={}",
        store.contacts().len(),
        store.tasks().len(),
        store.messages().len(),
        store.call_logs().len(),
        store.emails().len(),
        store.meetings().len(),
        store.proposals().len()
    );

    let summary = PipelineSummary::from_contacts(store.contacts());
    println!(
        "leads={} won={} conversion={}% pipeline_value={}",
        summary.total_leads,
        summary.won_deals,
        summary.conversion_rate_percent,
        summary.pipeline_value
    );
    Ok(())
}
