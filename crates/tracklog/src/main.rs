//! `tracklog` - CLI for the location-history recorder
//!
//! This binary runs the sampler and provides commands for inspecting
//! and clearing the recorded history.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;

use tracklog::cli::{Cli, Command, ConfigCommand, HistoryCommand, OutputFormat, RecordCommand};
use tracklog::sim::{ConsoleMap, SimulatedSource};
use tracklog::sink::{clear_history, rebuild_annotations};
use tracklog::{init_logging, BackgroundRunner, Config, Sampler, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Record(cmd) => handle_record(&config, &cmd).await,
        Command::History(cmd) => handle_history(&config, &cmd),
        Command::Clear => handle_clear(&config),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_record(config: &Config, cmd: &RecordCommand) -> anyhow::Result<()> {
    // The store must be openable before any sampling begins
    let store = Store::open(config.database_path())?;

    let mut map = ConsoleMap::new();
    let restored = rebuild_annotations(&store, &mut map)?;
    if restored > 0 {
        println!("Restored {restored} annotations from history");
    }

    let interval = cmd
        .interval
        .map_or_else(|| config.sample_interval(), Duration::from_secs);
    anyhow::ensure!(!interval.is_zero(), "interval must be greater than 0");

    let source = SimulatedSource::new(config.source.start_latitude, config.source.start_longitude);
    let sampler = Sampler::new(source, store, map, interval);

    let (stop_tx, stop_rx) = watch::channel(false);
    let (bg_tx, bg_rx) = watch::channel(false);

    // First interrupt backgrounds the recorder, the second terminates it
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = bg_tx.send(true);
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = bg_tx.send(true);
        }
    });

    println!(
        "Recording location history every {}s (Ctrl-C to background, twice to stop)",
        interval.as_secs()
    );

    let task = tokio::spawn(sampler.run(stop_rx));
    BackgroundRunner::new(config.background_grace())
        .supervise(task, stop_tx, bg_rx)
        .await;

    Ok(())
}

fn handle_history(config: &Config, cmd: &HistoryCommand) -> anyhow::Result<()> {
    let store = Store::open(config.database_path())?;
    let mut samples = store.fetch_all()?;

    if cmd.limit > 0 && samples.len() > cmd.limit {
        // Keep the most recent entries, still in insertion order
        samples.drain(..samples.len() - cmd.limit);
    }

    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&samples)?);
        }
        OutputFormat::Table => {
            if samples.is_empty() {
                println!("No samples recorded.");
                return Ok(());
            }
            println!("{:>6}  {:>11}  {:>12}  Recorded", "ID", "Latitude", "Longitude");
            for sample in &samples {
                println!(
                    "{:>6}  {:>11.6}  {:>12.6}  {}",
                    sample.id.unwrap_or_default(),
                    sample.latitude,
                    sample.longitude,
                    sample.label()
                );
            }
        }
    }

    Ok(())
}

fn handle_clear(config: &Config) -> anyhow::Result<()> {
    let store = Store::open(config.database_path())?;
    let mut map = ConsoleMap::new();

    let deleted = clear_history(&store, &mut map)?;
    println!("Deleted {deleted} samples.");
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = Store::open(config.database_path())?;
    let stats = store.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "total_samples": stats.total_samples,
            "oldest_sample": stats.oldest_sample.map(|t| t.to_rfc3339()),
            "newest_sample": stats.newest_sample.map(|t| t.to_rfc3339()),
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("tracklog status");
        println!("---------------");
        println!("Database:      {}", config.database_path().display());
        println!("Samples:       {}", stats.total_samples);
        if let Some(oldest) = stats.oldest_sample {
            println!("Oldest:        {}", oldest.to_rfc3339());
        }
        if let Some(newest) = stats.newest_sample {
            println!("Newest:        {}", newest.to_rfc3339());
        }
        println!("Size:          {} bytes", stats.db_size_bytes);
    }

    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:    {}", config.database_path().display());
                println!();
                println!("[Sampler]");
                println!("  Interval (secs):  {}", config.sampler.interval_secs);
                println!();
                println!("[Background]");
                println!("  Grace (secs):     {}", config.background.grace_secs);
                println!();
                println!("[Source]");
                println!(
                    "  Start coordinate: ({}, {})",
                    config.source.start_latitude, config.source.start_longitude
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
