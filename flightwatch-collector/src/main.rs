//! flightwatch: bounding-box flight collector CLI.
//!
//! `collect` runs exactly one pass (feed query → detail fetches → window
//! merge → exports); scheduling repeated passes belongs to an external
//! timer. `stats` prints the current window and frequency tables.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use flightwatch_core::aggregate::{airline_counts, model_counts, FrequencyTable};
use flightwatch_core::config::{self, Config};
use flightwatch_core::types::Result;

mod collect;
mod feed;
mod store;

use feed::Fr24Client;
use store::{WindowStore, AIRLINE_FILE, MODEL_FILE};

#[derive(Parser)]
#[command(name = "flightwatch", version, about = "Bounding-box flight collector")]
struct Cli {
    /// Config file path (defaults to ~/.flightwatch/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one collection pass and update the hourly window
    Collect {
        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Milliseconds between per-flight detail fetches
        #[arg(long)]
        spacing_ms: Option<u64>,
    },

    /// Print the current window and frequency tables
    Stats {
        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    let result = match cli.command {
        Commands::Collect {
            data_dir,
            spacing_ms,
        } => cmd_collect(cfg, data_dir, spacing_ms).await,
        Commands::Stats { data_dir } => cmd_stats(cfg, data_dir),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

fn data_dir(cfg: &Config, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(&cfg.data.dir))
}

async fn cmd_collect(
    cfg: Config,
    data_dir_flag: Option<PathBuf>,
    spacing_ms: Option<u64>,
) -> Result<()> {
    let bbox = cfg.bounds.bounding_box()?;
    let spacing = Duration::from_millis(spacing_ms.unwrap_or(cfg.collector.spacing_ms));
    let store = WindowStore::new(data_dir(&cfg, data_dir_flag));

    let client = Fr24Client::new(
        &cfg.collector.feed_url,
        &cfg.collector.detail_url,
        Duration::from_secs(cfg.collector.timeout_secs),
    )?;

    let now = now_epoch();
    info!(
        bounds = ?bbox,
        spacing_ms = spacing.as_millis() as u64,
        "starting collection pass"
    );

    let outcome = collect::collect(&client, &bbox, now, spacing).await?;

    let mut window = store.load()?;
    let stats = window.merge(now, outcome.batch);

    store.save(&window)?;
    let airlines = airline_counts(&window);
    let models = model_counts(&window);
    store.export_frequencies(AIRLINE_FILE, &airlines)?;
    store.export_frequencies(MODEL_FILE, &models)?;

    info!(
        inserted = stats.inserted,
        refreshed = stats.refreshed,
        evicted = stats.evicted,
        skipped = outcome.errors.len(),
        window = window.len(),
        "pass complete"
    );

    println!();
    println!("Pass complete");
    println!(
        "  Collected: {} aircraft ({} new, {} refreshed), {} skipped",
        stats.inserted + stats.refreshed,
        stats.inserted,
        stats.refreshed,
        outcome.errors.len()
    );
    println!(
        "  Window: {} aircraft ({} evicted as stale)",
        window.len(),
        stats.evicted
    );
    for err in &outcome.errors {
        println!("  skipped {} ({}): {}", err.icao, err.id, err.cause);
    }

    Ok(())
}

fn cmd_stats(cfg: Config, data_dir_flag: Option<PathBuf>) -> Result<()> {
    let store = WindowStore::new(data_dir(&cfg, data_dir_flag));
    let window = store.load()?;

    println!();
    println!("Window: {} aircraft", window.len());

    if !window.is_empty() {
        let now = now_epoch();
        let mut table = Table::new();
        table.set_header(vec![
            "ICAO", "Callsign", "Model", "Airline", "Trail pts", "Age (s)",
        ]);
        for rec in window.sorted_records() {
            table.add_row(vec![
                Cell::new(&rec.icao),
                Cell::new(&rec.callsign),
                Cell::new(if rec.model.is_empty() {
                    "-"
                } else {
                    rec.model.as_str()
                }),
                Cell::new(if rec.airline.is_empty() {
                    "-"
                } else {
                    rec.airline.as_str()
                }),
                Cell::new(rec.trail.len()),
                Cell::new(format!("{:.0}", rec.age(now))),
            ]);
        }
        println!("{table}");
    }

    print_frequency_table("Airlines", &airline_counts(&window));
    print_frequency_table("Models", &model_counts(&window));

    Ok(())
}

fn print_frequency_table(title: &str, rows: &FrequencyTable) {
    println!();
    println!("{title}:");
    if rows.is_empty() {
        println!("  (none)");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![title, "Count"]);
    for (group, count) in rows {
        table.add_row(vec![
            Cell::new(if group.is_empty() {
                "(unknown)"
            } else {
                group.as_str()
            }),
            Cell::new(count),
        ]);
    }
    println!("{table}");
}
