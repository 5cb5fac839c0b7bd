//! `tally` — attendance ledger and streak statistics CLI.
//!
//! # Usage
//!
//! ```
//! tally record --snapshot snapshot.json
//! some-sampler | tally record --snapshot -
//! tally report --date 2025-09-11
//! tally stats --user 1042 --as-of 2025-09-11
//! ```
//!
//! Configuration comes from `tally.toml` (or `--config`) plus `TALLY_`
//! environment variables; see [`settings`].

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tally_core::{calendar::BusinessCalendar, store::AttendanceStore};
use tally_store_csv::CsvStore;
use tally_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{AppConfig, StoreBackend};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tally", about = "Attendance ledger and streak statistics")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tally.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Record a presence snapshot for a day.
  Record {
    /// Path to a JSON snapshot file, or `-` to read stdin.
    #[arg(long, value_name = "FILE")]
    snapshot: String,

    /// Day to record the snapshot against; defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// List the attendance recorded for a day.
  Report {
    /// Day to report on; defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// Recompute and print one user's statistic.
  Stats {
    /// User id to recompute.
    #[arg(long)]
    user: String,

    /// As-of date for the streak walk; defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = settings::load(&cli.config)?;

  match cfg.store.backend {
    StoreBackend::Sqlite => {
      let store = SqliteStore::open(&cfg.store.sqlite_path)
        .await
        .with_context(|| {
          format!("failed to open store at {:?}", cfg.store.sqlite_path)
        })?;
      run(store, cfg, cli.command).await
    }
    StoreBackend::Csv => {
      let store = CsvStore::open(&cfg.store.csv_root).with_context(|| {
        format!("failed to open store at {:?}", cfg.store.csv_root)
      })?;
      run(store, cfg, cli.command).await
    }
  }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

async fn run<S>(store: S, cfg: AppConfig, command: Command) -> anyhow::Result<()>
where
  S: AttendanceStore + Clone,
{
  let calendar = BusinessCalendar::from_config(&cfg.holidays)
    .context("invalid holiday configuration")?;
  let today = Local::now().date_naive();

  match command {
    Command::Record { snapshot, date } => {
      commands::record(
        store,
        calendar,
        cfg.milestone_interval,
        &snapshot,
        date.unwrap_or(today),
      )
      .await
    }
    Command::Report { date } => {
      commands::report(store, date.unwrap_or(today)).await
    }
    Command::Stats { user, as_of } => {
      commands::stats(store, calendar, &user, as_of.unwrap_or(today)).await
    }
  }
}
