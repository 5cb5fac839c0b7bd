//! Error type for `tally-store-sqlite`.
//!
//! Database failures here are the "storage unavailable" case of the core
//! design: fatal to the current run, safe to retry in full.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("datetime parse error: {0}")]
  DateTimeParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
