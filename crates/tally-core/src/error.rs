//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A holiday entry in the calendar configuration could not be parsed.
  /// Raised at construction time only; calendar queries are total.
  #[error("invalid calendar configuration: bad holiday entry {0:?}")]
  CalendarConfiguration(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
