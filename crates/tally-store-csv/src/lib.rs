//! Flat delimited-file backend for the Tally attendance store.
//!
//! Facts live in one CSV file per group under `<root>/facts/`, appended to
//! and never rewritten; the statistics cache is a single `statistics.csv`
//! rewritten wholesale on every put. File I/O runs on the blocking thread
//! pool via [`tokio::task::spawn_blocking`].

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::CsvStore;

#[cfg(test)]
mod tests;
