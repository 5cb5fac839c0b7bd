//! The `AttendanceStore` trait.
//!
//! The trait is implemented by storage backends (`tally-store-sqlite`,
//! `tally-store-csv`). The ledger and statistics engine depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::fact::{FactKey, PresenceFact, UserStatistic};

/// Abstraction over a Tally storage backend.
///
/// Fact writes are append-only: `insert_fact` is a plain insert, and the
/// idempotency guarantee lives in the ledger's existence-check-then-write,
/// not here. Statistic writes are wholesale overwrites keyed by `user_id`.
///
/// Backend failures (I/O, auth, quota) surface through `Self::Error` and
/// must propagate to the caller; every write is idempotent, so a failed run
/// is always safe to retry in full.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait AttendanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Facts ─────────────────────────────────────────────────────────────

  /// Fetch the fact with the given natural key, if one exists.
  fn get_fact(
    &self,
    key: &FactKey,
  ) -> impl Future<Output = Result<Option<PresenceFact>, Self::Error>> + Send;

  /// Insert a new fact. The caller (the ledger) has already checked that no
  /// fact exists for this natural key.
  fn insert_fact(
    &self,
    fact: &PresenceFact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// All facts for a user, ordered by date ascending.
  fn facts_for_user(
    &self,
    user_id: &str,
  ) -> impl Future<Output = Result<Vec<PresenceFact>, Self::Error>> + Send;

  /// All facts recorded for a single day, across groups.
  fn facts_for_day(
    &self,
    day: NaiveDate,
  ) -> impl Future<Output = Result<Vec<PresenceFact>, Self::Error>> + Send;

  // ── Statistics ────────────────────────────────────────────────────────

  fn get_statistic(
    &self,
    user_id: &str,
  ) -> impl Future<Output = Result<Option<UserStatistic>, Self::Error>> + Send;

  /// Overwrite the statistic row for `stat.user_id`.
  fn put_statistic(
    &self,
    stat: &UserStatistic,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
