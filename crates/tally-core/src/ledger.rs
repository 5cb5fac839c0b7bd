//! The presence ledger — idempotent recording of daily attendance facts.
//!
//! Safety under retries comes entirely from the per-tuple
//! existence-check-then-write against the natural key `(date, group, user)`,
//! not from batch atomicity: a batch that fails partway leaves the ledger in
//! a state where re-issuing the identical upsert is a cheap no-op for
//! everything that already landed.

use chrono::NaiveDate;

use crate::{
  fact::{FactKey, PresenceFact, SnapshotEntry, UpsertOutcome},
  store::AttendanceStore,
};

/// Durable, idempotent store of "user X observed present in group G on day D".
///
/// Holds an explicitly constructed store value; no global client state.
pub struct PresenceLedger<S> {
  store: S,
}

impl<S: AttendanceStore> PresenceLedger<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Record one presence snapshot for `day`.
  ///
  /// For each tuple: if no fact exists for its natural key, a fact is
  /// written and the user lands in `newly_recorded`; otherwise nothing is
  /// written and the user lands in `already_recorded`. Malformed tuples are
  /// skipped with a warning and never abort the batch. A user observed in
  /// several groups the same day yields one fact per group but appears only
  /// once in the outcome.
  pub async fn upsert(
    &self,
    snapshot: &[SnapshotEntry],
    day: NaiveDate,
  ) -> Result<UpsertOutcome, S::Error> {
    let mut outcome = UpsertOutcome::default();

    for entry in snapshot {
      if !entry.is_valid() {
        tracing::warn!(
          group_id = %entry.group_id,
          user_id = %entry.user_id,
          "skipping malformed snapshot entry"
        );
        continue;
      }

      let key = FactKey {
        date:     day,
        group_id: entry.group_id.clone(),
        user_id:  entry.user_id.clone(),
      };

      if self.store.get_fact(&key).await?.is_some() {
        if !outcome.newly_recorded.contains(&entry.user_id) {
          outcome.already_recorded.insert(entry.user_id.clone());
        }
        continue;
      }

      let fact = PresenceFact {
        date:         day,
        group_id:     entry.group_id.clone(),
        user_id:      entry.user_id.clone(),
        display_name: entry.display_name.clone(),
        present:      true,
      };
      self.store.insert_fact(&fact).await?;

      tracing::info!(
        user_id = %entry.user_id,
        group_id = %entry.group_id,
        %day,
        "recorded new presence"
      );
      outcome.already_recorded.remove(&entry.user_id);
      outcome.newly_recorded.insert(entry.user_id.clone());
    }

    Ok(outcome)
  }

  /// A user's full fact history, ordered by date ascending.
  pub async fn history_for(
    &self,
    user_id: &str,
  ) -> Result<Vec<PresenceFact>, S::Error> {
    self.store.facts_for_user(user_id).await
  }

  /// Every fact recorded for `day`, across groups.
  pub async fn all_facts_for(
    &self,
    day: NaiveDate,
  ) -> Result<Vec<PresenceFact>, S::Error> {
    self.store.facts_for_day(day).await
  }
}
