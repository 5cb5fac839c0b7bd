//! Attendance fact types — the fundamental unit of the Tally ledger.
//!
//! A presence fact is a write-once claim that a user was observed in a voice
//! group on a given day. Facts are never updated, deleted, or flipped back to
//! absent; `display_name` is frozen at first sight so history survives
//! renames. Derived statistics live in a separate, always-recomputable row.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

// ─── Natural key ─────────────────────────────────────────────────────────────

/// The field tuple uniquely identifying a presence fact. Idempotent upsert is
/// defined over this key: at most one fact ever exists per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactKey {
  pub date:     NaiveDate,
  pub group_id: String,
  pub user_id:  String,
}

// ─── PresenceFact ────────────────────────────────────────────────────────────

/// A write-once record of "user X observed present in group G on day D".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceFact {
  pub date:         NaiveDate,
  pub group_id:     String,
  pub user_id:      String,
  /// Display name at the time the fact was first recorded; never overwritten.
  pub display_name: String,
  /// Always true once written. Kept as an explicit column so the persisted
  /// layout matches the tabular stores this core was designed against.
  pub present:      bool,
}

impl PresenceFact {
  pub fn key(&self) -> FactKey {
    FactKey {
      date:     self.date,
      group_id: self.group_id.clone(),
      user_id:  self.user_id.clone(),
    }
  }
}

// ─── SnapshotEntry ───────────────────────────────────────────────────────────

/// One tuple from the external presence sampler: a user currently observed in
/// a voice group. No ordering guarantee; the snapshot may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
  pub group_id:     String,
  pub user_id:      String,
  pub display_name: String,
}

impl SnapshotEntry {
  /// A tuple is usable only when both identifiers are non-empty. Malformed
  /// entries are skipped with a warning, never aborting the batch.
  pub fn is_valid(&self) -> bool {
    !self.group_id.is_empty() && !self.user_id.is_empty()
  }

  /// Parse a snapshot from its JSON wire form: an array of entries.
  pub fn parse_snapshot(raw: &str) -> Result<Vec<Self>> {
    Ok(serde_json::from_str(raw)?)
  }
}

// ─── UpsertOutcome ───────────────────────────────────────────────────────────

/// Result of one ledger upsert call. A user appears in `newly_recorded` when
/// at least one new fact was written for them this call, otherwise in
/// `already_recorded`. The sets are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
  pub newly_recorded:   BTreeSet<String>,
  pub already_recorded: BTreeSet<String>,
}

// ─── UserStatistic ───────────────────────────────────────────────────────────

/// Per-user engagement statistic — a derived cache, fully reconstructable
/// from the fact history plus the calendar and an as-of date. Overwritten
/// wholesale on every recompute; never patched incrementally and never
/// treated as a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistic {
  pub user_id:                   String,
  pub display_name:              String,
  pub last_attended_date:        NaiveDate,
  pub consecutive_business_days: u32,
  pub total_attended_days:       u32,
  pub updated_at:                DateTime<Utc>,
}
