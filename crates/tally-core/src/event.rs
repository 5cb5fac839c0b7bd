//! Notification event builder.
//!
//! Turns freshly recomputed statistics into at most one outbound event per
//! user per upsert call. The builder holds no persisted state: "exactly once"
//! follows entirely from acting only on the already-deduplicated
//! `newly_recorded` set produced by the ledger.

use serde::{Deserialize, Serialize};

use crate::fact::{UpsertOutcome, UserStatistic};

/// Total-attendance interval at which a `Milestone` event fires instead of a
/// plain `NewLogin`.
pub const DEFAULT_MILESTONE_INTERVAL: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  NewLogin,
  Milestone,
}

/// An ephemeral notification event; consumed by an external notifier, never
/// persisted by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneEvent {
  pub user_id:      String,
  pub display_name: String,
  pub kind:         EventKind,
  pub streak_value: u32,
  pub total_value:  u32,
}

/// Stateless event builder with a configurable milestone interval.
#[derive(Debug, Clone, Copy)]
pub struct EventBuilder {
  milestone_interval: u32,
}

impl Default for EventBuilder {
  fn default() -> Self {
    Self { milestone_interval: DEFAULT_MILESTONE_INTERVAL }
  }
}

impl EventBuilder {
  pub fn new(milestone_interval: u32) -> Self {
    Self { milestone_interval }
  }

  /// Build the single event for one user's fresh statistic.
  pub fn build(&self, stat: &UserStatistic) -> MilestoneEvent {
    let total = stat.total_attended_days;
    let kind = if self.milestone_interval > 0
      && total > 0
      && total % self.milestone_interval == 0
    {
      EventKind::Milestone
    } else {
      EventKind::NewLogin
    };

    MilestoneEvent {
      user_id:      stat.user_id.clone(),
      display_name: stat.display_name.clone(),
      kind,
      streak_value: stat.consecutive_business_days,
      total_value:  total,
    }
  }

  /// Build events for one upsert call: one per user in `newly_recorded`,
  /// none for users in `already_recorded`. `stats` carries the recomputed
  /// statistic for each newly recorded user; users without one (which would
  /// mean an empty history right after a write) are silently skipped.
  pub fn build_all(
    &self,
    outcome: &UpsertOutcome,
    stats: &[UserStatistic],
  ) -> Vec<MilestoneEvent> {
    outcome
      .newly_recorded
      .iter()
      .filter_map(|user_id| {
        stats.iter().find(|s| &s.user_id == user_id)
      })
      .map(|stat| self.build(stat))
      .collect()
  }
}
