//! The streak & statistics engine.
//!
//! A `UserStatistic` is a pure fold of the user's fact history through the
//! business calendar at an explicit as-of date. It is independent of write
//! order and timing, so recompute is stable under re-runs and backfills. The
//! persisted row is a cache only; the fact history stays the sole source of
//! truth.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};

use crate::{
  calendar::BusinessCalendar,
  fact::UserStatistic,
  store::AttendanceStore,
};

// ─── Pure fold ───────────────────────────────────────────────────────────────

/// Fold a sorted, deduplicated attended-date history into
/// `(consecutive_business_days, total_attended_days)` as of `as_of`.
///
/// The streak walks backward from the most recent attended date via the
/// previous business day: gaps made only of weekends and holidays never break
/// it and never count toward it. Attendance recorded on a holiday counts as a
/// normal attended day — holidays forgive gaps, they do not disqualify
/// attendance. If the most recent attended date is strictly older than the
/// previous business day of `as_of`, the effective streak is 0.
pub fn fold_history(
  attended: &BTreeSet<NaiveDate>,
  calendar: &BusinessCalendar,
  as_of: NaiveDate,
) -> (u32, u32) {
  let total = attended.len() as u32;
  let Some(&most_recent) = attended.iter().next_back() else {
    return (0, 0);
  };

  if most_recent < calendar.previous_business_day(as_of) {
    return (0, total);
  }

  let mut consecutive = 1;
  let mut anchor = most_recent;
  loop {
    let prev = calendar.previous_business_day(anchor);
    if attended.contains(&prev) {
      consecutive += 1;
      anchor = prev;
    } else {
      break;
    }
  }

  (consecutive, total)
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Derives and persists `UserStatistic` rows from the fact history.
pub struct StatsEngine<S> {
  store:    S,
  calendar: BusinessCalendar,
}

impl<S: AttendanceStore> StatsEngine<S> {
  pub fn new(store: S, calendar: BusinessCalendar) -> Self {
    Self { store, calendar }
  }

  pub fn calendar(&self) -> &BusinessCalendar { &self.calendar }

  /// Recompute the statistic for one user as of `as_of` and persist it by
  /// wholesale overwrite. An empty history yields `None` and writes nothing.
  ///
  /// `as_of` is an explicit parameter rather than wall-clock time so the
  /// computation is reproducible in tests and backfills.
  pub async fn recompute(
    &self,
    user_id: &str,
    as_of: NaiveDate,
  ) -> Result<Option<UserStatistic>, S::Error> {
    let history = self.store.facts_for_user(user_id).await?;
    let Some(latest) = history.last() else {
      return Ok(None);
    };

    // A user seen in several groups the same day has one fact per group;
    // statistics count days, so dedupe by date.
    let attended: BTreeSet<NaiveDate> =
      history.iter().map(|f| f.date).collect();

    let (consecutive, total) = fold_history(&attended, &self.calendar, as_of);

    let stat = UserStatistic {
      user_id:                   user_id.to_owned(),
      display_name:              latest.display_name.clone(),
      last_attended_date:        latest.date,
      consecutive_business_days: consecutive,
      total_attended_days:       total,
      updated_at:                Utc::now(),
    };
    self.store.put_statistic(&stat).await?;

    tracing::debug!(
      user_id,
      consecutive,
      total,
      %as_of,
      "recomputed user statistic"
    );
    Ok(Some(stat))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn dates(strs: &[&str]) -> BTreeSet<NaiveDate> {
    strs.iter().map(|s| d(s)).collect()
  }

  #[test]
  fn empty_history_is_zero() {
    let cal = BusinessCalendar::weekends_only();
    assert_eq!(fold_history(&dates(&[]), &cal, d("2025-09-11")), (0, 0));
  }

  #[test]
  fn single_attendance_is_one_and_one() {
    let cal = BusinessCalendar::weekends_only();
    let h = dates(&["2025-09-11"]);
    assert_eq!(fold_history(&h, &cal, d("2025-09-11")), (1, 1));
  }

  #[test]
  fn weekend_gap_does_not_break_streak() {
    // Mon-Fri of week 1 plus Monday of week 2: streak 6 as of that Monday.
    let cal = BusinessCalendar::weekends_only();
    let h = dates(&[
      "2025-09-08",
      "2025-09-09",
      "2025-09-10",
      "2025-09-11",
      "2025-09-12",
      "2025-09-15",
    ]);
    assert_eq!(fold_history(&h, &cal, d("2025-09-15")), (6, 6));
  }

  #[test]
  fn holiday_gap_does_not_break_streak() {
    // Tuesday is a holiday; attendance Monday and Wednesday stays unbroken.
    let cal = BusinessCalendar::from_config(&["2025-09-09"]).unwrap();
    let h = dates(&["2025-09-08", "2025-09-10"]);
    assert_eq!(fold_history(&h, &cal, d("2025-09-10")), (2, 2));
  }

  #[test]
  fn skipped_business_day_resets_streak() {
    // Monday then Wednesday, skipping a working Tuesday.
    let cal = BusinessCalendar::weekends_only();
    let h = dates(&["2025-09-08", "2025-09-10"]);
    assert_eq!(fold_history(&h, &cal, d("2025-09-10")), (1, 2));
  }

  #[test]
  fn missed_recent_business_day_decays_to_zero() {
    // Last attendance three business days before as_of.
    let cal = BusinessCalendar::weekends_only();
    let h = dates(&["2025-09-05", "2025-09-08"]); // Fri, Mon
    assert_eq!(fold_history(&h, &cal, d("2025-09-11")), (0, 2));
  }

  #[test]
  fn attendance_on_previous_business_day_keeps_streak_alive() {
    // Attended Wednesday; as_of Thursday: streak still counts.
    let cal = BusinessCalendar::weekends_only();
    let h = dates(&["2025-09-09", "2025-09-10"]);
    assert_eq!(fold_history(&h, &cal, d("2025-09-11")), (2, 2));
  }

  #[test]
  fn holiday_attendance_counts_as_attended_day() {
    // Friday is a holiday but the user showed up anyway; Monday continues
    // the streak through it.
    let cal = BusinessCalendar::from_config(&["2025-09-12"]).unwrap();
    let h = dates(&["2025-09-11", "2025-09-12", "2025-09-15"]);
    let (consecutive, total) = fold_history(&h, &cal, d("2025-09-15"));
    assert_eq!(total, 3);
    // The walk moves Mon -> Thu (previous business day); the holiday fact
    // adds to the total but not to the business-day chain.
    assert_eq!(consecutive, 2);
  }

  #[test]
  fn weekend_attendance_anchors_the_streak() {
    // Saturday attendance: the walk starts at Saturday and steps to Friday.
    let cal = BusinessCalendar::weekends_only();
    let h = dates(&["2025-09-12", "2025-09-13"]);
    assert_eq!(fold_history(&h, &cal, d("2025-09-15")), (2, 2));
  }
}
