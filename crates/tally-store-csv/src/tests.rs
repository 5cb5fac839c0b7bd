//! Integration tests for `CsvStore` against a temporary directory.

use chrono::{NaiveDate, Utc};
use tally_core::{
  fact::{FactKey, PresenceFact, SnapshotEntry, UserStatistic},
  ledger::PresenceLedger,
  store::AttendanceStore,
};
use tempfile::TempDir;

use crate::CsvStore;

fn store() -> (TempDir, CsvStore) {
  let dir = TempDir::new().expect("temp dir");
  let store = CsvStore::open(dir.path()).expect("csv store");
  (dir, store)
}

fn d(s: &str) -> NaiveDate { s.parse().unwrap() }

fn fact(date: &str, group: &str, user: &str, name: &str) -> PresenceFact {
  PresenceFact {
    date:         d(date),
    group_id:     group.into(),
    user_id:      user.into(),
    display_name: name.into(),
    present:      true,
  }
}

#[tokio::test]
async fn insert_and_get_fact_roundtrip() {
  let (_dir, s) = store();
  let f = fact("2025-09-11", "g1", "u1", "Alice");

  s.insert_fact(&f).await.unwrap();
  assert_eq!(s.get_fact(&f.key()).await.unwrap(), Some(f));
}

#[tokio::test]
async fn get_fact_missing_returns_none() {
  let (_dir, s) = store();
  let key = FactKey {
    date:     d("2025-09-11"),
    group_id: "never-seen".into(),
    user_id:  "u1".into(),
  };
  assert!(s.get_fact(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn facts_are_split_per_group_file() {
  let (dir, s) = store();
  s.insert_fact(&fact("2025-09-11", "lounge", "u1", "Alice"))
    .await
    .unwrap();
  s.insert_fact(&fact("2025-09-11", "focus room", "u2", "Bob"))
    .await
    .unwrap();

  assert!(dir.path().join("facts/lounge.csv").exists());
  assert!(dir.path().join("facts/focus room.csv").exists());
}

#[tokio::test]
async fn group_id_with_path_separator_is_sanitised() {
  let (dir, s) = store();
  s.insert_fact(&fact("2025-09-11", "team/alpha", "u1", "Alice"))
    .await
    .unwrap();

  assert!(dir.path().join("facts/team_alpha.csv").exists());
  // The record keeps the original group id.
  let facts = s.facts_for_day(d("2025-09-11")).await.unwrap();
  assert_eq!(facts[0].group_id, "team/alpha");
}

#[tokio::test]
async fn facts_for_user_spans_group_files_in_date_order() {
  let (_dir, s) = store();
  s.insert_fact(&fact("2025-09-10", "g1", "u1", "Alice")).await.unwrap();
  s.insert_fact(&fact("2025-09-08", "g2", "u1", "Alice")).await.unwrap();
  s.insert_fact(&fact("2025-09-09", "g1", "u1", "Alice")).await.unwrap();
  s.insert_fact(&fact("2025-09-09", "g1", "u2", "Bob")).await.unwrap();

  let history = s.facts_for_user("u1").await.unwrap();
  let dates: Vec<_> = history.iter().map(|f| f.date).collect();
  assert_eq!(dates, vec![d("2025-09-08"), d("2025-09-09"), d("2025-09-10")]);
}

#[tokio::test]
async fn append_to_leftover_empty_file_keeps_the_header() {
  let (dir, s) = store();
  // An interrupted run can leave a zero-length facts file behind.
  std::fs::write(dir.path().join("facts/g1.csv"), "").unwrap();

  let f = fact("2025-09-11", "g1", "u1", "Alice");
  s.insert_fact(&f).await.unwrap();

  // Without a header the reader would consume the fact as the header row.
  assert_eq!(s.get_fact(&f.key()).await.unwrap(), Some(f));
}

#[tokio::test]
async fn statistics_rewrite_leaves_no_temp_file() {
  let (dir, s) = store();
  let stat = UserStatistic {
    user_id:                   "u1".into(),
    display_name:              "Alice".into(),
    last_attended_date:        d("2025-09-10"),
    consecutive_business_days: 1,
    total_attended_days:       1,
    updated_at:                Utc::now(),
  };

  s.put_statistic(&stat).await.unwrap();
  s.put_statistic(&stat).await.unwrap();

  assert!(dir.path().join("statistics.csv").exists());
  assert!(!dir.path().join("statistics.csv.tmp").exists());
}

#[tokio::test]
async fn statistics_overwrite_by_user_id() {
  let (_dir, s) = store();
  let mut stat = UserStatistic {
    user_id:                   "u1".into(),
    display_name:              "Alice".into(),
    last_attended_date:        d("2025-09-10"),
    consecutive_business_days: 1,
    total_attended_days:       41,
    updated_at:                Utc::now(),
  };

  s.put_statistic(&stat).await.unwrap();
  stat.consecutive_business_days = 2;
  stat.total_attended_days = 42;
  s.put_statistic(&stat).await.unwrap();

  let fetched = s.get_statistic("u1").await.unwrap().unwrap();
  assert_eq!(fetched.total_attended_days, 42);
}

#[tokio::test]
async fn statistics_hold_multiple_users() {
  let (_dir, s) = store();
  for (user, total) in [("u1", 5), ("u2", 7)] {
    s.put_statistic(&UserStatistic {
      user_id:                   user.into(),
      display_name:              user.to_uppercase(),
      last_attended_date:        d("2025-09-10"),
      consecutive_business_days: 1,
      total_attended_days:       total,
      updated_at:                Utc::now(),
    })
    .await
    .unwrap();
  }

  assert_eq!(
    s.get_statistic("u1").await.unwrap().unwrap().total_attended_days,
    5
  );
  assert_eq!(
    s.get_statistic("u2").await.unwrap().unwrap().total_attended_days,
    7
  );
}

#[tokio::test]
async fn ledger_upsert_is_idempotent_over_files() {
  let (_dir, s) = store();
  let ledger = PresenceLedger::new(s.clone());
  let day = d("2025-09-11");
  let snapshot = vec![SnapshotEntry {
    group_id:     "g1".into(),
    user_id:      "u1".into(),
    display_name: "Alice".into(),
  }];

  let first = ledger.upsert(&snapshot, day).await.unwrap();
  let second = ledger.upsert(&snapshot, day).await.unwrap();

  assert!(first.newly_recorded.contains("u1"));
  assert!(second.already_recorded.contains("u1"));
  assert_eq!(s.facts_for_day(day).await.unwrap().len(), 1);
}
