//! Subcommand implementations, generic over the storage backend.

use std::{collections::BTreeMap, io::Read as _};

use anyhow::Context as _;
use chrono::NaiveDate;
use tally_core::{
  calendar::BusinessCalendar,
  event::EventBuilder,
  fact::SnapshotEntry,
  ledger::PresenceLedger,
  stats::StatsEngine,
  store::AttendanceStore,
};

/// Read a snapshot (a JSON array of entries) from a file, or stdin for `-`.
fn read_snapshot(source: &str) -> anyhow::Result<Vec<SnapshotEntry>> {
  let raw = if source == "-" {
    let mut buf = String::new();
    std::io::stdin()
      .read_to_string(&mut buf)
      .context("reading snapshot from stdin")?;
    buf
  } else {
    std::fs::read_to_string(source)
      .with_context(|| format!("reading snapshot file {source}"))?
  };

  SnapshotEntry::parse_snapshot(&raw).context("parsing snapshot JSON")
}

/// `tally record` — upsert one snapshot, recompute statistics for the users
/// it newly recorded, and emit their notification events as JSON lines.
pub async fn record<S: AttendanceStore + Clone>(
  store: S,
  calendar: BusinessCalendar,
  milestone_interval: u32,
  snapshot_source: &str,
  day: NaiveDate,
) -> anyhow::Result<()> {
  let snapshot = read_snapshot(snapshot_source)?;

  let ledger = PresenceLedger::new(store.clone());
  let outcome = ledger
    .upsert(&snapshot, day)
    .await
    .context("recording snapshot")?;

  let engine = StatsEngine::new(store, calendar);
  let mut stats = Vec::new();
  for user_id in &outcome.newly_recorded {
    if let Some(stat) = engine
      .recompute(user_id, day)
      .await
      .context("recomputing statistics")?
    {
      stats.push(stat);
    }
  }

  let events = EventBuilder::new(milestone_interval).build_all(&outcome, &stats);
  for event in &events {
    println!("{}", serde_json::to_string(event)?);
  }

  tracing::info!(
    new = outcome.newly_recorded.len(),
    repeat = outcome.already_recorded.len(),
    events = events.len(),
    %day,
    "snapshot recorded"
  );
  Ok(())
}

/// `tally report` — the day's attendance grouped by user: the groups each
/// user was seen in plus their cached streak and total.
pub async fn report<S: AttendanceStore>(
  store: S,
  day: NaiveDate,
) -> anyhow::Result<()> {
  let facts = store.facts_for_day(day).await.context("listing facts")?;
  if facts.is_empty() {
    println!("no attendance recorded for {day}");
    return Ok(());
  }

  // One line per user; a user seen in several groups has several facts.
  let mut by_user: BTreeMap<&str, (&str, Vec<&str>)> = BTreeMap::new();
  for fact in &facts {
    let (_, groups) = by_user
      .entry(&fact.user_id)
      .or_insert((&fact.display_name, Vec::new()));
    groups.push(&fact.group_id);
  }

  println!("attendance for {day}:");
  for (user_id, (display_name, groups)) in &by_user {
    let stat = store
      .get_statistic(user_id)
      .await
      .context("reading statistic")?;
    let (streak, total) = stat
      .map(|s| (s.consecutive_business_days, s.total_attended_days))
      .unwrap_or((0, 0));
    println!(
      "  {:<24} {:<32} streak {:>3}  total {:>4}",
      display_name,
      groups.join(", "),
      streak,
      total
    );
  }
  println!("{} user(s)", by_user.len());
  Ok(())
}

/// `tally stats` — recompute one user's statistic as of a date and print it.
pub async fn stats<S: AttendanceStore>(
  store: S,
  calendar: BusinessCalendar,
  user_id: &str,
  as_of: NaiveDate,
) -> anyhow::Result<()> {
  let engine = StatsEngine::new(store, calendar);
  match engine
    .recompute(user_id, as_of)
    .await
    .context("recomputing statistic")?
  {
    Some(stat) => println!("{}", serde_json::to_string_pretty(&stat)?),
    None => println!("no attendance history for user {user_id}"),
  }
  Ok(())
}
