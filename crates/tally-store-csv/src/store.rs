//! [`CsvStore`] — the flat-file implementation of [`AttendanceStore`].

use std::{
  fs,
  path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tally_core::{
  fact::{FactKey, PresenceFact, UserStatistic},
  store::AttendanceStore,
};
use tokio::task;

use crate::{Error, Result};

const FACTS_DIR: &str = "facts";
const STATISTICS_FILE: &str = "statistics.csv";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally attendance store backed by a directory of delimited files: one
/// facts file per group plus one statistics file.
///
/// Cloning is cheap — only the root path is copied. The single-active-writer
/// assumption of the wider design holds here too: concurrent writers are not
/// guarded against.
#[derive(Clone)]
pub struct CsvStore {
  root: PathBuf,
}

impl CsvStore {
  /// Open (or create) a store rooted at `root`.
  pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(root.join(FACTS_DIR))?;
    Ok(Self { root })
  }

  fn facts_dir(&self) -> PathBuf { self.root.join(FACTS_DIR) }

  fn statistics_path(&self) -> PathBuf { self.root.join(STATISTICS_FILE) }

  /// Path of the facts file for one group. Path separators in the group id
  /// are the only characters a filename cannot carry.
  fn group_path(&self, group_id: &str) -> PathBuf {
    let safe: String = group_id
      .chars()
      .map(|c| if c == '/' || c == '\\' { '_' } else { c })
      .collect();
    self.facts_dir().join(format!("{safe}.csv"))
  }
}

// ─── Blocking helpers ────────────────────────────────────────────────────────

fn read_facts_file(path: &Path) -> Result<Vec<PresenceFact>> {
  if !path.exists() {
    return Ok(Vec::new());
  }
  let mut reader = csv::Reader::from_path(path)?;
  let mut facts = Vec::new();
  for row in reader.deserialize() {
    facts.push(row?);
  }
  Ok(facts)
}

fn read_all_facts(facts_dir: &Path) -> Result<Vec<PresenceFact>> {
  let mut facts = Vec::new();
  for dir_entry in fs::read_dir(facts_dir)? {
    let path = dir_entry?.path();
    if path.extension().is_some_and(|ext| ext == "csv") {
      facts.extend(read_facts_file(&path)?);
    }
  }
  Ok(facts)
}

fn append_fact(path: &Path, fact: &PresenceFact) -> Result<()> {
  // Key the header on the file being empty, not merely absent: a zero-length
  // leftover from an interrupted open must still get one.
  let write_header = path.metadata().map_or(true, |m| m.len() == 0);
  let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
  let mut writer = csv::WriterBuilder::new()
    .has_headers(write_header)
    .from_writer(file);
  writer.serialize(fact)?;
  writer.flush()?;
  Ok(())
}

fn read_statistics(path: &Path) -> Result<Vec<UserStatistic>> {
  if !path.exists() {
    return Ok(Vec::new());
  }
  let mut reader = csv::Reader::from_path(path)?;
  let mut stats = Vec::new();
  for row in reader.deserialize() {
    stats.push(row?);
  }
  Ok(stats)
}

fn write_statistics(path: &Path, stats: &[UserStatistic]) -> Result<()> {
  // Write a sibling temp file and rename it into place so a crash mid-write
  // never leaves a truncated statistics file behind.
  let tmp = path.with_extension("csv.tmp");
  {
    let mut writer = csv::Writer::from_path(&tmp)?;
    for stat in stats {
      writer.serialize(stat)?;
    }
    writer.flush()?;
  }
  fs::rename(&tmp, path)?;
  Ok(())
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for CsvStore {
  type Error = Error;

  async fn get_fact(&self, key: &FactKey) -> Result<Option<PresenceFact>> {
    let path = self.group_path(&key.group_id);
    let key = key.clone();

    task::spawn_blocking(move || {
      let facts = read_facts_file(&path)?;
      Ok(facts.into_iter().find(|f| f.key() == key))
    })
    .await?
  }

  async fn insert_fact(&self, fact: &PresenceFact) -> Result<()> {
    let path = self.group_path(&fact.group_id);
    let fact = fact.clone();

    task::spawn_blocking(move || append_fact(&path, &fact)).await?
  }

  async fn facts_for_user(&self, user_id: &str) -> Result<Vec<PresenceFact>> {
    let facts_dir = self.facts_dir();
    let user_id = user_id.to_owned();

    task::spawn_blocking(move || {
      let mut facts: Vec<_> = read_all_facts(&facts_dir)?
        .into_iter()
        .filter(|f| f.user_id == user_id)
        .collect();
      facts.sort_by(|a, b| (a.date, &a.group_id).cmp(&(b.date, &b.group_id)));
      Ok(facts)
    })
    .await?
  }

  async fn facts_for_day(&self, day: NaiveDate) -> Result<Vec<PresenceFact>> {
    let facts_dir = self.facts_dir();

    task::spawn_blocking(move || {
      let mut facts: Vec<_> = read_all_facts(&facts_dir)?
        .into_iter()
        .filter(|f| f.date == day)
        .collect();
      facts.sort_by(|a, b| {
        (&a.group_id, &a.user_id).cmp(&(&b.group_id, &b.user_id))
      });
      Ok(facts)
    })
    .await?
  }

  async fn get_statistic(&self, user_id: &str) -> Result<Option<UserStatistic>> {
    let path = self.statistics_path();
    let user_id = user_id.to_owned();

    task::spawn_blocking(move || {
      let stats = read_statistics(&path)?;
      Ok(stats.into_iter().find(|s| s.user_id == user_id))
    })
    .await?
  }

  async fn put_statistic(&self, stat: &UserStatistic) -> Result<()> {
    let path = self.statistics_path();
    let stat = stat.clone();

    // Read-modify-rewrite of the whole file, keyed by user_id.
    task::spawn_blocking(move || {
      let mut stats = read_statistics(&path)?;
      match stats.iter_mut().find(|s| s.user_id == stat.user_id) {
        Some(existing) => *existing = stat,
        None => stats.push(stat),
      }
      stats.sort_by(|a, b| a.user_id.cmp(&b.user_id));
      write_statistics(&path, &stats)
    })
    .await?
  }
}
