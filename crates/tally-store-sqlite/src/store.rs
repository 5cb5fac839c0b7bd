//! [`SqliteStore`] — the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;

use tally_core::{
  fact::{FactKey, PresenceFact, UserStatistic},
  store::AttendanceStore,
};

use crate::{
  encode::{encode_date, encode_dt, RawFact, RawStatistic},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally attendance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  async fn get_fact(&self, key: &FactKey) -> Result<Option<PresenceFact>> {
    let date_str = encode_date(key.date);
    let group_id = key.group_id.clone();
    let user_id = key.user_id.clone();

    let raw: Option<RawFact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT date, group_id, user_id, display_name, present
               FROM facts WHERE date = ?1 AND group_id = ?2 AND user_id = ?3",
              rusqlite::params![date_str, group_id, user_id],
              |row| {
                Ok(RawFact {
                  date:         row.get(0)?,
                  group_id:     row.get(1)?,
                  user_id:      row.get(2)?,
                  display_name: row.get(3)?,
                  present:      row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFact::into_fact).transpose()
  }

  async fn insert_fact(&self, fact: &PresenceFact) -> Result<()> {
    let date_str = encode_date(fact.date);
    let group_id = fact.group_id.clone();
    let user_id = fact.user_id.clone();
    let display_name = fact.display_name.clone();
    let present = fact.present;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO facts (date, group_id, user_id, display_name, present)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![date_str, group_id, user_id, display_name, present],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn facts_for_user(&self, user_id: &str) -> Result<Vec<PresenceFact>> {
    let user_id = user_id.to_owned();

    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date, group_id, user_id, display_name, present
           FROM facts WHERE user_id = ?1
           ORDER BY date ASC, group_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| {
            Ok(RawFact {
              date:         row.get(0)?,
              group_id:     row.get(1)?,
              user_id:      row.get(2)?,
              display_name: row.get(3)?,
              present:      row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFact::into_fact).collect()
  }

  async fn facts_for_day(&self, day: NaiveDate) -> Result<Vec<PresenceFact>> {
    let date_str = encode_date(day);

    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date, group_id, user_id, display_name, present
           FROM facts WHERE date = ?1
           ORDER BY group_id ASC, user_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |row| {
            Ok(RawFact {
              date:         row.get(0)?,
              group_id:     row.get(1)?,
              user_id:      row.get(2)?,
              display_name: row.get(3)?,
              present:      row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFact::into_fact).collect()
  }

  async fn get_statistic(&self, user_id: &str) -> Result<Option<UserStatistic>> {
    let user_id = user_id.to_owned();

    let raw: Option<RawStatistic> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, display_name, last_attended_date,
                      consecutive_business_days, total_attended_days, updated_at
               FROM statistics WHERE user_id = ?1",
              rusqlite::params![user_id],
              |row| {
                Ok(RawStatistic {
                  user_id:                   row.get(0)?,
                  display_name:              row.get(1)?,
                  last_attended_date:        row.get(2)?,
                  consecutive_business_days: row.get(3)?,
                  total_attended_days:       row.get(4)?,
                  updated_at:                row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStatistic::into_statistic).transpose()
  }

  async fn put_statistic(&self, stat: &UserStatistic) -> Result<()> {
    let user_id = stat.user_id.clone();
    let display_name = stat.display_name.clone();
    let last_str = encode_date(stat.last_attended_date);
    let consecutive = stat.consecutive_business_days;
    let total = stat.total_attended_days;
    let updated_str = encode_dt(stat.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO statistics (
             user_id, display_name, last_attended_date,
             consecutive_business_days, total_attended_days, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(user_id) DO UPDATE SET
             display_name              = excluded.display_name,
             last_attended_date        = excluded.last_attended_date,
             consecutive_business_days = excluded.consecutive_business_days,
             total_attended_days       = excluded.total_attended_days,
             updated_at                = excluded.updated_at",
          rusqlite::params![
            user_id,
            display_name,
            last_str,
            consecutive,
            total,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
