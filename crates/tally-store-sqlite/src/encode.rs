//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as ISO 8601 (`YYYY-MM-DD`), which sorts
//! lexicographically in date order; timestamps as RFC 3339 strings.

use chrono::{DateTime, NaiveDate, Utc};
use tally_core::fact::{PresenceFact, UserStatistic};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|_| Error::DateParse(s.to_owned()))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateTimeParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `facts` row.
pub struct RawFact {
  pub date:         String,
  pub group_id:     String,
  pub user_id:      String,
  pub display_name: String,
  pub present:      bool,
}

impl RawFact {
  pub fn into_fact(self) -> Result<PresenceFact> {
    Ok(PresenceFact {
      date:         decode_date(&self.date)?,
      group_id:     self.group_id,
      user_id:      self.user_id,
      display_name: self.display_name,
      present:      self.present,
    })
  }
}

/// Raw strings read directly from a `statistics` row.
pub struct RawStatistic {
  pub user_id:                   String,
  pub display_name:              String,
  pub last_attended_date:        String,
  pub consecutive_business_days: u32,
  pub total_attended_days:       u32,
  pub updated_at:                String,
}

impl RawStatistic {
  pub fn into_statistic(self) -> Result<UserStatistic> {
    Ok(UserStatistic {
      user_id:                   self.user_id,
      display_name:              self.display_name,
      last_attended_date:        decode_date(&self.last_attended_date)?,
      consecutive_business_days: self.consecutive_business_days,
      total_attended_days:       self.total_attended_days,
      updated_at:                decode_dt(&self.updated_at)?,
    })
  }
}
