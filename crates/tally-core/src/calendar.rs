//! Business-day and holiday logic.
//!
//! Pure and deterministic: a day is a business day unless it falls on a
//! weekend or on a configured national holiday. Holiday configuration is
//! validated once at construction; every query after that is total.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{Error, Result};

/// A calendar of configured national holidays layered over the Sat/Sun
/// weekend. Construction fails fast on malformed configuration; queries
/// never fail.
#[derive(Debug, Clone, Default)]
pub struct BusinessCalendar {
  holidays: BTreeSet<NaiveDate>,
}

impl BusinessCalendar {
  /// A calendar with no holidays — weekends only.
  pub fn weekends_only() -> Self { Self::default() }

  pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
    Self { holidays: holidays.into_iter().collect() }
  }

  /// Build from configured holiday entries in `YYYY-MM-DD` form. Any entry
  /// that does not parse aborts construction with
  /// [`Error::CalendarConfiguration`].
  pub fn from_config<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
    let holidays = entries
      .iter()
      .map(|e| {
        let e = e.as_ref();
        e.parse::<NaiveDate>()
          .map_err(|_| Error::CalendarConfiguration(e.to_owned()))
      })
      .collect::<Result<BTreeSet<_>>>()?;
    Ok(Self { holidays })
  }

  pub fn is_holiday(&self, date: NaiveDate) -> bool {
    self.holidays.contains(&date)
  }

  /// True when `date` is neither a weekend day nor a configured holiday.
  pub fn is_business_day(&self, date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
      && !self.is_holiday(date)
  }

  /// The closest business day strictly before `date`.
  pub fn previous_business_day(&self, date: NaiveDate) -> NaiveDate {
    let mut day = date - Days::new(1);
    while !self.is_business_day(day) {
      day = day - Days::new(1);
    }
    day
  }

  /// Count of business days in the half-open interval `(from, to]`.
  /// Returns 0 when `from >= to`.
  pub fn business_days_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
    let mut count = 0;
    let mut day = from + Days::new(1);
    while day <= to {
      if self.is_business_day(day) {
        count += 1;
      }
      day = day + Days::new(1);
    }
    count
  }
}
