//! History aggregation
//!
//! Reshapes stored sessions for a month calendar: which days have entries,
//! and what was logged on each day. No decision logic lives here.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use itertools::Itertools;
use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::StoredSession;
use crate::infrastructure::traits::SessionStore;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl YearMonth {
    /// Fails for months outside 1..=12 and for years whose month (or the
    /// month after it) is not representable as a calendar date.
    pub fn new(year: i32, month: u32) -> ApplicationResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ApplicationError::OperationFailed {
                context: format!("invalid month {month}"),
                source: "month must be between 1 and 12".into(),
            });
        }
        let ym = Self { year, month };
        if ym.first_day().is_none() || ym.next().first_day().is_none() {
            return Err(ApplicationError::OperationFailed {
                context: format!("invalid year {year}"),
                source: "year is outside the supported calendar range".into(),
            });
        }
        Ok(ym)
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self { year: self.year.saturating_sub(1), month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year.saturating_add(1), month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 0,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calendar grid cells, Sunday first: `None` pads up to the weekday of the
/// 1st, then one `Some(day)` per day of the month.
pub fn calendar_days(ym: YearMonth) -> Vec<Option<u32>> {
    let leading = ym
        .first_day()
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (0..leading)
        .map(|_| None)
        .chain((1..=ym.days_in_month()).map(Some))
        .collect()
}

/// Local instant of a stored session, if its timestamp parses.
fn local_time(session: &StoredSession, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(&session.record.timestamp) {
        Ok(ts) => Some(ts.with_timezone(&offset)),
        Err(e) => {
            warn!(
                "skipping session {} with bad timestamp {:?}: {}",
                session.id, session.record.timestamp, e
            );
            None
        }
    }
}

/// Bucket sessions by day-of-month in `offset`. Order inside a day is kept.
pub fn group_by_day(
    sessions: &[StoredSession],
    offset: FixedOffset,
) -> BTreeMap<u32, Vec<StoredSession>> {
    sessions
        .iter()
        .filter_map(|s| local_time(s, offset).map(|ts| (ts.day(), s.clone())))
        .into_group_map()
        .into_iter()
        .collect()
}

/// One month of history for display.
#[derive(Debug, Clone)]
pub struct MonthHistory {
    pub month: YearMonth,
    pub calendar: Vec<Option<u32>>,
    /// Newest first within each day
    pub by_day: BTreeMap<u32, Vec<StoredSession>>,
}

impl MonthHistory {
    pub fn has_sessions(&self, day: u32) -> bool {
        self.by_day.contains_key(&day)
    }

    pub fn sessions_on(&self, day: u32) -> &[StoredSession] {
        self.by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.by_day.values().map(Vec::len).sum()
    }
}

/// Read side of the session store.
pub struct HistoryService {
    store: Arc<dyn SessionStore>,
    offset: FixedOffset,
}

impl HistoryService {
    /// `offset` decides which calendar day a session falls on.
    pub fn new(store: Arc<dyn SessionStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    fn sessions(&self, user_id: &str) -> ApplicationResult<Vec<StoredSession>> {
        self.store
            .sessions_for_user(user_id)
            .with_context(format!("read sessions for {user_id}"))
    }

    /// Sessions of one month, grouped by day.
    pub fn month(&self, user_id: &str, ym: YearMonth) -> ApplicationResult<MonthHistory> {
        let in_month: Vec<StoredSession> = self
            .sessions(user_id)?
            .into_iter()
            .filter(|s| {
                local_time(s, self.offset)
                    .map(|ts| YearMonth::of(&ts) == ym)
                    .unwrap_or(false)
            })
            .collect();
        debug!("month {}: {} sessions for {}", ym, in_month.len(), user_id);

        Ok(MonthHistory {
            month: ym,
            calendar: calendar_days(ym),
            by_day: group_by_day(&in_month, self.offset),
        })
    }

    /// Newest `limit` sessions.
    pub fn recent(&self, user_id: &str, limit: usize) -> ApplicationResult<Vec<StoredSession>> {
        let mut sessions = self.sessions(user_id)?;
        sessions.truncate(limit);
        Ok(sessions)
    }

    /// The newest session, if any.
    pub fn latest(&self, user_id: &str) -> ApplicationResult<Option<StoredSession>> {
        Ok(self.sessions(user_id)?.into_iter().next())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_january_when_prev_then_wraps_to_december() {
        let jan = YearMonth::new(2024, 1).unwrap();
        assert_eq!(jan.prev(), YearMonth::new(2023, 12).unwrap());
        assert_eq!(jan.prev().next(), jan);
    }

    #[test]
    fn given_leap_february_when_counting_days_then_29() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2023, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn given_year_beyond_calendar_range_when_creating_then_error() {
        assert!(YearMonth::new(i32::MAX, 12).is_err());
        assert!(YearMonth::new(i32::MIN, 1).is_err());
        assert!(YearMonth::new(2024, 12).is_ok());
    }

    #[test]
    fn given_extreme_year_when_stepping_then_no_overflow() {
        let last = YearMonth { year: i32::MAX, month: 12 };
        assert_eq!(last.next().year, i32::MAX);
        assert_eq!(last.days_in_month(), 0);
        assert!(calendar_days(last).is_empty());
    }

    #[test]
    fn given_month_13_when_creating_then_error() {
        assert!(YearMonth::new(2024, 13).is_err());
        assert!(YearMonth::new(2024, 0).is_err());
    }
}
