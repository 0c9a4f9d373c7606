//! Attendance records and worked-duration arithmetic.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, RecordId};

/// One check-in, optionally completed by a check-out.
///
/// Records are created and closed only by the [`Ledger`](crate::Ledger);
/// `check_in` never changes and `check_out` is set at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    id: RecordId,
    employee_id: EmployeeId,
    check_in: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    check_out: Option<NaiveDateTime>,
}

impl AttendanceRecord {
    pub(crate) fn open(
        id: RecordId,
        employee_id: EmployeeId,
        check_in: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            employee_id,
            check_in,
            check_out: None,
        }
    }

    pub(crate) const fn close(&mut self, check_out: NaiveDateTime) {
        self.check_out = Some(check_out);
    }

    pub const fn id(&self) -> RecordId {
        self.id
    }

    pub const fn employee_id(&self) -> &EmployeeId {
        &self.employee_id
    }

    pub const fn check_in(&self) -> NaiveDateTime {
        self.check_in
    }

    pub const fn check_out(&self) -> Option<NaiveDateTime> {
        self.check_out
    }

    /// Calendar date of the check-in; range queries filter on this.
    pub fn check_in_date(&self) -> NaiveDate {
        self.check_in.date()
    }

    /// True while the session has no check-out.
    pub const fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// Time between check-in and check-out.
    ///
    /// Returns `None` for open records.
    pub fn worked_duration(&self) -> Option<WorkedDuration> {
        self.check_out
            .map(|out| WorkedDuration::from_minutes((out - self.check_in).num_minutes()))
    }
}

/// Elapsed working time, kept in whole minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkedDuration {
    total_minutes: i64,
}

impl WorkedDuration {
    pub const ZERO: Self = Self { total_minutes: 0 };

    #[must_use]
    pub const fn from_minutes(total_minutes: i64) -> Self {
        Self { total_minutes }
    }

    pub const fn total_minutes(self) -> i64 {
        self.total_minutes
    }

    /// Whole hours.
    pub const fn hours(self) -> i64 {
        self.total_minutes / 60
    }

    /// Minutes left over after the whole hours.
    pub const fn minutes(self) -> i64 {
        self.total_minutes % 60
    }
}

impl Add for WorkedDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_minutes(self.total_minutes + rhs.total_minutes)
    }
}

impl Sum for WorkedDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for WorkedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours(), self.minutes())
    }
}

#[derive(Serialize, Deserialize)]
struct HoursMinutes {
    hours: i64,
    minutes: i64,
}

impl Serialize for WorkedDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        HoursMinutes {
            hours: self.hours(),
            minutes: self.minutes(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WorkedDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hm = HoursMinutes::deserialize(deserializer)?;
        Ok(Self::from_minutes(hm.hours * 60 + hm.minutes))
    }
}
