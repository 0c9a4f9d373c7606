//! Append-only attendance ledger.
//!
//! The ledger owns every [`AttendanceRecord`] and enforces the attendance
//! state machine:
//!
//! - an employee has at most one open session at a time
//! - a check-out closes the employee's open session exactly once
//! - a check-out must fall on the check-in's calendar date and strictly after it
//!
//! Records keep insertion order. An index from employee to open record keeps
//! `check_in`, `check_out` and `active_session` constant-time regardless of
//! how long the log grows.
//!
//! The ledger validates and mutates in memory only. It never logs and never
//! substitutes values; every rejection comes back as a [`LedgerError`] and
//! leaves the ledger untouched.
//!
//! # Thread Safety
//!
//! `Ledger` has no interior locking. Callers that share one across threads
//! must serialize `check_in` and `check_out`, for example with a
//! `Mutex<Ledger>`, to keep the one-open-session invariant.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::record::{AttendanceRecord, WorkedDuration};
use crate::types::{EmployeeId, RecordId};

/// Reasons a check-in or check-out is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The employee already has an open session.
    #[error("employee {employee_id} is already checked in (since {since})")]
    AlreadyCheckedIn {
        employee_id: EmployeeId,
        since: NaiveDateTime,
    },

    /// There is no open session to close.
    #[error("employee {employee_id} has no open session")]
    NoOpenSession { employee_id: EmployeeId },

    /// The check-out is on a different calendar date than the check-in.
    #[error("check-out on {check_out} does not match check-in date {check_in}")]
    CrossDayCheckout {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// The check-out equals the check-in.
    #[error("check-out at {at} equals check-in time")]
    ZeroDurationCheckout { at: NaiveDateTime },

    /// The check-out precedes the check-in on the same day.
    #[error("check-out at {check_out} is before check-in at {check_in}")]
    CheckoutBeforeCheckIn {
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    },
}

/// Ordered log of attendance records with an open-session index.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    records: Vec<AttendanceRecord>,
    open: HashMap<EmployeeId, RecordId>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `employee_id` at `at`.
    ///
    /// The caller is responsible for checking that the employee exists; see
    /// [`attendance::check_in`](crate::attendance::check_in) for the
    /// directory-gated variant.
    pub fn check_in(
        &mut self,
        employee_id: &EmployeeId,
        at: NaiveDateTime,
    ) -> Result<&AttendanceRecord, LedgerError> {
        if let Some(open) = self.active_session(employee_id) {
            return Err(LedgerError::AlreadyCheckedIn {
                employee_id: employee_id.clone(),
                since: open.check_in(),
            });
        }

        let id = RecordId::from_index(self.records.len());
        self.records
            .push(AttendanceRecord::open(id, employee_id.clone(), at));
        self.open.insert(employee_id.clone(), id);
        Ok(&self.records[id.index()])
    }

    /// Closes the open session of `employee_id` at `at`.
    pub fn check_out(
        &mut self,
        employee_id: &EmployeeId,
        at: NaiveDateTime,
    ) -> Result<&AttendanceRecord, LedgerError> {
        let Some(&id) = self.open.get(employee_id) else {
            return Err(LedgerError::NoOpenSession {
                employee_id: employee_id.clone(),
            });
        };

        let check_in = self.records[id.index()].check_in();
        validate_checkout(check_in, at)?;

        self.open.remove(employee_id);
        let record = &mut self.records[id.index()];
        record.close(at);
        Ok(&*record)
    }

    /// Returns the open record for `employee_id`, if any.
    pub fn active_session(&self, employee_id: &EmployeeId) -> Option<&AttendanceRecord> {
        self.open.get(employee_id).map(|id| &self.records[id.index()])
    }

    /// All open records, in insertion order.
    pub fn active_sessions(&self) -> Vec<&AttendanceRecord> {
        self.records.iter().filter(|r| r.is_open()).collect()
    }

    /// All closed records, in insertion order.
    pub fn completed_records(&self) -> Vec<&AttendanceRecord> {
        self.records.iter().filter(|r| !r.is_open()).collect()
    }

    /// Closed records whose check-in date lies in `[from, to]`.
    ///
    /// An inverted range yields nothing.
    pub fn records_in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<&AttendanceRecord> {
        if from > to {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|r| !r.is_open())
            .filter(|r| (from..=to).contains(&r.check_in_date()))
            .collect()
    }

    /// Every record of one employee, open or closed, in insertion order.
    pub fn records_for(&self, employee_id: &EmployeeId) -> Vec<&AttendanceRecord> {
        self.records
            .iter()
            .filter(|r| r.employee_id() == employee_id)
            .collect()
    }

    /// Worked time of a closed record; `None` if the record is open or unknown.
    pub fn worked_duration(&self, id: RecordId) -> Option<WorkedDuration> {
        self.get(id).and_then(AttendanceRecord::worked_duration)
    }

    pub fn get(&self, id: RecordId) -> Option<&AttendanceRecord> {
        self.records.get(id.index())
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Same calendar day, strictly later.
fn validate_checkout(check_in: NaiveDateTime, check_out: NaiveDateTime) -> Result<(), LedgerError> {
    if check_out.date() != check_in.date() {
        return Err(LedgerError::CrossDayCheckout {
            check_in: check_in.date(),
            check_out: check_out.date(),
        });
    }
    if check_out == check_in {
        return Err(LedgerError::ZeroDurationCheckout { at: check_out });
    }
    if check_out < check_in {
        return Err(LedgerError::CheckoutBeforeCheckIn {
            check_in,
            check_out,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn emp(id: &str) -> EmployeeId {
        EmployeeId::new(id).unwrap()
    }

    /// Ledger with one completed 09:00-17:30 shift for `E1` on 2024-01-10.
    fn ledger_with_shift() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();
        ledger.check_out(&emp("E1"), at("2024-01-10 17:30")).unwrap();
        ledger
    }

    #[test]
    fn check_in_opens_session() {
        let mut ledger = Ledger::new();
        let rec = ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();

        assert!(rec.is_open());
        assert_eq!(rec.employee_id(), &emp("E1"));
        assert_eq!(rec.check_in(), at("2024-01-10 09:00"));
        let id = rec.id();
        assert_eq!(ledger.worked_duration(id), None);
        assert_eq!(
            ledger.active_session(&emp("E1")).map(AttendanceRecord::id),
            Some(RecordId::from_index(0))
        );
    }

    #[test]
    fn second_check_in_is_rejected_and_ledger_unchanged() {
        let mut ledger = Ledger::new();
        ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();
        let before = ledger.records().to_vec();

        let err = ledger
            .check_in(&emp("E1"), at("2024-01-10 10:00"))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::AlreadyCheckedIn {
                employee_id: emp("E1"),
                since: at("2024-01-10 09:00"),
            }
        );
        assert_eq!(ledger.records(), before.as_slice());
        assert_eq!(ledger.active_sessions().len(), 1);
    }

    #[test]
    fn check_out_without_check_in_fails() {
        let mut ledger = Ledger::new();
        let err = ledger
            .check_out(&emp("E1"), at("2024-01-10 17:00"))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::NoOpenSession {
                employee_id: emp("E1")
            }
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn cross_day_check_out_is_rejected() {
        let mut ledger = Ledger::new();
        ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();

        let err = ledger
            .check_out(&emp("E1"), at("2024-01-11 09:00"))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::CrossDayCheckout {
                check_in: day("2024-01-10"),
                check_out: day("2024-01-11"),
            }
        );
        assert!(ledger.active_session(&emp("E1")).is_some());
    }

    #[test]
    fn zero_duration_check_out_is_rejected() {
        let mut ledger = Ledger::new();
        ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();

        let err = ledger
            .check_out(&emp("E1"), at("2024-01-10 09:00"))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::ZeroDurationCheckout {
                at: at("2024-01-10 09:00")
            }
        );
        assert!(ledger.completed_records().is_empty());
    }

    #[test]
    fn check_out_before_check_in_is_rejected() {
        let mut ledger = Ledger::new();
        ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();

        let err = ledger
            .check_out(&emp("E1"), at("2024-01-10 08:15"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::CheckoutBeforeCheckIn { .. }));
        assert!(ledger.active_session(&emp("E1")).is_some());
    }

    #[test]
    fn cross_day_takes_precedence_over_ordering() {
        let mut ledger = Ledger::new();
        ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();

        let err = ledger
            .check_out(&emp("E1"), at("2024-01-09 18:00"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::CrossDayCheckout { .. }));
    }

    #[test]
    fn completed_shift_reports_duration_and_range_membership() {
        let ledger = ledger_with_shift();

        let completed = ledger.completed_records();
        assert_eq!(completed.len(), 1);
        assert_eq!(
            completed[0].worked_duration(),
            Some(WorkedDuration::from_minutes(8 * 60 + 30))
        );

        let in_range = ledger.records_in_range(day("2024-01-10"), day("2024-01-10"));
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].id(), completed[0].id());

        assert!(
            ledger
                .records_in_range(day("2024-01-11"), day("2024-01-12"))
                .is_empty()
        );
    }

    #[test]
    fn closed_session_does_not_block_new_check_in() {
        let mut ledger = ledger_with_shift();
        assert!(ledger.active_session(&emp("E1")).is_none());

        let rec = ledger.check_in(&emp("E1"), at("2024-01-11 08:00")).unwrap();

        assert_eq!(rec.id(), RecordId::from_index(1));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn check_out_cannot_reclose_a_record() {
        let mut ledger = ledger_with_shift();

        let err = ledger
            .check_out(&emp("E1"), at("2024-01-10 18:00"))
            .unwrap_err();

        assert!(matches!(err, LedgerError::NoOpenSession { .. }));
        assert_eq!(
            ledger.records()[0].check_out(),
            Some(at("2024-01-10 17:30"))
        );
    }

    #[test]
    fn check_out_targets_the_latest_session() {
        let mut ledger = ledger_with_shift();
        ledger.check_in(&emp("E1"), at("2024-01-11 08:00")).unwrap();

        let rec = ledger.check_out(&emp("E1"), at("2024-01-11 12:00")).unwrap();

        assert_eq!(rec.id(), RecordId::from_index(1));
        assert_eq!(
            ledger.records()[0].check_out(),
            Some(at("2024-01-10 17:30"))
        );
    }

    #[test]
    fn sessions_are_tracked_per_employee() {
        let mut ledger = Ledger::new();
        ledger.check_in(&emp("E1"), at("2024-01-10 09:00")).unwrap();
        ledger.check_in(&emp("E2"), at("2024-01-10 09:05")).unwrap();

        ledger.check_out(&emp("E2"), at("2024-01-10 12:00")).unwrap();

        let active: Vec<_> = ledger
            .active_sessions()
            .iter()
            .map(|r| r.employee_id().clone())
            .collect();
        assert_eq!(active, vec![emp("E1")]);
        assert_eq!(ledger.records_for(&emp("E2")).len(), 1);
    }

    #[test]
    fn inverted_range_is_empty() {
        let mut ledger = ledger_with_shift();
        ledger.check_in(&emp("E2"), at("2024-01-12 09:00")).unwrap();
        ledger.check_out(&emp("E2"), at("2024-01-12 10:00")).unwrap();

        assert!(
            ledger
                .records_in_range(day("2024-01-12"), day("2024-01-10"))
                .is_empty()
        );
        assert!(
            Ledger::new()
                .records_in_range(day("2024-01-02"), day("2024-01-01"))
                .is_empty()
        );
    }

    #[test]
    fn range_bounds_are_inclusive_and_skip_open_records() {
        let mut ledger = Ledger::new();
        for (id, start, end) in [
            ("E1", "2024-01-09 09:00", "2024-01-09 17:00"),
            ("E1", "2024-01-10 09:00", "2024-01-10 17:00"),
            ("E1", "2024-01-12 09:00", "2024-01-12 17:00"),
            ("E1", "2024-01-13 09:00", "2024-01-13 17:00"),
        ] {
            ledger.check_in(&emp(id), at(start)).unwrap();
            ledger.check_out(&emp(id), at(end)).unwrap();
        }
        ledger.check_in(&emp("E2"), at("2024-01-11 09:00")).unwrap();

        let dates: Vec<_> = ledger
            .records_in_range(day("2024-01-10"), day("2024-01-12"))
            .iter()
            .map(|r| r.check_in_date())
            .collect();

        assert_eq!(dates, vec![day("2024-01-10"), day("2024-01-12")]);
    }

    #[test]
    fn queries_are_stable_without_mutation() {
        let ledger = ledger_with_shift();

        assert_eq!(ledger.completed_records(), ledger.completed_records());
        assert_eq!(
            ledger.records_in_range(day("2024-01-01"), day("2024-01-31")),
            ledger.records_in_range(day("2024-01-01"), day("2024-01-31"))
        );
    }

    #[test]
    fn never_two_open_sessions_per_employee() {
        let mut ledger = Ledger::new();
        let e = emp("E1");
        let steps = [
            ("in", "2024-01-10 08:00"),
            ("in", "2024-01-10 08:30"),
            ("out", "2024-01-10 08:00"),
            ("out", "2024-01-10 12:00"),
            ("out", "2024-01-10 13:00"),
            ("in", "2024-01-10 13:30"),
            ("in", "2024-01-10 14:00"),
            ("out", "2024-01-11 09:00"),
        ];

        for (op, ts) in steps {
            let _ = match op {
                "in" => ledger.check_in(&e, at(ts)).map(|_| ()),
                _ => ledger.check_out(&e, at(ts)).map(|_| ()),
            };
            let open = ledger
                .records_for(&e)
                .iter()
                .filter(|r| r.is_open())
                .count();
            assert!(open <= 1, "{open} open sessions after {op} at {ts}");
        }

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.completed_records().len(), 1);
    }

    #[test]
    fn get_resolves_handles() {
        let ledger = ledger_with_shift();
        let id = ledger.completed_records()[0].id();
        assert_eq!(ledger.get(id).map(AttendanceRecord::id), Some(id));
        assert_eq!(
            ledger.worked_duration(id),
            Some(WorkedDuration::from_minutes(510))
        );
        assert!(ledger.get(RecordId::from_index(5)).is_none());
        assert!(ledger.worked_duration(RecordId::from_index(5)).is_none());
    }
}
