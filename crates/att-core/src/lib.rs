//! Core domain logic for the attendance tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Ledger: the check-in/check-out state machine over an append-only log
//! - Directory: employee records the ledger is gated on
//! - Reporting: worked durations, date-range queries and per-employee totals

pub mod attendance;
pub mod directory;
mod ledger;
mod record;
pub mod report;
pub mod types;

pub use attendance::AttendanceError;
pub use directory::{DirectoryError, EmployeeDirectory, EmployeeProfile, InMemoryDirectory};
pub use ledger::{Ledger, LedgerError};
pub use record::{AttendanceRecord, WorkedDuration};
pub use report::{EmployeeTotal, totals_by_employee};
pub use types::{EmployeeId, RecordId, ValidationError};
