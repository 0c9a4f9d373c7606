//! Directory-gated check-in and check-out.
//!
//! Unknown employees are turned away here, before the ledger sees them, since
//! the ledger keeps no referential integrity of its own.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::directory::EmployeeDirectory;
use crate::ledger::{Ledger, LedgerError};
use crate::types::{EmployeeId, RecordId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("unknown employee: {employee_id}")]
    UnknownEmployee { employee_id: EmployeeId },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Checks `employee_id` in at `at` if the directory knows them.
pub fn check_in<D>(
    directory: &D,
    ledger: &mut Ledger,
    employee_id: &EmployeeId,
    at: NaiveDateTime,
) -> Result<RecordId, AttendanceError>
where
    D: EmployeeDirectory + ?Sized,
{
    ensure_known(directory, employee_id)?;
    Ok(ledger.check_in(employee_id, at)?.id())
}

/// Checks `employee_id` out at `at` if the directory knows them.
pub fn check_out<D>(
    directory: &D,
    ledger: &mut Ledger,
    employee_id: &EmployeeId,
    at: NaiveDateTime,
) -> Result<RecordId, AttendanceError>
where
    D: EmployeeDirectory + ?Sized,
{
    ensure_known(directory, employee_id)?;
    Ok(ledger.check_out(employee_id, at)?.id())
}

fn ensure_known<D>(directory: &D, employee_id: &EmployeeId) -> Result<(), AttendanceError>
where
    D: EmployeeDirectory + ?Sized,
{
    if directory.exists(employee_id) {
        Ok(())
    } else {
        Err(AttendanceError::UnknownEmployee {
            employee_id: employee_id.clone(),
        })
    }
}
