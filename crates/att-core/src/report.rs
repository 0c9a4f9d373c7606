//! Per-employee worked-time totals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{AttendanceRecord, WorkedDuration};
use crate::types::EmployeeId;

/// Worked time summed over one employee's completed sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTotal {
    pub employee_id: EmployeeId,
    pub sessions: usize,
    pub worked: WorkedDuration,
}

/// Sums completed records per employee, ordered by employee ID.
///
/// Open records are skipped.
pub fn totals_by_employee<'a, I>(records: I) -> Vec<EmployeeTotal>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut totals: BTreeMap<&EmployeeId, (usize, WorkedDuration)> = BTreeMap::new();
    for record in records {
        let Some(worked) = record.worked_duration() else {
            continue;
        };
        let entry = totals
            .entry(record.employee_id())
            .or_insert((0, WorkedDuration::ZERO));
        entry.0 += 1;
        entry.1 = entry.1 + worked;
    }

    totals
        .into_iter()
        .map(|(employee_id, (sessions, worked))| EmployeeTotal {
            employee_id: employee_id.clone(),
            sessions,
            worked,
        })
        .collect()
}
