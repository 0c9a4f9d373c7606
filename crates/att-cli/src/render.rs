//! Plain-text and JSON rendering of directory and ledger views.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use att_core::{
    AttendanceRecord, EmployeeDirectory, EmployeeId, EmployeeTotal, InMemoryDirectory,
    WorkedDuration,
};

const UNKNOWN_EMPLOYEE: &str = "(unknown)";

/// Formats a duration as "Xh Ym", or "Ym" under an hour.
/// Negative durations are treated as 0m.
pub fn format_duration(worked: WorkedDuration) -> String {
    if worked.total_minutes() < 0 {
        return "0m".to_string();
    }
    let hours = worked.hours();
    let minutes = worked.minutes();

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn employee_name<'a, D>(directory: &'a D, id: &EmployeeId) -> &'a str
where
    D: EmployeeDirectory + ?Sized,
{
    directory
        .lookup(id)
        .map_or(UNKNOWN_EMPLOYEE, |p| p.name.as_str())
}

pub fn write_employees<W: Write>(writer: &mut W, directory: &InMemoryDirectory) -> Result<()> {
    if directory.is_empty() {
        writeln!(writer, "No employees registered.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<10} {:<24} {:<16} POSITION",
        "ID", "NAME", "DEPARTMENT"
    )?;
    for profile in directory.list() {
        writeln!(
            writer,
            "{:<10} {:<24} {:<16} {}",
            profile.id,
            profile.name,
            profile.department.as_deref().unwrap_or("-"),
            profile.position.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

/// Lists open sessions: who is currently checked in, and since when.
pub fn write_active_sessions<W, D>(
    writer: &mut W,
    directory: &D,
    records: &[&AttendanceRecord],
    timestamp_format: &str,
) -> Result<()>
where
    W: Write,
    D: EmployeeDirectory + ?Sized,
{
    if records.is_empty() {
        writeln!(writer, "No one is checked in.")?;
        return Ok(());
    }

    writeln!(writer, "{:<10} {:<24} CHECKED IN", "ID", "NAME")?;
    for record in records {
        writeln!(
            writer,
            "{:<10} {:<24} {}",
            record.employee_id(),
            employee_name(directory, record.employee_id()),
            record.check_in().format(timestamp_format),
        )?;
    }
    Ok(())
}

/// Lists completed records with their worked duration.
pub fn write_records<W, D>(
    writer: &mut W,
    directory: &D,
    records: &[&AttendanceRecord],
    timestamp_format: &str,
) -> Result<()>
where
    W: Write,
    D: EmployeeDirectory + ?Sized,
{
    if records.is_empty() {
        writeln!(writer, "No completed attendance records.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<6} {:<10} {:<24} {:<17} {:<17} WORKED",
        "RECORD", "ID", "NAME", "CHECK IN", "CHECK OUT"
    )?;
    for record in records {
        let check_out = record
            .check_out()
            .map_or_else(|| "-".to_string(), |t| t.format(timestamp_format).to_string());
        let worked = record
            .worked_duration()
            .map_or_else(|| "-".to_string(), format_duration);
        writeln!(
            writer,
            "{:<6} {:<10} {:<24} {:<17} {:<17} {}",
            record.id().to_string(),
            record.employee_id(),
            employee_name(directory, record.employee_id()),
            record.check_in().format(timestamp_format).to_string(),
            check_out,
            worked,
        )?;
    }
    Ok(())
}

pub fn write_totals<W, D>(writer: &mut W, directory: &D, totals: &[EmployeeTotal]) -> Result<()>
where
    W: Write,
    D: EmployeeDirectory + ?Sized,
{
    if totals.is_empty() {
        writeln!(writer, "No worked time recorded.")?;
        return Ok(());
    }

    writeln!(writer, "{:<10} {:<24} {:<8} WORKED", "ID", "NAME", "SESSIONS")?;
    for total in totals {
        writeln!(
            writer,
            "{:<10} {:<24} {:<8} {}",
            total.employee_id,
            employee_name(directory, &total.employee_id),
            total.sessions,
            format_duration(total.worked),
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ExportRecord<'a> {
    #[serde(flatten)]
    record: &'a AttendanceRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    worked: Option<WorkedDuration>,
}

/// Writes records as a pretty-printed JSON array, with names and worked time.
pub fn write_json<W, D>(writer: &mut W, directory: &D, records: &[&AttendanceRecord]) -> Result<()>
where
    W: Write,
    D: EmployeeDirectory + ?Sized,
{
    let export: Vec<_> = records
        .iter()
        .map(|&record| ExportRecord {
            record,
            name: directory
                .lookup(record.employee_id())
                .map(|p| p.name.as_str()),
            worked: record.worked_duration(),
        })
        .collect();
    serde_json::to_writer_pretty(&mut *writer, &export)?;
    writeln!(writer)?;
    Ok(())
}
