//! Interactive menu shell.
//!
//! The shell owns the employee directory and the attendance ledger for the
//! lifetime of the process and drives them from line-oriented input. It is
//! generic over its reader and writer so whole sessions can be scripted in
//! tests.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};

use att_core::{
    EmployeeDirectory, EmployeeId, EmployeeProfile, InMemoryDirectory, Ledger, WorkedDuration,
    attendance, totals_by_employee,
};

use crate::Config;
use crate::input::{TimestampInput, parse_date, parse_timestamp};
use crate::render;

/// Source of the current wall-clock time.
pub type Clock = Box<dyn Fn() -> NaiveDateTime>;

/// Local wall-clock time, without timezone.
pub fn system_clock() -> Clock {
    Box::new(|| Local::now().naive_local())
}

const MENU: &str = "\
Attendance Tracker
  1) Add employee
  2) Update employee
  3) Delete employee
  4) List employees
  5) Check in
  6) Check out
  7) Currently checked in
  8) Completed attendance
  9) Attendance by date range
 10) Worked-hours summary
 11) Export completed records (JSON)
  0) Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    AddEmployee,
    UpdateEmployee,
    DeleteEmployee,
    ListEmployees,
    CheckIn,
    CheckOut,
    Active,
    Completed,
    Range,
    Summary,
    Export,
    Exit,
}

impl MenuChoice {
    fn parse(s: &str) -> Option<Self> {
        let choice = match s.trim() {
            "1" => Self::AddEmployee,
            "2" => Self::UpdateEmployee,
            "3" => Self::DeleteEmployee,
            "4" => Self::ListEmployees,
            "5" => Self::CheckIn,
            "6" => Self::CheckOut,
            "7" => Self::Active,
            "8" => Self::Completed,
            "9" => Self::Range,
            "10" => Self::Summary,
            "11" => Self::Export,
            "0" | "q" | "quit" | "exit" => Self::Exit,
            _ => return None,
        };
        Some(choice)
    }
}

/// Whether the menu loop should keep going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input ended in the middle of an action.
    Eof,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
    config: Config,
    clock: Clock,
    directory: InMemoryDirectory,
    ledger: Ledger,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, config: Config, clock: Clock) -> Self {
        Self {
            input,
            output,
            config,
            clock,
            directory: InMemoryDirectory::new(),
            ledger: Ledger::new(),
        }
    }

    pub const fn directory(&self) -> &InMemoryDirectory {
        &self.directory
    }

    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Runs the menu loop until the operator exits or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "{MENU}")?;
            let Some(line) = self.prompt("Choose an option: ")? else {
                break;
            };
            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "Unknown option '{}'.", line.trim())?;
                continue;
            };
            tracing::debug!(?choice, "menu selection");
            if choice == MenuChoice::Exit {
                break;
            }
            if self.dispatch(choice)? == Flow::Eof {
                break;
            }
        }
        writeln!(self.output, "Goodbye.")?;
        self.output.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<Flow> {
        match choice {
            MenuChoice::AddEmployee => self.add_employee(),
            MenuChoice::UpdateEmployee => self.update_employee(),
            MenuChoice::DeleteEmployee => self.delete_employee(),
            MenuChoice::ListEmployees => {
                render::write_employees(&mut self.output, &self.directory)?;
                Ok(Flow::Continue)
            }
            MenuChoice::CheckIn => self.check_in(),
            MenuChoice::CheckOut => self.check_out(),
            MenuChoice::Active => {
                render::write_active_sessions(
                    &mut self.output,
                    &self.directory,
                    &self.ledger.active_sessions(),
                    &self.config.timestamp_format,
                )?;
                Ok(Flow::Continue)
            }
            MenuChoice::Completed => {
                render::write_records(
                    &mut self.output,
                    &self.directory,
                    &self.ledger.completed_records(),
                    &self.config.timestamp_format,
                )?;
                Ok(Flow::Continue)
            }
            MenuChoice::Range => self.range_report(),
            MenuChoice::Summary => {
                let totals = totals_by_employee(self.ledger.records());
                render::write_totals(&mut self.output, &self.directory, &totals)?;
                Ok(Flow::Continue)
            }
            MenuChoice::Export => {
                render::write_json(
                    &mut self.output,
                    &self.directory,
                    &self.ledger.completed_records(),
                )?;
                Ok(Flow::Continue)
            }
            MenuChoice::Exit => Ok(Flow::Eof),
        }
    }

    // ========== Directory maintenance ==========

    fn add_employee(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt_employee_id()? else {
            return Ok(Flow::Eof);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        if self.directory.exists(&id) {
            writeln!(self.output, "Employee {id} already exists.")?;
            return Ok(Flow::Continue);
        }

        let Some(name) = self.prompt("Name: ")? else {
            return Ok(Flow::Eof);
        };
        let name = name.trim();
        if name.is_empty() {
            writeln!(self.output, "Name cannot be empty.")?;
            return Ok(Flow::Continue);
        }
        let mut profile = EmployeeProfile::new(id.clone(), name);

        let Some(department) = self.prompt("Department (optional): ")? else {
            return Ok(Flow::Eof);
        };
        profile.department = non_empty(&department);
        let Some(position) = self.prompt("Position (optional): ")? else {
            return Ok(Flow::Eof);
        };
        profile.position = non_empty(&position);

        match self.directory.add(profile) {
            Ok(()) => writeln!(self.output, "Added employee {id}.")?,
            Err(err) => writeln!(self.output, "{err}.")?,
        }
        Ok(Flow::Continue)
    }

    /// Blank answers keep the current value; `-` clears an optional field.
    fn update_employee(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt_employee_id()? else {
            return Ok(Flow::Eof);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        let Some(mut profile) = self.directory.lookup(&id).cloned() else {
            writeln!(self.output, "Unknown employee {id}.")?;
            return Ok(Flow::Continue);
        };

        let Some(name) = self.prompt(&format!("Name [{}]: ", profile.name))? else {
            return Ok(Flow::Eof);
        };
        if !name.trim().is_empty() {
            profile.name = name.trim().to_string();
        }

        let current = profile.department.clone().unwrap_or_default();
        let Some(department) = self.prompt(&format!("Department [{current}]: "))? else {
            return Ok(Flow::Eof);
        };
        profile.department = updated_optional(profile.department, &department);

        let current = profile.position.clone().unwrap_or_default();
        let Some(position) = self.prompt(&format!("Position [{current}]: "))? else {
            return Ok(Flow::Eof);
        };
        profile.position = updated_optional(profile.position, &position);

        match self.directory.update(profile) {
            Ok(()) => writeln!(self.output, "Updated employee {id}.")?,
            Err(err) => writeln!(self.output, "{err}.")?,
        }
        Ok(Flow::Continue)
    }

    fn delete_employee(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt_employee_id()? else {
            return Ok(Flow::Eof);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        match self.directory.remove(&id) {
            Ok(profile) => {
                writeln!(self.output, "Removed employee {id} ({}).", profile.name)?;
                if self.ledger.active_session(&id).is_some() {
                    writeln!(self.output, "Note: {id} still has an open session.")?;
                }
            }
            Err(err) => writeln!(self.output, "{err}.")?,
        }
        Ok(Flow::Continue)
    }

    // ========== Attendance ==========

    fn check_in(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt_known_employee()? else {
            return Ok(Flow::Eof);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        let Some(at) = self.prompt_timestamp("Check-in time")? else {
            return Ok(Flow::Eof);
        };

        match attendance::check_in(&self.directory, &mut self.ledger, &id, at) {
            Ok(record) => {
                tracing::info!(employee_id = %id, %record, %at, "checked in");
                let who = self.describe(&id);
                writeln!(
                    self.output,
                    "{who} checked in at {}.",
                    at.format(&self.config.timestamp_format)
                )?;
            }
            Err(err) => writeln!(self.output, "Check-in failed: {err}.")?,
        }
        Ok(Flow::Continue)
    }

    fn check_out(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt_known_employee()? else {
            return Ok(Flow::Eof);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        if self.ledger.active_session(&id).is_none() {
            let who = self.describe(&id);
            writeln!(self.output, "{who} is not checked in.")?;
            return Ok(Flow::Continue);
        }
        let Some(at) = self.prompt_timestamp("Check-out time")? else {
            return Ok(Flow::Eof);
        };

        match attendance::check_out(&self.directory, &mut self.ledger, &id, at) {
            Ok(record) => {
                let worked = self
                    .ledger
                    .worked_duration(record)
                    .map(render::format_duration)
                    .unwrap_or_default();
                tracing::info!(employee_id = %id, %record, %at, %worked, "checked out");
                let who = self.describe(&id);
                writeln!(
                    self.output,
                    "{who} checked out at {}; worked {worked}.",
                    at.format(&self.config.timestamp_format)
                )?;
            }
            Err(err) => writeln!(self.output, "Check-out failed: {err}.")?,
        }
        Ok(Flow::Continue)
    }

    fn range_report(&mut self) -> Result<Flow> {
        let Some(from) = self.prompt_date("From date")? else {
            return Ok(Flow::Eof);
        };
        let Some(to) = self.prompt_date("To date")? else {
            return Ok(Flow::Eof);
        };
        if from > to {
            writeln!(self.output, "From date is after to date.")?;
        }

        let records = self.ledger.records_in_range(from, to);
        render::write_records(
            &mut self.output,
            &self.directory,
            &records,
            &self.config.timestamp_format,
        )?;
        if !records.is_empty() {
            let total: WorkedDuration = records.iter().filter_map(|r| r.worked_duration()).sum();
            writeln!(self.output, "Total worked: {}", render::format_duration(total))?;
        }
        Ok(Flow::Continue)
    }

    // ========== Prompts ==========

    /// Writes `label` and reads one line. `None` means input has ended.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Outer `None` is end of input; inner `None` is an invalid ID that was
    /// already reported.
    #[expect(
        clippy::option_option,
        reason = "outer None is end of input, inner None an already-reported bad ID"
    )]
    fn prompt_employee_id(&mut self) -> Result<Option<Option<EmployeeId>>> {
        let Some(raw) = self.prompt("Employee ID: ")? else {
            return Ok(None);
        };
        match EmployeeId::new(raw) {
            Ok(id) => Ok(Some(Some(id))),
            Err(err) => {
                writeln!(self.output, "{err}.")?;
                Ok(Some(None))
            }
        }
    }

    /// Like [`Self::prompt_employee_id`], also rejecting IDs missing from the
    /// directory before any timestamp is asked for.
    #[expect(
        clippy::option_option,
        reason = "outer None is end of input, inner None an already-reported bad ID"
    )]
    fn prompt_known_employee(&mut self) -> Result<Option<Option<EmployeeId>>> {
        let Some(id) = self.prompt_employee_id()? else {
            return Ok(None);
        };
        let Some(id) = id else {
            return Ok(Some(None));
        };
        if !self.directory.exists(&id) {
            writeln!(self.output, "Unknown employee {id}.")?;
            return Ok(Some(None));
        }
        Ok(Some(Some(id)))
    }

    /// Asks until a timestamp resolves. A substituted current time is
    /// announced rather than applied silently.
    fn prompt_timestamp(&mut self, label: &str) -> Result<Option<NaiveDateTime>> {
        let label = format!("{label} (YYYY-MM-DD HH:MM, blank for now): ");
        loop {
            let Some(raw) = self.prompt(&label)? else {
                return Ok(None);
            };
            match parse_timestamp(&raw, (self.clock)(), &self.config) {
                Ok(TimestampInput::DefaultedToNow(now)) => {
                    tracing::warn!(input = %raw.trim(), %now, "unparsable timestamp, using current time");
                    writeln!(
                        self.output,
                        "Could not parse '{}'; using current time {}.",
                        raw.trim(),
                        now.format(&self.config.timestamp_format)
                    )?;
                    return Ok(Some(now));
                }
                Ok(parsed) => return Ok(Some(parsed.value())),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }

    fn prompt_date(&mut self, label: &str) -> Result<Option<NaiveDate>> {
        let label = format!("{label} (YYYY-MM-DD): ");
        loop {
            let Some(raw) = self.prompt(&label)? else {
                return Ok(None);
            };
            match parse_date(&raw, &self.config) {
                Ok(date) => return Ok(Some(date)),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }

    /// "E1 (Ada Lovelace)", or just the ID for employees no longer listed.
    fn describe(&self, id: &EmployeeId) -> String {
        self.directory
            .lookup(id)
            .map_or_else(|| id.to_string(), |p| format!("{id} ({})", p.name))
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn updated_optional(current: Option<String>, answer: &str) -> Option<String> {
    match answer.trim() {
        "" => current,
        "-" => None,
        value => Some(value.to_string()),
    }
}
