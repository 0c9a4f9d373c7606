//! Employee directory.
//!
//! The attendance core only needs to ask whether an employee exists and,
//! for display, to look one up. [`EmployeeDirectory`] captures exactly that;
//! [`InMemoryDirectory`] is the keyed collection the shell maintains.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::EmployeeId;

/// Directory maintenance errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("employee {0} already exists")]
    DuplicateEmployee(EmployeeId),

    #[error("employee {0} not found")]
    UnknownEmployee(EmployeeId),
}

/// Profile details kept for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl EmployeeProfile {
    pub fn new(id: EmployeeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            department: None,
            position: None,
        }
    }

    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

/// Read access to employee records.
///
/// This trait lets attendance operations run against different directory
/// representations (e.g., the in-memory shell directory, or test fixtures).
pub trait EmployeeDirectory {
    /// Returns true if `id` names a known employee.
    fn exists(&self, id: &EmployeeId) -> bool {
        self.lookup(id).is_some()
    }

    /// Returns the profile for `id`, if known.
    fn lookup(&self, id: &EmployeeId) -> Option<&EmployeeProfile>;
}

/// Employee records keyed by ID, iterated in ID order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    employees: BTreeMap<EmployeeId, EmployeeProfile>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new employee. Existing IDs are never overwritten.
    pub fn add(&mut self, profile: EmployeeProfile) -> Result<(), DirectoryError> {
        if self.employees.contains_key(&profile.id) {
            return Err(DirectoryError::DuplicateEmployee(profile.id));
        }
        tracing::debug!(employee_id = %profile.id, "employee added");
        self.employees.insert(profile.id.clone(), profile);
        Ok(())
    }

    /// Replaces the profile stored under `profile.id`.
    pub fn update(&mut self, profile: EmployeeProfile) -> Result<(), DirectoryError> {
        let Some(existing) = self.employees.get_mut(&profile.id) else {
            return Err(DirectoryError::UnknownEmployee(profile.id));
        };
        tracing::debug!(employee_id = %profile.id, "employee updated");
        *existing = profile;
        Ok(())
    }

    /// Removes an employee and returns the removed profile.
    ///
    /// Attendance records referencing the employee are not affected.
    pub fn remove(&mut self, id: &EmployeeId) -> Result<EmployeeProfile, DirectoryError> {
        let profile = self
            .employees
            .remove(id)
            .ok_or_else(|| DirectoryError::UnknownEmployee(id.clone()))?;
        tracing::debug!(employee_id = %id, "employee removed");
        Ok(profile)
    }

    pub fn list(&self) -> impl Iterator<Item = &EmployeeProfile> {
        self.employees.values()
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn exists(&self, id: &EmployeeId) -> bool {
        self.employees.contains_key(id)
    }

    fn lookup(&self, id: &EmployeeId) -> Option<&EmployeeProfile> {
        self.employees.get(id)
    }
}
