use chrono::{NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

/// Label shown wherever a shift has no matching employee
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed clock time {0:?} (expected HH:MM or HH:MM:SS)")]
    MalformedTime(String),
    #[error("record is missing its id")]
    MissingId,
    #[error("unknown employee group {0:?}")]
    UnknownGroup(String),
}

/// Parse a wall-clock time of the form "HH:MM" or "HH:MM:SS"
pub fn parse_clock_time(input: &str) -> Result<NaiveTime, RecordError> {
    let malformed = || RecordError::MalformedTime(input.to_string());

    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(malformed());
    }

    let hour = parts[0].parse::<u32>().map_err(|_| malformed())?;
    let minute = parts[1].parse::<u32>().map_err(|_| malformed())?;
    let second = match parts.get(2) {
        Some(s) => s.parse::<u32>().map_err(|_| malformed())?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(malformed)
}

/// Minutes since midnight, seconds are ignored
pub fn minutes_of_day(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A validated shift. `end_time == None` means the shift is still running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub employee_id: Option<String>,
    pub employee_group: Option<EmployeeGroup>,
    pub approved: bool,
}

impl Shift {
    pub fn is_open_ended(&self) -> bool {
        self.end_time.is_none()
    }

    /// Turn the shift back into an editable form payload
    pub fn to_draft(&self) -> ShiftDraft {
        ShiftDraft {
            id: Some(self.id.clone()),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            employee_id: self.employee_id.clone(),
            employee_group_id: self.employee_group.as_ref().map(|g| g.id.clone()),
            approved: self.approved,
        }
    }
}

/// Payload emitted by the shift dialog. `id` is set when editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftDraft {
    pub id: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub employee_id: Option<String>,
    pub employee_group_id: Option<String>,
    pub approved: bool,
}

impl ShiftDraft {
    /// Blank draft for a new shift starting at the given slot
    pub fn new_at(date: NaiveDate, start_time: NaiveTime) -> Self {
        Self {
            id: None,
            date,
            start_time,
            end_time: None,
            employee_id: None,
            employee_group_id: None,
            approved: false,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }
}

/// Employees and groups, as loaded for the current period
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub employees: Vec<Employee>,
    pub groups: Vec<EmployeeGroup>,
}

impl Roster {
    pub fn new(employees: Vec<Employee>, groups: Vec<EmployeeGroup>) -> Self {
        Self { employees, groups }
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn group(&self, id: &str) -> Result<&EmployeeGroup, RecordError> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| RecordError::UnknownGroup(id.to_string()))
    }

    /// Full name of the employee, or "Unassigned" when there is none
    pub fn display_name(&self, employee_id: Option<&str>) -> String {
        employee_id
            .and_then(|id| self.employee(id))
            .map(Employee::full_name)
            .unwrap_or_else(|| UNASSIGNED.to_string())
    }
}
