use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schedule::{parse_clock_time, Employee, EmployeeGroup, RecordError, Shift, ShiftDraft};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeGroupRecord {
    pub id: String,
    pub name: String,
}

impl From<EmployeeGroupRecord> for EmployeeGroup {
    fn from(record: EmployeeGroupRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

/// Shift as the backend sends it: times are "HH:MM:SS" strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee_group: Option<EmployeeGroupRecord>,
    #[serde(default)]
    pub approved: bool,
}

impl TryFrom<ShiftRecord> for Shift {
    type Error = RecordError;

    fn try_from(record: ShiftRecord) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(RecordError::MissingId);
        }
        let start_time = parse_clock_time(&record.start_time)?;
        let end_time = match record.end_time.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(parse_clock_time(raw)?),
            _ => None,
        };

        Ok(Self {
            id: record.id,
            date: record.date,
            start_time,
            end_time,
            employee_id: record.employee_id.filter(|id| !id.is_empty()),
            employee_group: record.employee_group.map(EmployeeGroup::from),
            approved: record.approved,
        })
    }
}

/// Validate a batch of records, dropping (and logging) the bad ones
pub fn validate_shifts(records: Vec<ShiftRecord>) -> Vec<Shift> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match Shift::try_from(record) {
                Ok(shift) => Some(shift),
                Err(err) => {
                    warn!(shift_id = %id, error = %err, "dropping invalid shift record");
                    None
                }
            }
        })
        .collect()
}

/// Body for create/update calls
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPayload {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: Option<String>,
    pub employee_id: Option<String>,
    pub employee_group_id: Option<String>,
    pub approved: bool,
}

impl From<&ShiftDraft> for ShiftPayload {
    fn from(draft: &ShiftDraft) -> Self {
        Self {
            date: draft.date,
            start_time: draft.start_time.format("%H:%M:%S").to_string(),
            end_time: draft.end_time.map(|t| t.format("%H:%M:%S").to_string()),
            employee_id: draft.employee_id.clone(),
            employee_group_id: draft.employee_group_id.clone(),
            approved: draft.approved,
        }
    }
}
