//! Domain models for Roster

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One parsed data row, keyed by the source file's column headers
pub type SourceRow = HashMap<String, String>;

/// The fixed enumeration of target contact attributes a source column
/// may be mapped to.
///
/// Enumeration order matters: the auto-mapper resolves ties by taking the
/// first matching field in this order, so reordering variants changes
/// mapping proposals for ambiguous headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownField {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Mobile,
    WorkPhone,
    Company,
    JobTitle,
    Department,
    Website,
    Linkedin,
    AddressLine1,
    AddressLine2,
    City,
    State,
    ZipCode,
    Country,
    Notes,
    Tags,
}

impl KnownField {
    /// All known fields in canonical enumeration order.
    pub const ALL: [KnownField; 20] = [
        Self::FirstName,
        Self::LastName,
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::Mobile,
        Self::WorkPhone,
        Self::Company,
        Self::JobTitle,
        Self::Department,
        Self::Website,
        Self::Linkedin,
        Self::AddressLine1,
        Self::AddressLine2,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::Country,
        Self::Notes,
        Self::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Mobile => "mobile",
            Self::WorkPhone => "work_phone",
            Self::Company => "company",
            Self::JobTitle => "job_title",
            Self::Department => "department",
            Self::Website => "website",
            Self::Linkedin => "linkedin",
            Self::AddressLine1 => "address_line1",
            Self::AddressLine2 => "address_line2",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zip_code",
            Self::Country => "country",
            Self::Notes => "notes",
            Self::Tags => "tags",
        }
    }

    /// Human-readable label, used for match normalization and for the
    /// downloadable import template header row.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::FullName => "Full Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Mobile => "Mobile",
            Self::WorkPhone => "Work Phone",
            Self::Company => "Company",
            Self::JobTitle => "Job Title",
            Self::Department => "Department",
            Self::Website => "Website",
            Self::Linkedin => "LinkedIn",
            Self::AddressLine1 => "Address Line 1",
            Self::AddressLine2 => "Address Line 2",
            Self::City => "City",
            Self::State => "State",
            Self::ZipCode => "Zip Code",
            Self::Country => "Country",
            Self::Notes => "Notes",
            Self::Tags => "Tags",
        }
    }
}

impl std::str::FromStr for KnownField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first_name" => Ok(Self::FirstName),
            "last_name" => Ok(Self::LastName),
            "full_name" => Ok(Self::FullName),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "mobile" => Ok(Self::Mobile),
            "work_phone" => Ok(Self::WorkPhone),
            "company" => Ok(Self::Company),
            "job_title" => Ok(Self::JobTitle),
            "department" => Ok(Self::Department),
            "website" => Ok(Self::Website),
            "linkedin" => Ok(Self::Linkedin),
            "address_line1" => Ok(Self::AddressLine1),
            "address_line2" => Ok(Self::AddressLine2),
            "city" => Ok(Self::City),
            "state" => Ok(Self::State),
            "zip_code" => Ok(Self::ZipCode),
            "country" => Ok(Self::Country),
            "notes" => Ok(Self::Notes),
            "tags" => Ok(Self::Tags),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

impl std::fmt::Display for KnownField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted contact row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    /// Account on whose behalf this contact was imported
    pub owner_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub work_phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    /// Unmapped source columns, keyed by their original headers
    pub custom_data: Option<Map<String, Value>>,
    /// Import mechanism identifier (e.g. "csv_import")
    pub source: String,
    /// Run that produced this row
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// "First Last" with missing parts dropped
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// Whether this contact has been projected into the CRM table
    pub fn synced_to_crm(&self) -> bool {
        self.custom_data
            .as_ref()
            .and_then(|data| data.get("synced_to_crm"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A contact produced by the row transformer, before DB insertion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContact {
    pub owner_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub work_phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub custom_data: Option<Map<String, Value>>,
    pub source: String,
    pub batch_id: String,
}

impl NewContact {
    /// Write a scalar known-field value. `Tags` is not a scalar slot and
    /// must be handled by the caller's tag splitting.
    pub fn set_field(&mut self, field: KnownField, value: String) {
        match field {
            KnownField::FirstName => self.first_name = Some(value),
            KnownField::LastName => self.last_name = Some(value),
            KnownField::FullName => self.full_name = Some(value),
            KnownField::Email => self.email = Some(value),
            KnownField::Phone => self.phone = Some(value),
            KnownField::Mobile => self.mobile = Some(value),
            KnownField::WorkPhone => self.work_phone = Some(value),
            KnownField::Company => self.company = Some(value),
            KnownField::JobTitle => self.job_title = Some(value),
            KnownField::Department => self.department = Some(value),
            KnownField::Website => self.website = Some(value),
            KnownField::Linkedin => self.linkedin = Some(value),
            KnownField::AddressLine1 => self.address_line1 = Some(value),
            KnownField::AddressLine2 => self.address_line2 = Some(value),
            KnownField::City => self.city = Some(value),
            KnownField::State => self.state = Some(value),
            KnownField::ZipCode => self.zip_code = Some(value),
            KnownField::Country => self.country = Some(value),
            KnownField::Notes => self.notes = Some(value),
            KnownField::Tags => {}
        }
    }
}

/// Import run lifecycle
///
/// Success requires a zero failed count; any failure yields PartialFailure.
/// There is no distinct total-failure state even when every group fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    #[default]
    Idle,
    Running,
    Success,
    PartialFailure,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Success => "success",
            Self::PartialFailure => "partial_failure",
        }
    }
}

impl std::str::FromStr for ImportStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "partial_failure" => Ok(Self::PartialFailure),
            _ => Err(format!("Unknown import status: {}", s)),
        }
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in an import run's error list
///
/// Group entries record a failed write group; a General entry records a
/// run-level failure. Serialized shapes: `{"batchIndex": n, "message": s}`
/// and `{"general": s}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportErrorEntry {
    Group {
        #[serde(rename = "batchIndex")]
        batch_index: usize,
        message: String,
    },
    General {
        #[serde(rename = "general")]
        message: String,
    },
}

impl ImportErrorEntry {
    pub fn group(batch_index: usize, message: impl Into<String>) -> Self {
        Self::Group {
            batch_index,
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::General {
            message: message.into(),
        }
    }
}

/// Structured error payload stored on an audit row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub errors: Vec<ImportErrorEntry>,
}

/// The outcome of one import run, surfaced to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunResult {
    pub batch_id: String,
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<ImportErrorEntry>,
}

impl ImportRunResult {
    pub fn status(&self) -> ImportStatus {
        if self.failed == 0 {
            ImportStatus::Success
        } else {
            ImportStatus::PartialFailure
        }
    }
}

/// One append-only audit row per import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatchRecord {
    pub id: i64,
    pub batch_id: String,
    pub owner_id: String,
    pub file_name: String,
    pub total_rows: i64,
    pub imported_rows: i64,
    pub failed_rows: i64,
    pub error_details: Option<ErrorDetails>,
    pub created_at: DateTime<Utc>,
}

/// Audit row fields as written at the end of a run
#[derive(Debug, Clone)]
pub struct NewImportBatchRecord {
    pub batch_id: String,
    pub owner_id: String,
    pub file_name: String,
    pub total_rows: i64,
    pub imported_rows: i64,
    pub failed_rows: i64,
    pub error_details: Option<ErrorDetails>,
}

/// A team-visible CRM contact row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmContact {
    pub id: i64,
    pub owner_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub practice_name: Option<String>,
    pub title: Option<String>,
    pub contact_type: String,
    pub status: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A CRM contact projected from a personal contact, before insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewCrmContact {
    pub owner_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub practice_name: Option<String>,
    pub title: Option<String>,
    pub contact_type: String,
    pub status: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}
