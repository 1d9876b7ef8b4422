//! CSV contact import pipeline
//!
//! The pipeline has three stages: parse the file into rows, transform each
//! row through the column mapping, and write the results in fixed-size
//! groups. A malformed file aborts before anything is written; a failed
//! group is counted and skipped while the run continues.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Utc;
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::mapping::{ColumnMapping, MapTarget};
use crate::models::{
    ErrorDetails, ImportErrorEntry, ImportRunResult, KnownField, NewContact,
    NewImportBatchRecord, SourceRow,
};

/// Rows per store write
pub const DEFAULT_GROUP_SIZE: usize = 100;

/// Source tag stamped on rows imported from generic CSV files
pub const DEFAULT_SOURCE: &str = "csv_import";

/// Optional tag derivation layered on top of the generic mapping
///
/// All three rules are off until their column is named. Numeric comparisons
/// are strict and tolerant: a value that does not parse simply fails the
/// threshold.
#[derive(Debug, Clone)]
pub struct TagHeuristics {
    /// Column whose raw value becomes a tag when present
    pub specialty_column: Option<String>,
    /// Numeric column that earns the "High Score" tag above the threshold
    pub score_column: Option<String>,
    pub score_threshold: f64,
    /// Numeric column that earns the "Active" tag above the threshold
    pub activity_column: Option<String>,
    pub activity_threshold: f64,
}

impl Default for TagHeuristics {
    fn default() -> Self {
        Self {
            specialty_column: None,
            score_column: None,
            score_threshold: 150.0,
            activity_column: None,
            activity_threshold: 10.0,
        }
    }
}

impl TagHeuristics {
    /// Tags derived from one row, in rule order
    fn derive_tags(&self, row: &SourceRow) -> Vec<String> {
        let mut tags = Vec::new();

        if let Some(column) = &self.specialty_column {
            if let Some(value) = row.get(column) {
                if !value.is_empty() {
                    tags.push(value.clone());
                }
            }
        }

        if let Some(column) = &self.score_column {
            if exceeds(row.get(column), self.score_threshold) {
                tags.push("High Score".to_string());
            }
        }

        if let Some(column) = &self.activity_column {
            if exceeds(row.get(column), self.activity_threshold) {
                tags.push("Active".to_string());
            }
        }

        tags
    }
}

/// Tolerant threshold check for tag heuristics
///
/// Empty, missing, and unparseable values fail the check; nothing here ever
/// raises. Thousands separators are accepted.
fn exceeds(value: Option<&String>, threshold: f64) -> bool {
    let Some(value) = value else {
        return false;
    };
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() {
        return false;
    }
    match cleaned.parse::<f64>() {
        Ok(number) => number > threshold,
        Err(_) => false,
    }
}

/// How audit-row write failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditPolicy {
    /// Log the failure and return the run result anyway
    #[default]
    BestEffort,
    /// Fail the run after the contact writes
    Required,
}

/// Run-level settings for one import invocation
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Account the contacts belong to
    pub owner_id: String,
    /// File name recorded on the audit row
    pub file_name: String,
    /// Import mechanism identifier stamped on every row
    pub source: String,
    /// Rows per store write
    pub group_size: usize,
    /// Strip phone fields down to digits and a leading '+'
    pub normalize_phones: bool,
    pub heuristics: TagHeuristics,
    pub audit: AuditPolicy,
}

impl ImportOptions {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            file_name: "CSV Import".to_string(),
            source: DEFAULT_SOURCE.to_string(),
            group_size: DEFAULT_GROUP_SIZE,
            normalize_phones: false,
            heuristics: TagHeuristics::default(),
            audit: AuditPolicy::default(),
        }
    }
}

/// Run-scoped correlation id shared by contact rows and the audit row
pub fn generate_batch_id() -> String {
    format!("import_{}", Utc::now().timestamp_millis())
}

/// Parse a delimited file into headers and rows
///
/// The first record is the header row. Data rows where every cell is empty
/// are dropped; ragged rows are tolerated, with missing cells read as empty.
/// Any parse failure aborts the whole read.
pub fn read_rows<R: Read>(reader: R) -> Result<(Vec<String>, Vec<SourceRow>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = SourceRow::new();
        for (i, header) in headers.iter().enumerate() {
            row.insert(header.clone(), record.get(i).unwrap_or("").to_string());
        }
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "Parsed CSV input");
    Ok((headers, rows))
}

/// Parse a delimited file from disk
pub fn read_rows_from_path(path: &Path) -> Result<(Vec<String>, Vec<SourceRow>)> {
    let file = File::open(path)?;
    read_rows(file)
}

/// Strip a phone value down to digits and '+'
pub(crate) fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Split a tags cell on commas, dropping empty pieces
pub(crate) fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Transform one source row into a contact
///
/// Mapped columns with non-empty cells land in their scalar fields, the
/// tags column is split into a tag list, and every unmapped non-empty
/// column is preserved verbatim in custom_data under its original header.
pub fn transform_row(
    row: &SourceRow,
    mappings: &[ColumnMapping],
    options: &ImportOptions,
    batch_id: &str,
) -> NewContact {
    let mut contact = NewContact {
        owner_id: options.owner_id.clone(),
        source: options.source.clone(),
        batch_id: batch_id.to_string(),
        ..Default::default()
    };

    for mapping in mappings {
        let MapTarget::Field(field) = mapping.target else {
            continue;
        };
        let Some(value) = row.get(&mapping.source) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        if field == KnownField::Tags {
            contact.tags = split_tags(value);
        } else {
            contact.set_field(field, value.clone());
        }
    }

    if options.normalize_phones {
        for slot in [
            &mut contact.phone,
            &mut contact.mobile,
            &mut contact.work_phone,
        ] {
            if let Some(value) = slot {
                let cleaned = normalize_phone(value);
                *value = cleaned;
            }
        }
    }

    let mut custom = Map::new();
    for (key, value) in row {
        if value.is_empty() {
            continue;
        }
        let mapped = mappings
            .iter()
            .any(|m| &m.source == key && !m.target.is_skip());
        if !mapped {
            custom.insert(key.clone(), Value::String(value.clone()));
        }
    }
    if !custom.is_empty() {
        contact.custom_data = Some(custom);
    }

    contact.tags.extend(options.heuristics.derive_tags(row));

    contact
}

/// Executes import runs against a database
pub struct Importer<'a> {
    db: &'a Database,
    options: ImportOptions,
}

impl<'a> Importer<'a> {
    pub fn new(db: &'a Database, options: ImportOptions) -> Self {
        Self { db, options }
    }

    /// Import parsed rows through a column mapping
    ///
    /// Rows are written in sequential groups. A failed group counts all of
    /// its rows as failed and the run moves on; `on_progress` is called with
    /// (rows processed, total rows) after every group. One audit row is
    /// recorded at the end regardless of outcome.
    pub fn run(
        &self,
        rows: &[SourceRow],
        mappings: &[ColumnMapping],
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<ImportRunResult> {
        let batch_id = generate_batch_id();
        let total = rows.len();
        let group_size = self.options.group_size.max(1);

        let mut imported = 0usize;
        let mut failed = 0usize;
        let mut errors: Vec<ImportErrorEntry> = Vec::new();

        info!(
            batch_id = %batch_id,
            total,
            owner = %self.options.owner_id,
            "Starting contact import"
        );

        for (group_index, group) in rows.chunks(group_size).enumerate() {
            let contacts: Vec<NewContact> = group
                .iter()
                .map(|row| transform_row(row, mappings, &self.options, &batch_id))
                .collect();

            match self.db.upsert_contacts(&contacts) {
                Ok(written) => {
                    imported += written;
                }
                Err(e) => {
                    warn!(group = group_index, error = %e, "Contact group write failed");
                    failed += group.len();
                    errors.push(ImportErrorEntry::group(group_index, e.to_string()));
                }
            }

            let processed = group_index * group_size + group.len();
            on_progress(processed, total);
        }

        let record = NewImportBatchRecord {
            batch_id: batch_id.clone(),
            owner_id: self.options.owner_id.clone(),
            file_name: self.options.file_name.clone(),
            total_rows: total as i64,
            imported_rows: imported as i64,
            failed_rows: failed as i64,
            error_details: if errors.is_empty() {
                None
            } else {
                Some(ErrorDetails {
                    errors: errors.clone(),
                })
            },
        };

        if let Err(e) = self.db.insert_import_batch(&record) {
            match self.options.audit {
                AuditPolicy::BestEffort => {
                    warn!(batch_id = %batch_id, error = %e, "Audit row write failed")
                }
                AuditPolicy::Required => return Err(e),
            }
        }

        info!(batch_id = %batch_id, imported, failed, "Import finished");

        Ok(ImportRunResult {
            batch_id,
            total,
            imported,
            failed,
            errors,
        })
    }
}
