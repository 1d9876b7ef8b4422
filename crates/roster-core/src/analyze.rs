//! Pre-import file analysis
//!
//! Answers the questions worth asking before committing to an import: how
//! many rows, which columns would map where, how many records would land
//! without an email or phone, and what the most common values in a column
//! look like.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::import;
use crate::mapping::{self, ColumnMapping, MapTarget};
use crate::models::{KnownField, SourceRow};

/// Top-N cutoff for value distributions
const TOP_VALUES: usize = 10;

/// Value distribution for one column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDistribution {
    pub column: String,
    /// (value, occurrences) pairs, most common first
    pub top: Vec<(String, usize)>,
}

/// Summary report for a CSV file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub total_rows: usize,
    /// Proposed auto-mapping, with first-row samples
    pub mappings: Vec<ColumnMapping>,
    /// Headers the auto-mapper would skip
    pub unmapped: Vec<String>,
    /// Rows where no email-mapped column has a value
    pub missing_emails: usize,
    /// Rows where no phone-mapped column has a value
    pub missing_phones: usize,
    pub distributions: Vec<ColumnDistribution>,
}

impl FileReport {
    /// Number of columns the auto-mapper landed on a known field
    pub fn mapped_count(&self) -> usize {
        self.mappings.len() - self.unmapped.len()
    }

    /// Count as a percentage of total rows
    pub fn percent(&self, count: usize) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            count as f64 / self.total_rows as f64 * 100.0
        }
    }
}

/// Analyze a CSV file on disk
pub fn analyze_file(path: &Path, top_columns: &[String]) -> Result<FileReport> {
    let (headers, rows) = import::read_rows_from_path(path)?;
    analyze_rows(&headers, &rows, top_columns)
}

/// Analyze already-parsed rows
pub fn analyze_rows(
    headers: &[String],
    rows: &[SourceRow],
    top_columns: &[String],
) -> Result<FileReport> {
    let mappings = mapping::auto_map(headers, rows.first());

    let unmapped: Vec<String> = mappings
        .iter()
        .filter(|m| m.target.is_skip())
        .map(|m| m.source.clone())
        .collect();

    let email_columns = columns_for(&mappings, &[KnownField::Email]);
    let phone_columns = columns_for(
        &mappings,
        &[KnownField::Phone, KnownField::Mobile, KnownField::WorkPhone],
    );

    let mut missing_emails = 0;
    let mut missing_phones = 0;
    for row in rows {
        if !has_value(row, &email_columns) {
            missing_emails += 1;
        }
        if !has_value(row, &phone_columns) {
            missing_phones += 1;
        }
    }

    let mut distributions = Vec::with_capacity(top_columns.len());
    for column in top_columns {
        if !headers.contains(column) {
            return Err(Error::NotFound(format!(
                "Column '{}' not found in file",
                column
            )));
        }
        distributions.push(distribution(rows, column));
    }

    Ok(FileReport {
        total_rows: rows.len(),
        mappings,
        unmapped,
        missing_emails,
        missing_phones,
        distributions,
    })
}

fn columns_for(mappings: &[ColumnMapping], fields: &[KnownField]) -> Vec<String> {
    mappings
        .iter()
        .filter(|m| matches!(m.target, MapTarget::Field(f) if fields.contains(&f)))
        .map(|m| m.source.clone())
        .collect()
}

fn has_value(row: &SourceRow, columns: &[String]) -> bool {
    columns
        .iter()
        .any(|c| row.get(c).map(|v| !v.trim().is_empty()).unwrap_or(false))
}

fn distribution(rows: &[SourceRow], column: &str) -> ColumnDistribution {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in rows {
        if let Some(value) = row.get(column) {
            let value = value.trim();
            if !value.is_empty() {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
    }

    // Ties break on the value so the ordering is stable
    let mut top: Vec<(String, usize)> = counts.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(TOP_VALUES);

    ColumnDistribution {
        column: column.to_string(),
        top,
    }
}
