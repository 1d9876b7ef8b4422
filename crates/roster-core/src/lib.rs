//! Roster Core Library
//!
//! Shared functionality for the Roster contact-import tool:
//! - Database access and migrations (SQLCipher-encrypted SQLite)
//! - Column auto-mapping from CSV headers onto the contact schema
//! - Import pipeline: parse, transform, batch upsert, audit
//! - Tag heuristics for score/activity-driven labeling
//! - CRM sync projection for sharing personal contacts
//! - CSV export and pre-import file analysis

pub mod analyze;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod mapping;
pub mod models;
pub mod sync;

pub use analyze::{ColumnDistribution, FileReport};
pub use db::Database;
pub use error::{Error, Result};
pub use export::{ContactExportOptions, EXPORT_HEADER};
pub use import::{
    AuditPolicy, ImportOptions, Importer, TagHeuristics, DEFAULT_GROUP_SIZE, DEFAULT_SOURCE,
};
pub use mapping::{ColumnMapping, MapTarget};
pub use models::{
    Contact, CrmContact, ErrorDetails, ImportBatchRecord, ImportErrorEntry, ImportRunResult,
    ImportStatus, KnownField, NewContact, NewCrmContact, NewImportBatchRecord, SourceRow,
};
