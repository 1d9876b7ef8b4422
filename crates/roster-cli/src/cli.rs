//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Roster - Import and share CRM contact exports
#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "CSV contact importer with CRM sync", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "roster.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for contact data)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set ROSTER_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Preview the column mapping a file would get
    Map {
        /// CSV file to inspect
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Import contacts from a CSV file
    Import(ImportArgs),

    /// Write the import template header row
    Template {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage contacts (list, search, delete)
    Contacts {
        #[command(subcommand)]
        action: ContactsAction,
    },

    /// Export contacts to CSV
    Export {
        /// Restrict to one owner's contacts
        #[arg(long)]
        owner: Option<String>,

        /// Restrict to one import batch
        #[arg(long)]
        batch: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show import history
    History {
        /// Restrict to one owner's batches
        #[arg(long)]
        owner: Option<String>,

        /// Number of batches to show
        #[arg(long, default_value = "20")]
        limit: i64,

        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Project contacts into the CRM table
    Sync {
        /// Comma-separated contact IDs to sync
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,

        /// Sync every contact from one import batch
        #[arg(long, conflicts_with = "ids")]
        batch: Option<String>,

        /// Require the contacts to belong to this owner
        #[arg(long)]
        owner: Option<String>,
    },

    /// Analyze a CSV file before importing it
    Analyze {
        /// CSV file to analyze
        #[arg(short, long)]
        file: PathBuf,

        /// Column(s) to show a top-10 value distribution for
        #[arg(long = "top")]
        top: Vec<String>,
    },

    /// Show database status (encryption, size, row counts)
    Status,
}

/// Arguments for the import command
#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to import
    #[arg(short, long)]
    pub file: PathBuf,

    /// Account the contacts belong to
    #[arg(short, long)]
    pub owner: String,

    /// Mapping override as COLUMN=FIELD (FIELD may be "skip"); repeatable
    #[arg(long = "map", value_name = "COLUMN=FIELD")]
    pub map: Vec<String>,

    /// Rows per database write
    #[arg(long, default_value = "100")]
    pub group_size: usize,

    /// Source tag stamped on every imported row
    #[arg(long)]
    pub source: Option<String>,

    /// Strip phone fields down to digits and a leading '+'
    #[arg(long)]
    pub normalize_phones: bool,

    /// Column whose raw value becomes a tag
    #[arg(long)]
    pub specialty_column: Option<String>,

    /// Numeric column that earns the "High Score" tag above the threshold
    #[arg(long)]
    pub score_column: Option<String>,

    /// Threshold for the "High Score" tag
    #[arg(long, default_value = "150")]
    pub score_threshold: f64,

    /// Numeric column that earns the "Active" tag above the threshold
    #[arg(long)]
    pub activity_column: Option<String>,

    /// Threshold for the "Active" tag
    #[arg(long, default_value = "10")]
    pub activity_threshold: f64,

    /// Fail the run if the audit row cannot be written
    #[arg(long)]
    pub require_audit: bool,

    /// Print the run result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ContactsAction {
    /// List contacts, newest first
    List {
        /// Account whose contacts to list
        #[arg(short, long)]
        owner: String,

        /// Number of contacts to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },

    /// Search contacts by name, email, company, or title
    Search {
        /// Account whose contacts to search
        #[arg(short, long)]
        owner: String,

        /// Substring to search for
        query: String,

        /// Number of matches to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },

    /// Delete one contact
    Delete {
        /// Contact ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Show one import batch with its error details
    Show {
        /// Batch ID (e.g. import_1712345678901)
        batch_id: String,
    },
}
