//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_template` - Write the import template header row

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use roster_core::{db::Database, mapping};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path.to_str().unwrap();
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Preview a file's mapping: roster map --file contacts.csv");
    println!("  2. Import it: roster import --file contacts.csv --owner me");

    Ok(())
}

/// Write the import template header row to a file or stdout
pub fn cmd_template(output: Option<&Path>) -> Result<()> {
    let template = mapping::template_csv();

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(template.as_bytes())?;
            println!("✅ Template written to {}", path.display());
        }
        None => {
            print!("{}", template);
        }
    }

    Ok(())
}
