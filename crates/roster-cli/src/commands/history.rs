//! Import history command implementations

use anyhow::Result;
use chrono::Local;
use roster_core::db::Database;
use roster_core::models::ImportErrorEntry;

use super::truncate;

pub fn cmd_history_list(db: &Database, owner: Option<&str>, limit: i64) -> Result<()> {
    let batches = db.list_import_batches(owner, limit, 0)?;

    if batches.is_empty() {
        println!("No imports recorded yet.");
        return Ok(());
    }

    let total = db.count_import_batches(owner)?;

    println!();
    println!("📜 Import History ({} total)", total);
    println!("   ─────────────────────────────────────────────────────────────");

    for batch in batches {
        let glyph = if batch.failed_rows == 0 { "✅" } else { "⚠️ " };
        println!(
            "   {} {} │ {:<20} │ {} rows: {} ok, {} failed │ {}",
            glyph,
            batch.batch_id,
            truncate(&batch.file_name, 20),
            batch.total_rows,
            batch.imported_rows,
            batch.failed_rows,
            batch.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("   Use 'roster history show <batch_id>' for error details.");

    Ok(())
}

pub fn cmd_history_show(db: &Database, batch_id: &str) -> Result<()> {
    let batch = db
        .get_import_batch(batch_id)?
        .ok_or_else(|| anyhow::anyhow!("Batch '{}' not found", batch_id))?;

    let status = if batch.failed_rows == 0 {
        "success"
    } else {
        "partial_failure"
    };

    println!();
    println!("📦 {}", batch.batch_id);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Owner: {}", batch.owner_id);
    println!("   File: {}", batch.file_name);
    println!("   Imported: {}", batch.imported_rows);
    println!("   Failed: {}", batch.failed_rows);
    println!("   Total: {}", batch.total_rows);
    println!("   Status: {}", status);
    println!(
        "   Created: {}",
        batch.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );

    match &batch.error_details {
        Some(details) => {
            println!();
            println!("   Errors:");
            for error in &details.errors {
                match error {
                    ImportErrorEntry::Group {
                        batch_index,
                        message,
                    } => println!("   - group {}: {}", batch_index, message),
                    ImportErrorEntry::General { message } => println!("   - {}", message),
                }
            }
        }
        None => {
            println!();
            println!("   No errors recorded.");
        }
    }

    Ok(())
}
