//! File command implementations (map preview, import, export, analyze)

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use roster_core::{
    analyze,
    db::Database,
    export::ContactExportOptions,
    import::{read_rows_from_path, AuditPolicy, ImportOptions, Importer, TagHeuristics},
    mapping,
    models::ImportErrorEntry,
};

use crate::cli::ImportArgs;
use super::open_db;

/// Preview the column mapping a file would get
pub fn cmd_map(file: &Path) -> Result<()> {
    let (headers, rows) = read_rows_from_path(file)
        .with_context(|| format!("Failed to read CSV file: {}", file.display()))?;

    let mappings = mapping::auto_map(&headers, rows.first());
    let mapped = mappings.iter().filter(|m| !m.target.is_skip()).count();

    println!();
    println!(
        "🗺️  Proposed mapping for {} ({} rows)",
        file.display(),
        rows.len()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for mapping in &mappings {
        let target = if mapping.target.is_skip() {
            "(skip)".to_string()
        } else {
            mapping.target.to_string()
        };
        let sample = mapping
            .sample
            .as_deref()
            .map(|s| format!("  e.g. \"{}\"", super::truncate(s, 30)))
            .unwrap_or_default();

        println!("   {:<28} → {:<16}{}", super::truncate(&mapping.source, 28), target, sample);
    }

    println!();
    println!("   {} of {} columns mapped.", mapped, mappings.len());
    println!("   Unmapped columns are preserved per-contact in custom_data.");
    println!("   Override with: roster import --map \"Column=field\" ...");

    Ok(())
}

pub fn cmd_import(db_path: &Path, args: &ImportArgs, no_encrypt: bool) -> Result<()> {
    // Parse the whole file up front; a malformed file aborts before any write
    let (headers, rows) = read_rows_from_path(&args.file)
        .with_context(|| format!("Failed to read CSV file: {}", args.file.display()))?;

    let mut mappings = mapping::auto_map(&headers, rows.first());

    let mut overrides = Vec::with_capacity(args.map.len());
    for raw in &args.map {
        overrides.push(mapping::parse_override(raw)?);
    }
    mapping::apply_overrides(&mut mappings, &overrides)?;

    if !args.json {
        println!("📥 Importing {} contacts from {}...", rows.len(), args.file.display());
    }

    let db = open_db(db_path, no_encrypt)?;

    let mut options = ImportOptions::new(&args.owner);
    options.file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.file.display().to_string());
    if let Some(source) = &args.source {
        options.source = source.clone();
    }
    options.group_size = args.group_size;
    options.normalize_phones = args.normalize_phones;
    options.heuristics = TagHeuristics {
        specialty_column: args.specialty_column.clone(),
        score_column: args.score_column.clone(),
        score_threshold: args.score_threshold,
        activity_column: args.activity_column.clone(),
        activity_threshold: args.activity_threshold,
    };
    if args.require_audit {
        options.audit = AuditPolicy::Required;
    }

    let importer = Importer::new(&db, options);
    let quiet = args.json;
    let result = importer.run(&rows, &mappings, |done, total| {
        if !quiet {
            println!("   {} / {} rows", done, total);
        }
    })?;

    if args.json {
        let payload = serde_json::json!({
            "batch_id": result.batch_id,
            "total": result.total,
            "imported": result.imported,
            "failed": result.failed,
            "status": result.status().as_str(),
            "errors": result.errors,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!();
    if result.failed == 0 {
        println!("✅ Import complete!");
    } else {
        println!("⚠️  Import finished with failures");
    }
    println!("   Batch: {}", result.batch_id);
    println!("   Imported: {}", result.imported);
    println!("   Failed: {}", result.failed);

    if !result.errors.is_empty() {
        println!();
        println!("   Errors:");
        for error in &result.errors {
            match error {
                ImportErrorEntry::Group {
                    batch_index,
                    message,
                } => println!("   - group {}: {}", batch_index, message),
                ImportErrorEntry::General { message } => println!("   - {}", message),
            }
        }
        println!();
        println!(
            "   Run 'roster history show {}' to revisit these later.",
            result.batch_id
        );
    }

    Ok(())
}

/// Export contacts to CSV
pub fn cmd_export(
    db: &Database,
    owner: Option<String>,
    batch: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let opts = ContactExportOptions {
        owner_id: owner,
        batch_id: batch,
    };

    let csv = db.export_contacts_csv(&opts)?;

    match output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(csv.as_bytes())?;

            let lines = csv.lines().count() - 1; // Subtract header
            println!("✅ Exported {} contacts to {}", lines, path.display());
        }
        None => {
            print!("{}", csv);
        }
    }

    Ok(())
}

/// Analyze a CSV file before importing it
pub fn cmd_analyze(file: &Path, top: &[String]) -> Result<()> {
    let report = analyze::analyze_file(file, top)
        .with_context(|| format!("Failed to analyze file: {}", file.display()))?;

    println!();
    println!("📊 File Analysis: {}", file.display());
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total rows: {}", report.total_rows);
    println!(
        "   Missing emails: {} ({:.1}%)",
        report.missing_emails,
        report.percent(report.missing_emails)
    );
    println!(
        "   Missing phones: {} ({:.1}%)",
        report.missing_phones,
        report.percent(report.missing_phones)
    );

    println!();
    println!(
        "   Columns: {} mapped, {} unmapped",
        report.mapped_count(),
        report.unmapped.len()
    );
    if !report.unmapped.is_empty() {
        println!("   Unmapped: {}", report.unmapped.join(", "));
    }

    for dist in &report.distributions {
        println!();
        println!("   📈 Top values: {}", dist.column);
        for (value, count) in &dist.top {
            println!(
                "      {}: {} ({:.1}%)",
                super::truncate(value, 40),
                count,
                report.percent(*count)
            );
        }
    }

    println!();
    Ok(())
}
