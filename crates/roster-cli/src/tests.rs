//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::PathBuf;

use roster_core::db::Database;
use roster_core::models::NewContact;

use crate::cli::ImportArgs;
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn seed_contact(db: &Database, owner: &str, email: &str, first: &str) -> i64 {
    db.upsert_contacts(&[NewContact {
        owner_id: owner.to_string(),
        first_name: Some(first.to_string()),
        email: Some(email.to_string()),
        company: Some("Acme Dental".to_string()),
        source: "csv_import".to_string(),
        batch_id: "import_1".to_string(),
        ..Default::default()
    }])
    .unwrap();
    // Rowids are sequential here, so the count doubles as the new id
    db.count_contacts(None).unwrap()
}

fn import_args(file: PathBuf, owner: &str) -> ImportArgs {
    ImportArgs {
        file,
        owner: owner.to_string(),
        map: vec![],
        group_size: 100,
        source: None,
        normalize_phones: false,
        specialty_column: None,
        score_column: None,
        score_threshold: 150.0,
        activity_column: None,
        activity_threshold: 10.0,
        require_audit: false,
        json: false,
    }
}

const TEST_CSV: &str = "\
First Name,Last Name,Email,Specialty
Jane,Doe,jane@example.com,Orthodontics
Bob,Smith,bob@example.com,Pediatric
";

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly ten", 11), "exactly ten");
    assert_eq!(truncate("a much longer string", 10), "a much ...");
}

// ========== Template / Map Tests ==========

#[test]
fn test_cmd_template_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.csv");

    let result = commands::cmd_template(Some(&path));
    assert!(result.is_ok());

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("First Name,Last Name,Full Name,Email,"));
    assert!(contents.ends_with("Tags\n"));
}

#[test]
fn test_cmd_map_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.csv");
    fs::write(&path, TEST_CSV).unwrap();

    assert!(commands::cmd_map(&path).is_ok());
}

#[test]
fn test_cmd_map_missing_file() {
    let result = commands::cmd_map(std::path::Path::new("/nonexistent/contacts.csv"));
    assert!(result.is_err());
}

// ========== Import Tests ==========

#[test]
fn test_cmd_import_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("contacts.csv");
    fs::write(&csv_path, TEST_CSV).unwrap();
    let db_path = dir.path().join("test.db");

    let args = import_args(csv_path, "owner-1");
    let result = commands::cmd_import(&db_path, &args, true);
    assert!(result.is_ok());

    let db = Database::new_unencrypted(db_path.to_str().unwrap()).unwrap();
    assert_eq!(db.count_contacts(Some("owner-1")).unwrap(), 2);
    assert_eq!(db.count_import_batches(None).unwrap(), 1);

    let batches = db.list_import_batches(None, 10, 0).unwrap();
    assert_eq!(batches[0].file_name, "contacts.csv");
    assert_eq!(batches[0].imported_rows, 2);
}

#[test]
fn test_cmd_import_with_mapping_override() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("contacts.csv");
    fs::write(&csv_path, TEST_CSV).unwrap();
    let db_path = dir.path().join("test.db");

    let mut args = import_args(csv_path, "owner-1");
    args.map = vec!["Specialty=notes".to_string()];
    commands::cmd_import(&db_path, &args, true).unwrap();

    let db = Database::new_unencrypted(db_path.to_str().unwrap()).unwrap();
    let contacts = db.list_contacts("owner-1", 10, 0).unwrap();
    let jane = contacts
        .iter()
        .find(|c| c.email.as_deref() == Some("jane@example.com"))
        .unwrap();
    assert_eq!(jane.notes.as_deref(), Some("Orthodontics"));
    // Once mapped, the column no longer lands in custom_data
    assert!(jane.custom_data.is_none());
}

#[test]
fn test_cmd_import_bad_override_spec() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("contacts.csv");
    fs::write(&csv_path, TEST_CSV).unwrap();
    let db_path = dir.path().join("test.db");

    let mut args = import_args(csv_path, "owner-1");
    args.map = vec!["Specialty".to_string()];
    assert!(commands::cmd_import(&db_path, &args, true).is_err());

    // Nothing was written
    assert!(!db_path.exists());
}

#[test]
fn test_cmd_import_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");

    let args = import_args(PathBuf::from("/nonexistent/contacts.csv"), "owner-1");
    assert!(commands::cmd_import(&db_path, &args, true).is_err());
    assert!(!db_path.exists());
}

// ========== Contacts Command Tests ==========

#[test]
fn test_cmd_contacts_list() {
    let db = setup_test_db();
    seed_contact(&db, "owner-1", "jane@example.com", "Jane");

    assert!(commands::cmd_contacts_list(&db, "owner-1", 20).is_ok());
    // Empty owner prints the import hint instead of failing
    assert!(commands::cmd_contacts_list(&db, "owner-2", 20).is_ok());
}

#[test]
fn test_cmd_contacts_search() {
    let db = setup_test_db();
    seed_contact(&db, "owner-1", "jane@example.com", "Jane");

    assert!(commands::cmd_contacts_search(&db, "owner-1", "jane", 20).is_ok());
    assert!(commands::cmd_contacts_search(&db, "owner-1", "nobody", 20).is_ok());
}

#[test]
fn test_cmd_contacts_delete() {
    let db = setup_test_db();
    let id = seed_contact(&db, "owner-1", "jane@example.com", "Jane");

    assert!(commands::cmd_contacts_delete(&db, id).is_ok());
    assert_eq!(db.count_contacts(Some("owner-1")).unwrap(), 0);

    let result = commands::cmd_contacts_delete(&db, id);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

// ========== History Command Tests ==========

#[test]
fn test_cmd_history_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_history_list(&db, None, 20).is_ok());
}

#[test]
fn test_cmd_history_show_missing() {
    let db = setup_test_db();
    let result = commands::cmd_history_show(&db, "import_404");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

// ========== Sync Command Tests ==========

#[test]
fn test_cmd_sync_by_ids() {
    let db = setup_test_db();
    let id = seed_contact(&db, "owner-1", "jane@example.com", "Jane");

    assert!(commands::cmd_sync(&db, &[id], None, None).is_ok());
    assert_eq!(db.count_crm_contacts(Some("owner-1")).unwrap(), 1);
}

#[test]
fn test_cmd_sync_ownership_gate() {
    let db = setup_test_db();
    let id = seed_contact(&db, "owner-1", "jane@example.com", "Jane");

    let result = commands::cmd_sync(&db, &[id], None, Some("owner-2"));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("belongs to"));
    // The gate fired before any write
    assert_eq!(db.count_crm_contacts(None).unwrap(), 0);

    assert!(commands::cmd_sync(&db, &[id], None, Some("owner-1")).is_ok());
}

#[test]
fn test_cmd_sync_requires_selection() {
    let db = setup_test_db();
    let result = commands::cmd_sync(&db, &[], None, None);
    assert!(result.is_err());
}

// ========== Export / Analyze / Status Tests ==========

#[test]
fn test_cmd_export_to_file() {
    let db = setup_test_db();
    seed_contact(&db, "owner-1", "jane@example.com", "Jane");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");

    let result = commands::cmd_export(&db, Some("owner-1".to_string()), None, Some(path.clone()));
    assert!(result.is_ok());

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("First Name,Last Name,Email,Phone,Company,Job Title,Tags\n"));
    assert!(contents.contains("jane@example.com"));
}

#[test]
fn test_cmd_analyze() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.csv");
    fs::write(&path, TEST_CSV).unwrap();

    assert!(commands::cmd_analyze(&path, &["Specialty".to_string()]).is_ok());
    assert!(commands::cmd_analyze(&path, &["Missing Column".to_string()]).is_err());
}

#[test]
fn test_cmd_status_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("missing.db");
    assert!(commands::cmd_status(&db_path, true).is_ok());
}
