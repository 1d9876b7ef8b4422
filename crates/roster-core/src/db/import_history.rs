//! Import audit trail operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{ErrorDetails, ImportBatchRecord, NewImportBatchRecord};

impl Database {
    /// Record one audit row for a completed import run
    pub fn insert_import_batch(&self, record: &NewImportBatchRecord) -> Result<i64> {
        let conn = self.conn()?;

        let error_json = record
            .error_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO import_batches
                (batch_id, owner_id, file_name, total_rows, imported_rows, failed_rows, error_details)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.batch_id,
                record.owner_id,
                record.file_name,
                record.total_rows,
                record.imported_rows,
                record.failed_rows,
                error_json,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List audit rows, newest first, optionally scoped to an owner
    pub fn list_import_batches(
        &self,
        owner_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ImportBatchRecord>> {
        let conn = self.conn()?;

        let (sql, params): (&str, Vec<Box<dyn rusqlite::ToSql>>) = if let Some(owner) = owner_id {
            (
                r#"
                SELECT id, batch_id, owner_id, file_name, total_rows, imported_rows,
                       failed_rows, error_details, created_at
                FROM import_batches
                WHERE owner_id = ?
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
                vec![
                    Box::new(owner.to_string()) as Box<dyn rusqlite::ToSql>,
                    Box::new(limit),
                    Box::new(offset),
                ],
            )
        } else {
            (
                r#"
                SELECT id, batch_id, owner_id, file_name, total_rows, imported_rows,
                       failed_rows, error_details, created_at
                FROM import_batches
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
                vec![Box::new(limit) as Box<dyn rusqlite::ToSql>, Box::new(offset)],
            )
        };

        let mut stmt = conn.prepare(sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let batches = stmt
            .query_map(params_refs.as_slice(), |row| Self::map_batch_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(batches)
    }

    /// Get a single audit row by its batch id
    pub fn get_import_batch(&self, batch_id: &str) -> Result<Option<ImportBatchRecord>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            r#"
            SELECT id, batch_id, owner_id, file_name, total_rows, imported_rows,
                   failed_rows, error_details, created_at
            FROM import_batches
            WHERE batch_id = ?
            "#,
            params![batch_id],
            |row| Self::map_batch_row(row),
        );

        match result {
            Ok(batch) => Ok(Some(batch)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Count audit rows, optionally scoped to an owner
    pub fn count_import_batches(&self, owner_id: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;

        let count: i64 = if let Some(owner) = owner_id {
            conn.query_row(
                "SELECT COUNT(*) FROM import_batches WHERE owner_id = ?",
                params![owner],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM import_batches", [], |row| row.get(0))?
        };

        Ok(count)
    }

    /// Helper to map a row to ImportBatchRecord
    fn map_batch_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImportBatchRecord> {
        let error_raw: Option<String> = row.get(7)?;
        let created_at_str: String = row.get(8)?;

        // Malformed error payloads read as absent rather than failing the row
        let error_details: Option<ErrorDetails> =
            error_raw.as_deref().and_then(|s| serde_json::from_str(s).ok());

        Ok(ImportBatchRecord {
            id: row.get(0)?,
            batch_id: row.get(1)?,
            owner_id: row.get(2)?,
            file_name: row.get(3)?,
            total_rows: row.get(4)?,
            imported_rows: row.get(5)?,
            failed_rows: row.get(6)?,
            error_details,
            created_at: parse_datetime(&created_at_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImportErrorEntry;

    fn record(batch_id: &str, owner: &str) -> NewImportBatchRecord {
        NewImportBatchRecord {
            batch_id: batch_id.to_string(),
            owner_id: owner.to_string(),
            file_name: "contacts.csv".to_string(),
            total_rows: 250,
            imported_rows: 250,
            failed_rows: 0,
            error_details: None,
        }
    }

    #[test]
    fn test_insert_and_get_batch() {
        let db = Database::in_memory().unwrap();

        let id = db.insert_import_batch(&record("import_100", "owner-1")).unwrap();
        assert_eq!(id, 1);

        let loaded = db.get_import_batch("import_100").unwrap().unwrap();
        assert_eq!(loaded.file_name, "contacts.csv");
        assert_eq!(loaded.total_rows, 250);
        assert!(loaded.error_details.is_none());

        assert!(db.get_import_batch("import_999").unwrap().is_none());
    }

    #[test]
    fn test_error_details_roundtrip() {
        let db = Database::in_memory().unwrap();

        let mut new_record = record("import_100", "owner-1");
        new_record.imported_rows = 150;
        new_record.failed_rows = 100;
        new_record.error_details = Some(ErrorDetails {
            errors: vec![
                ImportErrorEntry::group(1, "disk I/O error"),
                ImportErrorEntry::general("lost connection"),
            ],
        });
        db.insert_import_batch(&new_record).unwrap();

        let loaded = db.get_import_batch("import_100").unwrap().unwrap();
        let details = loaded.error_details.unwrap();
        assert_eq!(details.errors.len(), 2);
        assert_eq!(
            details.errors[0],
            ImportErrorEntry::group(1, "disk I/O error")
        );
    }

    #[test]
    fn test_batch_id_unique() {
        let db = Database::in_memory().unwrap();

        db.insert_import_batch(&record("import_100", "owner-1")).unwrap();
        let duplicate = db.insert_import_batch(&record("import_100", "owner-1"));
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_list_and_count_batches() {
        let db = Database::in_memory().unwrap();

        db.insert_import_batch(&record("import_1", "owner-1")).unwrap();
        db.insert_import_batch(&record("import_2", "owner-1")).unwrap();
        db.insert_import_batch(&record("import_3", "owner-2")).unwrap();

        let all = db.list_import_batches(None, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].batch_id, "import_3");

        let owned = db.list_import_batches(Some("owner-1"), 10, 0).unwrap();
        assert_eq!(owned.len(), 2);

        assert_eq!(db.count_import_batches(None).unwrap(), 3);
        assert_eq!(db.count_import_batches(Some("owner-2")).unwrap(), 1);

        // Pagination
        let page = db.list_import_batches(None, 2, 2).unwrap();
        assert_eq!(page.len(), 1);
    }
}
