//! Personal contact operations

use rusqlite::params;
use serde_json::Value;

use super::{custom_data_from_json, parse_datetime, tags_from_json, tags_to_json, Database};
use crate::error::Result;
use crate::models::{Contact, NewContact};

impl Database {
    /// Upsert a group of contacts keyed on (owner_id, email)
    ///
    /// Existing rows with a matching key are overwritten in place; rows
    /// without an email always insert fresh because NULL never matches the
    /// unique constraint. The whole group commits atomically and the number
    /// of written rows is returned.
    pub fn upsert_contacts(&self, contacts: &[NewContact]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO contacts (
                    owner_id, first_name, last_name, full_name, email, phone, mobile,
                    work_phone, company, job_title, department, website, linkedin,
                    address_line1, address_line2, city, state, zip_code, country, notes,
                    tags, custom_data, source, batch_id
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(owner_id, email) DO UPDATE SET
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    full_name = excluded.full_name,
                    phone = excluded.phone,
                    mobile = excluded.mobile,
                    work_phone = excluded.work_phone,
                    company = excluded.company,
                    job_title = excluded.job_title,
                    department = excluded.department,
                    website = excluded.website,
                    linkedin = excluded.linkedin,
                    address_line1 = excluded.address_line1,
                    address_line2 = excluded.address_line2,
                    city = excluded.city,
                    state = excluded.state,
                    zip_code = excluded.zip_code,
                    country = excluded.country,
                    notes = excluded.notes,
                    tags = excluded.tags,
                    custom_data = excluded.custom_data,
                    source = excluded.source,
                    batch_id = excluded.batch_id,
                    updated_at = CURRENT_TIMESTAMP
                "#,
            )?;

            for contact in contacts {
                let tags_json = tags_to_json(&contact.tags)?;
                let custom_json = contact
                    .custom_data
                    .as_ref()
                    .map(|data| serde_json::to_string(data))
                    .transpose()?;

                written += stmt.execute(params![
                    contact.owner_id,
                    contact.first_name,
                    contact.last_name,
                    contact.full_name,
                    contact.email,
                    contact.phone,
                    contact.mobile,
                    contact.work_phone,
                    contact.company,
                    contact.job_title,
                    contact.department,
                    contact.website,
                    contact.linkedin,
                    contact.address_line1,
                    contact.address_line2,
                    contact.city,
                    contact.state,
                    contact.zip_code,
                    contact.country,
                    contact.notes,
                    tags_json,
                    custom_json,
                    contact.source,
                    contact.batch_id,
                ])?;
            }
        }

        tx.commit()?;
        Ok(written)
    }

    /// List contacts for an owner, newest first
    pub fn list_contacts(&self, owner_id: &str, limit: i64, offset: i64) -> Result<Vec<Contact>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner_id, first_name, last_name, full_name, email, phone, mobile,
                   work_phone, company, job_title, department, website, linkedin,
                   address_line1, address_line2, city, state, zip_code, country, notes,
                   tags, custom_data, source, batch_id, created_at, updated_at
            FROM contacts
            WHERE owner_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )?;

        let contacts = stmt
            .query_map(params![owner_id, limit, offset], |row| {
                Self::map_contact_row(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(contacts)
    }

    /// Case-insensitive substring search over name, email, company and title
    pub fn search_contacts(
        &self,
        owner_id: &str,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Contact>> {
        let conn = self.conn()?;
        let pattern = format!("%{}%", query);

        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner_id, first_name, last_name, full_name, email, phone, mobile,
                   work_phone, company, job_title, department, website, linkedin,
                   address_line1, address_line2, city, state, zip_code, country, notes,
                   tags, custom_data, source, batch_id, created_at, updated_at
            FROM contacts
            WHERE owner_id = ?1
              AND (first_name LIKE ?2 COLLATE NOCASE
                   OR last_name LIKE ?2 COLLATE NOCASE
                   OR email LIKE ?2 COLLATE NOCASE
                   OR company LIKE ?2 COLLATE NOCASE
                   OR job_title LIKE ?2 COLLATE NOCASE)
            ORDER BY created_at DESC, id DESC
            LIMIT ?3
            "#,
        )?;

        let contacts = stmt
            .query_map(params![owner_id, pattern, limit], |row| {
                Self::map_contact_row(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(contacts)
    }

    /// Get a single contact by ID
    pub fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            r#"
            SELECT id, owner_id, first_name, last_name, full_name, email, phone, mobile,
                   work_phone, company, job_title, department, website, linkedin,
                   address_line1, address_line2, city, state, zip_code, country, notes,
                   tags, custom_data, source, batch_id, created_at, updated_at
            FROM contacts
            WHERE id = ?
            "#,
            params![id],
            |row| Self::map_contact_row(row),
        );

        match result {
            Ok(contact) => Ok(Some(contact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get contacts by ID list, in ID order
    pub fn get_contacts_by_ids(&self, ids: &[i64]) -> Result<Vec<Contact>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, owner_id, first_name, last_name, full_name, email, phone, mobile,
                   work_phone, company, job_title, department, website, linkedin,
                   address_line1, address_line2, city, state, zip_code, country, notes,
                   tags, custom_data, source, batch_id, created_at, updated_at
            FROM contacts
            WHERE id IN ({})
            ORDER BY id
            "#,
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let contacts = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
                Self::map_contact_row(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(contacts)
    }

    /// Get contacts written by one import run
    pub fn get_contacts_by_batch(&self, batch_id: &str) -> Result<Vec<Contact>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner_id, first_name, last_name, full_name, email, phone, mobile,
                   work_phone, company, job_title, department, website, linkedin,
                   address_line1, address_line2, city, state, zip_code, country, notes,
                   tags, custom_data, source, batch_id, created_at, updated_at
            FROM contacts
            WHERE batch_id = ?
            ORDER BY id
            "#,
        )?;

        let contacts = stmt
            .query_map(params![batch_id], |row| Self::map_contact_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(contacts)
    }

    /// Count contacts, optionally scoped to an owner
    pub fn count_contacts(&self, owner_id: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;

        let count: i64 = if let Some(owner) = owner_id {
            conn.query_row(
                "SELECT COUNT(*) FROM contacts WHERE owner_id = ?",
                params![owner],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?
        };

        Ok(count)
    }

    /// Delete a contact by ID
    ///
    /// Returns true if a row was deleted.
    pub fn delete_contact(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let count = conn.execute("DELETE FROM contacts WHERE id = ?", params![id])?;
        Ok(count > 0)
    }

    /// Mark contacts as projected into the CRM table
    ///
    /// Sets `synced_to_crm: true` inside each contact's custom_data, creating
    /// the object if the contact has none.
    pub fn mark_contacts_synced(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut read = tx.prepare("SELECT custom_data FROM contacts WHERE id = ?")?;
            let mut write = tx.prepare(
                "UPDATE contacts SET custom_data = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )?;

            for &id in ids {
                let raw: Option<String> = match read.query_row(params![id], |row| row.get(0)) {
                    Ok(raw) => raw,
                    Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                    Err(e) => return Err(e.into()),
                };

                let mut data = custom_data_from_json(raw).unwrap_or_default();
                data.insert("synced_to_crm".to_string(), Value::Bool(true));
                write.execute(params![serde_json::to_string(&data)?, id])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Helper to map a row to Contact
    pub(crate) fn map_contact_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
        let tags_raw: Option<String> = row.get(21)?;
        let custom_raw: Option<String> = row.get(22)?;
        let created_at_str: String = row.get(25)?;
        let updated_at_str: Option<String> = row.get(26)?;

        Ok(Contact {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            full_name: row.get(4)?,
            email: row.get(5)?,
            phone: row.get(6)?,
            mobile: row.get(7)?,
            work_phone: row.get(8)?,
            company: row.get(9)?,
            job_title: row.get(10)?,
            department: row.get(11)?,
            website: row.get(12)?,
            linkedin: row.get(13)?,
            address_line1: row.get(14)?,
            address_line2: row.get(15)?,
            city: row.get(16)?,
            state: row.get(17)?,
            zip_code: row.get(18)?,
            country: row.get(19)?,
            notes: row.get(20)?,
            tags: tags_from_json(tags_raw),
            custom_data: custom_data_from_json(custom_raw),
            source: row.get(23)?,
            batch_id: row.get(24)?,
            created_at: parse_datetime(&created_at_str),
            updated_at: updated_at_str.map(|s| parse_datetime(&s)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn contact(owner: &str, email: Option<&str>, first: &str) -> NewContact {
        NewContact {
            owner_id: owner.to_string(),
            first_name: Some(first.to_string()),
            email: email.map(|e| e.to_string()),
            source: "csv_import".to_string(),
            batch_id: "import_1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_inserts_and_overwrites() {
        let db = Database::in_memory().unwrap();

        let written = db
            .upsert_contacts(&[contact("owner-1", Some("a@example.com"), "Alice")])
            .unwrap();
        assert_eq!(written, 1);

        // Same key again: overwritten, not duplicated
        let mut updated = contact("owner-1", Some("a@example.com"), "Alicia");
        updated.batch_id = "import_2".to_string();
        let written = db.upsert_contacts(&[updated]).unwrap();
        assert_eq!(written, 1);

        let contacts = db.list_contacts("owner-1", 10, 0).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].first_name.as_deref(), Some("Alicia"));
        assert_eq!(contacts[0].batch_id, "import_2");
        assert!(contacts[0].updated_at.is_some());
    }

    #[test]
    fn test_upsert_scoped_by_owner() {
        let db = Database::in_memory().unwrap();

        db.upsert_contacts(&[
            contact("owner-1", Some("a@example.com"), "Alice"),
            contact("owner-2", Some("a@example.com"), "Alice"),
        ])
        .unwrap();

        // Same email under different owners stays two rows
        assert_eq!(db.count_contacts(None).unwrap(), 2);
        assert_eq!(db.count_contacts(Some("owner-1")).unwrap(), 1);
    }

    #[test]
    fn test_null_emails_never_conflict() {
        let db = Database::in_memory().unwrap();

        let written = db
            .upsert_contacts(&[
                contact("owner-1", None, "NoMail One"),
                contact("owner-1", None, "NoMail Two"),
            ])
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(db.count_contacts(Some("owner-1")).unwrap(), 2);
    }

    #[test]
    fn test_tags_and_custom_data_roundtrip() {
        let db = Database::in_memory().unwrap();

        let mut new_contact = contact("owner-1", Some("a@example.com"), "Alice");
        new_contact.tags = vec!["vip".to_string(), "conference".to_string()];
        let mut data = Map::new();
        data.insert(
            "HubSpot Score".to_string(),
            Value::String("192".to_string()),
        );
        new_contact.custom_data = Some(data);

        db.upsert_contacts(&[new_contact]).unwrap();

        let loaded = db.get_contact(1).unwrap().unwrap();
        assert_eq!(loaded.tags, vec!["vip", "conference"]);
        let custom = loaded.custom_data.unwrap();
        assert_eq!(
            custom.get("HubSpot Score").and_then(Value::as_str),
            Some("192")
        );
    }

    #[test]
    fn test_search_contacts() {
        let db = Database::in_memory().unwrap();

        let mut acme = contact("owner-1", Some("jane@acme.com"), "Jane");
        acme.company = Some("Acme Dental".to_string());
        let other = contact("owner-1", Some("bob@other.com"), "Bob");
        db.upsert_contacts(&[acme, other]).unwrap();

        let hits = db.search_contacts("owner-1", "acme", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name.as_deref(), Some("Jane"));

        // Case-insensitive
        let hits = db.search_contacts("owner-1", "ACME", 10).unwrap();
        assert_eq!(hits.len(), 1);

        // Other owners never leak in
        let hits = db.search_contacts("owner-2", "acme", 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_get_contacts_by_ids_and_batch() {
        let db = Database::in_memory().unwrap();

        db.upsert_contacts(&[
            contact("owner-1", Some("a@example.com"), "Alice"),
            contact("owner-1", Some("b@example.com"), "Bob"),
            contact("owner-1", Some("c@example.com"), "Cara"),
        ])
        .unwrap();

        let picked = db.get_contacts_by_ids(&[1, 3]).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].first_name.as_deref(), Some("Alice"));
        assert_eq!(picked[1].first_name.as_deref(), Some("Cara"));

        let batch = db.get_contacts_by_batch("import_1").unwrap();
        assert_eq!(batch.len(), 3);

        assert!(db.get_contacts_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_delete_contact() {
        let db = Database::in_memory().unwrap();

        db.upsert_contacts(&[contact("owner-1", Some("a@example.com"), "Alice")])
            .unwrap();

        assert!(db.delete_contact(1).unwrap());
        assert!(!db.delete_contact(1).unwrap());
        assert_eq!(db.count_contacts(None).unwrap(), 0);
    }

    #[test]
    fn test_mark_contacts_synced() {
        let db = Database::in_memory().unwrap();

        let mut with_data = contact("owner-1", Some("a@example.com"), "Alice");
        let mut data = Map::new();
        data.insert("Region".to_string(), Value::String("West".to_string()));
        with_data.custom_data = Some(data);
        let without_data = contact("owner-1", Some("b@example.com"), "Bob");

        db.upsert_contacts(&[with_data, without_data]).unwrap();
        db.mark_contacts_synced(&[1, 2]).unwrap();

        let alice = db.get_contact(1).unwrap().unwrap();
        assert!(alice.synced_to_crm());
        // Existing keys survive the merge
        let custom = alice.custom_data.unwrap();
        assert_eq!(custom.get("Region").and_then(Value::as_str), Some("West"));

        let bob = db.get_contact(2).unwrap().unwrap();
        assert!(bob.synced_to_crm());
    }
}
