//! Team-visible CRM contact operations

use rusqlite::params;

use super::{parse_datetime, tags_from_json, tags_to_json, Database};
use crate::error::Result;
use crate::models::{CrmContact, NewCrmContact};

impl Database {
    /// Insert projected CRM contacts as one atomic batch
    ///
    /// Plain inserts, no conflict key: projecting the same contact twice
    /// produces two CRM rows. Any failure rolls the whole batch back.
    pub fn insert_crm_contacts(&self, contacts: &[NewCrmContact]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO crm_contacts
                    (owner_id, first_name, last_name, email, phone, practice_name, title,
                     contact_type, status, notes, tags)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;

            for contact in contacts {
                stmt.execute(params![
                    contact.owner_id,
                    contact.first_name,
                    contact.last_name,
                    contact.email,
                    contact.phone,
                    contact.practice_name,
                    contact.title,
                    contact.contact_type,
                    contact.status,
                    contact.notes,
                    tags_to_json(&contact.tags)?,
                ])?;
            }
        }

        tx.commit()?;
        Ok(contacts.len())
    }

    /// List CRM contacts, newest first, optionally scoped to an owner
    pub fn list_crm_contacts(
        &self,
        owner_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CrmContact>> {
        let conn = self.conn()?;

        let (sql, params): (&str, Vec<Box<dyn rusqlite::ToSql>>) = if let Some(owner) = owner_id {
            (
                r#"
                SELECT id, owner_id, first_name, last_name, email, phone, practice_name,
                       title, contact_type, status, notes, tags, created_at
                FROM crm_contacts
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
                SELECT id, owner_id, first_name, last_name, email, phone, practice_name,
                       title, contact_type, status, notes, tags, created_at
                FROM crm_contacts
                ORDER BY created_at DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
                vec![Box::new(limit) as Box<dyn rusqlite::ToSql>, Box::new(offset)],
            )
        };

        let mut stmt = conn.prepare(sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let contacts = stmt
            .query_map(params_refs.as_slice(), |row| Self::map_crm_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(contacts)
    }

    /// Count CRM contacts, optionally scoped to an owner
    pub fn count_crm_contacts(&self, owner_id: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;

        let count: i64 = if let Some(owner) = owner_id {
            conn.query_row(
                "SELECT COUNT(*) FROM crm_contacts WHERE owner_id = ?",
                params![owner],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM crm_contacts", [], |row| row.get(0))?
        };

        Ok(count)
    }

    /// Helper to map a row to CrmContact
    fn map_crm_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CrmContact> {
        let tags_raw: Option<String> = row.get(11)?;
        let created_at_str: String = row.get(12)?;

        Ok(CrmContact {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
            practice_name: row.get(6)?,
            title: row.get(7)?,
            contact_type: row.get(8)?,
            status: row.get(9)?,
            notes: row.get(10)?,
            tags: tags_from_json(tags_raw),
            created_at: parse_datetime(&created_at_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crm_contact(owner: &str, first: &str) -> NewCrmContact {
        NewCrmContact {
            owner_id: owner.to_string(),
            first_name: Some(first.to_string()),
            last_name: None,
            email: None,
            phone: None,
            practice_name: Some("Acme Dental".to_string()),
            title: None,
            contact_type: "other".to_string(),
            status: "lead".to_string(),
            notes: Some("Imported from personal contacts. ".to_string()),
            tags: vec!["vip".to_string()],
        }
    }

    #[test]
    fn test_insert_and_list() {
        let db = Database::in_memory().unwrap();

        let written = db
            .insert_crm_contacts(&[crm_contact("owner-1", "Alice"), crm_contact("owner-1", "Bob")])
            .unwrap();
        assert_eq!(written, 2);

        let listed = db.list_crm_contacts(Some("owner-1"), 10, 0).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].status, "lead");
        assert_eq!(listed[0].contact_type, "other");
        assert_eq!(listed[0].tags, vec!["vip"]);

        assert_eq!(db.count_crm_contacts(None).unwrap(), 2);
        assert_eq!(db.count_crm_contacts(Some("owner-2")).unwrap(), 0);
    }

    #[test]
    fn test_inserts_are_not_deduplicated() {
        let db = Database::in_memory().unwrap();

        db.insert_crm_contacts(&[crm_contact("owner-1", "Alice")]).unwrap();
        db.insert_crm_contacts(&[crm_contact("owner-1", "Alice")]).unwrap();

        // No conflict key on this table; repeat projection duplicates
        assert_eq!(db.count_crm_contacts(None).unwrap(), 2);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.insert_crm_contacts(&[]).unwrap(), 0);
        assert_eq!(db.count_crm_contacts(None).unwrap(), 0);
    }
}
