//! Contact CSV export
//!
//! Emits the fixed seven-column layout downstream tooling expects:
//! `First Name,Last Name,Email,Phone,Company,Job Title,Tags`, with tags
//! joined by `;` inside the single tags cell.

use crate::db::Database;
use crate::error::Result;
use crate::models::Contact;

/// Options for contact export
#[derive(Debug, Clone, Default)]
pub struct ContactExportOptions {
    /// Restrict to one owner's contacts
    pub owner_id: Option<String>,
    /// Restrict to the contacts written by one import run
    pub batch_id: Option<String>,
}

/// The export header row, in column order
pub const EXPORT_HEADER: &str = "First Name,Last Name,Email,Phone,Company,Job Title,Tags";

impl Database {
    /// Export contacts to CSV format
    pub fn export_contacts_csv(&self, opts: &ContactExportOptions) -> Result<String> {
        let contacts = self.export_contacts(opts)?;

        let mut csv = String::from(EXPORT_HEADER);
        csv.push('\n');

        for contact in contacts {
            let tags = contact.tags.join(";");

            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                escape_csv_field(contact.first_name.as_deref().unwrap_or("")),
                escape_csv_field(contact.last_name.as_deref().unwrap_or("")),
                escape_csv_field(contact.email.as_deref().unwrap_or("")),
                escape_csv_field(contact.phone.as_deref().unwrap_or("")),
                escape_csv_field(contact.company.as_deref().unwrap_or("")),
                escape_csv_field(contact.job_title.as_deref().unwrap_or("")),
                escape_csv_field(&tags)
            ));
        }

        Ok(csv)
    }

    /// Export contacts with filtering, newest first
    pub fn export_contacts(&self, opts: &ContactExportOptions) -> Result<Vec<Contact>> {
        let conn = self.conn()?;

        let mut sql = String::from(
            r#"
            SELECT id, owner_id, first_name, last_name, full_name, email, phone, mobile,
                   work_phone, company, job_title, department, website, linkedin,
                   address_line1, address_line2, city, state, zip_code, country, notes,
                   tags, custom_data, source, batch_id, created_at, updated_at
            FROM contacts
            WHERE 1=1
            "#,
        );

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(owner_id) = &opts.owner_id {
            sql.push_str(&format!(" AND owner_id = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(owner_id.clone()));
        }

        if let Some(batch_id) = &opts.batch_id {
            sql.push_str(&format!(" AND batch_id = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(batch_id.clone()));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let contacts = stmt
            .query_map(params_refs.as_slice(), |row| Self::map_contact_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(contacts)
    }
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
