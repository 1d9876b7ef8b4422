//! CRM sync projection
//!
//! A one-shot transform-and-insert: selected personal contacts are projected
//! into the team-visible CRM shape and inserted as a single atomic batch.
//! Contacts that make it in are marked `synced_to_crm` in their custom_data.

use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Contact, NewCrmContact};

/// Fixed classification for projected contacts
pub const CRM_CONTACT_TYPE: &str = "other";
/// Fixed pipeline status for projected contacts
pub const CRM_CONTACT_STATUS: &str = "lead";

/// Project one personal contact into the CRM shape
///
/// The first populated phone field wins, company becomes the practice name,
/// and the contact's notes ride along behind a fixed provenance prefix.
pub fn project_contact(contact: &Contact) -> NewCrmContact {
    let phone = contact
        .phone
        .clone()
        .or_else(|| contact.mobile.clone())
        .or_else(|| contact.work_phone.clone());

    let notes = format!(
        "Imported from personal contacts. {}",
        contact.notes.as_deref().unwrap_or("")
    );

    NewCrmContact {
        owner_id: contact.owner_id.clone(),
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        email: contact.email.clone(),
        phone,
        practice_name: contact.company.clone(),
        title: contact.job_title.clone(),
        contact_type: CRM_CONTACT_TYPE.to_string(),
        status: CRM_CONTACT_STATUS.to_string(),
        notes: Some(notes),
        tags: contact.tags.clone(),
    }
}

fn sync_rows(db: &Database, contacts: &[Contact]) -> Result<usize> {
    let projected: Vec<NewCrmContact> = contacts.iter().map(project_contact).collect();
    let written = db.insert_crm_contacts(&projected)?;

    // Marking happens only after the insert lands; a failed insert leaves
    // the source contacts untouched
    let ids: Vec<i64> = contacts.iter().map(|c| c.id).collect();
    db.mark_contacts_synced(&ids)?;

    info!(synced = written, "Synced contacts to CRM");
    Ok(written)
}

/// Sync contacts by ID into the CRM table
///
/// IDs with no matching contact are ignored; if none match, this is an
/// error. Returns the number of contacts synced.
pub fn sync_contacts(db: &Database, ids: &[i64]) -> Result<usize> {
    let contacts = db.get_contacts_by_ids(ids)?;
    if contacts.is_empty() {
        return Err(Error::NotFound("No matching contacts to sync".to_string()));
    }
    sync_rows(db, &contacts)
}

/// Sync every contact written by one import run
pub fn sync_batch(db: &Database, batch_id: &str) -> Result<usize> {
    let contacts = db.get_contacts_by_batch(batch_id)?;
    if contacts.is_empty() {
        return Err(Error::NotFound(format!(
            "No contacts in batch '{}'",
            batch_id
        )));
    }
    sync_rows(db, &contacts)
}
