//! CRM sync command implementation

use anyhow::Result;
use roster_core::db::Database;
use roster_core::sync;

pub fn cmd_sync(
    db: &Database,
    ids: &[i64],
    batch: Option<&str>,
    owner: Option<&str>,
) -> Result<()> {
    if ids.is_empty() && batch.is_none() {
        anyhow::bail!("Nothing to sync: pass --ids 1,2,3 or --batch <batch_id>");
    }

    // Ownership check happens before any write
    if let Some(owner) = owner {
        let contacts = match batch {
            Some(batch_id) => db.get_contacts_by_batch(batch_id)?,
            None => db.get_contacts_by_ids(ids)?,
        };
        for contact in &contacts {
            if contact.owner_id != owner {
                anyhow::bail!(
                    "Contact {} belongs to '{}', not '{}'",
                    contact.id,
                    contact.owner_id,
                    owner
                );
            }
        }
    }

    println!("🔄 Syncing contacts to CRM...");

    let synced = match batch {
        Some(batch_id) => sync::sync_batch(db, batch_id)?,
        None => sync::sync_contacts(db, ids)?,
    };

    println!("✅ Synced {} contact(s) to the CRM.", synced);
    println!("   Synced contacts are marked and show ↗ in listings.");

    Ok(())
}
