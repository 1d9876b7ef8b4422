//! Contact command implementations

use anyhow::Result;
use roster_core::db::Database;
use roster_core::models::Contact;

use super::truncate;

fn print_contact_line(contact: &Contact) {
    let name = contact.display_name();
    let name = if name.is_empty() { "(no name)" } else { &name };
    let synced = if contact.synced_to_crm() { " ↗" } else { "" };

    println!(
        "   [{}] {:<24} │ {:<28} │ {}{}",
        contact.id,
        truncate(name, 24),
        truncate(contact.email.as_deref().unwrap_or("-"), 28),
        truncate(contact.company.as_deref().unwrap_or("-"), 24),
        synced
    );
}

pub fn cmd_contacts_list(db: &Database, owner: &str, limit: i64) -> Result<()> {
    let contacts = db.list_contacts(owner, limit, 0)?;

    if contacts.is_empty() {
        println!("No contacts found for '{}'. Import some with:", owner);
        println!("  roster import --file contacts.csv --owner {}", owner);
        return Ok(());
    }

    let total = db.count_contacts(Some(owner))?;

    println!();
    println!("👥 Contacts for {} ({} total)", owner, total);
    println!("   ─────────────────────────────────────────────────────────────");

    for contact in &contacts {
        print_contact_line(contact);
    }

    if !contacts.iter().any(|c| c.synced_to_crm()) {
        println!();
        println!("   Use 'roster sync --ids 1,2,3' to share contacts with the CRM.");
    }

    Ok(())
}

pub fn cmd_contacts_search(db: &Database, owner: &str, query: &str, limit: i64) -> Result<()> {
    let contacts = db.search_contacts(owner, query, limit)?;

    if contacts.is_empty() {
        println!("No contacts matching '{}'.", query);
        return Ok(());
    }

    println!();
    println!("🔎 {} match(es) for '{}'", contacts.len(), query);
    println!("   ─────────────────────────────────────────────────────────────");

    for contact in &contacts {
        print_contact_line(contact);
    }

    Ok(())
}

pub fn cmd_contacts_delete(db: &Database, id: i64) -> Result<()> {
    let contact = db
        .get_contact(id)?
        .ok_or_else(|| anyhow::anyhow!("Contact {} not found", id))?;

    db.delete_contact(id)?;

    let name = contact.display_name();
    let name = if name.is_empty() {
        contact.email.as_deref().unwrap_or("(unnamed)").to_string()
    } else {
        name
    };
    println!("✅ Deleted contact {} ({})", id, name);

    Ok(())
}
