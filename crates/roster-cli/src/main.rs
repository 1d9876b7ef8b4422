//! Roster CLI - CSV contact importer with CRM sync
//!
//! Usage:
//!   roster init                      Initialize database
//!   roster map --file contacts.csv   Preview column mapping
//!   roster import --file contacts.csv --owner me
//!   roster sync --ids 1,2,3          Share contacts with the CRM

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    tracing::debug!("Using database at {}", cli.db.display());

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Map { file } => commands::cmd_map(&file),
        Commands::Import(args) => commands::cmd_import(&cli.db, &args, cli.no_encrypt),
        Commands::Template { output } => commands::cmd_template(output.as_deref()),
        Commands::Contacts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                ContactsAction::List { owner, limit } => {
                    commands::cmd_contacts_list(&db, &owner, limit)
                }
                ContactsAction::Search {
                    owner,
                    query,
                    limit,
                } => commands::cmd_contacts_search(&db, &owner, &query, limit),
                ContactsAction::Delete { id } => commands::cmd_contacts_delete(&db, id),
            }
        }
        Commands::Export {
            owner,
            batch,
            output,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(&db, owner, batch, output)
        }
        Commands::History {
            owner,
            limit,
            action,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_history_list(&db, owner.as_deref(), limit),
                Some(HistoryAction::Show { batch_id }) => {
                    commands::cmd_history_show(&db, &batch_id)
                }
            }
        }
        Commands::Sync { ids, batch, owner } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_sync(&db, &ids, batch.as_deref(), owner.as_deref())
        }
        Commands::Analyze { file, top } => commands::cmd_analyze(&file, &top),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
    }
}
