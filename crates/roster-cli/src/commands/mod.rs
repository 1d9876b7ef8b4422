//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, template) and shared utilities (open_db)
//! - `contacts` - Contact commands (list, search, delete)
//! - `history` - Import history commands (list, show)
//! - `import` - File commands (map preview, import, export, analyze)
//! - `status` - Database status command
//! - `sync` - CRM sync command

pub mod contacts;
pub mod core;
pub mod history;
pub mod import;
pub mod status;
pub mod sync;

// Re-export command functions for main.rs
pub use contacts::*;
pub use core::*;
pub use history::*;
pub use import::*;
pub use status::*;
pub use sync::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
