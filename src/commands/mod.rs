pub mod config;
pub mod describe;
pub mod export;
pub mod list;
pub mod new;
pub mod show;

use std::path::Path;

use anyhow::{Context, Result};
use datebook_core::pdb::Datebook;

/// Load a Datebook database, naming the file in any error.
pub fn load_datebook(path: &Path) -> Result<Datebook> {
    if !path.exists() {
        anyhow::bail!(
            "Database not found: {}\n\n\
            Pass one with --db, or set `database` in the config file.",
            path.display()
        );
    }
    Datebook::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
