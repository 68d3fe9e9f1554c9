use std::path::PathBuf;

use anyhow::{Context, Result};
use datebook_core::config::DatebookConfig;
use owo_colors::OwoColorize;

/// Settings to store; `None` leaves the current value alone.
pub struct ConfigUpdate {
    pub database: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl ConfigUpdate {
    fn is_empty(&self) -> bool {
        self.database.is_none() && self.log_filter.is_none()
    }
}

pub fn run(update: ConfigUpdate) -> Result<()> {
    let config_path = DatebookConfig::config_path()?;

    if update.is_empty() {
        let cfg = DatebookConfig::load_from(&config_path)?;
        println!("{}", "Paths".bold());
        println!("  Config:     {}", config_path.display());
        println!("  Database:   {}", cfg.database_path().display());
        println!(
            "  Log filter: {}",
            cfg.log_filter.as_deref().unwrap_or("warn (default)")
        );
        return Ok(());
    }

    if !config_path.exists() {
        DatebookConfig::create_default_config(&config_path)?;
    }
    let mut cfg = DatebookConfig::load_from(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    if let Some(database) = update.database {
        cfg.database = database;
    }
    if let Some(filter) = update.log_filter {
        cfg.log_filter = Some(filter);
    }
    cfg.save(&config_path)?;

    println!(
        "{}",
        format!("  Saved {}", config_path.display()).green()
    );
    Ok(())
}
