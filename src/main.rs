mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use datebook_core::config::{DatebookConfig, expand_path};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datebook")]
#[command(about = "Inspect and create Palm OS Datebook records and databases")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a raw appointment record and print every field
    Describe {
        /// File holding one packed record
        file: PathBuf,
    },
    /// List the appointments in a Datebook database
    List {
        /// Database file (defaults to `database` from config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show one appointment with its record metadata
    Show {
        /// Record index, as printed by `list`
        index: usize,

        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Dump a Datebook database as JSON
    Export {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Create an appointment
    New {
        /// Start date or date/time (e.g. "2004-03-20" or "2004-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End time (e.g. "16:30" or "2004-03-20T16:30"); defaults to the start
        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        note: Option<String>,

        /// Alarm this many minutes before the start
        #[arg(long)]
        alarm: Option<i32>,

        /// Write the packed record to this file
        #[arg(long, conflicts_with = "db", required_unless_present = "db")]
        out: Option<PathBuf>,

        /// Append the appointment to this database (created if missing)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show the config file location and settings, or update them
    Config {
        /// Default database for list, show and export
        #[arg(long)]
        database: Option<PathBuf>,

        /// Log filter, e.g. "info" or "datebook_core=debug"
        #[arg(long)]
        log_filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (cfg, load_error) = match DatebookConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (DatebookConfig::default(), Some(e)),
    };
    init_logging(&cfg);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "using default configuration");
    }

    match cli.command {
        Commands::Describe { file } => commands::describe::run(&file),
        Commands::List { db } => commands::list::run(&resolve_db(db, &cfg)),
        Commands::Show { index, db } => commands::show::run(&resolve_db(db, &cfg), index),
        Commands::Export { db } => commands::export::run(&resolve_db(db, &cfg)),
        Commands::New {
            start,
            end,
            description,
            note,
            alarm,
            out,
            db,
        } => {
            let args = commands::new::NewArgs {
                start,
                end,
                description,
                note,
                alarm,
            };
            match (out, db) {
                (Some(out), _) => commands::new::write_record(args, &out),
                (None, Some(db)) => commands::new::append_to_database(args, &expand_path(&db)),
                (None, None) => anyhow::bail!("Either --out or --db is required"),
            }
        }
        Commands::Config {
            database,
            log_filter,
        } => commands::config::run(commands::config::ConfigUpdate {
            database,
            log_filter,
        }),
    }
}

/// Log to stderr; RUST_LOG wins over the configured filter.
fn init_logging(cfg: &DatebookConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cfg.log_filter.as_deref().unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_db(db: Option<PathBuf>, cfg: &DatebookConfig) -> PathBuf {
    match db {
        Some(path) => expand_path(&path),
        None => cfg.database_path(),
    }
}
