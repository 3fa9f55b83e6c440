//! Command-line entry point for planboard maintenance tasks.
//!
//! # Responsibility
//! - Open (and migrate) a planboard database from config or flags.
//! - Print a viewer's activity feed as JSON lines.

use clap::{Parser, Subcommand};
use log::info;
use planboard_core::db::migrations::{current_user_version, latest_version};
use planboard_core::{init_logging_from_config, open_db_with_config, BoardService, CoreConfig};
use std::error::Error;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "planboard")]
#[command(about = "Planboard core maintenance tool")]
struct Args {
    /// JSON config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Database file; overrides `database.path` from the config
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the core version
    Version,
    /// Open the database, apply pending migrations and print the schema version
    Migrate,
    /// Print a viewer's activity feed, newest first, one JSON entry per line
    Feed {
        #[arg(long)]
        viewer: Uuid,
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Command::Version = args.command {
        println!("planboard_core version={}", planboard_core::core_version());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if let Some(db) = args.db {
        config.database.path = Some(db);
    }
    init_logging_from_config(&config.logging)?;

    let conn = open_db_with_config(&config.database)?;
    match args.command {
        Command::Version => {}
        Command::Migrate => {
            let version = current_user_version(&conn)?;
            info!("event=cli_migrate module=cli status=ok schema_version={version}");
            println!("schema_version={version} latest={}", latest_version());
        }
        Command::Feed { viewer, limit } => {
            let service = BoardService::new(&conn, config.audit);
            for entry in service.activity_feed(viewer, limit)? {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
    }
    Ok(())
}
