//! CLI entry point for medtrack.
//!
//! This binary provides the `medtrack` command with subcommands for
//! managing medications and the signed-in session.

mod cli;
mod commands;
mod config;
mod helpers;
mod picker;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::{RecordEdit, Session};
use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = AppConfig::load(&config_path)?;
    config.apply_env()?;
    if let Some(db) = cli.db {
        config.storage.path = db;
    }
    if let Some(mode) = cli.write_mode {
        config.storage.write_mode = mode;
    }

    helpers::init_tracing(&config.logging.level);

    let session = Session::open(&config).await?;

    match cli.command {
        Commands::List { json } => commands::cmd_list(session, json).await,
        Commands::Add {
            medication,
            dosage,
            time,
            color,
        } => {
            let edit = RecordEdit {
                medication: Some(medication),
                dosage,
                time,
                color,
            };
            commands::cmd_add(session, edit).await
        }
        Commands::Update {
            id,
            medication,
            dosage,
            time,
            color,
        } => {
            let edit = RecordEdit {
                medication,
                dosage,
                time,
                color,
            };
            commands::cmd_update(session, id, edit).await
        }
        Commands::Pick { id } => commands::cmd_pick(session, id).await,
        Commands::Login { token } => commands::cmd_login(session, token).await,
        Commands::Logout => commands::cmd_logout(session).await,
        Commands::Status => commands::cmd_status(session, &config).await,
    }
}
