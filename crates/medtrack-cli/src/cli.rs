//! CLI argument definitions for medtrack.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use medtrack_store::WriteMode;

/// medtrack -- medication reminders from the terminal.
#[derive(Parser)]
#[command(
    name = "medtrack",
    version,
    about = "medtrack -- medication reminders",
    long_about = "Keeps a list of medications with dosage, reminder time and colour \
                  in a local SQLite database."
)]
pub struct Cli {
    /// Config file to read instead of config/default.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides config and MEDTRACK_DB).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Write mode: fire_and_forget or serialized.
    #[arg(long, global = true)]
    pub write_mode: Option<WriteMode>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stored medications.
    List {
        /// Print the raw JSON list instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Add a medication.
    Add {
        /// Medication name.
        medication: String,

        /// Dosage, e.g. "10mg".
        #[arg(long, short)]
        dosage: Option<String>,

        /// Reminder time as HH:MM.
        #[arg(long, short)]
        time: Option<String>,

        /// Colour: a preset name ("Blue") or a hex value.
        #[arg(long, short)]
        color: Option<String>,
    },

    /// Update an existing medication. Unset flags keep their current value.
    Update {
        /// Id of the medication to update.
        id: String,

        #[arg(long, short)]
        medication: Option<String>,

        #[arg(long, short)]
        dosage: Option<String>,

        /// Reminder time as HH:MM.
        #[arg(long, short)]
        time: Option<String>,

        /// Colour: a preset name or a hex value.
        #[arg(long, short)]
        color: Option<String>,
    },

    /// Interactively pick a colour for a medication.
    Pick {
        /// Id of the medication to recolour.
        id: String,
    },

    /// Store an access token.
    Login {
        /// Access token issued by the account service.
        #[arg(long)]
        token: String,
    },

    /// Forget the stored access token.
    Logout,

    /// Show storage and session status.
    Status,
}
