use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{CacheCommands, ReviewCommands, ScheduleCommands};

/// Command-line client for Mapzip trip schedules
///
/// Mapzip plans a road trip around meal stops. The client creates and edits
/// schedules through the same three-step wizard the app uses, selects the
/// schedule for today's trip, and keeps the selection in a local store for
/// 24 hours.
#[derive(Parser)]
#[command(version, about, name = "mz")]
pub struct Args {
    /// Base URL of the Mapzip gateway. Overrides MAPZIP_API_BASE_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to the local SQLite store. Defaults to
    /// $XDG_DATA_HOME/mapzip/mapzip.db
    #[arg(long, global = true)]
    pub store_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Mapzip CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage trip schedules
    #[command(alias = "s")]
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Manage reviews waiting to be written
    #[command(alias = "r")]
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
    /// Manage the local store
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}
