mod app_config;
mod commands;
mod config;
mod google;
mod session;
mod todoist;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "caltask-cli")]
#[command(about = "Mirror upcoming calendar events into your task tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize access to the calendar account
    Auth,
    /// Sync upcoming events into the task tracker
    Sync {
        /// Target project in the task tracker (exact name match)
        #[arg(long, default_value = config::DEFAULT_PROJECT)]
        project: String,

        /// How many days of upcoming events to sync
        #[arg(long, default_value_t = config::DEFAULT_DAYS_AHEAD)]
        days_ahead: i64,

        /// Show what would be created without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Auth => commands::auth::run().await,
        Commands::Sync {
            project,
            days_ahead,
            dry_run,
        } => commands::sync::run(&project, days_ahead, dry_run).await,
    }
}
