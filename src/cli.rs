//! CLI interface for razator-utils.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod data;
pub mod host;

/// razator: common helper functions from the command line.
#[derive(Parser)]
#[command(name = "razator")]
#[command(about = "Common helper functions from the command line", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Splits items into fixed-size batches.
    Batch(data::BatchCommand),
    /// Converts camelCase names to snake_case.
    Snake(data::SnakeCommand),
    /// Flattens a nested JSON object.
    Flatten(data::FlattenCommand),
    /// Prints the installed Chrome major version.
    #[command(name = "chrome-version")]
    ChromeVersion(host::ChromeVersionCommand),
    /// Posts a message to a Discord webhook.
    Notify(host::NotifyCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Batch(cmd) => cmd.execute(),
            Commands::Snake(cmd) => cmd.execute(),
            Commands::Flatten(cmd) => cmd.execute(),
            Commands::ChromeVersion(cmd) => cmd.execute(),
            Commands::Notify(cmd) => cmd.execute().await,
        }
    }
}
