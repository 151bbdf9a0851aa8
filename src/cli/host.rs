//! Commands that talk to the host or the network.

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::chrome::{ChromeProbe, ChromeVersion};
use crate::webhook::DiscordNotifier;

/// Chrome version command options.
#[derive(Parser)]
pub struct ChromeVersionCommand {}

impl ChromeVersionCommand {
    /// Prints the major version, failing when no browser is found.
    pub fn execute(self) -> Result<()> {
        match ChromeProbe::system().detect() {
            ChromeVersion::Found(major) => {
                println!("{major}");
                Ok(())
            }
            ChromeVersion::NotFound => bail!("Chrome or Chromium not found"),
        }
    }
}

/// Notify command options.
#[derive(Parser)]
pub struct NotifyCommand {
    /// Webhook URL; falls back to DISCORD_WEBHOOK_URL from the environment
    /// or settings file.
    #[arg(long)]
    pub url: Option<String>,

    /// Message content.
    pub message: String,
}

impl NotifyCommand {
    /// Posts the message to the webhook.
    pub async fn execute(self) -> Result<()> {
        let notifier = match self.url.as_deref() {
            Some(url) => DiscordNotifier::new(url)?,
            None => DiscordNotifier::from_env()
                .context("No webhook URL given and none configured")?,
        };
        notifier.send(&self.message).await?;
        eprintln!("Notification sent");
        Ok(())
    }
}
