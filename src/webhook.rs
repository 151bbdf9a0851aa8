//! Discord webhook notifications.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::utils::settings::{get_env_var, DISCORD_WEBHOOK_URL};

/// Discord webhook request body.
#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts text messages to a Discord webhook.
///
/// Requests carry no timeout and are never retried; a slow endpoint blocks
/// the awaiting task until the transport gives up.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    /// HTTP client for webhook requests.
    client: Client,
    /// Webhook endpoint.
    url: Url,
}

impl DiscordNotifier {
    /// Creates a notifier for the given webhook URL.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_client(url, Client::new())
    }

    /// Creates a notifier that sends through an existing client.
    pub fn with_client(url: &str, client: Client) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::invalid_argument(format!("invalid webhook URL '{url}': {e}")))?;
        Ok(Self { client, url })
    }

    /// Creates a notifier from `DISCORD_WEBHOOK_URL`, read from the
    /// environment or the settings file.
    pub fn from_env() -> Result<Self> {
        let url = get_env_var(DISCORD_WEBHOOK_URL)
            .map_err(|_| Error::MissingSetting(DISCORD_WEBHOOK_URL.to_string()))?;
        Self::new(&url)
    }

    /// Returns the webhook URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends `content` as a webhook message.
    ///
    /// Transport failures and 4xx/5xx responses are returned as
    /// [`Error::Notification`].
    pub async fn send(&self, content: &str) -> Result<()> {
        info!(
            host = self.url.host_str().unwrap_or_default(),
            content_len = content.len(),
            "Sending Discord notification"
        );

        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload { content })
            .send()
            .await
            .map_err(|e| Error::Notification {
                reason: e.to_string(),
                source: Some(e),
            })?;

        let status = response.status();
        let status_check = response.error_for_status_ref().map(|_| ());
        if let Err(source) = status_check {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read webhook error body: {e}");
                String::new()
            });
            return Err(Error::Notification {
                reason: format!("HTTP {status}: {}", body.trim()),
                source: Some(source),
            });
        }

        debug!(%status, "Discord notification delivered");
        Ok(())
    }
}

/// Posts `content` to the webhook at `url`.
pub async fn send_discord_message(url: &str, content: &str) -> Result<()> {
    DiscordNotifier::new(url)?.send(content).await
}
