// src/notify/telegram.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;

pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_CHAT_ID: &str = "CHAT_ID";

/// What happened to a delivery attempt that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    SkippedMissingCredentials,
}

pub struct TelegramNotifier {
    token: Option<String>,
    chat_id: Option<String>,
    client: Client,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var(ENV_TELEGRAM_TOKEN).ok().filter(|s| !s.is_empty()),
            chat_id: std::env::var(ENV_CHAT_ID).ok().filter(|s| !s.is_empty()),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Explicit builder for tests/tools.
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            chat_id: Some(chat_id.into()),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    /// Deliver one rendered digest. Never issues a request when either
    /// credential is unset.
    ///
    /// Error contexts deliberately omit the endpoint URL: it embeds the bot
    /// token.
    pub async fn send_digest(&self, text: &str) -> Result<Delivery> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            tracing::error!("TELEGRAM_TOKEN or CHAT_ID is not set; skipping delivery");
            return Ok(Delivery::SkippedMissingCredentials);
        };

        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
        });

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("telegram sendMessage request")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("telegram sendMessage returned {status}: {detail}");
        }

        tracing::info!("digest delivered to telegram");
        Ok(Delivery::Sent)
    }
}
