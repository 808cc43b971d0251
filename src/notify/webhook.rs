// src/notify/webhook.rs
use std::time::Duration;

use reqwest::Client;

use super::{Notifier, SummaryPayload};
use crate::error::NotificationError;

const ENV_WEBHOOK_URL: &str = "MONITOR_WEBHOOK_URL";

/// Generic JSON webhook sink (Slack/Discord-compatible `{"text": ...}` body).
#[derive(Clone)]
pub struct WebhookNotifier {
    webhook_url: Option<String>,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl WebhookNotifier {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var(ENV_WEBHOOK_URL).ok(),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    fn render(payload: &SummaryPayload) -> String {
        let mut text = format!("*{}*", payload.headline());
        for rec in payload.records.iter().take(10) {
            text.push_str(&format!("\n• {} ({}) {}", rec.name, rec.source, rec.link));
        }
        if payload.records.len() > 10 {
            text.push_str(&format!("\n… and {} more", payload.records.len() - 10));
        }
        text
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, payload: &SummaryPayload) -> Result<(), NotificationError> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("webhook disabled (no {ENV_WEBHOOK_URL})");
            return Ok(());
        };

        let body = serde_json::json!({ "text": Self::render(payload) });

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(url)
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(NotificationError::Webhook(format!("http error: {e}")));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(NotificationError::Webhook(format!("request failed: {e}")));
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
