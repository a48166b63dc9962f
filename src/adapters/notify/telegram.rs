//! Telegram Bot API channel.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::TelegramSettings;
use crate::domain::payment::PaymentEvent;
use crate::ports::{NotifyError, PaymentNotifier};

use super::{check_response, http_client, message_text};

const CHANNEL: &str = "telegram";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Posts a chat message per verified event.
pub struct TelegramNotifier {
    settings: TelegramSettings,
    api_base_url: String,
    http_client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(settings: TelegramSettings) -> Result<Self, NotifyError> {
        Ok(Self {
            settings,
            api_base_url: "https://api.telegram.org".to_string(),
            http_client: http_client(CHANNEL)?,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[async_trait]
impl PaymentNotifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        CHANNEL
    }

    async fn notify(&self, event: &PaymentEvent) -> Result<(), NotifyError> {
        // The token is part of the path, so the URL itself must never be logged.
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base_url,
            self.settings.bot_token.expose_secret()
        );
        let text = message_text(event);

        let response = self
            .http_client
            .post(url)
            .json(&SendMessage {
                chat_id: &self.settings.chat_id,
                text: &text,
            })
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                channel: CHANNEL,
                message: e.without_url().to_string(),
            })?;

        check_response(CHANNEL, response).await
    }
}
