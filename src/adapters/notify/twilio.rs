//! Twilio Messages API channel.

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::config::TwilioSettings;
use crate::domain::payment::PaymentEvent;
use crate::ports::{NotifyError, PaymentNotifier};

use super::{check_response, http_client, message_text};

const CHANNEL: &str = "twilio";

/// Sends an SMS per verified event.
pub struct TwilioNotifier {
    settings: TwilioSettings,
    api_base_url: String,
    http_client: reqwest::Client,
}

impl TwilioNotifier {
    pub fn new(settings: TwilioSettings) -> Result<Self, NotifyError> {
        Ok(Self {
            settings,
            api_base_url: "https://api.twilio.com".to_string(),
            http_client: http_client(CHANNEL)?,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[async_trait]
impl PaymentNotifier for TwilioNotifier {
    fn channel(&self) -> &'static str {
        CHANNEL
    }

    async fn notify(&self, event: &PaymentEvent) -> Result<(), NotifyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base_url, self.settings.account_sid
        );
        let text = message_text(event);

        let response = self
            .http_client
            .post(url)
            .basic_auth(
                &self.settings.account_sid,
                Some(self.settings.auth_token.expose_secret()),
            )
            .form(&[
                ("Body", text.as_str()),
                ("From", self.settings.from.as_str()),
                ("To", self.settings.to.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                channel: CHANNEL,
                message: e.to_string(),
            })?;

        check_response(CHANNEL, response).await
    }
}
