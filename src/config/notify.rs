//! Payment notification channels

use secrecy::SecretString;
use serde::Deserialize;

/// Chat and SMS destinations for verified payment events.
///
/// A channel is enabled only when all of its fields are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    pub telegram_bot_token: Option<SecretString>,
    pub telegram_chat_id: Option<String>,

    pub twilio_sid: Option<String>,
    pub twilio_token: Option<SecretString>,
    pub twilio_from: Option<String>,
    pub twilio_to: Option<String>,
}

/// Telegram Bot API settings
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: SecretString,
    pub chat_id: String,
}

/// Twilio Messages API settings
#[derive(Debug, Clone)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: SecretString,
    pub from: String,
    pub to: String,
}

impl NotifyConfig {
    pub fn telegram(&self) -> Option<TelegramSettings> {
        Some(TelegramSettings {
            bot_token: self.telegram_bot_token.clone()?,
            chat_id: non_empty(&self.telegram_chat_id)?,
        })
    }

    pub fn twilio(&self) -> Option<TwilioSettings> {
        Some(TwilioSettings {
            account_sid: non_empty(&self.twilio_sid)?,
            auth_token: self.twilio_token.clone()?,
            from: non_empty(&self.twilio_from)?,
            to: non_empty(&self.twilio_to)?,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}
