//! Twilio Messages API client

use super::{ProviderError, SmsConfig, SmsProvider, SmsReceipt};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TwilioProvider {
    client: reqwest::Client,
    config: SmsConfig,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: String,
}

impl TwilioProvider {
    pub fn new(config: SmsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Twilio puts a human-readable `message` in its error bodies
    fn classify_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<TwilioErrorBody>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("HTTP {status}: {body}"));

        match status.as_u16() {
            401 | 403 => ProviderError::auth(message),
            400 | 404 => ProviderError::rejected(message),
            429 => ProviderError::rate_limit(message),
            500..=599 => ProviderError::server_error(message),
            _ => ProviderError::unknown(message),
        }
    }
}

#[async_trait]
impl SmsProvider for TwilioProvider {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, ProviderError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", self.config.from.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_error(status, &body));
        }

        let resource: MessageResource = response.json().await.map_err(|e| {
            ProviderError::unknown(format!("Failed to parse Twilio response: {e}"))
        })?;

        Ok(SmsReceipt { sid: resource.sid })
    }

    fn name(&self) -> &str {
        "twilio"
    }
}
