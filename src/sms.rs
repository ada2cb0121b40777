//! Outbound SMS for the relay endpoint
//!
//! The relay forwards one message per request to a provider; nothing is
//! retried or stored.

#[cfg(test)]
pub mod mock;
mod twilio;

pub use twilio::TwilioProvider;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Provider acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsReceipt {
    pub sid: String,
}

/// Provider failure, surfaced to the caller as `message`
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Auth, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Rejected, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::ServerError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unknown, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Could not reach the provider
    Network,
    /// Credentials refused (401, 403)
    Auth,
    /// Bad number or body (400, 404)
    Rejected,
    RateLimit,
    ServerError,
    Unknown,
}

/// Sends a text message to a phone number
#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, ProviderError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Provider credentials from the environment
#[derive(Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub api_base: String,
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from", &self.from)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SmsConfig {
    /// `None` unless the account SID, auth token and sender are all set
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            account_sid: get("TWILIO_ACCOUNT_SID")?,
            auth_token: get("TWILIO_AUTH_TOKEN")?,
            from: get("TWILIO_FROM")?,
            api_base: get("TWILIO_API_BASE")
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
        })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the provider, wrapped for logging
    pub fn provider(&self) -> Arc<dyn SmsProvider> {
        Arc::new(LoggingProvider::new(Arc::new(TwilioProvider::new(
            self.clone(),
        ))))
    }
}

/// Logging wrapper for SMS providers
///
/// Logs timing and outcome only; the recipient and the body stay out of logs.
pub struct LoggingProvider {
    inner: Arc<dyn SmsProvider>,
}

impl LoggingProvider {
    pub fn new(inner: Arc<dyn SmsProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SmsProvider for LoggingProvider {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, ProviderError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(to, body).await;
        let duration = start.elapsed();

        match &result {
            Ok(receipt) => {
                tracing::info!(
                    provider = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    sid = %receipt.sid,
                    "SMS sent"
                );
            }
            Err(e) => {
                tracing::error!(
                    provider = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "SMS send failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
