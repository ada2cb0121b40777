//! In-memory SMS provider for tests

use super::{ProviderError, SmsProvider, SmsReceipt};
use async_trait::async_trait;
use std::sync::Mutex;

/// Message captured by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct MockSmsProvider {
    sent: Mutex<Vec<SentSms>>,
    next_error: Mutex<Option<ProviderError>>,
}

impl MockSmsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next send with `error`
    pub fn fail_next(&self, error: ProviderError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsProvider for MockSmsProvider {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, ProviderError> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(SmsReceipt {
            sid: format!("SM{:04}", sent.len()),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
