//! HTTP API: the chat page, its JSON endpoints, the event stream and the SMS relay

mod handlers;
mod page;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::ChatHandle;
use crate::sms::SmsProvider;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatHandle,
    /// `None` when the SMS credentials are not configured
    pub sms: Option<Arc<dyn SmsProvider>>,
}

impl AppState {
    pub fn new(chat: ChatHandle, sms: Option<Arc<dyn SmsProvider>>) -> Self {
        Self { chat, sms }
    }
}
