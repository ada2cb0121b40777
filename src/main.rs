//! Brave Buddy - a kid-friendly anti-bullying chat companion
//!
//! Serves the chat page, drives the conversation state machine and relays
//! emergency text messages through an SMS provider.

mod api;
mod classify;
mod config;
mod content;
mod lookup;
mod render;
mod runtime;
mod sms;
mod state_machine;
mod transcript;

use api::{create_router, AppState};
use config::Config;
use content::Content;
use lookup::{DuckDuckGoLookup, LoggingLookup};
use runtime::ChatHandle;
use state_machine::Event;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brave_buddy=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    let content = Arc::new(Content::load(config.content_path.as_deref())?);
    tracing::info!(
        source = config
            .content_path
            .as_ref()
            .map_or_else(|| "builtin".to_string(), |p| p.display().to_string()),
        "Content loaded"
    );

    let lookup = Arc::new(LoggingLookup::new(Arc::new(DuckDuckGoLookup::new(
        config.lookup_url.clone(),
    ))));

    let chat = ChatHandle::spawn(content, lookup, config.typing);
    chat.send(Event::Start).await?;

    let sms = config.sms.map(|sms| sms.provider());
    if sms.is_none() {
        tracing::warn!(
            "No SMS credentials configured. Set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM."
        );
    }

    let state = AppState::new(chat, sms);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Brave Buddy server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
