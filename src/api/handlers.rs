//! HTTP request handlers

use super::page::chat_page;
use super::sse::{sse_stream, InitSnapshot};
use super::types::{
    ChatRequest, ChatStateResponse, CommandRequest, ErrorResponse, LocationReport,
    MicrophoneRequest, QueuedResponse, QuizRequest, SendSmsRequest, SendSmsResponse,
    ToggleRequest, ValidationError,
};
use super::AppState;
use crate::render::render_transcript;
use crate::runtime::RuntimeError;
use crate::sms::ProviderError;
use crate::state_machine::Event;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use thiserror::Error;
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_page))
        // Relay
        .route("/send-sms", post(send_sms))
        // Chat state and input
        .route("/api/chat", get(get_chat).post(send_chat))
        .route("/api/chat/command", post(send_command))
        .route("/api/chat/quiz", post(answer_quiz))
        .route("/api/chat/toggle", post(toggle))
        .route("/api/chat/mascot", post(poke_mascot))
        // Client capability results
        .route("/api/chat/location", post(report_location))
        .route("/api/chat/microphone", post(report_microphone))
        // Output
        .route("/api/chat/render", get(render_chat))
        .route("/api/chat/stream", get(stream_chat))
        .route("/api/chat/exports/:id", get(download_export))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn serve_page() -> Html<String> {
    Html(chat_page().into_string())
}

// ============================================================
// Relay
// ============================================================

async fn send_sms(
    State(state): State<AppState>,
    payload: Result<Json<SendSmsRequest>, JsonRejection>,
) -> Result<Json<SendSmsResponse>, RelayError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "Unreadable relay request");
        ValidationError::MissingFields
    })?;
    let (number, message) = request.validate()?;

    let provider = state.sms.as_ref().ok_or(RelayError::NotConfigured)?;
    let receipt = provider.send(&number, &message).await?;

    Ok(Json(SendSmsResponse::sent(receipt.sid)))
}

#[derive(Debug, Error)]
enum RelayError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("SMS provider is not configured")]
    NotConfigured,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::Invalid(_) => StatusCode::BAD_REQUEST,
            RelayError::NotConfigured | RelayError::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(SendSmsResponse::failed(self.to_string()))).into_response()
    }
}

// ============================================================
// Chat
// ============================================================

async fn get_chat(State(state): State<AppState>) -> Json<ChatStateResponse> {
    Json(ChatStateResponse {
        session: state.chat.session(),
        messages: state.chat.messages().await,
    })
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be blank".to_string()));
    }
    queue(&state, Event::UserText { text: req.text }).await
}

async fn send_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    state.chat.command(req.command).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

async fn answer_quiz(
    State(state): State<AppState>,
    Json(req): Json<QuizRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, Event::QuizAnswer { option: req.option }).await
}

async fn toggle(
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, Event::Toggle(req.target)).await
}

async fn poke_mascot(State(state): State<AppState>) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, Event::MascotPoked).await
}

async fn report_location(
    State(state): State<AppState>,
    Json(report): Json<LocationReport>,
) -> Result<Json<QueuedResponse>, AppError> {
    let event = Event::LocationResolved {
        result: report.into_result(),
    };
    queue(&state, event).await
}

async fn report_microphone(
    State(state): State<AppState>,
    Json(req): Json<MicrophoneRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, Event::Microphone(req.status)).await
}

async fn queue(state: &AppState, event: Event) -> Result<Json<QueuedResponse>, AppError> {
    state.chat.send(event).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

async fn render_chat(State(state): State<AppState>) -> Html<String> {
    Html(render_transcript(&state.chat.messages().await))
}

async fn stream_chat(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe first so nothing falls between the snapshot and the stream
    let broadcast_rx = state.chat.subscribe();
    let init = InitSnapshot {
        session: state.chat.session(),
        messages: state.chat.messages().await,
    };
    sse_stream(init, broadcast_rx)
}

async fn download_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let export = state
        .chat
        .export(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Export not found: {id}")))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export.filename.replace(['"', '\\'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

async fn get_version() -> &'static str {
    concat!("brave-buddy ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        AppError::Unavailable(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
