//! API request and response types

use crate::state_machine::{
    Coordinates, LocationFailure, MenuCommand, MicStatus, Session, Toggle,
};
use crate::transcript::ChatMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================
// Relay
// ============================================================

/// Body of `POST /send-sms`
///
/// Fields are optional here so a missing field reports the same error as an
/// empty one.
#[derive(Debug, Deserialize)]
pub struct SendSmsRequest {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("number and message required")]
    MissingFields,
}

impl SendSmsRequest {
    /// `(number, message)`, both present and not blank
    pub fn validate(self) -> Result<(String, String), ValidationError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (present(self.number), present(self.message)) {
            (Some(number), Some(message)) => Ok((number, message)),
            _ => Err(ValidationError::MissingFields),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendSmsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendSmsResponse {
    pub fn sent(sid: String) -> Self {
        Self {
            success: true,
            sid: Some(sid),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sid: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================
// Chat
// ============================================================

/// Typed text or a speech-recognition transcript
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: MenuCommand,
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub option: usize,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub target: Toggle,
}

/// Geolocation outcome posted back by the page
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationReport {
    Found { latitude: f64, longitude: f64 },
    Failed { error: LocationFailure },
}

impl LocationReport {
    pub fn into_result(self) -> Result<Coordinates, LocationFailure> {
        match self {
            LocationReport::Found {
                latitude,
                longitude,
            } => Ok(Coordinates {
                latitude,
                longitude,
            }),
            LocationReport::Failed { error } => Err(error),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MicrophoneRequest {
    pub status: MicStatus,
}

/// Response with the session and the full transcript
#[derive(Debug, Serialize)]
pub struct ChatStateResponse {
    pub session: Session,
    pub messages: Vec<ChatMessage>,
}

/// Response for queued events
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
