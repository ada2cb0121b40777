//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use super::SseEvent;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// A line of speech for the client's synthesizer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechCue {
    pub text: String,
    /// BCP 47 tag, e.g. `en-IN`
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
}

/// A client capability that is not available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{feature} is not available")]
pub struct UnsupportedFeature {
    pub feature: &'static str,
}

/// Text-to-speech output
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak a cue; failure is never fatal to the chat
    async fn speak(&self, cue: SpeechCue) -> Result<(), UnsupportedFeature>;
}

#[async_trait]
impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    async fn speak(&self, cue: SpeechCue) -> Result<(), UnsupportedFeature> {
        (**self).speak(cue).await
    }
}

/// Speech delivered as `speak` events to connected browsers
pub struct BroadcastSpeech {
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl BroadcastSpeech {
    pub fn new(broadcast_tx: broadcast::Sender<SseEvent>) -> Self {
        Self { broadcast_tx }
    }
}

#[async_trait]
impl SpeechSynthesizer for BroadcastSpeech {
    async fn speak(&self, cue: SpeechCue) -> Result<(), UnsupportedFeature> {
        // No connected page means nobody can play it
        self.broadcast_tx
            .send(SseEvent::Speak(cue))
            .map(|_| ())
            .map_err(|_| UnsupportedFeature { feature: "speech" })
    }
}
