//! Runtime for the chat session
//!
//! A single actor task owns the session and feeds events through the pure
//! state machine; handlers talk to it through a cloneable [`ChatHandle`].

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;
pub use traits::*;

use crate::config::TypingDelay;
use crate::content::Content;
use crate::lookup::KnowledgeLookup;
use crate::state_machine::{Event, MenuCommand, Session, Sound};
use crate::transcript::{ChatMessage, Export, Transcript};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 64;
const BROADCAST_CAPACITY: usize = 256;

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Message { message: ChatMessage },
    /// The bot is "typing"; the next replies follow after a pause
    Typing,
    Speak(SpeechCue),
    Sound(Sound),
    Music { playing: bool },
    /// The page should read the device location and post it back
    LocationRequest,
    Error { message: String },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Chat runtime is not running")]
    Stopped,
}

/// Handle to interact with the running chat
#[derive(Clone)]
pub struct ChatHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    session_rx: watch::Receiver<Session>,
    transcript: Arc<Transcript>,
}

impl ChatHandle {
    /// Spawn the runtime with speech delivered over the event stream
    pub fn spawn(
        content: Arc<Content>,
        lookup: Arc<dyn KnowledgeLookup>,
        typing: TypingDelay,
    ) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let speech = Arc::new(BroadcastSpeech::new(broadcast_tx.clone()));
        Self::spawn_with(content, lookup, speech, typing, broadcast_tx)
    }

    pub fn spawn_with(
        content: Arc<Content>,
        lookup: Arc<dyn KnowledgeLookup>,
        speech: Arc<dyn SpeechSynthesizer>,
        typing: TypingDelay,
        broadcast_tx: broadcast::Sender<SseEvent>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        let (session_tx, session_rx) = watch::channel(Session::new());
        let transcript = Arc::new(Transcript::new());

        let runtime = ChatRuntime::new(
            content,
            session_tx,
            transcript.clone(),
            lookup,
            speech,
            typing,
            event_rx,
            event_tx.downgrade(),
            broadcast_tx.clone(),
        );
        tokio::spawn(runtime.run());

        Self {
            event_tx,
            broadcast_tx,
            session_rx,
            transcript,
        }
    }

    pub async fn send(&self, event: Event) -> Result<(), RuntimeError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Run a menu command; roleplay draws its scenario at random
    pub async fn command(&self, command: MenuCommand) -> Result<(), RuntimeError> {
        let event = match command {
            MenuCommand::Roleplay => Event::StartRoleplay {
                roll: rand::thread_rng().gen(),
            },
            other => Event::Command(other),
        };
        self.send(event).await
    }

    pub fn session(&self) -> Session {
        self.session_rx.borrow().clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.messages().await
    }

    pub async fn export(&self, id: Uuid) -> Option<Export> {
        self.transcript.export(id).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.broadcast_tx.subscribe()
    }
}
