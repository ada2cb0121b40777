//! Chat runtime executor

use super::traits::{SpeechCue, SpeechSynthesizer};
use super::SseEvent;

use crate::config::TypingDelay;
use crate::content::Content;
use crate::lookup::KnowledgeLookup;
use crate::state_machine::{
    transition, BotMessage, Effect, Event, Session, Speech, TransitionError, Utterance,
};
use crate::transcript::{ChatMessage, Export, MessageBody, Transcript};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns the session; the only writer of session and transcript
pub struct ChatRuntime {
    content: Arc<Content>,
    session: Session,
    session_tx: watch::Sender<Session>,
    transcript: Arc<Transcript>,
    lookup: Arc<dyn KnowledgeLookup>,
    speech: Arc<dyn SpeechSynthesizer>,
    typing: TypingDelay,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the runtime stops once every handle is gone
    event_tx: mpsc::WeakSender<Event>,
    /// Effects released after a typing pause
    deferred_tx: mpsc::UnboundedSender<Vec<Effect>>,
    deferred_rx: mpsc::UnboundedReceiver<Vec<Effect>>,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl ChatRuntime {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        content: Arc<Content>,
        session_tx: watch::Sender<Session>,
        transcript: Arc<Transcript>,
        lookup: Arc<dyn KnowledgeLookup>,
        speech: Arc<dyn SpeechSynthesizer>,
        typing: TypingDelay,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::WeakSender<Event>,
        broadcast_tx: broadcast::Sender<SseEvent>,
    ) -> Self {
        let (deferred_tx, deferred_rx) = mpsc::unbounded_channel();
        let session = session_tx.borrow().clone();
        Self {
            content,
            session,
            session_tx,
            transcript,
            lookup,
            speech,
            typing,
            event_rx,
            event_tx,
            deferred_tx,
            deferred_rx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting chat runtime");

        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    let Some(event) = event else { break };
                    if let Err(e) = self.process_event(event).await {
                        tracing::warn!(error = %e, "Event rejected");
                        let _ = self.broadcast_tx.send(SseEvent::Error {
                            message: e.to_string(),
                        });
                    }
                }
                Some(effects) = self.deferred_rx.recv() => {
                    self.run_effects(effects).await;
                }
            }
        }

        tracing::info!("Chat runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.session, &self.content, event)?;

        if result.new_state != self.session {
            tracing::debug!(focus = ?result.new_state.focus, "Session updated");
            self.session = result.new_state;
            self.session_tx.send_replace(self.session.clone());
        }

        self.run_effects(result.effects).await;
        Ok(())
    }

    /// Run effects in order; a `Typing` marker defers the rest
    async fn run_effects(&mut self, effects: Vec<Effect>) {
        let mut effects = effects.into_iter();
        while let Some(effect) = effects.next() {
            if effect == Effect::Typing {
                self.start_typing(effects.collect());
                return;
            }
            self.execute_effect(effect).await;
        }
    }

    fn start_typing(&self, rest: Vec<Effect>) {
        let _ = self.broadcast_tx.send(SseEvent::Typing);

        let delay = self.typing.sample();
        let deferred_tx = self.deferred_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = deferred_tx.send(rest);
        });
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RecordUser { text } => {
                self.append(ChatMessage::user(text)).await;
            }

            Effect::Reply(BotMessage { body, speech }) => {
                let utterance = match speech {
                    Speech::Auto => body.spoken_text().map(Utterance::new),
                    Speech::Silent => None,
                    Speech::Custom(utterance) => Some(utterance),
                };
                self.append(ChatMessage::bot(body)).await;
                if let Some(utterance) = utterance {
                    self.speak(utterance).await;
                }
            }

            Effect::Speak(utterance) => self.speak(utterance).await,

            // Handled by run_effects
            Effect::Typing => {}

            Effect::Lookup { query } => {
                let lookup = self.lookup.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = lookup.lookup(&query).await;
                    if let Some(event_tx) = event_tx.upgrade() {
                        let _ = event_tx.send(Event::LookupCompleted { result }).await;
                    }
                });
            }

            Effect::RequestLocation => {
                let _ = self.broadcast_tx.send(SseEvent::LocationRequest);
            }

            Effect::PlaySound(sound) => {
                let _ = self.broadcast_tx.send(SseEvent::Sound(sound));
            }

            Effect::SetMusic { playing } => {
                let _ = self.broadcast_tx.send(SseEvent::Music { playing });
            }

            Effect::OfferDownload {
                filename,
                content,
                label,
            } => {
                let export_id = self
                    .transcript
                    .store_export(Export {
                        filename: filename.clone(),
                        content,
                    })
                    .await;
                tracing::info!(%export_id, %filename, "Export stored");
                self.append(ChatMessage::bot(MessageBody::Download {
                    export_id,
                    filename,
                    label,
                }))
                .await;
            }
        }
    }

    async fn append(&self, message: ChatMessage) {
        self.transcript.push(message.clone()).await;
        let _ = self.broadcast_tx.send(SseEvent::Message { message });
    }

    /// Voice and locale are read when the cue goes out, not when it was queued
    async fn speak(&self, utterance: Utterance) {
        if !self.session.voice_enabled {
            return;
        }

        let cue = SpeechCue {
            text: utterance.text,
            locale: self.session.language.locale().to_string(),
            rate: utterance.rate,
            pitch: utterance.pitch,
        };
        if let Err(e) = self.speech.speak(cue).await {
            tracing::debug!(error = %e, "Speech skipped");
        }
    }
}
