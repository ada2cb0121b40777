//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use super::{ChatHandle, SseEvent};
use crate::config::TypingDelay;
use crate::content::Content;
use crate::lookup::{KnowledgeLookup, LookupError};
use crate::transcript::{ChatMessage, MessageBody};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Mock Lookup
// ============================================================================

/// Lookup that returns queued results, then `NoAnswer`
#[derive(Default)]
pub struct MockLookup {
    results: Mutex<VecDeque<Result<String, LookupError>>>,
    queries: Mutex<Vec<String>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_answer(&self, answer: impl Into<String>) {
        self.results.lock().unwrap().push_back(Ok(answer.into()));
    }

    pub fn queue_error(&self, error: LookupError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeLookup for MockLookup {
    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LookupError::NoAnswer))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Recording Speech
// ============================================================================

#[derive(Default)]
pub struct RecordingSpeech {
    cues: Mutex<Vec<SpeechCue>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<SpeechCue> {
        self.cues.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.cues().into_iter().map(|c| c.text).collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeech {
    async fn speak(&self, cue: SpeechCue) -> Result<(), UnsupportedFeature> {
        self.cues.lock().unwrap().push(cue);
        Ok(())
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// Helper for running a chat with mocks and no typing pause
pub struct TestChat {
    pub handle: ChatHandle,
    pub lookup: Arc<MockLookup>,
    pub speech: Arc<RecordingSpeech>,
    pub events: broadcast::Receiver<SseEvent>,
}

impl TestChat {
    pub fn new() -> Self {
        Self::with_typing(TypingDelay::none())
    }

    pub fn with_typing(typing: TypingDelay) -> Self {
        let content = Arc::new(Content::builtin().unwrap());
        let lookup = Arc::new(MockLookup::new());
        let speech = Arc::new(RecordingSpeech::new());
        let (broadcast_tx, events) = broadcast::channel(256);
        let handle = ChatHandle::spawn_with(
            content,
            lookup.clone(),
            speech.clone(),
            typing,
            broadcast_tx,
        );
        Self {
            handle,
            lookup,
            speech,
            events,
        }
    }

    /// Poll until the transcript holds at least `count` messages
    pub async fn wait_for_messages(&self, count: usize, timeout: Duration) -> Vec<ChatMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let messages = self.handle.messages().await;
            if messages.len() >= count || tokio::time::Instant::now() >= deadline {
                return messages;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Poll until at least `count` speech cues were recorded
    pub async fn wait_for_cues(&self, count: usize, timeout: Duration) -> Vec<SpeechCue> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let cues = self.speech.cues();
            if cues.len() >= count || tokio::time::Instant::now() >= deadline {
                return cues;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Wait for the next stream event matching `pred`
    pub async fn wait_for_event(
        &mut self,
        pred: impl Fn(&SseEvent) -> bool,
        timeout: Duration,
    ) -> Option<SseEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.events.recv()).await {
                Ok(Ok(event)) if pred(&event) => return Some(event),
                _ => continue,
            }
        }
        None
    }
}

pub fn texts(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match &m.body {
            MessageBody::Text { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Language;
    use crate::state_machine::{Event, MenuCommand, Sound, Toggle};
    use crate::transcript::Role;

    const WAIT: Duration = Duration::from_secs(2);

    fn user_text(text: &str) -> Event {
        Event::UserText {
            text: text.to_string(),
        }
    }

    async fn named_chat() -> TestChat {
        let chat = TestChat::new();
        chat.handle.send(Event::Start).await.unwrap();
        chat.handle.send(user_text("Sam")).await.unwrap();
        // intro, user name, greeting, menu; the intro and greeting are spoken
        chat.wait_for_messages(4, WAIT).await;
        chat.wait_for_cues(2, WAIT).await;
        chat
    }

    #[tokio::test]
    async fn test_name_capture_end_to_end() {
        let chat = named_chat().await;

        let messages = chat.handle.messages().await;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, Role::User);
        assert!(matches!(&messages[2].body, MessageBody::Greeting { name, .. } if name == "Sam"));
        assert!(matches!(&messages[3].body, MessageBody::Menu { .. }));
        assert_eq!(chat.handle.session().user_name.as_deref(), Some("Sam"));

        // Menu is silent; the intro and the greeting are spoken
        assert_eq!(
            chat.speech.spoken(),
            vec![
                "👋 Hi! I am Brave Buddy. Tell me your name to start.",
                "Nice to meet you, Sam!"
            ]
        );
    }

    #[tokio::test]
    async fn test_lookup_result_arrives_after_searching() {
        let chat = named_chat().await;
        chat.lookup.queue_answer("A rainbow is an optical phenomenon.");

        chat.handle.send(user_text("what is a rainbow")).await.unwrap();
        let messages = chat.wait_for_messages(7, WAIT).await;

        assert_eq!(
            texts(&messages[4..]),
            vec![
                "what is a rainbow",
                "🔎 Searching...",
                "A rainbow is an optical phenomenon."
            ]
        );
        assert_eq!(chat.lookup.queries(), vec!["what is a rainbow"]);
    }

    #[tokio::test]
    async fn test_lookup_failure_apologizes() {
        let chat = named_chat().await;
        chat.lookup
            .queue_error(LookupError::Request("timeout".to_string()));

        chat.handle.send(user_text("tell me about volcanoes")).await.unwrap();
        let messages = chat.wait_for_messages(7, WAIT).await;
        assert_eq!(
            texts(&messages).last().map(String::as_str),
            Some("⚠️ Error searching. Try a different query.")
        );
    }

    #[tokio::test]
    async fn test_typed_replies_wait_for_the_pause() {
        let pause = Duration::from_millis(200);
        let chat = TestChat::with_typing(TypingDelay::new(pause, pause));
        chat.handle.send(user_text("Sam")).await.unwrap();

        // The user's message lands at once, the greeting only after the pause
        let early = chat.wait_for_messages(1, WAIT).await;
        assert_eq!(early.len(), 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(chat.handle.messages().await.len(), 1);

        let later = chat.wait_for_messages(3, WAIT).await;
        assert_eq!(later.len(), 3);
    }

    #[tokio::test]
    async fn test_muted_voice_speaks_nothing() {
        let chat = named_chat().await;
        let spoken_before = chat.speech.cues().len();

        chat.handle.send(Event::Toggle(Toggle::Voice)).await.unwrap();
        chat.handle.send(user_text("hello")).await.unwrap();
        chat.wait_for_messages(7, WAIT).await;

        assert!(!chat.handle.session().voice_enabled);
        assert_eq!(chat.speech.cues().len(), spoken_before);
    }

    #[tokio::test]
    async fn test_hindi_speech_uses_hindi_locale() {
        let chat = named_chat().await;
        chat.handle.send(Event::Toggle(Toggle::Language)).await.unwrap();
        let mut cues = chat.wait_for_cues(3, WAIT).await;

        let last = cues.pop().unwrap();
        assert_eq!(last.locale, "hi-IN");
        assert_eq!(last.text, "भाषा हिंदी में सेट");
    }

    #[tokio::test]
    async fn test_report_creates_download() {
        let chat = named_chat().await;
        chat.handle
            .send(user_text("Alex\nPlayground\nHe pushed me"))
            .await
            .unwrap();
        let messages = chat.wait_for_messages(7, WAIT).await;

        let export_id = messages
            .iter()
            .find_map(|m| match &m.body {
                MessageBody::Download { export_id, .. } => Some(*export_id),
                _ => None,
            })
            .unwrap();
        let export = chat.handle.export(export_id).await.unwrap();
        assert_eq!(export.filename, "Bullying_Report.txt");
        assert!(export.content.starts_with("Bullying Report:\nWho: Alex"));
    }

    #[tokio::test]
    async fn test_quiz_correct_answer_plays_clap() {
        let mut chat = named_chat().await;
        chat.handle.command(MenuCommand::Quiz).await.unwrap();
        chat.handle
            .send(Event::QuizAnswer { option: 2 })
            .await
            .unwrap();

        let clap = chat
            .wait_for_event(|e| matches!(e, SseEvent::Sound(Sound::Clap)), WAIT)
            .await;
        assert!(clap.is_some());
    }

    #[tokio::test]
    async fn test_rejected_event_reports_error() {
        let mut chat = TestChat::new();
        chat.handle.command(MenuCommand::Pledge).await.unwrap();

        let error = chat
            .wait_for_event(|e| matches!(e, SseEvent::Error { .. }), WAIT)
            .await;
        assert!(
            matches!(error, Some(SseEvent::Error { message }) if message == "Tell me your name first")
        );
        assert!(chat.handle.session().awaiting_name());
    }

    #[tokio::test]
    async fn test_roleplay_command_draws_a_scenario() {
        let chat = named_chat().await;
        chat.handle.command(MenuCommand::Roleplay).await.unwrap();
        let messages = chat.wait_for_messages(7, WAIT).await;

        assert!(chat.handle.session().awaiting_roleplay());
        let content = Content::builtin().unwrap();
        let scenarios = &content.strings(Language::English).roleplay_scenarios;
        assert!(texts(&messages).iter().any(|t| scenarios.contains(t)));
    }

    #[tokio::test]
    async fn test_runtime_stops_when_handles_drop() {
        let TestChat {
            handle, mut events, ..
        } = TestChat::new();
        drop(handle);

        // The runtime holds the last broadcast sender, so the stream closes once it exits
        let stopped = tokio::time::timeout(WAIT, async {
            while !matches!(
                events.recv().await,
                Err(broadcast::error::RecvError::Closed)
            ) {}
        })
        .await;
        assert!(stopped.is_ok());
    }
}
