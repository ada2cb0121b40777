//! Chat messages and the append-only transcript

use crate::state_machine::event::MenuCommand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub command: MenuCommand,
    pub label: String,
}

/// Typed message content; rendering escapes every string field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Text {
        text: String,
    },
    /// "Nice to meet you, **name**!"
    Greeting {
        prefix: String,
        name: String,
    },
    Menu {
        items: Vec<MenuItem>,
    },
    QuizQuestion {
        /// 1-based
        number: usize,
        prompt: String,
        options: Vec<String>,
    },
    Pledge {
        lead: String,
        pledge: String,
    },
    /// Preformatted report summary
    Report {
        text: String,
    },
    Download {
        export_id: Uuid,
        filename: String,
        label: String,
    },
    Location {
        label: String,
        latitude: f64,
        longitude: f64,
        link_label: String,
    },
}

impl MessageBody {
    pub fn text(text: impl Into<String>) -> Self {
        MessageBody::Text { text: text.into() }
    }

    /// Plain text for the speech collaborator; `None` for non-verbal bodies
    pub fn spoken_text(&self) -> Option<String> {
        let raw = match self {
            MessageBody::Text { text } | MessageBody::Report { text } => text.clone(),
            MessageBody::Greeting { prefix, name } => format!("{prefix} {name}!"),
            MessageBody::QuizQuestion {
                number,
                prompt,
                options,
            } => {
                let options = options
                    .iter()
                    .enumerate()
                    .map(|(i, o)| format!("{}. {o}", i + 1))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("Q{number}: {prompt} {options}")
            }
            MessageBody::Pledge { lead, pledge } => format!("{lead} {pledge}"),
            MessageBody::Location {
                label,
                latitude,
                longitude,
                ..
            } => format!("{label} {latitude:.4}, {longitude:.4}"),
            MessageBody::Menu { .. } | MessageBody::Download { .. } => return None,
        };

        let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, body: MessageBody) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            body,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageBody::text(text))
    }

    pub fn bot(body: MessageBody) -> Self {
        Self::new(Role::Bot, body)
    }
}

/// A text file offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub content: String,
}

/// Append-only message list plus downloadable exports
///
/// The chat runtime is the only writer; handlers only read.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: RwLock<Vec<ChatMessage>>,
    exports: RwLock<HashMap<Uuid, Export>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, message: ChatMessage) {
        self.messages.write().await.push(message);
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    pub async fn store_export(&self, export: Export) -> Uuid {
        let id = Uuid::new_v4();
        self.exports.write().await.insert(id, export);
        id
    }

    pub async fn export(&self, id: Uuid) -> Option<Export> {
        self.exports.read().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_text_collapses_whitespace() {
        let body = MessageBody::text("🌬️ Inhale — Hold — Exhale\n(Repeat   a few times)");
        assert_eq!(
            body.spoken_text().as_deref(),
            Some("🌬️ Inhale — Hold — Exhale (Repeat a few times)")
        );
    }

    #[test]
    fn test_menu_and_download_are_not_spoken() {
        assert_eq!(MessageBody::Menu { items: vec![] }.spoken_text(), None);
        let download = MessageBody::Download {
            export_id: Uuid::new_v4(),
            filename: "r.txt".to_string(),
            label: "Download".to_string(),
        };
        assert_eq!(download.spoken_text(), None);
        assert_eq!(MessageBody::text("   ").spoken_text(), None);
    }

    #[test]
    fn test_quiz_question_is_spoken_with_numbered_options() {
        let body = MessageBody::QuizQuestion {
            number: 1,
            prompt: "Which is bullying?".to_string(),
            options: vec!["Teasing once".to_string(), "Repeatedly making fun".to_string()],
        };
        assert_eq!(
            body.spoken_text().as_deref(),
            Some("Q1: Which is bullying? 1. Teasing once 2. Repeatedly making fun")
        );
    }

    #[tokio::test]
    async fn test_transcript_appends_in_order() {
        let transcript = Transcript::new();
        transcript.push(ChatMessage::user("first")).await;
        transcript
            .push(ChatMessage::bot(MessageBody::text("second")))
            .await;

        let messages = transcript.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].body, MessageBody::text("second"));
    }

    #[tokio::test]
    async fn test_exports_round_trip_by_id() {
        let transcript = Transcript::new();
        let id = transcript
            .store_export(Export {
                filename: "Bullying_Report.txt".to_string(),
                content: "Bullying Report:".to_string(),
            })
            .await;

        assert_eq!(
            transcript.export(id).await.map(|e| e.filename),
            Some("Bullying_Report.txt".to_string())
        );
        assert!(transcript.export(Uuid::new_v4()).await.is_none());
    }
}
