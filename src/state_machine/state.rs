//! Session state

use crate::content::Language;
use serde::{Deserialize, Serialize};

/// Where the next free-text input goes
///
/// At most one sub-flow holds the focus; free text is pattern-matched only
/// when the focus is `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Focus {
    /// No display name yet; the next text becomes the name
    #[default]
    AwaitingName,

    /// General pattern matching
    Idle,

    /// A roleplay scenario is waiting for the user's reply
    AwaitingRoleplay,

    /// "Is this bullying?" is waiting for a description
    AwaitingDescription,

    /// Quiz in progress; answers come as option selections
    AwaitingQuiz { index: usize, score: usize },
}

/// The single per-process conversation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub focus: Focus,
    pub user_name: Option<String>,
    pub language: Language,
    pub voice_enabled: bool,
    pub music_playing: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            focus: Focus::AwaitingName,
            user_name: None,
            language: Language::English,
            voice_enabled: true,
            music_playing: true,
        }
    }

    pub fn awaiting_name(&self) -> bool {
        matches!(self.focus, Focus::AwaitingName)
    }

    pub fn awaiting_roleplay(&self) -> bool {
        matches!(self.focus, Focus::AwaitingRoleplay)
    }

    pub fn awaiting_quiz(&self) -> bool {
        matches!(self.focus, Focus::AwaitingQuiz { .. })
    }

    /// `(index, score)` while a quiz is running
    #[cfg(test)]
    pub fn quiz_progress(&self) -> Option<(usize, usize)> {
        match self.focus {
            Focus::AwaitingQuiz { index, score } => Some((index, score)),
            _ => None,
        }
    }

    pub(crate) fn with_focus(&self, focus: Focus) -> Self {
        Self {
            focus,
            ..self.clone()
        }
    }
}
