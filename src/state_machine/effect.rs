//! Effects produced by state transitions

use crate::transcript::MessageBody;
use serde::Serialize;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Echo the user's input into the transcript
    RecordUser { text: String },

    /// Append a bot message (and speak it unless silent)
    Reply(BotMessage),

    /// Speech cue without a transcript entry
    Speak(Utterance),

    /// Everything after this marker waits for a "typing" pause
    Typing,

    /// Ask the knowledge lookup; the answer comes back as `LookupCompleted`
    Lookup { query: String },

    /// Ask the client for the device location
    RequestLocation,

    PlaySound(Sound),

    SetMusic { playing: bool },

    /// Offer a text file for download and link it in the transcript
    OfferDownload {
        filename: String,
        content: String,
        label: String,
    },
}

impl Effect {
    pub fn say(body: MessageBody) -> Self {
        Effect::Reply(BotMessage {
            body,
            speech: Speech::Auto,
        })
    }

    pub fn say_text(text: impl Into<String>) -> Self {
        Self::say(MessageBody::text(text))
    }

    pub fn say_silently(body: MessageBody) -> Self {
        Effect::Reply(BotMessage {
            body,
            speech: Speech::Silent,
        })
    }

    pub fn say_with(body: MessageBody, utterance: Utterance) -> Self {
        Effect::Reply(BotMessage {
            body,
            speech: Speech::Custom(utterance),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotMessage {
    pub body: MessageBody,
    pub speech: Speech,
}

/// How a bot message is voiced
#[derive(Debug, Clone, PartialEq)]
pub enum Speech {
    /// Speak the message's own text
    Auto,
    Silent,
    /// Speak something else, or with a different rate/pitch
    Custom(Utterance),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: 1.0,
            pitch: 1.0,
        }
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }
}

/// Short sound effects played by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    Clap,
    Siren,
}
