//! Events that can occur in a conversation

use crate::lookup::LookupError;
use serde::{Deserialize, Serialize};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Page load: introduce the bot
    Start,

    // User events
    /// Typed text or a speech-recognition transcript
    UserText { text: String },
    Command(MenuCommand),
    /// Roleplay with a random draw; `roll` picks the scenario
    StartRoleplay { roll: usize },
    QuizAnswer { option: usize },
    Toggle(Toggle),
    MascotPoked,

    // Collaborator results
    LookupCompleted { result: Result<String, LookupError> },
    LocationResolved {
        result: Result<Coordinates, LocationFailure>,
    },
    Microphone(MicStatus),
}

/// Menu actions, invoked explicitly rather than pattern-matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCommand {
    ShowMenu,
    CalmDown,
    IsItBullying,
    Roleplay,
    Quiz,
    Pledge,
    ReportForm,
    Location,
}

impl MenuCommand {
    /// Buttons shown in the menu, in display order
    pub const MENU: [MenuCommand; 7] = [
        MenuCommand::CalmDown,
        MenuCommand::IsItBullying,
        MenuCommand::Roleplay,
        MenuCommand::Quiz,
        MenuCommand::Pledge,
        MenuCommand::ReportForm,
        MenuCommand::Location,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MenuCommand::ShowMenu => "show_menu",
            MenuCommand::CalmDown => "calm_down",
            MenuCommand::IsItBullying => "is_it_bullying",
            MenuCommand::Roleplay => "roleplay",
            MenuCommand::Quiz => "quiz",
            MenuCommand::Pledge => "pledge",
            MenuCommand::ReportForm => "report_form",
            MenuCommand::Location => "location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Voice,
    Music,
    Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={:.4},{:.4}",
            self.latitude, self.longitude
        )
    }
}

/// Why the device location could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum LocationFailure {
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("location permission denied or unavailable")]
    Denied,
}

/// Speech-recognition status reported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MicStatus {
    Listening,
    Unsupported,
    Failed,
}
