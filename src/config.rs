//! Process configuration from the environment

use crate::lookup::DEFAULT_LOOKUP_URL;
use crate::sms::SmsConfig;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TYPING_MIN_MS: u64 = 700;
const DEFAULT_TYPING_MAX_MS: u64 = 1600;

/// Range for the simulated "typing" pause before bot replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelay {
    pub min: Duration,
    pub max: Duration,
}

impl TypingDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Uniform pick in `[min, max]`
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_TYPING_MIN_MS),
            Duration::from_millis(DEFAULT_TYPING_MAX_MS),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// `None` when Twilio credentials are missing; the relay then answers 500
    pub sms: Option<SmsConfig>,
    pub lookup_url: String,
    pub typing: TypingDelay,
    /// JSON file replacing the built-in content
    pub content_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("BRAVE_BUDDY_PORT")
            .or_else(|| var("PORT"))
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let millis = |key: &str, default: u64| {
            Duration::from_millis(
                var(key)
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(default),
            )
        };
        let typing = TypingDelay::new(
            millis("BRAVE_BUDDY_TYPING_MIN_MS", DEFAULT_TYPING_MIN_MS),
            millis("BRAVE_BUDDY_TYPING_MAX_MS", DEFAULT_TYPING_MAX_MS),
        );

        Self {
            port,
            sms: SmsConfig::from_vars(&var),
            lookup_url: var("BRAVE_BUDDY_LOOKUP_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string()),
            typing,
            content_path: var("BRAVE_BUDDY_CONTENT")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}
