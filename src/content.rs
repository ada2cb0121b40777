//! String tables, quiz items, roleplay scenarios and keyword lists
//!
//! The built-in tables are embedded at compile time; a JSON file with the
//! same shape can replace them at startup (`BRAVE_BUDDY_CONTENT`).

use crate::classify::{KeywordLists, Lexicon};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const BUILTIN: &str = include_str!("content/default.json");

/// Which parallel string table and speech locale to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    /// Locale tag handed to the speech collaborator
    pub fn locale(self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Hindi => "hi-IN",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::English => Language::Hindi,
            Language::Hindi => Language::English,
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid content JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid keyword list: {0}")]
    Keywords(#[from] regex::Error),
    #[error("invalid content: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuLabels {
    pub calm_down: String,
    pub is_it_bullying: String,
    pub roleplay: String,
    pub quiz: String,
    pub pledge: String,
    pub report_form: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLabels {
    pub physical: String,
    pub verbal: String,
    pub cyber: String,
}

/// Every line the bot can say, for one language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strings {
    pub intro: String,
    pub nice_to_meet: String,
    pub help_reply: String,
    pub greeting_reply: String,
    pub distress_reply: String,
    pub menu: MenuLabels,
    pub calm_intro: String,
    pub calm_steps: String,
    pub calm_speech: String,
    pub describe_prompt: String,
    pub signs_detected: String,
    pub no_signs: String,
    pub categories: CategoryLabels,
    pub roleplay_intro: String,
    pub roleplay_scenarios: Vec<String>,
    pub roleplay_hint: String,
    pub roleplay_good: String,
    pub roleplay_improve: String,
    pub quiz_intro: String,
    pub quiz: Vec<QuizItem>,
    pub quiz_correct: String,
    pub quiz_wrong: String,
    /// `{score}` and `{total}` are substituted
    pub quiz_done: String,
    pub quiz_nudge: String,
    pub repeat_after_me: String,
    pub pledge: String,
    pub report_prompt: String,
    pub report_title: String,
    pub report_who: String,
    pub report_where: String,
    pub report_what: String,
    pub report_download: String,
    pub searching: String,
    pub no_answer: String,
    pub search_error: String,
    pub location_detecting: String,
    pub location_found: String,
    pub open_in_maps: String,
    pub location_unsupported: String,
    pub location_denied: String,
    pub mic_listening: String,
    pub mic_unsupported: String,
    pub mic_failed: String,
    pub voice_on: String,
    pub voice_off: String,
    pub language_set: String,
    pub mascot_warning: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    en: Strings,
    hi: Strings,
    keywords: KeywordLists,
}

/// Validated content with compiled keyword sets
#[derive(Debug, Clone)]
pub struct Content {
    english: Strings,
    hindi: Strings,
    lexicon: Lexicon,
}

impl Content {
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN)
    }

    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Load from `path` when given, otherwise the built-in tables
    pub fn load(path: Option<&Path>) -> Result<Self, ContentError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        let file: ContentFile = serde_json::from_str(raw)?;
        validate(&file)?;
        Ok(Self {
            lexicon: Lexicon::compile(&file.keywords)?,
            english: file.en,
            hindi: file.hi,
        })
    }

    pub fn strings(&self, language: Language) -> &Strings {
        match language {
            Language::English => &self.english,
            Language::Hindi => &self.hindi,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Number of quiz items (identical across languages)
    #[cfg(test)]
    pub fn quiz_len(&self) -> usize {
        self.english.quiz.len()
    }
}

fn validate(file: &ContentFile) -> Result<(), ContentError> {
    for (tag, strings) in [("en", &file.en), ("hi", &file.hi)] {
        if strings.quiz.is_empty() {
            return Err(ContentError::Invalid(format!("{tag}: quiz has no items")));
        }
        for (i, item) in strings.quiz.iter().enumerate() {
            if item.answer >= item.options.len() {
                return Err(ContentError::Invalid(format!(
                    "{tag}: quiz item {} answer {} is out of range ({} options)",
                    i + 1,
                    item.answer,
                    item.options.len()
                )));
            }
        }
        if strings.roleplay_scenarios.is_empty() {
            return Err(ContentError::Invalid(format!(
                "{tag}: no roleplay scenarios"
            )));
        }
    }

    // A language switch mid-quiz keeps the current index
    if file.en.quiz.len() != file.hi.quiz.len() {
        return Err(ContentError::Invalid(format!(
            "quiz length differs between languages ({} vs {})",
            file.en.quiz.len(),
            file.hi.quiz.len()
        )));
    }

    Ok(())
}
