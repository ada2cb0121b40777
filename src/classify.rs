//! Keyword heuristics behind the free-text dispatch
//!
//! None of this is a real classifier: the word lists are content, loaded
//! with the rest of the string tables, and false positives are expected.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Word lists as they appear in the content file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordLists {
    pub help: Vec<String>,
    pub greeting: Vec<String>,
    pub distress: Vec<String>,
    pub incident: Vec<String>,
    pub assertive: Vec<String>,
    pub physical: Vec<String>,
    pub verbal: Vec<String>,
    pub cyber: Vec<String>,
}

/// A set of terms matched as whole words (case-insensitive)
///
/// A term matches when it is not glued to another letter, mark or digit on
/// either side, so "hi" does not fire on "nothing" and "stop," still fires.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    pattern: Option<Regex>,
}

impl KeywordSet {
    pub fn new(terms: &[String]) -> Result<Self, regex::Error> {
        let alternation = normalize_terms(terms)
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(
            r"(?i)(?:^|[^\p{{L}}\p{{M}}\p{{N}}])(?:{alternation})(?:$|[^\p{{L}}\p{{M}}\p{{N}}])"
        ))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}

/// A set of terms matched by plain substring containment
#[derive(Debug, Clone)]
pub struct SubstringSet {
    terms: Vec<String>,
}

impl SubstringSet {
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: normalize_terms(terms),
        }
    }

    /// `lowered` must already be lower-cased
    fn contains_any(&self, lowered: &str) -> bool {
        self.terms.iter().any(|t| lowered.contains(t.as_str()))
    }
}

fn normalize_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Canned-response triggers for idle free text, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Looks like a description of an incident: run the bullying classifier
    Incident,
    Help,
    Greeting,
    Distress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BullyingCategory {
    Physical,
    Verbal,
    Cyber,
}

impl BullyingCategory {
    pub const ALL: [BullyingCategory; 3] = [Self::Physical, Self::Verbal, Self::Cyber];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleplayVerdict {
    Good,
    NeedsImprovement,
}

/// Compiled keyword sets
#[derive(Debug, Clone)]
pub struct Lexicon {
    help: KeywordSet,
    greeting: KeywordSet,
    distress: KeywordSet,
    incident: KeywordSet,
    assertive: KeywordSet,
    physical: SubstringSet,
    verbal: SubstringSet,
    cyber: SubstringSet,
}

impl Lexicon {
    pub fn compile(lists: &KeywordLists) -> Result<Self, regex::Error> {
        Ok(Self {
            help: KeywordSet::new(&lists.help)?,
            greeting: KeywordSet::new(&lists.greeting)?,
            distress: KeywordSet::new(&lists.distress)?,
            incident: KeywordSet::new(&lists.incident)?,
            assertive: KeywordSet::new(&lists.assertive)?,
            physical: SubstringSet::new(&lists.physical),
            verbal: SubstringSet::new(&lists.verbal),
            cyber: SubstringSet::new(&lists.cyber),
        })
    }

    /// First matching trigger, tested in a fixed order
    pub fn trigger(&self, text: &str) -> Option<Trigger> {
        [
            (Trigger::Incident, &self.incident),
            (Trigger::Help, &self.help),
            (Trigger::Greeting, &self.greeting),
            (Trigger::Distress, &self.distress),
        ]
        .into_iter()
        .find(|(_, set)| set.is_match(text))
        .map(|(trigger, _)| trigger)
    }

    /// Categories whose keywords appear anywhere in the text, in fixed order
    pub fn detect_bullying(&self, text: &str) -> Vec<BullyingCategory> {
        let lowered = text.to_lowercase();
        BullyingCategory::ALL
            .into_iter()
            .filter(|category| {
                let set = match category {
                    BullyingCategory::Physical => &self.physical,
                    BullyingCategory::Verbal => &self.verbal,
                    BullyingCategory::Cyber => &self.cyber,
                };
                set.contains_any(&lowered)
            })
            .collect()
    }

    pub fn classify_roleplay(&self, reply: &str) -> RoleplayVerdict {
        if self.assertive.is_match(reply) {
            RoleplayVerdict::Good
        } else {
            RoleplayVerdict::NeedsImprovement
        }
    }
}

/// A three-part incident report typed as separate lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub who: String,
    pub place: String,
    pub what: String,
}

/// Parse `who\nwhere\nwhat...`; needs at least three lines
///
/// Only the text as a whole is trimmed, so a blank line in the middle is an
/// empty field rather than a missing one.
pub fn parse_report(text: &str) -> Option<Report> {
    let lines: Vec<&str> = text.trim().split('\n').map(str::trim).collect();

    match lines.as_slice() {
        [who, place, what @ ..] if !what.is_empty() => Some(Report {
            who: (*who).to_string(),
            place: (*place).to_string(),
            what: what.join(" "),
        }),
        _ => None,
    }
}
