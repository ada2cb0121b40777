//! Pure state transition function
//!
//! Given the same session, content and event this always produces the same
//! new session and effects; timers, speech, lookups and the transcript live
//! in the runtime.

use super::effect::{Effect, Sound, Utterance};
use super::event::{Event, LocationFailure, MenuCommand, MicStatus, Toggle};
use super::state::{Focus, Session};
use crate::classify::{parse_report, BullyingCategory, Report, RoleplayVerdict, Trigger};
use crate::content::{Content, MenuLabels, Strings};
use crate::lookup::LookupError;
use crate::transcript::{MenuItem, MessageBody};
use thiserror::Error;

pub const REPORT_FILENAME: &str = "Bullying_Report.txt";
const PLEDGE_RATE: f32 = 0.95;
const MASCOT_PITCH: f32 = 0.7;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Tell me your name first")]
    NameRequired,
    #[error("No quiz is running")]
    NoQuiz,
    #[error("Quiz option {option} does not exist (the question has {count} options)")]
    OptionOutOfRange { option: usize, count: usize },
}

/// Pure transition function
pub fn transition(
    session: &Session,
    content: &Content,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let strings = content.strings(session.language);

    match (&session.focus, event) {
        (_, Event::Start) => {
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::say_text(&strings.intro)))
        }

        // ============================================================
        // Name capture
        // ============================================================
        (Focus::AwaitingName, Event::UserText { text }) => {
            let greeting = MessageBody::Greeting {
                prefix: strings.nice_to_meet.clone(),
                name: text.clone(),
            };
            let new_state = Session {
                focus: Focus::Idle,
                user_name: Some(text.clone()),
                ..session.clone()
            };

            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::RecordUser { text })
                .with_effect(Effect::Typing)
                .with_effect(Effect::say(greeting))
                .with_effect(Effect::say_silently(menu(strings))))
        }

        (Focus::AwaitingName, Event::Command(_) | Event::StartRoleplay { .. }) => {
            Err(TransitionError::NameRequired)
        }

        // ============================================================
        // Sub-flows holding the focus
        // ============================================================
        (Focus::AwaitingRoleplay, Event::UserText { text }) => {
            let reply = match content.lexicon().classify_roleplay(&text) {
                RoleplayVerdict::Good => &strings.roleplay_good,
                RoleplayVerdict::NeedsImprovement => &strings.roleplay_improve,
            };

            Ok(TransitionResult::new(session.with_focus(Focus::Idle))
                .with_effect(Effect::RecordUser { text })
                .with_effect(Effect::Typing)
                .with_effect(Effect::say_text(reply)))
        }

        (Focus::AwaitingDescription, Event::UserText { text }) => {
            let reply = classification_message(content, strings, &text);

            Ok(TransitionResult::new(session.with_focus(Focus::Idle))
                .with_effect(Effect::RecordUser { text })
                .with_effect(Effect::Typing)
                .with_effect(Effect::say_text(reply)))
        }

        (Focus::AwaitingQuiz { index, score }, Event::UserText { text }) => {
            let option_count = strings.quiz.get(*index).map_or(0, |q| q.options.len());

            match parse_option_number(&text, option_count) {
                Some(option) => {
                    let answered = answer_quiz(session, strings, *index, *score, option)?;
                    Ok(TransitionResult::new(answered.new_state)
                        .with_effect(Effect::RecordUser { text })
                        .with_effects(answered.effects))
                }
                None => Ok(TransitionResult::new(session.clone())
                    .with_effect(Effect::RecordUser { text })
                    .with_effect(Effect::say_text(&strings.quiz_nudge))),
            }
        }

        (Focus::AwaitingQuiz { index, score }, Event::QuizAnswer { option }) => {
            answer_quiz(session, strings, *index, *score, option)
        }

        (_, Event::QuizAnswer { .. }) => Err(TransitionError::NoQuiz),

        (Focus::Idle, Event::UserText { text }) => {
            Ok(respond_to_free_text(session, content, strings, text))
        }

        // ============================================================
        // Menu commands
        // ============================================================
        (_, Event::Command(command)) => Ok(run_command(session, strings, command)),

        (_, Event::StartRoleplay { roll }) => Ok(start_roleplay(session, strings, roll)),

        // ============================================================
        // Toggles
        // ============================================================
        (_, Event::Toggle(toggle)) => Ok(apply_toggle(session, content, toggle)),

        (_, Event::MascotPoked) => Ok(TransitionResult::new(session.clone())
            .with_effect(Effect::Typing)
            .with_effect(Effect::say_with(
                MessageBody::text(&strings.mascot_warning),
                Utterance::new(&strings.mascot_warning).with_pitch(MASCOT_PITCH),
            ))
            .with_effect(Effect::PlaySound(Sound::Siren))),

        // ============================================================
        // Collaborator results
        // ============================================================
        (_, Event::LookupCompleted { result }) => {
            let text = match result {
                Ok(summary) => summary,
                Err(LookupError::NoAnswer) => strings.no_answer.clone(),
                Err(_) => strings.search_error.clone(),
            };
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::say_text(text)))
        }

        (_, Event::LocationResolved { result }) => {
            let effect = match result {
                Ok(coords) => Effect::say(MessageBody::Location {
                    label: strings.location_found.clone(),
                    latitude: coords.latitude,
                    longitude: coords.longitude,
                    link_label: strings.open_in_maps.clone(),
                }),
                Err(LocationFailure::Unsupported) => Effect::say_text(&strings.location_unsupported),
                Err(LocationFailure::Denied) => Effect::say_text(&strings.location_denied),
            };
            Ok(TransitionResult::new(session.clone()).with_effect(effect))
        }

        (_, Event::Microphone(status)) => {
            let effect = match status {
                MicStatus::Listening => Effect::say_text(&strings.mic_listening),
                MicStatus::Unsupported => Effect::say_text(&strings.mic_unsupported),
                MicStatus::Failed => Effect::say_text(&strings.mic_failed),
            };
            Ok(TransitionResult::new(session.clone()).with_effect(effect))
        }
    }
}

// Helper functions

fn respond_to_free_text(
    session: &Session,
    content: &Content,
    strings: &Strings,
    text: String,
) -> TransitionResult {
    let result = TransitionResult::new(session.clone()).with_effect(Effect::RecordUser {
        text: text.clone(),
    });

    if let Some(report) = parse_report(&text) {
        let summary = format_report(strings, &report);
        return result
            .with_effect(Effect::say(MessageBody::Report {
                text: summary.clone(),
            }))
            .with_effect(Effect::OfferDownload {
                filename: REPORT_FILENAME.to_string(),
                content: summary,
                label: strings.report_download.clone(),
            });
    }

    let result = result.with_effect(Effect::Typing);
    match content.lexicon().trigger(&text) {
        Some(Trigger::Incident) => result.with_effect(Effect::say_text(classification_message(
            content, strings, &text,
        ))),
        Some(Trigger::Help) => result.with_effect(Effect::say_text(&strings.help_reply)),
        Some(Trigger::Greeting) => result.with_effect(Effect::say_text(&strings.greeting_reply)),
        Some(Trigger::Distress) => result.with_effect(Effect::say_text(&strings.distress_reply)),
        None => result
            .with_effect(Effect::say_text(&strings.searching))
            .with_effect(Effect::Lookup { query: text }),
    }
}

fn run_command(session: &Session, strings: &Strings, command: MenuCommand) -> TransitionResult {
    match command {
        MenuCommand::ShowMenu => TransitionResult::new(session.clone())
            .with_effect(Effect::say_silently(menu(strings))),

        MenuCommand::CalmDown => TransitionResult::new(session.clone())
            .with_effect(Effect::Typing)
            .with_effect(Effect::say_text(&strings.calm_intro))
            .with_effect(Effect::say_silently(MessageBody::text(&strings.calm_steps)))
            .with_effect(Effect::Speak(Utterance::new(&strings.calm_speech))),

        MenuCommand::IsItBullying => {
            TransitionResult::new(session.with_focus(Focus::AwaitingDescription))
                .with_effect(Effect::Typing)
                .with_effect(Effect::say_text(&strings.describe_prompt))
        }

        MenuCommand::Roleplay => start_roleplay(session, strings, 0),

        MenuCommand::Quiz => {
            TransitionResult::new(session.with_focus(Focus::AwaitingQuiz { index: 0, score: 0 }))
                .with_effect(Effect::Typing)
                .with_effect(Effect::say_text(&strings.quiz_intro))
                .with_effects(quiz_question(strings, 0).map(Effect::say))
        }

        MenuCommand::Pledge => TransitionResult::new(session.clone())
            .with_effect(Effect::Typing)
            .with_effect(Effect::say_with(
                MessageBody::Pledge {
                    lead: strings.repeat_after_me.clone(),
                    pledge: strings.pledge.clone(),
                },
                Utterance::new(&strings.pledge).with_rate(PLEDGE_RATE),
            )),

        // Reports are parsed from idle free text
        MenuCommand::ReportForm => TransitionResult::new(session.with_focus(Focus::Idle))
            .with_effect(Effect::Typing)
            .with_effect(Effect::say_text(&strings.report_prompt)),

        MenuCommand::Location => TransitionResult::new(session.clone())
            .with_effect(Effect::RequestLocation)
            .with_effect(Effect::Typing)
            .with_effect(Effect::say_text(&strings.location_detecting)),
    }
}

fn start_roleplay(session: &Session, strings: &Strings, roll: usize) -> TransitionResult {
    let scenarios = &strings.roleplay_scenarios;
    let scenario = scenarios.get(roll % scenarios.len().max(1));

    TransitionResult::new(session.with_focus(Focus::AwaitingRoleplay))
        .with_effect(Effect::Typing)
        .with_effect(Effect::say_text(&strings.roleplay_intro))
        .with_effects(scenario.map(Effect::say_text))
        .with_effect(Effect::say_text(&strings.roleplay_hint))
}

fn answer_quiz(
    session: &Session,
    strings: &Strings,
    index: usize,
    score: usize,
    option: usize,
) -> Result<TransitionResult, TransitionError> {
    let item = strings.quiz.get(index).ok_or(TransitionError::NoQuiz)?;
    if option >= item.options.len() {
        return Err(TransitionError::OptionOutOfRange {
            option,
            count: item.options.len(),
        });
    }

    let correct = option == item.answer;
    let score = score + usize::from(correct);

    let feedback = if correct {
        vec![
            Effect::say_text(&strings.quiz_correct),
            Effect::PlaySound(Sound::Clap),
        ]
    } else {
        let answer = item.options.get(item.answer).map_or("", String::as_str);
        vec![Effect::say_text(format!("{} {answer}", strings.quiz_wrong))]
    };

    let next = index + 1;
    if next < strings.quiz.len() {
        Ok(
            TransitionResult::new(session.with_focus(Focus::AwaitingQuiz { index: next, score }))
                .with_effects(feedback)
                .with_effect(Effect::Typing)
                .with_effects(quiz_question(strings, next).map(Effect::say)),
        )
    } else {
        let done = strings
            .quiz_done
            .replace("{score}", &score.to_string())
            .replace("{total}", &strings.quiz.len().to_string());
        Ok(TransitionResult::new(session.with_focus(Focus::Idle))
            .with_effects(feedback)
            .with_effect(Effect::say_text(done)))
    }
}

fn quiz_question(strings: &Strings, index: usize) -> Option<MessageBody> {
    strings.quiz.get(index).map(|item| MessageBody::QuizQuestion {
        number: index + 1,
        prompt: item.prompt.clone(),
        options: item.options.clone(),
    })
}

/// "2" or "2." selects the second option
fn parse_option_number(text: &str, option_count: usize) -> Option<usize> {
    let number: usize = text.trim().trim_end_matches('.').parse().ok()?;
    (1..=option_count).contains(&number).then(|| number - 1)
}

fn apply_toggle(session: &Session, content: &Content, toggle: Toggle) -> TransitionResult {
    match toggle {
        Toggle::Voice => {
            let voice_enabled = !session.voice_enabled;
            let strings = content.strings(session.language);
            let text = if voice_enabled {
                &strings.voice_on
            } else {
                &strings.voice_off
            };
            TransitionResult::new(Session {
                voice_enabled,
                ..session.clone()
            })
            .with_effect(Effect::say_text(text))
        }
        Toggle::Music => {
            let music_playing = !session.music_playing;
            TransitionResult::new(Session {
                music_playing,
                ..session.clone()
            })
            .with_effect(Effect::SetMusic {
                playing: music_playing,
            })
        }
        Toggle::Language => {
            let language = session.language.toggled();
            TransitionResult::new(Session {
                language,
                ..session.clone()
            })
            .with_effect(Effect::say_text(&content.strings(language).language_set))
        }
    }
}

fn classification_message(content: &Content, strings: &Strings, text: &str) -> String {
    let found = content.lexicon().detect_bullying(text);
    if found.is_empty() {
        return strings.no_signs.clone();
    }

    let labels = found
        .iter()
        .map(|category| match category {
            BullyingCategory::Physical => strings.categories.physical.as_str(),
            BullyingCategory::Verbal => strings.categories.verbal.as_str(),
            BullyingCategory::Cyber => strings.categories.cyber.as_str(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {labels}", strings.signs_detected)
}

fn format_report(strings: &Strings, report: &Report) -> String {
    format!(
        "{}\n{} {}\n{} {}\n{} {}",
        strings.report_title,
        strings.report_who,
        report.who,
        strings.report_where,
        report.place,
        strings.report_what,
        report.what
    )
}

fn menu(strings: &Strings) -> MessageBody {
    MessageBody::Menu {
        items: MenuCommand::MENU
            .into_iter()
            .filter_map(|command| {
                menu_label(&strings.menu, command).map(|label| MenuItem {
                    command,
                    label: label.to_string(),
                })
            })
            .collect(),
    }
}

fn menu_label(labels: &MenuLabels, command: MenuCommand) -> Option<&str> {
    let label = match command {
        MenuCommand::ShowMenu => return None,
        MenuCommand::CalmDown => &labels.calm_down,
        MenuCommand::IsItBullying => &labels.is_it_bullying,
        MenuCommand::Roleplay => &labels.roleplay,
        MenuCommand::Quiz => &labels.quiz,
        MenuCommand::Pledge => &labels.pledge,
        MenuCommand::ReportForm => &labels.report_form,
        MenuCommand::Location => &labels.location,
    };
    Some(label)
}
