//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::content::{Content, Language};
use crate::lookup::LookupError;
use proptest::prelude::*;
use std::sync::OnceLock;

// ============================================================================
// Test Helpers
// ============================================================================

/// Parsed once; every case shares the compiled keyword sets
fn content() -> &'static Content {
    static CONTENT: OnceLock<Content> = OnceLock::new();
    CONTENT.get_or_init(|| Content::builtin().unwrap())
}

fn named(language: Language) -> Session {
    Session {
        focus: Focus::Idle,
        user_name: Some("Sam".to_string()),
        language,
        ..Session::new()
    }
}

fn focus_count(session: &Session) -> usize {
    [
        session.awaiting_name(),
        session.awaiting_roleplay(),
        session.awaiting_quiz(),
        matches!(session.focus, Focus::AwaitingDescription),
    ]
    .into_iter()
    .filter(|held| *held)
    .count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_language() -> impl Strategy<Value = Language> {
    prop_oneof![Just(Language::English), Just(Language::Hindi)]
}

fn arb_command() -> impl Strategy<Value = MenuCommand> {
    prop_oneof![
        Just(MenuCommand::ShowMenu),
        Just(MenuCommand::CalmDown),
        Just(MenuCommand::IsItBullying),
        Just(MenuCommand::Roleplay),
        Just(MenuCommand::Quiz),
        Just(MenuCommand::Pledge),
        Just(MenuCommand::ReportForm),
        Just(MenuCommand::Location),
    ]
}

fn arb_toggle() -> impl Strategy<Value = Toggle> {
    prop_oneof![
        Just(Toggle::Voice),
        Just(Toggle::Music),
        Just(Toggle::Language)
    ]
}

fn arb_lookup_result() -> impl Strategy<Value = Result<String, LookupError>> {
    prop_oneof![
        "[a-zA-Z ]{1,40}".prop_map(Ok),
        Just(Err(LookupError::NoAnswer)),
        (400u16..600).prop_map(|code| Err(LookupError::Status(code))),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z0-9 \n]{0,40}".prop_map(|text| Event::UserText { text }),
        arb_command().prop_map(Event::Command),
        any::<usize>().prop_map(|roll| Event::StartRoleplay { roll }),
        (0usize..4).prop_map(|option| Event::QuizAnswer { option }),
        arb_toggle().prop_map(Event::Toggle),
        Just(Event::MascotPoked),
        arb_lookup_result().prop_map(|result| Event::LookupCompleted { result }),
        Just(Event::Microphone(MicStatus::Listening)),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: any first text becomes the display name verbatim
    #[test]
    fn prop_first_text_is_the_name(text in "\\PC{0,30}") {
        let result = transition(&Session::new(), &content(), Event::UserText { text: text.clone() });
        prop_assert!(result.is_ok(), "Name capture failed: {:?}", result);
        let new_state = result.unwrap().new_state;
        prop_assert_eq!(new_state.focus, Focus::Idle);
        prop_assert_eq!(new_state.user_name, Some(text));
    }

    // Invariant 2: at most one sub-flow holds the focus, whatever happens
    #[test]
    fn prop_single_focus(events in proptest::collection::vec(arb_event(), 0..25)) {
        let content = content();
        let mut session = Session::new();
        for event in events {
            if let Ok(result) = transition(&session, &content, event) {
                session = result.new_state;
            }
            prop_assert!(focus_count(&session) <= 1, "Multiple focuses in {:?}", session);
        }
    }

    // Invariant 3: the final score equals the number of correct answers
    #[test]
    fn prop_quiz_score_counts_correct_answers(
        answers in proptest::collection::vec(0usize..3, 2),
        language in arb_language()
    ) {
        let content = content();
        let key: Vec<usize> = content.strings(language).quiz.iter().map(|q| q.answer).collect();
        let expected = answers.iter().zip(&key).filter(|(a, k)| a == k).count();

        let mut session = transition(&named(language), &content, Event::Command(MenuCommand::Quiz))
            .unwrap()
            .new_state;
        let mut last_score = 0;
        for option in answers {
            let result = transition(&session, &content, Event::QuizAnswer { option });
            prop_assert!(result.is_ok(), "Answer rejected: {:?}", result);
            let result = result.unwrap();
            session = result.new_state;
            if let Some((_, score)) = session.quiz_progress() {
                prop_assert!(score >= last_score, "Score went down");
                prop_assert!(score <= content.quiz_len());
                last_score = score;
            } else {
                let total = content.quiz_len().to_string();
                let done = content
                    .strings(language)
                    .quiz_done
                    .replace("{score}", &expected.to_string())
                    .replace("{total}", &total);
                let said_done = result.effects.iter().any(|e| matches!(
                    e,
                    Effect::Reply(msg) if msg.body == crate::transcript::MessageBody::text(done.clone())
                ));
                prop_assert!(said_done, "Missing final score message");
            }
        }
        prop_assert_eq!(session.focus, Focus::Idle);
    }

    // Invariant 4: roleplay feedback depends only on the reply text
    #[test]
    fn prop_roleplay_is_deterministic(reply in "[a-zA-Z ,.!']{0,40}", roll in any::<usize>()) {
        let content = content();
        let started = transition(&named(Language::English), &content, Event::StartRoleplay { roll })
            .unwrap()
            .new_state;
        let first = transition(&started, &content, Event::UserText { text: reply.clone() }).unwrap();
        let second = transition(&started, &content, Event::UserText { text: reply }).unwrap();
        prop_assert_eq!(first.new_state, second.new_state);
        prop_assert_eq!(first.effects, second.effects);
    }

    // Invariant 5: toggling twice restores the session
    #[test]
    fn prop_double_toggle_is_identity(toggle in arb_toggle(), language in arb_language()) {
        let content = content();
        let session = named(language);
        let once = transition(&session, &content, Event::Toggle(toggle)).unwrap().new_state;
        prop_assert_ne!(&once, &session);
        let twice = transition(&once, &content, Event::Toggle(toggle)).unwrap().new_state;
        prop_assert_eq!(twice, session);
    }

    // Invariant 6: commands never change the name or the preferences
    #[test]
    fn prop_commands_keep_preferences(command in arb_command(), language in arb_language()) {
        let session = named(language);
        let result = transition(&session, &content(), Event::Command(command)).unwrap();
        prop_assert_eq!(result.new_state.user_name, session.user_name);
        prop_assert_eq!(result.new_state.language, session.language);
        prop_assert_eq!(result.new_state.voice_enabled, session.voice_enabled);
    }

    // Invariant 7: lookups are only requested from idle free text
    #[test]
    fn prop_lookup_only_from_idle(event in arb_event()) {
        let session = named(Language::English).with_focus(Focus::AwaitingRoleplay);
        if let Ok(result) = transition(&session, &content(), event) {
            let looked_up = result.effects.iter().any(|e| matches!(e, Effect::Lookup { .. }));
            prop_assert!(!looked_up, "Lookup from a sub-flow: {:?}", result.effects);
        }
    }
}
