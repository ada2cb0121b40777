//! Conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime feeds events in and executes the effects that come out.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{BotMessage, Effect, Sound, Speech, Utterance};
pub use event::{Coordinates, Event, LocationFailure, MenuCommand, MicStatus, Toggle};
pub use state::Session;
pub use transition::{transition, TransitionError};
