//! Slash-command helpers.
//!
//! Thin request/response wrappers with no internal state: dice rolls,
//! weather lookups, meme/picture fetches, image generation, user profile
//! summaries, and avatar URL derivation. The
//! gateway formats these results for the platform; nothing here touches
//! session state.

pub mod avatar;
pub mod dice;
pub mod imgen;
pub mod meme;
pub mod userinfo;
pub mod weather;

use derive_more::{Display, Error};

/// Failure from an external command API.
#[derive(Debug, Clone, Display, Error)]
#[display("Command error: {} at {}:{}", message, file, line)]
pub struct CommandError {
    /// Error message.
    pub message: String,
    /// Line number where the error was created.
    pub line: u32,
    /// Source file where the error was created.
    pub file: &'static str,
}

impl CommandError {
    /// Creates a new command error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
