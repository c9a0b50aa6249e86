//! Turnabout library - chat-platform game bot core
//!
//! The centerpiece is the turn-based game subsystem: a session state
//! machine with randomized seats, a generation-tagged turn clock, and a
//! lifecycle coordinator that serializes every event touching one session
//! through a single arbiter task. Around it sit thin collaborators: a
//! text-completion client, per-user conversation logs, and slash-command
//! helpers.
//!
//! # Architecture
//!
//! - **Games**: pure tic-tac-toe board and engine
//! - **Session**: one match's participants, seats, and outcome
//! - **Coordinator**: challenge validation, arbiters, rematch prompts
//! - **Presenter**: the trait boundary a chat gateway implements
//! - **Chat / Commands**: LLM chat with logs, REST command wrappers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use turnabout::{GameCoordinator, Participant, TimerSettings};
//! # use turnabout::{Presenter, PresentError, RenderHandle, SessionView, Rejection};
//! # struct NoopPresenter;
//! # #[async_trait::async_trait]
//! # impl Presenter for NoopPresenter {
//! #     async fn render(&self, _: &SessionView) -> Result<RenderHandle, PresentError> { Ok(RenderHandle(0)) }
//! #     async fn update(&self, _: RenderHandle, _: &SessionView) -> Result<(), PresentError> { Ok(()) }
//! #     async fn disable(&self, _: RenderHandle) -> Result<(), PresentError> { Ok(()) }
//! #     async fn notify_rejected(&self, _: &str, _: &Rejection) -> Result<(), PresentError> { Ok(()) }
//! #     async fn announce(&self, _: &str) -> Result<(), PresentError> { Ok(()) }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (coordinator, _notices) =
//!     GameCoordinator::spawn(Arc::new(NoopPresenter), TimerSettings::default());
//!
//! let challenger = Participant::new("1".into(), "Ada".into(), false);
//! let opponent = Participant::new("2".into(), "Grace".into(), false);
//! let _session = coordinator.start_challenge(challenger, opponent).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod chat;
mod chat_log;
mod clock;
mod config;
mod coordinator;
mod games;
mod llm_client;
mod presenter;
mod session;

// Public module declarations - command helpers keep their namespacing
pub mod commands;

// Crate-level exports - chat feature
pub use chat::{ChatResponder, scrub_log_leakage, truncate_reply};
pub use chat_log::{ChatLog, ChatLogError, LogSender};

// Crate-level exports - configuration
pub use config::{BotConfig, ConfigError};

// Crate-level exports - session lifecycle
pub use coordinator::{
    ChallengeError, CoordinatorNotice, FollowUpChoice, FollowUpEvent, FollowUpHandle,
    GameCoordinator, SessionEvent, SessionHandle, TimerSettings,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - presentation boundary
pub use presenter::{PresentError, Presenter, RenderHandle, SeatView, SessionView};

// Crate-level exports - session state
pub use session::{
    GameSession, MoveApplied, Outcome, Participant, Rejection, SessionId, UserId,
};

// Crate-level exports - game types (tic-tac-toe)
pub use games::tictactoe::{Board, Cell, Game, Mark, MoveError, PlaceError, Verdict};
