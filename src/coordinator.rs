//! Session lifecycle controller.
//!
//! The coordinator validates challenges, owns session creation, and runs one
//! arbiter task per active session. The arbiter is the single writer for its
//! session: moves, abandon requests and clock fires all arrive through one
//! mailbox and are applied in receive order, so a move accepted before a
//! clock fire always supersedes it and vice versa. Concurrency exists across
//! sessions only.

use crate::clock::TurnClock;
use crate::games::tictactoe::Mark;
use crate::presenter::{Presenter, RenderHandle, SessionView};
use crate::session::{
    GameSession, MoveApplied, Outcome, Participant, Rejection, SessionId, UserId,
};
use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Event delivered to a session's arbiter mailbox.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user pressed a board cell.
    Move {
        /// Acting user.
        actor: UserId,
        /// Target row (0-2).
        row: usize,
        /// Target column (0-2).
        col: usize,
    },
    /// A user pressed the abandon control.
    Abandon {
        /// Acting user.
        actor: UserId,
    },
    /// The turn clock for the given arm generation ran out.
    ClockFired {
        /// Arm-cycle generation the sleeper was started under.
        generation: u64,
    },
}

/// A choice on the post-game follow-up prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum FollowUpChoice {
    /// Start a fresh session with the same two players.
    Rematch,
    /// Disable the prompt permanently.
    Cancel,
}

/// A user action on a follow-up prompt.
#[derive(Debug, Clone)]
pub struct FollowUpEvent {
    /// Acting user.
    pub actor: UserId,
    /// Selected choice.
    pub choice: FollowUpChoice,
}

/// Gateway-side handle for feeding actions into a live session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Session id.
    pub id: SessionId,
    /// Mailbox for user actions. Sends fail once the session finished.
    pub actions: mpsc::Sender<SessionEvent>,
}

/// Gateway-side handle for a post-game follow-up prompt.
#[derive(Debug, Clone)]
pub struct FollowUpHandle {
    /// Prompt id (independent of the session that spawned it).
    pub id: u64,
    /// Mailbox for rematch/cancel choices.
    pub choices: mpsc::Sender<FollowUpEvent>,
}

/// Lifecycle notifications for the gateway (and tests).
#[derive(Debug, Clone)]
pub enum CoordinatorNotice {
    /// A session was created and its arbiter started.
    SessionOpened(SessionHandle),
    /// A session reached a terminal outcome.
    SessionClosed {
        /// Session id.
        id: SessionId,
        /// Terminal outcome.
        outcome: Outcome,
    },
    /// A follow-up prompt is accepting choices.
    FollowUpOffered(FollowUpHandle),
    /// A follow-up prompt resolved or expired.
    FollowUpClosed {
        /// Prompt id.
        id: u64,
        /// Whether a rematch session was spawned.
        rematch: bool,
    },
}

/// Errors from issuing a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ChallengeError {
    /// Challenger and opponent are the same user.
    #[display("You can't play against yourself")]
    SelfChallenge,
    /// Opponent is an automated account.
    #[display("You can't play against a bot")]
    InvalidOpponent,
    /// The coordinator task is gone.
    #[display("Game coordinator is shut down")]
    Shutdown,
}

/// Timeout policy for sessions and prompts.
#[derive(Debug, Clone, Copy, Getters, derive_new::new)]
pub struct TimerSettings {
    /// Per-move budget before the current player forfeits.
    turn_limit: Duration,
    /// How long the rematch/cancel prompt stays live.
    follow_up_expiry: Duration,
    /// Overall inactivity ceiling for a whole session.
    session_ceiling: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(30),
            Duration::from_secs(300),
            Duration::from_secs(1800),
        )
    }
}

enum Command {
    StartChallenge {
        challenger: Participant,
        opponent: Participant,
        reply: oneshot::Sender<Result<SessionHandle, ChallengeError>>,
    },
    SessionEnded {
        id: SessionId,
        outcome: Outcome,
        player_x: Participant,
        player_o: Participant,
    },
}

/// Cheap-to-clone handle to the coordinator task.
#[derive(Debug, Clone)]
pub struct GameCoordinator {
    commands: mpsc::Sender<Command>,
}

impl GameCoordinator {
    /// Spawns the coordinator task and returns a handle plus the
    /// notification stream.
    pub fn spawn(
        presenter: Arc<dyn Presenter>,
        timers: TimerSettings,
    ) -> (Self, mpsc::UnboundedReceiver<CoordinatorNotice>) {
        let (commands_tx, commands_rx) = mpsc::channel(64);
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();

        let state = CoordinatorState {
            presenter,
            timers,
            notices: notices_tx,
            commands: commands_tx.clone(),
            next_session_id: 1,
            next_follow_up_id: 1,
        };
        tokio::spawn(state.run(commands_rx));

        (
            Self {
                commands: commands_tx,
            },
            notices_rx,
        )
    }

    /// Starts a challenge between two users.
    ///
    /// # Errors
    ///
    /// Rejects a [`ChallengeError::SelfChallenge`] and challenges against
    /// automated accounts; see [`ChallengeError`].
    #[instrument(skip(self, challenger, opponent), fields(challenger = %challenger.name, opponent = %opponent.name))]
    pub async fn start_challenge(
        &self,
        challenger: Participant,
        opponent: Participant,
    ) -> Result<SessionHandle, ChallengeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::StartChallenge {
                challenger,
                opponent,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ChallengeError::Shutdown)?;
        reply_rx.await.map_err(|_| ChallengeError::Shutdown)?
    }
}

struct CoordinatorState {
    presenter: Arc<dyn Presenter>,
    timers: TimerSettings,
    notices: mpsc::UnboundedSender<CoordinatorNotice>,
    commands: mpsc::Sender<Command>,
    next_session_id: SessionId,
    next_follow_up_id: u64,
}

impl CoordinatorState {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        info!("Game coordinator started");
        while let Some(command) = commands.recv().await {
            match command {
                Command::StartChallenge {
                    challenger,
                    opponent,
                    reply,
                } => {
                    let result = self.open_session(challenger, opponent);
                    let _ = reply.send(result);
                }
                Command::SessionEnded {
                    id,
                    outcome,
                    player_x,
                    player_o,
                } => {
                    let _ = self
                        .notices
                        .send(CoordinatorNotice::SessionClosed { id, outcome });
                    self.offer_follow_up(player_x, player_o);
                }
            }
        }
        info!("Game coordinator stopped");
    }

    #[instrument(skip_all, fields(challenger = %challenger.name, opponent = %opponent.name))]
    fn open_session(
        &mut self,
        challenger: Participant,
        opponent: Participant,
    ) -> Result<SessionHandle, ChallengeError> {
        if challenger.id == opponent.id {
            debug!("Rejecting self-challenge");
            return Err(ChallengeError::SelfChallenge);
        }
        if opponent.is_bot {
            debug!("Rejecting challenge against a bot");
            return Err(ChallengeError::InvalidOpponent);
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        let session = GameSession::new(id, challenger, opponent);
        let (actions_tx, actions_rx) = mpsc::channel(32);
        let handle = SessionHandle {
            id,
            actions: actions_tx.clone(),
        };

        tokio::spawn(run_session(
            session,
            actions_rx,
            actions_tx,
            Arc::clone(&self.presenter),
            self.timers,
            self.commands.clone(),
        ));

        let _ = self
            .notices
            .send(CoordinatorNotice::SessionOpened(handle.clone()));
        info!(session_id = id, "Session opened");
        Ok(handle)
    }

    fn offer_follow_up(&mut self, player_x: Participant, player_o: Participant) {
        let id = self.next_follow_up_id;
        self.next_follow_up_id += 1;

        let (choices_tx, choices_rx) = mpsc::channel(8);
        let handle = FollowUpHandle {
            id,
            choices: choices_tx,
        };
        let _ = self
            .notices
            .send(CoordinatorNotice::FollowUpOffered(handle.clone()));

        tokio::spawn(run_follow_up(
            id,
            player_x,
            player_o,
            choices_rx,
            Arc::clone(&self.presenter),
            *self.timers.follow_up_expiry(),
            self.commands.clone(),
            self.notices.clone(),
        ));
    }
}

/// Arbiter task: single writer for one session's state.
#[instrument(skip_all, fields(session_id = session.id()))]
async fn run_session(
    mut session: GameSession,
    mut actions: mpsc::Receiver<SessionEvent>,
    events_tx: mpsc::Sender<SessionEvent>,
    presenter: Arc<dyn Presenter>,
    timers: TimerSettings,
    commands: mpsc::Sender<Command>,
) {
    let turn_limit_secs = timers.turn_limit().as_secs();

    let view = SessionView::snapshot(&session, turn_limit_secs);
    let surface = match presenter.render(&view).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Initial render failed; session continues unrendered");
            None
        }
    };

    let mut clock = TurnClock::new(events_tx, *timers.turn_limit());
    clock.arm(session.next_generation());

    let ceiling = tokio::time::sleep(*timers.session_ceiling());
    tokio::pin!(ceiling);

    let outcome = loop {
        let event = tokio::select! {
            event = actions.recv() => match event {
                Some(event) => event,
                // The clock holds a sender, so the mailbox cannot close
                // while the session is live.
                None => return,
            },
            () = &mut ceiling => {
                warn!("Session ceiling reached");
                match session.expire() {
                    Some(outcome) => break outcome,
                    None => return,
                }
            }
        };

        match event {
            SessionEvent::Move { actor, row, col } => {
                match session.apply_move(&actor, row, col) {
                    Ok(MoveApplied::Continued) => {
                        clock.arm(session.next_generation());
                        refresh(&presenter, surface, &session, turn_limit_secs).await;
                    }
                    Ok(MoveApplied::Finished(outcome)) => break outcome,
                    Err(rejection) => notify(&presenter, &actor, rejection).await,
                }
            }
            SessionEvent::Abandon { actor } => match session.abandon(&actor) {
                Ok(outcome) => break outcome,
                Err(rejection) => notify(&presenter, &actor, rejection).await,
            },
            SessionEvent::ClockFired { generation } => {
                if let Some(outcome) = session.clock_fired(generation) {
                    break outcome;
                }
                // Stale fire: superseded arm cycle, drop silently.
            }
        }
    };

    clock.cancel();
    info!(?outcome, "Session finished");

    let final_view = SessionView::snapshot(&session, turn_limit_secs);
    if let Some(handle) = surface {
        refresh_with(&presenter, handle, &final_view).await;
        if let Err(e) = presenter.disable(handle).await {
            warn!(error = %e, "Failed to disable surface");
        }
    }
    if let Err(e) = presenter.announce(&final_view.status_line()).await {
        warn!(error = %e, "Failed to announce result");
    }

    let _ = commands
        .send(Command::SessionEnded {
            id: session.id(),
            outcome,
            player_x: session.participant(Mark::X).clone(),
            player_o: session.participant(Mark::O).clone(),
        })
        .await;

    // Reject any actions that raced the finish, then stop accepting more.
    actions.close();
    while let Some(event) = actions.recv().await {
        match event {
            SessionEvent::Move { actor, .. } | SessionEvent::Abandon { actor } => {
                notify(&presenter, &actor, Rejection::GameOver).await;
            }
            SessionEvent::ClockFired { .. } => {}
        }
    }
}

/// Follow-up prompt task: resolves to a rematch, a cancel, or expiry.
#[instrument(skip_all, fields(follow_up_id = id))]
async fn run_follow_up(
    id: u64,
    player_x: Participant,
    player_o: Participant,
    mut choices: mpsc::Receiver<FollowUpEvent>,
    presenter: Arc<dyn Presenter>,
    expiry: Duration,
    commands: mpsc::Sender<Command>,
    notices: mpsc::UnboundedSender<CoordinatorNotice>,
) {
    let offer = format!(
        "Game finished! {} vs {}\nStart a new game?",
        player_x.name, player_o.name
    );
    if let Err(e) = presenter.announce(&offer).await {
        warn!(error = %e, "Failed to announce follow-up prompt");
    }

    let deadline = tokio::time::sleep(expiry);
    tokio::pin!(deadline);

    let rematch = loop {
        let event = tokio::select! {
            event = choices.recv() => match event {
                Some(event) => event,
                None => break false,
            },
            () = &mut deadline => {
                debug!("Follow-up prompt expired");
                let _ = presenter.announce("Game options timed out.").await;
                break false;
            }
        };

        if event.actor != player_x.id && event.actor != player_o.id {
            notify(&presenter, &event.actor, Rejection::NotAParticipant).await;
            continue;
        }

        match event.choice {
            FollowUpChoice::Rematch => {
                info!(by = %event.actor, "Rematch requested");
                // Seats are re-randomized by the new session.
                let (reply_tx, reply_rx) = oneshot::channel();
                let sent = commands
                    .send(Command::StartChallenge {
                        challenger: player_x.clone(),
                        opponent: player_o.clone(),
                        reply: reply_tx,
                    })
                    .await;
                match sent {
                    Ok(()) => match reply_rx.await {
                        Ok(Ok(_)) => break true,
                        Ok(Err(e)) => {
                            warn!(error = %e, "Rematch challenge rejected");
                            break false;
                        }
                        Err(_) => break false,
                    },
                    Err(_) => break false,
                }
            }
            FollowUpChoice::Cancel => {
                info!(by = %event.actor, "Follow-up cancelled");
                let _ = presenter.announce("Game cancelled.").await;
                break false;
            }
        }
    };

    let _ = notices.send(CoordinatorNotice::FollowUpClosed { id, rematch });
}

async fn refresh(
    presenter: &Arc<dyn Presenter>,
    surface: Option<RenderHandle>,
    session: &GameSession,
    turn_limit_secs: u64,
) {
    if let Some(handle) = surface {
        let view = SessionView::snapshot(session, turn_limit_secs);
        refresh_with(presenter, handle, &view).await;
    }
}

async fn refresh_with(presenter: &Arc<dyn Presenter>, handle: RenderHandle, view: &SessionView) {
    if let Err(e) = presenter.update(handle, view).await {
        warn!(error = %e, "Surface update failed; state is unaffected");
    }
}

async fn notify(presenter: &Arc<dyn Presenter>, actor: &str, rejection: Rejection) {
    debug!(actor, %rejection, "Action rejected");
    if let Err(e) = presenter.notify_rejected(actor, &rejection).await {
        warn!(error = %e, "Failed to deliver rejection notice");
    }
}
