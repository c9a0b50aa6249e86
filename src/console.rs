//! Local console presenter and interactive game loop.
//!
//! A stand-in gateway for development and demos: renders sessions to
//! stdout and feeds typed commands into the coordinator. The real chat
//! platform plugs in by implementing [`Presenter`] the same way.

use crate::coordinator::{
    CoordinatorNotice, FollowUpChoice, FollowUpEvent, FollowUpHandle, GameCoordinator,
    SessionEvent, SessionHandle, TimerSettings,
};
use crate::games::tictactoe::{Board, Cell, SIZE};
use crate::presenter::{PresentError, Presenter, RenderHandle, SessionView};
use crate::session::{Participant, Rejection};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Presenter that writes surfaces to stdout.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    next_handle: AtomicU64,
}

impl ConsolePresenter {
    fn print_view(&self, view: &SessionView) {
        let mut board = Board::new();
        for (index, cell) in view.cells.iter().enumerate() {
            if let Cell::Taken(mark) = cell {
                // Rebuilding a board from a snapshot of itself cannot fail.
                let _ = board.place(index / SIZE, index % SIZE, *mark);
            }
        }
        println!("\n{}\n{}", board.display(), view.status_line());
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn render(&self, view: &SessionView) -> Result<RenderHandle, PresentError> {
        println!(
            "\nTic Tac Toe: {} (X) vs {} (O)",
            view.player_x.name, view.player_o.name
        );
        self.print_view(view);
        Ok(RenderHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)))
    }

    async fn update(&self, _handle: RenderHandle, view: &SessionView) -> Result<(), PresentError> {
        self.print_view(view);
        Ok(())
    }

    async fn disable(&self, _handle: RenderHandle) -> Result<(), PresentError> {
        println!("(board controls disabled)");
        Ok(())
    }

    async fn notify_rejected(
        &self,
        actor: &str,
        reason: &Rejection,
    ) -> Result<(), PresentError> {
        println!("(only {actor} sees this) {reason}");
        Ok(())
    }

    async fn announce(&self, text: &str) -> Result<(), PresentError> {
        println!("{text}");
        Ok(())
    }
}

/// Runs an interactive session between two local seats.
///
/// Input lines: `a <row> <col>`, `b <row> <col>`, `a abandon`,
/// `a rematch`, `b cancel`, `quit`. Seat letters map to the two players;
/// marks are assigned randomly per session.
pub async fn run_console(
    player_one: String,
    player_two: String,
    timers: TimerSettings,
) -> anyhow::Result<()> {
    let presenter = Arc::new(ConsolePresenter::default());
    let (coordinator, mut notices) = GameCoordinator::spawn(presenter, timers);

    let seat_a = Participant::new("console-a".to_string(), player_one, false);
    let seat_b = Participant::new("console-b".to_string(), player_two, false);

    let mut session: Option<SessionHandle> =
        Some(coordinator.start_challenge(seat_a, seat_b).await?);
    let mut follow_up: Option<FollowUpHandle> = None;

    println!("Moves: 'a <row> <col>' or 'b <row> <col>' (0-2). Also: abandon, rematch, cancel, quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Some(CoordinatorNotice::SessionOpened(handle)) => {
                    debug!(session_id = handle.id, "Console bound to session");
                    session = Some(handle);
                    follow_up = None;
                }
                Some(CoordinatorNotice::SessionClosed { .. }) => {
                    session = None;
                }
                Some(CoordinatorNotice::FollowUpOffered(handle)) => {
                    follow_up = Some(handle);
                }
                Some(CoordinatorNotice::FollowUpClosed { rematch, .. }) => {
                    follow_up = None;
                    if !rematch {
                        println!("No further games. Bye!");
                        return Ok(());
                    }
                }
                None => return Ok(()),
            },
            line = lines.next_line() => {
                let Some(line) = line? else { return Ok(()) };
                if line.trim() == "quit" {
                    return Ok(());
                }
                dispatch(&line, session.as_ref(), follow_up.as_ref()).await;
            }
        }
    }
}

async fn dispatch(line: &str, session: Option<&SessionHandle>, follow_up: Option<&FollowUpHandle>) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [seat, rest @ ..] = tokens.as_slice() else {
        return;
    };

    let actor = match *seat {
        "a" => "console-a".to_string(),
        "b" => "console-b".to_string(),
        _ => {
            println!("Unknown seat '{seat}' (use 'a' or 'b')");
            return;
        }
    };

    match rest {
        ["abandon"] => {
            if let Some(session) = session {
                let _ = session
                    .actions
                    .send(SessionEvent::Abandon { actor })
                    .await;
            } else {
                println!("No active game");
            }
        }
        ["rematch"] | ["cancel"] => {
            let choice = if rest == ["rematch"] {
                FollowUpChoice::Rematch
            } else {
                FollowUpChoice::Cancel
            };
            if let Some(prompt) = follow_up {
                let _ = prompt
                    .choices
                    .send(FollowUpEvent { actor, choice })
                    .await;
            } else {
                println!("No rematch prompt is open");
            }
        }
        [row, col] => {
            let (Ok(row), Ok(col)) = (row.parse::<usize>(), col.parse::<usize>()) else {
                println!("Expected numeric row and column");
                return;
            };
            if let Some(session) = session {
                if session
                    .actions
                    .send(SessionEvent::Move { actor, row, col })
                    .await
                    .is_err()
                {
                    println!("The game is already over");
                }
            } else {
                println!("No active game");
            }
        }
        _ => println!("Unrecognized command: {line}"),
    }
}
