//! Integration tests for the session lifecycle coordinator: challenge
//! validation, serialized move/clock handling, timeouts, and the
//! rematch/cancel follow-up flow. All timing runs under tokio paused time.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use turnabout::{
    ChallengeError, CoordinatorNotice, FollowUpChoice, FollowUpEvent, FollowUpHandle,
    GameCoordinator, Outcome, Participant, PresentError, Presenter, Rejection, RenderHandle,
    SessionEvent, SessionHandle, SessionView, TimerSettings,
};

/// Presenter that records every call for assertions.
#[derive(Default)]
struct RecordingPresenter {
    views: Mutex<Vec<SessionView>>,
    rejections: Mutex<Vec<(String, Rejection)>>,
    announcements: Mutex<Vec<String>>,
    disabled: Mutex<Vec<RenderHandle>>,
}

impl RecordingPresenter {
    fn latest_view(&self) -> SessionView {
        self.views
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("a view was rendered")
    }

    fn rejections(&self) -> Vec<(String, Rejection)> {
        self.rejections.lock().unwrap().clone()
    }

    fn announcements(&self) -> Vec<String> {
        self.announcements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn render(&self, view: &SessionView) -> Result<RenderHandle, PresentError> {
        let mut views = self.views.lock().unwrap();
        views.push(view.clone());
        Ok(RenderHandle(views.len() as u64))
    }

    async fn update(&self, _handle: RenderHandle, view: &SessionView) -> Result<(), PresentError> {
        self.views.lock().unwrap().push(view.clone());
        Ok(())
    }

    async fn disable(&self, handle: RenderHandle) -> Result<(), PresentError> {
        self.disabled.lock().unwrap().push(handle);
        Ok(())
    }

    async fn notify_rejected(&self, actor: &str, reason: &Rejection) -> Result<(), PresentError> {
        self.rejections
            .lock()
            .unwrap()
            .push((actor.to_string(), *reason));
        Ok(())
    }

    async fn announce(&self, text: &str) -> Result<(), PresentError> {
        self.announcements.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn ada() -> Participant {
    Participant::new("u-ada".to_string(), "Ada".to_string(), false)
}

fn grace() -> Participant {
    Participant::new("u-grace".to_string(), "Grace".to_string(), false)
}

fn bot() -> Participant {
    Participant::new("u-bot".to_string(), "Bleep".to_string(), true)
}

/// Lets spawned tasks run without advancing time meaningfully.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

async fn open_session(
    presenter: &Arc<RecordingPresenter>,
    coordinator: &GameCoordinator,
    notices: &mut tokio::sync::mpsc::UnboundedReceiver<CoordinatorNotice>,
) -> SessionHandle {
    let handle = coordinator
        .start_challenge(ada(), grace())
        .await
        .expect("challenge accepted");
    match notices.recv().await.expect("notice") {
        CoordinatorNotice::SessionOpened(opened) => assert_eq!(opened.id, handle.id),
        other => panic!("expected SessionOpened, got {other:?}"),
    }
    settle().await;
    assert!(!presenter.views.lock().unwrap().is_empty(), "initial render");
    handle
}

/// Sends a move as whoever currently holds the turn.
async fn play(presenter: &RecordingPresenter, handle: &SessionHandle, row: usize, col: usize) {
    let view = presenter.latest_view();
    let actor = view.seat(view.to_move).id.clone();
    handle
        .actions
        .send(SessionEvent::Move { actor, row, col })
        .await
        .expect("session accepts events");
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn winning_line_finishes_session_and_offers_rematch() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, mut notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());
    let handle = open_session(&presenter, &coordinator, &mut notices).await;

    let opening_view = presenter.latest_view();
    let winner_mark = opening_view.to_move;
    let winner_name = opening_view.seat(winner_mark).name.clone();

    // First mover completes the top row on the fifth move.
    for (row, col) in [(0, 0), (1, 1), (0, 1), (1, 0), (0, 2)] {
        play(&presenter, &handle, row, col).await;
    }

    match notices.recv().await.expect("notice") {
        CoordinatorNotice::SessionClosed { id, outcome } => {
            assert_eq!(id, handle.id);
            assert_eq!(outcome, Outcome::Won(winner_mark));
        }
        other => panic!("expected SessionClosed, got {other:?}"),
    }
    assert!(matches!(
        notices.recv().await.expect("notice"),
        CoordinatorNotice::FollowUpOffered(_)
    ));

    assert_eq!(presenter.disabled.lock().unwrap().len(), 1);
    let announcements = presenter.announcements();
    assert!(
        announcements
            .iter()
            .any(|a| a.contains("wins") && a.contains(&winner_name)),
        "winner announcement missing: {announcements:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn illegal_actions_get_private_rejections_without_state_change() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, mut notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());
    let handle = open_session(&presenter, &coordinator, &mut notices).await;

    let view = presenter.latest_view();
    let waiting = view.seat(view.to_move.opponent()).id.clone();

    // Out of turn.
    handle
        .actions
        .send(SessionEvent::Move {
            actor: waiting.clone(),
            row: 0,
            col: 0,
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(
        presenter.rejections().last(),
        Some(&(waiting.clone(), Rejection::NotYourTurn))
    );
    // Rejection produced no new render.
    assert_eq!(presenter.views.lock().unwrap().len(), 1);

    play(&presenter, &handle, 0, 0).await;

    // Occupied cell (waiting player now holds the turn).
    handle
        .actions
        .send(SessionEvent::Move {
            actor: waiting.clone(),
            row: 0,
            col: 0,
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(
        presenter.rejections().last(),
        Some(&(waiting.clone(), Rejection::CellOccupied))
    );

    // Out of range.
    handle
        .actions
        .send(SessionEvent::Move {
            actor: waiting.clone(),
            row: 7,
            col: 0,
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(
        presenter.rejections().last(),
        Some(&(waiting.clone(), Rejection::OutOfRange))
    );

    // Stranger.
    handle
        .actions
        .send(SessionEvent::Move {
            actor: "u-nobody".to_string(),
            row: 2,
            col: 2,
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(
        presenter.rejections().last(),
        Some(&("u-nobody".to_string(), Rejection::NotAParticipant))
    );
}

#[tokio::test(start_paused = true)]
async fn turn_timeout_penalizes_the_current_player_only() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, mut notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());
    let handle = open_session(&presenter, &coordinator, &mut notices).await;

    let view = presenter.latest_view();
    let delinquent_mark = view.to_move;
    let delinquent_name = view.seat(delinquent_mark).name.clone();

    tokio::time::sleep(Duration::from_secs(31)).await;

    match notices.recv().await.expect("notice") {
        CoordinatorNotice::SessionClosed { id, outcome } => {
            assert_eq!(id, handle.id);
            assert_eq!(outcome, Outcome::TimedOut(delinquent_mark));
        }
        other => panic!("expected SessionClosed, got {other:?}"),
    }

    let announcements = presenter.announcements();
    assert!(
        announcements
            .iter()
            .any(|a| a.contains("took too long") && a.contains(&delinquent_name)),
        "timeout announcement missing: {announcements:?}"
    );
    // The opponent is not promoted to winner.
    assert!(announcements.iter().all(|a| !a.contains("wins")));
}

#[tokio::test(start_paused = true)]
async fn accepted_move_supersedes_the_pending_clock() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, mut notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());
    let handle = open_session(&presenter, &coordinator, &mut notices).await;

    // Move just before the first deadline; a fresh clock must start for
    // the opponent and the superseded sleeper must stay silent.
    tokio::time::sleep(Duration::from_secs(29)).await;
    play(&presenter, &handle, 0, 0).await;
    let second_mark = presenter.latest_view().to_move;

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(
        notices.try_recv().is_err(),
        "no timeout may fire from the superseded clock"
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    match notices.recv().await.expect("notice") {
        CoordinatorNotice::SessionClosed { outcome, .. } => {
            assert_eq!(outcome, Outcome::TimedOut(second_mark));
        }
        other => panic!("expected SessionClosed, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn late_move_after_timeout_is_a_noop() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, mut notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());
    let handle = open_session(&presenter, &coordinator, &mut notices).await;
    let view = presenter.latest_view();
    let actor = view.seat(view.to_move).id.clone();

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(matches!(
        notices.recv().await.expect("notice"),
        CoordinatorNotice::SessionClosed { .. }
    ));
    assert!(matches!(
        notices.recv().await.expect("notice"),
        CoordinatorNotice::FollowUpOffered(_)
    ));

    // The mailbox is closed or closing; a racing move either fails to send
    // or is rejected as game-over. Either way the outcome never changes.
    let send_result = handle
        .actions
        .send(SessionEvent::Move {
            actor: actor.clone(),
            row: 0,
            col: 0,
        })
        .await;
    settle().await;
    if send_result.is_ok() {
        assert_eq!(
            presenter.rejections().last(),
            Some(&(actor, Rejection::GameOver))
        );
    }
    assert!(notices.try_recv().is_err(), "no second terminal notice");
}

#[tokio::test(start_paused = true)]
async fn session_ceiling_ends_a_slow_game() {
    let presenter = Arc::new(RecordingPresenter::default());
    // Generous per-turn budget so only the overall ceiling can trip.
    let timers = TimerSettings::new(
        Duration::from_secs(600),
        Duration::from_secs(300),
        Duration::from_secs(1800),
    );
    let (coordinator, mut notices) = GameCoordinator::spawn(presenter.clone(), timers);
    let handle = open_session(&presenter, &coordinator, &mut notices).await;

    // Each move lands inside its 600 s turn budget, so no turn clock ever
    // fires; the 1800 s ceiling does.
    for (row, col) in [(0, 0), (1, 1), (2, 2)] {
        tokio::time::sleep(Duration::from_secs(500)).await;
        play(&presenter, &handle, row, col).await;
    }
    let on_the_clock = presenter.latest_view().to_move;

    tokio::time::sleep(Duration::from_secs(400)).await;
    match notices.recv().await.expect("notice") {
        CoordinatorNotice::SessionClosed { id, outcome } => {
            assert_eq!(id, handle.id);
            assert_eq!(outcome, Outcome::TimedOut(on_the_clock));
        }
        other => panic!("expected SessionClosed, got {other:?}"),
    }
    assert!(
        presenter
            .announcements()
            .iter()
            .any(|a| a.contains("took too long"))
    );
}

#[tokio::test]
async fn self_and_bot_challenges_are_rejected() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, _notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());

    assert_eq!(
        coordinator.start_challenge(ada(), ada()).await.unwrap_err(),
        ChallengeError::SelfChallenge
    );
    assert_eq!(
        coordinator.start_challenge(ada(), bot()).await.unwrap_err(),
        ChallengeError::InvalidOpponent
    );
    assert!(presenter.views.lock().unwrap().is_empty());
}

async fn finish_by_abandon(
    presenter: &Arc<RecordingPresenter>,
    notices: &mut tokio::sync::mpsc::UnboundedReceiver<CoordinatorNotice>,
    handle: &SessionHandle,
) -> FollowUpHandle {
    // Abandoning is allowed regardless of whose turn it is.
    let view = presenter.latest_view();
    let quitter = view.seat(view.to_move.opponent()).id.clone();
    handle
        .actions
        .send(SessionEvent::Abandon { actor: quitter })
        .await
        .unwrap();

    match notices.recv().await.expect("notice") {
        CoordinatorNotice::SessionClosed { outcome, .. } => {
            assert!(matches!(outcome, Outcome::Abandoned(_)));
        }
        other => panic!("expected SessionClosed, got {other:?}"),
    }
    match notices.recv().await.expect("notice") {
        CoordinatorNotice::FollowUpOffered(prompt) => prompt,
        other => panic!("expected FollowUpOffered, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn rematch_spawns_a_fresh_session_and_cancel_disables() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, mut notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());
    let first = open_session(&presenter, &coordinator, &mut notices).await;

    let prompt = finish_by_abandon(&presenter, &mut notices, &first).await;

    // A stranger cannot resolve the prompt.
    prompt
        .choices
        .send(FollowUpEvent {
            actor: "u-nobody".to_string(),
            choice: FollowUpChoice::Rematch,
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(
        presenter.rejections().last(),
        Some(&("u-nobody".to_string(), Rejection::NotAParticipant))
    );
    assert!(notices.try_recv().is_err(), "prompt must remain open");

    // A participant requests the rematch.
    prompt
        .choices
        .send(FollowUpEvent {
            actor: "u-grace".to_string(),
            choice: FollowUpChoice::Rematch,
        })
        .await
        .unwrap();

    let second = match notices.recv().await.expect("notice") {
        CoordinatorNotice::SessionOpened(handle) => handle,
        other => panic!("expected SessionOpened, got {other:?}"),
    };
    assert_ne!(second.id, first.id);
    assert!(matches!(
        notices.recv().await.expect("notice"),
        CoordinatorNotice::FollowUpClosed { rematch: true, .. }
    ));
    settle().await;

    // Cancel the prompt after the second game ends.
    let prompt = finish_by_abandon(&presenter, &mut notices, &second).await;
    prompt
        .choices
        .send(FollowUpEvent {
            actor: "u-ada".to_string(),
            choice: FollowUpChoice::Cancel,
        })
        .await
        .unwrap();
    assert!(matches!(
        notices.recv().await.expect("notice"),
        CoordinatorNotice::FollowUpClosed { rematch: false, .. }
    ));
    assert!(
        presenter
            .announcements()
            .iter()
            .any(|a| a.contains("Game cancelled"))
    );
}

#[tokio::test(start_paused = true)]
async fn follow_up_prompt_expires_without_a_choice() {
    let presenter = Arc::new(RecordingPresenter::default());
    let (coordinator, mut notices) =
        GameCoordinator::spawn(presenter.clone(), TimerSettings::default());
    let handle = open_session(&presenter, &coordinator, &mut notices).await;

    let _prompt = finish_by_abandon(&presenter, &mut notices, &handle).await;

    tokio::time::sleep(Duration::from_secs(301)).await;
    assert!(matches!(
        notices.recv().await.expect("notice"),
        CoordinatorNotice::FollowUpClosed { rematch: false, .. }
    ));
    assert!(
        presenter
            .announcements()
            .iter()
            .any(|a| a.contains("Game options timed out"))
    );
}
