//! End-to-end projection properties: every guarantee the board makes to its
//! observers, exercised through the public API.

use smokeboard::api::state::AppState;
use smokeboard::board::{Affordance, Board, Role};
use smokeboard::event::{CommitStatusEvent, FeedEvent, Percent, TestProgressEvent};
use smokeboard::projector::{project_and_apply, run_projection_loop, PatchOp};
use smokeboard::status::Status;
use tokio::sync::mpsc;

fn full_board() -> Board {
    let mut board = Board::new();
    board
        .insert(
            "box-abc-linux",
            Role::ProgressBox {
                sha: "abc123".into(),
                config: "linux".into(),
            },
        )
        .unwrap();
    board
        .insert(
            "row-abc-linux",
            Role::ConfigRow {
                sha: "abc123".into(),
                config: "linux".into(),
                big_list: true,
            },
        )
        .unwrap();
    board
        .insert(
            "label-abc-linux",
            Role::ShaLabel {
                sha: "abc123".into(),
                config: "linux".into(),
            },
        )
        .unwrap();
    board
        .insert("branch-abc", Role::BranchEntry { sha: "abc123".into() })
        .unwrap();
    board
        .insert("retest-abc", Role::RetestControl { sha: "abc123".into() })
        .unwrap();
    board
}

fn progress(raw_status: Status, percent: &str) -> FeedEvent {
    FeedEvent::TestProgress(TestProgressEvent {
        sha: "abc123".into(),
        config: "linux".into(),
        raw_status,
        status: format!("run is {}", raw_status),
        percent: Percent::Text(percent.into()),
    })
}

#[test]
fn test_every_status_is_mutually_exclusive() {
    let mut board = full_board();
    for status in Status::ALL {
        project_and_apply(&mut board, &progress(status, "50%"));
        // Exactly the projected value, never an accumulation.
        assert_eq!(board.get("box-abc-linux").unwrap().view.status, Some(status));
        assert_eq!(board.get("row-abc-linux").unwrap().view.status, Some(status));
    }
}

#[test]
fn test_percent_visible_only_while_testing() {
    let mut board = full_board();

    project_and_apply(&mut board, &progress(Status::Testing, "73%"));
    assert_eq!(
        board.get("box-abc-linux").unwrap().view.text.as_deref(),
        Some("73%")
    );

    project_and_apply(&mut board, &progress(Status::Passing, "100%"));
    assert_eq!(board.get("box-abc-linux").unwrap().view.text, None);
}

#[test]
fn test_tooltip_carries_status_line() {
    let mut board = full_board();
    project_and_apply(&mut board, &progress(Status::Failing, "88%"));

    let tooltip = Some("run is failing".to_string());
    assert_eq!(board.get("box-abc-linux").unwrap().view.tooltip, tooltip);
    assert_eq!(board.get("label-abc-linux").unwrap().view.tooltip, tooltip);
}

#[test]
fn test_commit_status_sets_queued_everywhere_it_should() {
    let mut board = full_board();
    let event = FeedEvent::CommitStatus(CommitStatusEvent {
        sha: "abc123".into(),
        raw_status: Status::Queued,
    });
    project_and_apply(&mut board, &event);

    assert_eq!(
        board.get("row-abc-linux").unwrap().view.status,
        Some(Status::Queued)
    );
    assert_eq!(
        board.get("branch-abc").unwrap().view.status,
        Some(Status::Queued)
    );
    // Per-config elements are not commit_status targets.
    assert_eq!(board.get("box-abc-linux").unwrap().view.status, None);
    assert_eq!(board.get("label-abc-linux").unwrap().view.status, None);
}

#[test]
fn test_retest_affordance_is_one_way() {
    let mut board = full_board();
    let event = FeedEvent::CommitStatus(CommitStatusEvent {
        sha: "abc123".into(),
        raw_status: Status::Testing,
    });

    assert_eq!(
        board.get("retest-abc").unwrap().view.affordance,
        Some(Affordance::Testable)
    );
    for _ in 0..3 {
        project_and_apply(&mut board, &event);
        assert_eq!(
            board.get("retest-abc").unwrap().view.affordance,
            Some(Affordance::Retestable)
        );
    }
}

#[test]
fn test_double_projection_equals_single() {
    let event = progress(Status::Todo, "100%");

    let mut once = full_board();
    project_and_apply(&mut once, &event);

    let mut twice = full_board();
    project_and_apply(&mut twice, &event);
    project_and_apply(&mut twice, &event);

    let snapshot = |b: &Board| serde_json::to_value(b).unwrap();
    assert_eq!(snapshot(&once), snapshot(&twice));
}

#[tokio::test]
async fn test_projection_loop_applies_and_broadcasts() {
    let state = AppState::new(full_board(), 64);
    let (events_tx, events_rx) = mpsc::channel(16);
    let mut patches = state.patches.subscribe();

    let task = tokio::spawn(run_projection_loop(
        state.board.clone(),
        events_rx,
        state.patches.clone(),
    ));

    events_tx
        .send(progress(Status::Testing, "12%"))
        .await
        .unwrap();

    // First patch out of the stream is the progress box status change.
    let first = patches.recv().await.unwrap();
    assert_eq!(first.element, "box-abc-linux");
    assert_eq!(
        first.op,
        PatchOp::SetStatus {
            status: Status::Testing
        }
    );

    // Drain the rest of the event's patches: box tooltip/text, row, label.
    for _ in 0..4 {
        patches.recv().await.unwrap();
    }

    drop(events_tx);
    task.await.unwrap();

    let board = state.board.read().await;
    let view = &board.get("box-abc-linux").unwrap().view;
    assert_eq!(view.status, Some(Status::Testing));
    assert_eq!(view.text.as_deref(), Some("12%"));
}
