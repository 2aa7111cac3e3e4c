use std::time::{Duration, SystemTime};

use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::SeedableRng;

use plink::config::Config;
use plink::error::GameError;
use plink::quadrant::ALL_QUADRANTS;
use plink::results::ResultsStore;
use plink::session::{ClickOutcome, Phase, Session};

/// End-to-end round lifecycle tests: play, persist, reload, and aggregate
/// across multiple sessions sharing one results directory.

fn session_in(dir: &std::path::Path, seed: u64) -> Session {
    Session::with_rng(
        Config::default(),
        ResultsStore::with_dir(dir),
        StdRng::seed_from_u64(seed),
    )
}

fn play_full_round(session: &mut Session, mut now: SystemTime) -> SystemTime {
    session.start_next_round(now).unwrap();
    for _ in 0..session.clicks_per_round() {
        now += Duration::from_millis(300);
        let target = session.targets()[0];
        let outcome = session.handle_click(target.x, target.y, now);
        assert_matches!(outcome, ClickOutcome::Hit { .. });
    }
    assert_eq!(session.phase(), Phase::RoundSummary);
    now
}

#[test]
fn rounds_accumulate_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let results_dir = dir.path().join("results");

    // First session plays one round
    let mut first = session_in(&results_dir, 1);
    play_full_round(&mut first, SystemTime::now());
    assert_eq!(first.results().len(), 10);

    // A later session sees the earlier round after its own finishes.
    // Record-file names have second resolution, so space the rounds out.
    std::thread::sleep(Duration::from_millis(1100));
    let mut second = session_in(&results_dir, 2);
    play_full_round(&mut second, SystemTime::now());
    assert_eq!(second.results().len(), 20);

    // Every loaded row carries the full column set
    for row in second.results().rows() {
        assert!(row.click_datetime.is_some());
        assert!(row.reaction_time.is_some());
        assert!(row.precision_factor.is_some());
        assert!(row.game_version.is_some());
        assert!(row.round_number.is_some());
        assert!(row.click_in_round_number.is_some());
        assert!(row.clicked_quadrant.is_some());
    }
}

#[test]
fn zero_click_round_leaves_history_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let results_dir = dir.path().join("results");

    let mut session = session_in(&results_dir, 3);
    play_full_round(&mut session, SystemTime::now());
    let files_before = std::fs::read_dir(&results_dir).unwrap().count();

    session.start_next_round(SystemTime::now()).unwrap();
    session.end_round();

    assert_eq!(std::fs::read_dir(&results_dir).unwrap().count(), files_before);
    assert_eq!(session.results().len(), 10);
}

#[test]
fn multi_round_session_counts_rounds_and_clicks() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(&dir.path().join("results"), 4);

    let now = play_full_round(&mut session, SystemTime::now());
    assert_eq!(session.round(), 1);

    std::thread::sleep(Duration::from_millis(1100));
    play_full_round(&mut session, now);
    assert_eq!(session.round(), 2);
    assert_eq!(session.results().len(), 20);

    let rounds: Vec<u32> = session
        .results()
        .rows()
        .iter()
        .filter_map(|r| r.round_number)
        .collect();
    assert_eq!(rounds.iter().filter(|&&r| r == 1).count(), 10);
    assert_eq!(rounds.iter().filter(|&&r| r == 2).count(), 10);
}

#[test]
fn disabled_quadrants_block_the_next_round_until_reenabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(&dir.path().join("results"), 5);
    play_full_round(&mut session, SystemTime::now());

    for q in ALL_QUADRANTS {
        if session.quadrants().is_enabled(q) {
            session.toggle_quadrant(q);
        }
    }

    assert_matches!(
        session.start_next_round(SystemTime::now()),
        Err(GameError::NoQuadrantEnabled)
    );
    assert_eq!(session.phase(), Phase::RoundSummary);
    assert!(session.no_quadrant_notice());

    session.toggle_quadrant(ALL_QUADRANTS[0]);
    session.start_next_round(SystemTime::now()).unwrap();
    assert_eq!(session.phase(), Phase::RoundActive);
}

#[test]
fn reset_mid_round_discards_the_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let results_dir = dir.path().join("results");
    let mut session = session_in(&results_dir, 6);

    let now = SystemTime::now();
    session.start_next_round(now).unwrap();
    let target = session.targets()[0];
    session.handle_click(target.x, target.y, now + Duration::from_millis(100));
    assert_eq!(session.clicks_in_round(), 1);

    session.reset();
    assert_eq!(session.phase(), Phase::AwaitingStart);
    // Nothing was flushed, so nothing was written
    assert!(!results_dir.exists());
}
