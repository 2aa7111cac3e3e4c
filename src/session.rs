use crate::config::Config;
use crate::error::GameError;
use crate::history::HistoryWindow;
use crate::quadrant::{full_screen_bounds, spawn_bounds, Quadrant, QuadrantSelector};
use crate::recorder::RoundRecorder;
use crate::results::{ResultsStore, ResultsTable};
use crate::scoring;
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::SystemTime;

/// Virtual playfield dimensions. The renderer maps terminal cells into this
/// space, so target geometry is independent of the terminal size.
pub const PLAYFIELD_WIDTH: f64 = 800.0;
pub const PLAYFIELD_HEIGHT: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Round 0, welcome screen. Never collects clicks.
    AwaitingStart,
    RoundActive,
    RoundSummary,
}

/// A live on-screen target. Created on spawn, destroyed on hit, never on
/// miss.
#[derive(Clone, Copy, Debug)]
pub struct Target {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub spawn_time: SystemTime,
    pub quadrant: Quadrant,
}

impl Target {
    pub fn distance_from_center(&self, x: f64, y: f64) -> f64 {
        ((x - self.x).powi(2) + (y - self.y).powi(2)).sqrt()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.distance_from_center(x, y) <= self.radius
    }
}

/// Per-round averages computed from the flushed records, shown on the
/// summary screen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoundSummary {
    pub round: u32,
    pub clicks: u32,
    pub avg_points: u32,
    pub avg_reaction: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    Hit {
        points: u32,
        reaction_secs: f64,
        round_complete: bool,
    },
    Miss,
    /// Click outside an active round; scoring logic never sees it.
    Ignored,
}

/// Orchestrates the round lifecycle: active -> summary -> active. Owns the
/// targets, the recorder, the rolling history and the results store, and is
/// the only mutator of any of them.
pub struct Session {
    config: Config,
    phase: Phase,
    round: u32,
    targets: Vec<Target>,
    recorder: RoundRecorder,
    history: HistoryWindow,
    round_scores: Vec<(u32, f64)>,
    quadrants: QuadrantSelector,
    store: ResultsStore,
    results: ResultsTable,
    last_points: u32,
    last_reaction: f64,
    last_summary: Option<RoundSummary>,
    no_quadrant_notice: bool,
    next_target_id: u64,
    rng: StdRng,
}

impl Session {
    pub fn new(config: Config, store: ResultsStore) -> Self {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Deterministic constructor for tests.
    pub fn with_rng(config: Config, store: ResultsStore, rng: StdRng) -> Self {
        let history = HistoryWindow::new(config.history_window);
        Self {
            config,
            phase: Phase::AwaitingStart,
            round: 0,
            targets: Vec::new(),
            recorder: RoundRecorder::new(),
            history,
            round_scores: Vec::new(),
            quadrants: QuadrantSelector::default(),
            store,
            results: ResultsTable::default(),
            last_points: 0,
            last_reaction: 0.0,
            last_summary: None,
            no_quadrant_notice: false,
            next_target_id: 0,
            rng,
        }
    }

    /// Starts the next round. Valid from the welcome screen and from a
    /// round summary; refused while every quadrant is disabled, in which
    /// case the persistent notice flag is raised and the phase is unchanged.
    pub fn start_next_round(&mut self, now: SystemTime) -> Result<(), GameError> {
        if self.phase == Phase::RoundActive {
            return Ok(());
        }
        if !self.quadrants.any_enabled() {
            self.no_quadrant_notice = true;
            return Err(GameError::NoQuadrantEnabled);
        }

        self.no_quadrant_notice = false;
        self.round += 1;
        self.recorder.reset(self.round, Local::now());
        self.round_scores.clear();
        self.targets.clear();
        self.phase = Phase::RoundActive;

        while self.targets.len() < self.config.max_targets {
            if !self.spawn_target(now) {
                break;
            }
        }
        Ok(())
    }

    /// Tests a pointer-down against the live targets. Only meaningful while
    /// a round is active; summary-screen affordances are the UI layer's
    /// geometry and never reach this path.
    pub fn handle_click(&mut self, x: f64, y: f64, now: SystemTime) -> ClickOutcome {
        if self.phase != Phase::RoundActive {
            return ClickOutcome::Ignored;
        }

        // Targets are tested in their existing order; first geometric hit
        // wins.
        let hit_idx = self.targets.iter().position(|t| t.contains(x, y));
        let Some(idx) = hit_idx else {
            self.recorder.on_miss();
            return ClickOutcome::Miss;
        };

        let target = self.targets.remove(idx);
        let distance = target.distance_from_center(x, y);
        let reaction_secs = now
            .duration_since(target.spawn_time)
            .unwrap_or_default()
            .as_secs_f64();

        let (points, precision_factor) = scoring::score(distance, target.radius, reaction_secs);
        self.recorder
            .on_hit(reaction_secs, precision_factor, target.radius, target.quadrant);

        self.last_points = points;
        self.last_reaction = reaction_secs;
        self.history.push(points, reaction_secs);
        self.round_scores.push((points, reaction_secs));

        let round_complete = self.recorder.hit_count() >= self.config.clicks_per_round;
        if round_complete {
            self.finish_round();
        } else {
            self.spawn_target(now);
        }

        ClickOutcome::Hit {
            points,
            reaction_secs,
            round_complete,
        }
    }

    /// Manual end-round action; ends the round regardless of hit count.
    pub fn end_round(&mut self) {
        if self.phase == Phase::RoundActive {
            self.finish_round();
        }
    }

    /// Flush, persist, refresh the aggregate view, compute the round's
    /// averages, and enter the summary phase. Persistence failures are
    /// logged and never touch the in-memory scoring state.
    fn finish_round(&mut self) {
        let records = self.recorder.flush();
        self.targets.clear();

        if !records.is_empty() {
            match self.store.save_round(&records) {
                Ok(path) => log::info!("round {} data saved to {path:?}", self.round),
                Err(err) => log::warn!("failed to save round {} data: {err}", self.round),
            }
        }

        match self.store.load_all() {
            Ok(table) => self.results = table,
            Err(err) => log::warn!("failed to reload historical results: {err}"),
        }

        let points: Vec<u32> = self.round_scores.iter().map(|(p, _)| *p).collect();
        let times: Vec<f64> = self.round_scores.iter().map(|(_, t)| *t).collect();
        self.last_summary = Some(RoundSummary {
            round: self.round,
            clicks: records.len() as u32,
            avg_points: crate::util::floor_mean(&points),
            avg_reaction: crate::util::mean(&times).unwrap_or(0.0),
        });
        self.round_scores.clear();
        self.phase = Phase::RoundSummary;
    }

    /// Full reset, valid from any phase: back to the welcome screen with all
    /// history, buffers and the round number cleared.
    pub fn reset(&mut self) {
        self.phase = Phase::AwaitingStart;
        self.round = 0;
        self.targets.clear();
        self.recorder.reset(0, Local::now());
        self.round_scores.clear();
        self.history.clear();
        self.results = ResultsTable::default();
        self.last_points = 0;
        self.last_reaction = 0.0;
        self.last_summary = None;
        self.no_quadrant_notice = false;
    }

    pub fn toggle_quadrant(&mut self, quadrant: Quadrant) {
        self.quadrants.toggle(quadrant);
        self.no_quadrant_notice = !self.quadrants.any_enabled();
    }

    /// Spawns one target if the live-target cap allows it. A disabled-all
    /// configuration mid-round or a degenerate playfield never panics; the
    /// failure is logged and no target appears.
    fn spawn_target(&mut self, now: SystemTime) -> bool {
        if self.targets.len() >= self.config.max_targets {
            return false;
        }

        let quadrant = match self.quadrants.pick(&mut self.rng) {
            Ok(q) => q,
            Err(_) => {
                log::warn!("no quadrants enabled for spawning");
                return false;
            }
        };

        let radius = self.config.target_radius;
        let bounds = spawn_bounds(quadrant, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, radius)
            .or_else(|| {
                log::warn!("quadrant {quadrant} too small for radius {radius}, spawning anywhere");
                full_screen_bounds(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, radius)
            });

        let (x, y) = match bounds {
            Some(b) => b.sample(&mut self.rng),
            None => (PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 2.0),
        };

        self.targets.push(Target {
            id: self.next_target_id,
            x,
            y,
            radius,
            spawn_time: now,
            quadrant,
        });
        self.next_target_id += 1;
        true
    }

    // Read accessors polled by the rendering layer.

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn clicks_in_round(&self) -> u32 {
        self.recorder.hit_count()
    }

    pub fn clicks_per_round(&self) -> u32 {
        self.config.clicks_per_round
    }

    pub fn last_points(&self) -> u32 {
        self.last_points
    }

    pub fn last_reaction(&self) -> f64 {
        self.last_reaction
    }

    pub fn avg_points(&self) -> u32 {
        self.history.avg_points()
    }

    pub fn avg_reaction(&self) -> f64 {
        self.history.avg_reaction()
    }

    pub fn history_window(&self) -> usize {
        self.history.capacity()
    }

    pub fn quadrants(&self) -> &QuadrantSelector {
        &self.quadrants
    }

    pub fn no_quadrant_notice(&self) -> bool {
        self.no_quadrant_notice
    }

    pub fn last_summary(&self) -> Option<RoundSummary> {
        self.last_summary
    }

    pub fn results(&self) -> &ResultsTable {
        &self.results
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrant::ALL_QUADRANTS;
    use assert_matches::assert_matches;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    fn test_session() -> (Session, TempDir) {
        let dir = tempdir().unwrap();
        let store = ResultsStore::with_dir(dir.path().join("results"));
        let session = Session::with_rng(Config::default(), store, StdRng::seed_from_u64(99));
        (session, dir)
    }

    fn hit_current_target(session: &mut Session, now: SystemTime) -> ClickOutcome {
        let target = session.targets()[0];
        session.handle_click(target.x, target.y, now)
    }

    #[test]
    fn starts_in_welcome_state() {
        let (session, _dir) = test_session();
        assert_eq!(session.phase(), Phase::AwaitingStart);
        assert_eq!(session.round(), 0);
        assert!(session.targets().is_empty());
    }

    #[test]
    fn start_spawns_targets_and_enters_round_one() {
        let (mut session, _dir) = test_session();
        session.start_next_round(SystemTime::now()).unwrap();

        assert_eq!(session.phase(), Phase::RoundActive);
        assert_eq!(session.round(), 1);
        assert_eq!(session.targets().len(), 1);

        let t = session.targets()[0];
        assert!(t.x >= t.radius && t.x <= PLAYFIELD_WIDTH - t.radius);
        assert!(t.y >= t.radius && t.y <= PLAYFIELD_HEIGHT - t.radius);
    }

    #[test]
    fn dead_center_hit_scores_like_the_formula() {
        let (mut session, _dir) = test_session();
        let t0 = SystemTime::now();
        session.start_next_round(t0).unwrap();

        let outcome = hit_current_target(&mut session, t0 + Duration::from_millis(500));
        assert_matches!(
            outcome,
            ClickOutcome::Hit { points: 296, round_complete: false, .. }
        );
        assert_eq!(session.last_points(), 296);
        assert_eq!(session.clicks_in_round(), 1);
        // a replacement target was spawned
        assert_eq!(session.targets().len(), 1);
    }

    #[test]
    fn miss_keeps_target_and_counts_streak() {
        let (mut session, _dir) = test_session();
        let t0 = SystemTime::now();
        session.start_next_round(t0).unwrap();
        let before = session.targets()[0].id;

        // Click far outside any target
        let outcome = session.handle_click(-100.0, -100.0, t0);
        assert_eq!(outcome, ClickOutcome::Miss);
        assert_eq!(session.targets()[0].id, before);
        assert_eq!(session.clicks_in_round(), 0);
    }

    #[test]
    fn full_round_triggers_exactly_one_summary_transition() {
        let (mut session, _dir) = test_session();
        let mut now = SystemTime::now();
        session.start_next_round(now).unwrap();

        for i in 1..=10u32 {
            now += Duration::from_millis(300);
            let outcome = hit_current_target(&mut session, now);
            let expect_complete = i == 10;
            assert_matches!(outcome, ClickOutcome::Hit { round_complete, .. }
                if round_complete == expect_complete);
        }

        assert_eq!(session.phase(), Phase::RoundSummary);
        assert!(session.targets().is_empty());

        let summary = session.last_summary().unwrap();
        assert_eq!(summary.round, 1);
        assert_eq!(summary.clicks, 10);
        assert!(summary.avg_points > 0);
        assert!(summary.avg_reaction > 0.0);

        // One record file written, ten rows loaded back
        assert_eq!(session.results().len(), 10);
    }

    #[test]
    fn clicks_during_summary_are_ignored_and_never_count_as_misses() {
        let (mut session, _dir) = test_session();
        let now = SystemTime::now();
        session.start_next_round(now).unwrap();
        session.end_round();
        assert_eq!(session.phase(), Phase::RoundSummary);

        assert_eq!(session.handle_click(400.0, 300.0, now), ClickOutcome::Ignored);

        // Start the next round and land a hit: no misses carried over
        session.start_next_round(now).unwrap();
        hit_current_target(&mut session, now + Duration::from_millis(200));
        // The freshly written record is in the recorder buffer
        assert_eq!(session.clicks_in_round(), 1);
    }

    #[test]
    fn manual_end_with_zero_clicks_writes_no_file() {
        let (mut session, _dir) = test_session();
        let now = SystemTime::now();

        // Round 1: complete two hits, end manually -> one file
        session.start_next_round(now).unwrap();
        hit_current_target(&mut session, now + Duration::from_millis(100));
        hit_current_target(&mut session, now + Duration::from_millis(200));
        session.end_round();
        let after_first = session.results().len();
        assert_eq!(after_first, 2);

        // Round 2: zero clicks, manual end -> no new file, prior data intact
        session.start_next_round(now).unwrap();
        session.end_round();
        assert_eq!(session.phase(), Phase::RoundSummary);
        assert_eq!(session.results().len(), after_first);

        let summary = session.last_summary().unwrap();
        assert_eq!(summary.clicks, 0);
        assert_eq!(summary.avg_points, 0);
        assert_eq!(summary.avg_reaction, 0.0);
    }

    #[test]
    fn start_refused_while_all_quadrants_disabled() {
        let (mut session, _dir) = test_session();
        let now = SystemTime::now();
        session.start_next_round(now).unwrap();
        session.end_round();

        for q in ALL_QUADRANTS {
            if session.quadrants().is_enabled(q) {
                session.toggle_quadrant(q);
            }
        }
        assert!(session.no_quadrant_notice());

        assert_matches!(
            session.start_next_round(now),
            Err(GameError::NoQuadrantEnabled)
        );
        assert_eq!(session.phase(), Phase::RoundSummary);
        assert_eq!(session.round(), 1);

        // Re-enabling one quadrant clears the notice and allows the start
        session.toggle_quadrant(Quadrant::BottomLeft);
        assert!(!session.no_quadrant_notice());
        session.start_next_round(now).unwrap();
        assert_eq!(session.phase(), Phase::RoundActive);
        assert_eq!(session.round(), 2);
        assert_eq!(session.targets()[0].quadrant, Quadrant::BottomLeft);
    }

    #[test]
    fn reset_returns_to_welcome_from_any_phase() {
        let (mut session, _dir) = test_session();
        let now = SystemTime::now();
        session.start_next_round(now).unwrap();
        hit_current_target(&mut session, now + Duration::from_millis(100));

        session.reset();
        assert_eq!(session.phase(), Phase::AwaitingStart);
        assert_eq!(session.round(), 0);
        assert!(session.targets().is_empty());
        assert_eq!(session.clicks_in_round(), 0);
        assert_eq!(session.last_points(), 0);
        assert_eq!(session.avg_points(), 0);
        assert!(session.last_summary().is_none());
        assert!(session.results().is_empty());
    }

    #[test]
    fn buffer_never_exceeds_clicks_per_round() {
        let (mut session, _dir) = test_session();
        let mut now = SystemTime::now();
        session.start_next_round(now).unwrap();

        for _ in 0..10 {
            now += Duration::from_millis(100);
            assert!(session.clicks_in_round() < session.clicks_per_round());
            hit_current_target(&mut session, now);
        }
        // Counter reset by the summary transition's flush path
        assert_eq!(session.phase(), Phase::RoundSummary);
    }

    #[test]
    fn rolling_averages_track_the_history_window() {
        let (mut session, _dir) = test_session();
        let t0 = SystemTime::now();
        session.start_next_round(t0).unwrap();

        hit_current_target(&mut session, t0 + Duration::from_millis(500));
        assert_eq!(session.avg_points(), 296);
        assert!((session.avg_reaction() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn targets_only_spawn_in_enabled_quadrants() {
        let (mut session, _dir) = test_session();
        let mut now = SystemTime::now();
        // Leave only top-right enabled
        session.toggle_quadrant(Quadrant::TopLeft);
        session.start_next_round(now).unwrap();

        for _ in 0..9 {
            assert_eq!(session.targets()[0].quadrant, Quadrant::TopRight);
            now += Duration::from_millis(100);
            hit_current_target(&mut session, now);
        }
    }
}
