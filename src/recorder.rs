use crate::quadrant::Quadrant;
use chrono::{DateTime, Local};

/// One data row per successful hit. Immutable once constructed; appended to
/// the active round's buffer and flushed to a record file at round end.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickRecord {
    pub click_datetime: String,
    pub reaction_time: f64,
    pub precision_factor: f64,
    pub round_start_time_iso: Option<String>,
    pub game_version: String,
    pub target_radius: f64,
    pub misses_since_last_hit: u32,
    pub round_number: u32,
    pub click_in_round_number: u32,
    pub clicked_quadrant: String,
}

/// Accumulates the data rows for the round in progress and tracks the
/// round's counters. Reports the hit count but never ends rounds itself;
/// the session decides transitions.
#[derive(Debug, Default)]
pub struct RoundRecorder {
    buffer: Vec<ClickRecord>,
    round_number: u32,
    round_started_at: Option<DateTime<Local>>,
    misses_since_last_hit: u32,
    hits: u32,
}

impl RoundRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the buffer and counters for a new round.
    pub fn reset(&mut self, round_number: u32, round_started_at: DateTime<Local>) {
        self.buffer.clear();
        self.round_number = round_number;
        self.round_started_at = Some(round_started_at);
        self.misses_since_last_hit = 0;
        self.hits = 0;
    }

    /// Builds and appends the record for a hit. The 1-based click index is
    /// taken before the hit counter is incremented so the round's final
    /// record still carries a correct index; the miss streak is embedded in
    /// the record and then zeroed.
    pub fn on_hit(
        &mut self,
        reaction_secs: f64,
        precision_factor: f64,
        target_radius: f64,
        quadrant: Quadrant,
    ) -> &ClickRecord {
        let record = ClickRecord {
            click_datetime: Local::now().to_rfc3339(),
            reaction_time: reaction_secs,
            precision_factor,
            round_start_time_iso: self.round_started_at.map(|t| t.to_rfc3339()),
            game_version: env!("CARGO_PKG_VERSION").to_string(),
            target_radius,
            misses_since_last_hit: self.misses_since_last_hit,
            round_number: self.round_number,
            click_in_round_number: self.hits + 1,
            clicked_quadrant: quadrant.tag().to_string(),
        };

        self.buffer.push(record);
        self.misses_since_last_hit = 0;
        self.hits += 1;

        self.buffer.last().unwrap()
    }

    pub fn on_miss(&mut self) {
        self.misses_since_last_hit += 1;
    }

    /// Returns and clears the buffer. Called exactly once per round, at
    /// round end.
    pub fn flush(&mut self) -> Vec<ClickRecord> {
        std::mem::take(&mut self.buffer)
    }

    pub fn hit_count(&self) -> u32 {
        self.hits
    }

    pub fn misses_since_last_hit(&self) -> u32 {
        self.misses_since_last_hit
    }

    pub fn buffer(&self) -> &[ClickRecord] {
        &self.buffer
    }
}
