use crate::util::{floor_mean, mean};
use std::collections::VecDeque;

/// Rolling window of the last N hits, used only for the UI's running
/// averages. Independent of the round buffer that gets persisted.
#[derive(Clone, Debug)]
pub struct HistoryWindow {
    entries: VecDeque<(u32, f64)>,
    capacity: usize,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a (points, reaction time) pair, evicting the oldest entry
    /// once the window is full.
    pub fn push(&mut self, points: u32, reaction_secs: f64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((points, reaction_secs));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn avg_points(&self) -> u32 {
        let points: Vec<u32> = self.entries.iter().map(|(p, _)| *p).collect();
        floor_mean(&points)
    }

    pub fn avg_reaction(&self) -> f64 {
        let times: Vec<f64> = self.entries.iter().map(|(_, t)| *t).collect();
        mean(&times).unwrap_or(0.0)
    }
}
