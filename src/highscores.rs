//! Best score tracking
//!
//! In memory only: lives as long as the page (or process) does.

use serde::{Deserialize, Serialize};

/// Number of recent session results to keep
pub const MAX_RECENT: usize = 10;

/// A finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Final score
    pub score: u32,
    /// Session generation the score belongs to
    pub generation: u64,
}

/// Best score plus a short history of recent results
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    best: u32,
    /// Most recent first
    recent: Vec<SessionResult>,
}

impl HighScores {
    /// Create empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score so far. Never decreases.
    pub fn best(&self) -> u32 {
        self.best
    }

    /// Check if a score would raise the best
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.best
    }

    /// Record a finished session. Returns true if it set a new best.
    pub fn record(&mut self, score: u32, generation: u64) -> bool {
        self.recent.insert(0, SessionResult { score, generation });
        self.recent.truncate(MAX_RECENT);

        if self.qualifies(score) {
            log::info!("New best score: {} (was {})", score, self.best);
            self.best = score;
            true
        } else {
            false
        }
    }

    pub fn recent(&self) -> &[SessionResult] {
        &self.recent
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}
