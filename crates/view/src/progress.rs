//! Training progress estimate
//!
//! The solver answers a training request in one piece and reports nothing in
//! between. [`HeuristicProgress`] fills the gap with a wall-clock guess: it
//! assumes a run takes `estimated_total` and never claims more than `cap`
//! percent until the response actually arrives. It is an estimate, not a
//! measurement, and is labelled as such wherever it is shown.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEstimate {
    /// Percent complete, `0.0..=100.0`.
    pub percent: f64,
    /// Episode the run is assumed to have reached.
    pub episode: u32,
    /// `false` for heuristic guesses, `true` once the run has finished.
    pub exact: bool,
}

impl ProgressEstimate {
    #[must_use]
    pub const fn start() -> Self {
        Self {
            percent: 0.0,
            episode: 0,
            exact: false,
        }
    }

    #[must_use]
    pub const fn complete(total_episodes: u32) -> Self {
        Self {
            percent: 100.0,
            episode: total_episodes,
            exact: true,
        }
    }

    /// Whole percent for display, suffixed with `~` while estimated.
    #[must_use]
    pub fn label(&self) -> String {
        let whole = self.percent.floor();
        if self.exact {
            format!("{whole}%")
        } else {
            format!("~{whole}%")
        }
    }
}

/// Wall-clock progress heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicProgress {
    pub estimated_total: Duration,
    pub cap: f64,
}

impl Default for HeuristicProgress {
    fn default() -> Self {
        Self {
            estimated_total: Duration::from_secs(5),
            cap: 95.0,
        }
    }
}

impl HeuristicProgress {
    #[must_use]
    pub fn estimate(&self, elapsed: Duration, total_episodes: u32) -> ProgressEstimate {
        let total = self.estimated_total.as_secs_f64().max(f64::EPSILON);
        let percent = (elapsed.as_secs_f64() / total * 100.0).min(self.cap);
        let episode = (percent / 100.0 * f64::from(total_episodes)).floor() as u32;
        ProgressEstimate {
            percent,
            episode,
            exact: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_grows_linearly_then_caps() {
        let heuristic = HeuristicProgress::default();
        let half = heuristic.estimate(Duration::from_millis(2500), 1000);
        assert!((half.percent - 50.0).abs() < 1e-9);
        assert_eq!(half.episode, 500);
        assert!(!half.exact);

        let late = heuristic.estimate(Duration::from_secs(60), 1000);
        assert_eq!(late.percent, 95.0);
        assert_eq!(late.episode, 950);
    }

    #[test]
    fn labels_mark_estimates() {
        assert_eq!(ProgressEstimate::start().label(), "~0%");
        assert_eq!(ProgressEstimate::complete(10).label(), "100%");
    }
}
