//! Front end configuration

use std::path::PathBuf;
use std::time::Duration;

use view::{HeuristicProgress, PlaybackTiming};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const DEFAULT_OUT_DIR: &str = "sandbox-out";

/// Side of the square environment and value canvases.
pub const DEFAULT_CANVAS_PX: u32 = 400;
pub const CHART_SIZE: (u32, u32) = (500, 250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause between replayed steps.
    pub step_interval: Duration,
    /// Readout lingers this long after a replay.
    pub linger: Duration,
    /// Progress estimate refresh while training.
    pub tick: Duration,
    /// Delay before a manual episode that reached `done` is reset.
    pub auto_reset_delay: Duration,
    pub log_poll: Duration,
    pub request_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        let playback = PlaybackTiming::default();
        Self {
            step_interval: playback.step_interval,
            linger: playback.linger,
            tick: Duration::from_millis(100),
            auto_reset_delay: Duration::from_secs(1),
            log_poll: Duration::from_secs(1),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl Timing {
    #[must_use]
    pub fn playback(&self) -> PlaybackTiming {
        PlaybackTiming {
            step_interval: self.step_interval,
            linger: self.linger,
        }
    }
}

/// Pixel sizes of the three canvases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSizes {
    pub environment: (u32, u32),
    pub values: (u32, u32),
    pub chart: (u32, u32),
}

impl CanvasSizes {
    #[must_use]
    pub fn square(px: u32) -> Self {
        Self {
            environment: (px, px),
            values: (px, px),
            chart: CHART_SIZE,
        }
    }
}

impl Default for CanvasSizes {
    fn default() -> Self {
        Self::square(DEFAULT_CANVAS_PX)
    }
}

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Base URL of the solver.
    pub server: String,
    /// Directory that receives rendered PNGs.
    pub out_dir: PathBuf,
    pub canvas: CanvasSizes,
    pub timing: Timing,
    pub progress: HeuristicProgress,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_owned(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            canvas: CanvasSizes::default(),
            timing: Timing::default(),
            progress: HeuristicProgress::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_front_end_timings() {
        let timing = Timing::default();
        assert_eq!(timing.step_interval, Duration::from_millis(200));
        assert_eq!(timing.linger, Duration::from_millis(2000));
        assert_eq!(timing.tick, Duration::from_millis(100));
        assert_eq!(timing.playback(), PlaybackTiming::default());
    }

    #[test]
    fn chart_keeps_its_aspect() {
        let sizes = CanvasSizes::square(600);
        assert_eq!(sizes.environment, (600, 600));
        assert_eq!(sizes.chart, (500, 250));
    }
}
