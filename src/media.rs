//! Background video playback-rate hints
//!
//! The core never touches the video itself. It tracks the rate it wants and
//! reports changes; the presentation layer applies them.

use serde::{Deserialize, Serialize};

/// Playback rate bounds while running
pub const MIN_PLAYBACK_RATE: f32 = 0.25;
pub const MAX_PLAYBACK_RATE: f32 = 5.0;
/// Changes smaller than this are not applied (prevents jitter)
pub const RATE_DEADBAND: f32 = 0.05;
/// Perceived-speed score the game pace is normalized against
pub const REFERENCE_SPEED_SCORE: f32 = 8.0;

/// Rate used while the boss warning counts down
pub const WARNING_RATE: f32 = 0.1;
/// Rate used during the boss fight (paused)
pub const FIGHT_RATE: f32 = 0.0;
pub const NORMAL_RATE: f32 = 1.0;

/// Desired playback rate for the background video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSync {
    pub rate: f32,
}

impl Default for PlaybackSync {
    fn default() -> Self {
        Self { rate: NORMAL_RATE }
    }
}

impl PlaybackSync {
    /// Target rate for a game pace (current / base speed) and the
    /// calibration service's perceived-speed estimate
    pub fn target_rate(pace: f32, speed_estimate: f32) -> f32 {
        let estimate = speed_estimate.max(1.0);
        (REFERENCE_SPEED_SCORE / estimate * pace).clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE)
    }

    /// Follow the game pace, applying only changes beyond the deadband.
    /// Returns the new rate when it changed.
    pub fn sync(&mut self, pace: f32, speed_estimate: f32) -> Option<f32> {
        let target = Self::target_rate(pace, speed_estimate);
        if (self.rate - target).abs() > RATE_DEADBAND {
            self.rate = target;
            Some(target)
        } else {
            None
        }
    }

    /// Set the rate unconditionally (phase hooks). Returns the new rate when it changed.
    pub fn force(&mut self, rate: f32) -> Option<f32> {
        if self.rate == rate {
            return None;
        }
        self.rate = rate;
        Some(rate)
    }
}
