//! Per-hand cycle detection and joint repetition counting

use super::HandFrame;

/// Neutral wrist height used after a reset
const NEUTRAL_Y: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CyclePhase {
    /// Waiting for the wrist to leave its last rest position
    Idle,
    /// Wrist moved away; waiting for it to come back from `extreme_y`
    AtExtreme { extreme_y: f32 },
}

/// Two-phase motion detector for one hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTracker {
    pub last_y: f32,
    pub phase: CyclePhase,
    /// A half-cycle finished and has not been paired yet
    pub completed: bool,
}

impl CycleTracker {
    pub fn new(y: f32) -> Self {
        Self {
            last_y: y,
            phase: CyclePhase::Idle,
            completed: false,
        }
    }

    /// Feed one wrist height
    pub fn update(&mut self, y: f32, threshold: f32) {
        match self.phase {
            CyclePhase::Idle => {
                if (y - self.last_y).abs() > threshold {
                    self.phase = CyclePhase::AtExtreme { extreme_y: y };
                }
            }
            CyclePhase::AtExtreme { extreme_y } => {
                if (y - extreme_y).abs() > threshold {
                    self.completed = true;
                    self.phase = CyclePhase::Idle;
                    self.last_y = y;
                }
            }
        }
    }
}

/// Counts repetitions that both hands complete
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    pub left: CycleTracker,
    pub right: CycleTracker,
    threshold: f32,
}

impl GestureRecognizer {
    pub fn new(threshold: f32) -> Self {
        Self {
            left: CycleTracker::new(NEUTRAL_Y),
            right: CycleTracker::new(NEUTRAL_Y),
            threshold,
        }
    }

    /// Back to neutral, e.g. on entering a boss encounter
    pub fn reset(&mut self) {
        self.left = CycleTracker::new(NEUTRAL_Y);
        self.right = CycleTracker::new(NEUTRAL_Y);
    }

    /// Feed one tracker sample. Unusable samples are ignored.
    /// Returns true on a joint completion (before any debounce).
    pub fn process(&mut self, frame: &HandFrame) -> bool {
        match frame.wrist_pair() {
            Some((left_y, right_y)) => self.process_pair(left_y, right_y),
            None => false,
        }
    }

    pub fn process_pair(&mut self, left_y: f32, right_y: f32) -> bool {
        self.left.update(left_y, self.threshold);
        self.right.update(right_y, self.threshold);

        if self.left.completed && self.right.completed {
            // Restart both cycles from here so residual drift cannot pair later
            self.left = CycleTracker::new(left_y);
            self.right = CycleTracker::new(right_y);
            return true;
        }
        false
    }
}
