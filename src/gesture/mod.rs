//! Two-hand repetition input
//!
//! Hand samples arrive from a tracker running at its own cadence and are
//! queued over a bounded channel; the frame tick drains them and feeds the
//! recognizer. Only the wrist's normalized vertical position is used.

pub mod link;
pub mod recognizer;

pub use link::{
    CaptureError, HandTracker, NoTracker, ReplayTracker, SyntheticTracker, TrackingLink,
};
pub use recognizer::{CyclePhase, CycleTracker, GestureRecognizer};

use serde::{Deserialize, Serialize};

/// Index of the wrist in a hand's keypoint list
pub const WRIST: usize = 0;

/// Normalized image coordinates (0 = top/left, 1 = bottom/right)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// One tracked hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    /// `"Left"` or `"Right"` as reported by the tracker
    pub label: String,
    pub keypoints: Vec<Keypoint>,
}

impl HandObservation {
    /// A hand with only the wrist keypoint
    pub fn wrist(label: &str, y: f32) -> Self {
        Self {
            label: label.to_string(),
            keypoints: vec![Keypoint { x: 0.5, y, z: 0.0 }],
        }
    }

    /// Normalized wrist height, if present and finite
    pub fn wrist_y(&self) -> Option<f32> {
        self.keypoints
            .get(WRIST)
            .map(|k| k.y)
            .filter(|y| y.is_finite())
    }
}

/// All hands seen in one tracker sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub hands: Vec<HandObservation>,
}

impl HandFrame {
    /// A sample with a left and a right wrist
    pub fn two_hands(left_y: f32, right_y: f32) -> Self {
        Self {
            hands: vec![
                HandObservation::wrist("Left", left_y),
                HandObservation::wrist("Right", right_y),
            ],
        }
    }

    /// `(left, right)` wrist heights when the sample holds exactly one hand
    /// of each label. Anything else is not usable.
    pub fn wrist_pair(&self) -> Option<(f32, f32)> {
        if self.hands.len() != 2 {
            return None;
        }
        let find = |label: &str| {
            let mut matching = self.hands.iter().filter(|h| h.label == label);
            match (matching.next(), matching.next()) {
                (Some(hand), None) => hand.wrist_y(),
                _ => None,
            }
        };
        Some((find("Left")?, find("Right")?))
    }
}
