//! Camera calibration supplied by the external perspective-analysis service
//!
//! The service answers with free text that should contain a JSON object of
//! normalized values. Anything unusable falls back to the default camera so a
//! session never fails because of calibration.

use serde::Deserialize;
use thiserror::Error;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::CameraConfig;

/// Perceived-speed score assumed when none is supplied
pub const DEFAULT_SPEED_ESTIMATE: f32 = 5.0;

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("calibration reply contains no JSON object")]
    NoObject,
    #[error("calibration reply is not valid JSON: {0}")]
    Parse(String),
    #[error("calibration produced an unusable camera: {0:?}")]
    OutOfRange(CameraConfig),
}

/// Camera configuration plus the perceived-speed estimate of the background
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub camera: CameraConfig,
    /// 1 (slow) to 10 (fast)
    pub speed_estimate: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            speed_estimate: DEFAULT_SPEED_ESTIMATE,
        }
    }
}

/// Normalized fields the calibration service reports
#[derive(Debug, Deserialize)]
struct Report {
    vp_x: Option<f32>,
    vp_y: Option<f32>,
    road_width: Option<f32>,
    curvature: Option<f32>,
    speed: Option<f32>,
}

/// Span from the first `{` to the last `}` in free text, so nested
/// objects stay intact
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

impl Calibration {
    /// Build a calibration from the service's reply. The current spawn
    /// distance is kept since the service does not estimate it.
    pub fn from_report(text: &str, spawn_distance: f32) -> Result<Self, CalibrationError> {
        let object = extract_object(text).ok_or(CalibrationError::NoObject)?;
        let report: Report =
            serde_json::from_str(object).map_err(|e| CalibrationError::Parse(e.to_string()))?;

        let camera = CameraConfig {
            vp_x: report.vp_x.unwrap_or(0.5) * SCREEN_WIDTH,
            horizon_y: report.vp_y.unwrap_or(0.3) * SCREEN_HEIGHT,
            road_width: report.road_width.unwrap_or(0.8) * SCREEN_WIDTH,
            curvature: report.curvature.unwrap_or(0.0).clamp(-10.0, 10.0),
            spawn_distance,
        };
        if !camera.is_valid() {
            return Err(CalibrationError::OutOfRange(camera));
        }

        let speed_estimate = report
            .speed
            .filter(|s| s.is_finite())
            .unwrap_or(DEFAULT_SPEED_ESTIMATE)
            .clamp(1.0, 10.0);

        Ok(Self {
            camera,
            speed_estimate,
        })
    }

    /// Like `from_report`, but any failure yields the default calibration
    pub fn from_report_or_default(text: &str) -> Self {
        let spawn_distance = CameraConfig::default().spawn_distance;
        match Self::from_report(text, spawn_distance) {
            Ok(calibration) => {
                log::info!("Calibration applied: {:?}", calibration.camera);
                calibration
            }
            Err(e) => {
                log::warn!("Calibration rejected ({e}), using default camera");
                Self::default()
            }
        }
    }

    /// Replace unusable values with defaults
    pub fn sanitized(self) -> Self {
        let camera = if self.camera.is_valid() {
            self.camera
        } else {
            log::warn!("Invalid camera {:?}, using default", self.camera);
            CameraConfig::default()
        };
        let speed_estimate = if self.speed_estimate.is_finite() {
            self.speed_estimate.max(1.0)
        } else {
            DEFAULT_SPEED_ESTIMATE
        };
        Self {
            camera,
            speed_estimate,
        }
    }
}
