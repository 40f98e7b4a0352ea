//! Single-vanishing-point pseudo-3D projection
//!
//! World space: `x` lateral offset (lane centers at -120/0/120), `y` height
//! above the ground, `z` depth ahead of the player (player sits at 0).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Camera parameters, usually supplied by the calibration service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    /// Vanishing point X (pixels)
    pub vp_x: f32,
    /// Horizon line Y (pixels)
    pub horizon_y: f32,
    /// Width of the three-lane road at the bottom of the screen (pixels)
    pub road_width: f32,
    /// Sideways bend applied to distant geometry
    pub curvature: f32,
    /// Depth at which new entities appear
    pub spawn_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            vp_x: 400.0,
            horizon_y: 180.0,
            road_width: 640.0,
            curvature: 0.0,
            spawn_distance: 4000.0,
        }
    }
}

impl CameraConfig {
    /// Whether this configuration can be projected through
    pub fn is_valid(&self) -> bool {
        let finite = [
            self.vp_x,
            self.horizon_y,
            self.road_width,
            self.curvature,
            self.spawn_distance,
        ]
        .iter()
        .all(|v| v.is_finite());

        finite
            && self.horizon_y > 0.0
            && self.horizon_y < SCREEN_HEIGHT
            && self.road_width > 0.0
            && self.spawn_distance > FOG_LEAD
    }

    /// Screen pixels per world unit at scale 1.0
    #[inline]
    pub fn pixels_per_unit(&self) -> f32 {
        self.road_width / (LANE_COUNT as f32 * LANE_WIDTH)
    }

    /// Distance fog: 1.0 up close, fading to 0 past the spawn distance
    pub fn fog_alpha(&self, z: f32) -> f32 {
        let fade_start = self.spawn_distance - FOG_LEAD;
        let fade_end = self.spawn_distance + FOG_TAIL;
        if z > fade_start {
            (1.0 - (z - fade_start) / (fade_end - fade_start)).max(0.0)
        } else {
            1.0
        }
    }
}

/// A projected point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Screen position (pixels, y down)
    pub pos: Vec2,
    /// Perspective scale `K / (z + K)`
    pub scale: f32,
    /// Pixels per world unit at this depth
    pub pixel_scale: f32,
    /// Fog opacity
    pub alpha: f32,
}

/// Project a world position to the screen.
///
/// Returns `None` when the point is behind the camera; callers must skip it.
pub fn project(world: Vec3, camera: &CameraConfig) -> Option<ScreenPoint> {
    let dist = world.z + PROJECTION_K;
    if dist <= NEAR_CLIP {
        return None;
    }

    let scale = PROJECTION_K / dist;
    let ppu = camera.pixels_per_unit();

    let floor_y = camera.horizon_y + (SCREEN_HEIGHT - camera.horizon_y) * scale;
    let y = floor_y - world.y * ppu * scale;

    let curve = camera.curvature * world.z * world.z / CURVE_DIVISOR;
    let x = camera.vp_x + world.x * ppu * scale + curve;

    Some(ScreenPoint {
        pos: Vec2::new(x, y),
        scale,
        pixel_scale: scale * ppu,
        alpha: camera.fog_alpha(world.z),
    })
}
