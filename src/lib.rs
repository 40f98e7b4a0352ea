//! Lane Rush - a three-lane pseudo-3D endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (projection, kinematics, spawning, collisions, phases)
//! - `renderer`: Projection-driven draw lists and a software rasterizer
//! - `gesture`: Two-hand repetition recognizer and the hand-tracking link
//! - `calibration`: Camera configuration supplied by the calibration service
//! - `media`: Background video playback-rate hints
//! - `highscores`: Top-N leaderboard persistence
//! - `tuning`: Data-driven game balance

pub mod calibration;
pub mod game;
pub mod gesture;
pub mod highscores;
pub mod media;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use calibration::Calibration;
pub use game::{Game, GameInput};
pub use highscores::{Leaderboard, ScoreEntry};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step used by the headless driver (60 Hz, in ms)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Screen dimensions the projection maps into
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// World width of a single lane
    pub const LANE_WIDTH: f32 = 120.0;
    /// Number of lanes
    pub const LANE_COUNT: usize = 3;

    /// Projection focal constant: depth at which scale is 1.0 is 0
    pub const PROJECTION_K: f32 = 800.0;
    /// Minimum pseudo-depth before an entity counts as behind the camera
    pub const NEAR_CLIP: f32 = 10.0;
    /// Divisor for the quadratic road-curvature term
    pub const CURVE_DIVISOR: f32 = 50_000.0;
    /// Fog begins this far before the spawn distance
    pub const FOG_LEAD: f32 = 1000.0;
    /// Entities are fully faded this far past the spawn distance
    pub const FOG_TAIL: f32 = 500.0;

    /// Player kinematics (per tick)
    pub const GRAVITY: f32 = 1.2;
    pub const JUMP_VELOCITY: f32 = 22.0;
    pub const LATERAL_SPEED: f32 = 18.0;
    /// Player collision half-width
    pub const PLAYER_HALF_WIDTH: f32 = 20.0;

    /// Scroll speed (world units per tick)
    pub const BASE_SCROLL_SPEED: f32 = 25.0;
    /// Extra scroll speed per unit of distance travelled
    pub const SPEED_RAMP: f32 = 0.0001;
    /// Bus-class entities scroll this much faster
    pub const BUS_SPEED_BONUS: f32 = 20.0;

    /// Distance units per point of score
    pub const SCORE_DIVISOR: f32 = 250.0;

    /// Entity dimensions
    pub const OBSTACLE_WIDTH: f32 = 90.0;
    pub const BUS_WIDTH_FACTOR: f32 = 1.3;
    pub const TOKEN_HEIGHT: f32 = 50.0;
    pub const LOW_BARRIER_HEIGHT: f32 = 60.0;
    pub const TALL_BARRIER_HEIGHT: f32 = 120.0;
    pub const WEAVER_HEIGHT: f32 = 100.0;
    pub const BUS_HEIGHT: f32 = 280.0;

    /// Depth band in which entities can touch the player
    pub const COLLISION_NEAR_Z: f32 = -60.0;
    pub const COLLISION_FAR_Z: f32 = 40.0;
    /// Entities are dropped once they scroll behind this depth
    pub const DESPAWN_Z: f32 = -200.0;

    /// Spawner thresholds (ticks)
    pub const SPAWN_THRESHOLD_START: u32 = 70;
    pub const SPAWN_THRESHOLD_FLOOR: u32 = 25;
    /// Distance per one-tick reduction of the spawn threshold
    pub const SPAWN_RAMP_DISTANCE: f32 = 2000.0;

    /// Credits
    pub const CREDIT_GOAL: u32 = 160;
    pub const CREDITS_PER_TOKEN: u32 = 4;

    /// Boss encounter timing (ms)
    pub const BOSS_INTERVAL_MS: f32 = 30_000.0;
    pub const BOSS_WARNING_MS: f32 = 3_000.0;
    pub const BOSS_FIGHT_MS: f32 = 67_000.0;
    /// Repetitions needed to win the encounter
    pub const REPS_TO_WIN: u32 = 6;
    /// Minimum spacing between counted hits (ms)
    pub const HIT_DEBOUNCE_MS: f64 = 150.0;
    /// Obstacles nearer than this are cleared after a won encounter
    pub const BOSS_CLEAR_DEPTH: f32 = 2000.0;

    /// Grace period after spawning or losing a shield (ms)
    pub const INVINCIBILITY_MS: f64 = 1500.0;

    /// Normalized wrist displacement that counts as movement
    pub const GESTURE_THRESHOLD: f32 = 0.05;
}

/// Lane-center world X for a lane index
#[inline]
pub fn lane_center_x(lane: usize) -> f32 {
    (lane as f32 - 1.0) * consts::LANE_WIDTH
}

/// Move `current` toward `target` by at most `step`, never overshooting
#[inline]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else if current > target {
        (current - step).max(target)
    } else {
        current
    }
}
