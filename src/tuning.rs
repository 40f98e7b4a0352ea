//! Game balance tunables
//!
//! Defaults come from `consts`; any subset can be overridden from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Failure loading or validating a tuning file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Relative weights of the six spawnable kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub credit: f32,
    pub shield: f32,
    pub low_barrier: f32,
    pub tall_barrier: f32,
    pub weaver: f32,
    pub bus: f32,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            credit: 0.30,
            shield: 0.03,
            low_barrier: 0.17,
            tall_barrier: 0.20,
            weaver: 0.15,
            bus: 0.15,
        }
    }
}

impl SpawnWeights {
    pub fn total(&self) -> f32 {
        self.credit + self.shield + self.low_barrier + self.tall_barrier + self.weaver + self.bus
    }

    fn all_non_negative(&self) -> bool {
        [
            self.credit,
            self.shield,
            self.low_barrier,
            self.tall_barrier,
            self.weaver,
            self.bus,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Overridable game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub gravity: f32,
    pub jump_velocity: f32,
    pub lateral_speed: f32,
    /// Grace period after spawn or shield use (ms)
    pub invincibility_ms: f64,

    // === Pace ===
    pub base_scroll_speed: f32,
    pub speed_ramp: f32,
    pub bus_speed_bonus: f32,
    pub score_divisor: f32,

    // === Spawner ===
    pub spawn_threshold_start: u32,
    pub spawn_threshold_floor: u32,
    pub spawn_ramp_distance: f32,
    pub spawn_weights: SpawnWeights,

    // === Credits ===
    pub credit_goal: u32,
    pub credits_per_token: u32,

    // === Boss encounter ===
    pub boss_interval_ms: f32,
    pub boss_warning_ms: f32,
    pub boss_fight_ms: f32,
    pub reps_to_win: u32,
    pub hit_debounce_ms: f64,
    pub boss_clear_depth: f32,
    pub gesture_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            lateral_speed: LATERAL_SPEED,
            invincibility_ms: INVINCIBILITY_MS,

            base_scroll_speed: BASE_SCROLL_SPEED,
            speed_ramp: SPEED_RAMP,
            bus_speed_bonus: BUS_SPEED_BONUS,
            score_divisor: SCORE_DIVISOR,

            spawn_threshold_start: SPAWN_THRESHOLD_START,
            spawn_threshold_floor: SPAWN_THRESHOLD_FLOOR,
            spawn_ramp_distance: SPAWN_RAMP_DISTANCE,
            spawn_weights: SpawnWeights::default(),

            credit_goal: CREDIT_GOAL,
            credits_per_token: CREDITS_PER_TOKEN,

            boss_interval_ms: BOSS_INTERVAL_MS,
            boss_warning_ms: BOSS_WARNING_MS,
            boss_fight_ms: BOSS_FIGHT_MS,
            reps_to_win: REPS_TO_WIN,
            hit_debounce_ms: HIT_DEBOUNCE_MS,
            boss_clear_depth: BOSS_CLEAR_DEPTH,
            gesture_threshold: GESTURE_THRESHOLD,
        }
    }
}

impl Tuning {
    /// Scroll speed for a cumulative distance
    pub fn scroll_speed(&self, distance: f32) -> f32 {
        self.base_scroll_speed + distance * self.speed_ramp
    }

    /// Score for a cumulative distance
    pub fn score_for(&self, distance: f32) -> u64 {
        (distance / self.score_divisor).floor() as u64
    }

    /// Ticks between spawns at a cumulative distance
    pub fn spawn_threshold(&self, distance: f32) -> u32 {
        let steps = (distance / self.spawn_ramp_distance).floor().max(0.0);
        let steps = steps.min(self.spawn_threshold_start as f32) as u32;
        self.spawn_threshold_start
            .saturating_sub(steps)
            .max(self.spawn_threshold_floor)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason })
            }
        }

        check(self.gravity > 0.0, "gravity", "must be positive")?;
        check(self.jump_velocity > 0.0, "jump_velocity", "must be positive")?;
        check(self.lateral_speed > 0.0, "lateral_speed", "must be positive")?;
        check(self.base_scroll_speed > 0.0, "base_scroll_speed", "must be positive")?;
        check(self.speed_ramp >= 0.0, "speed_ramp", "must not be negative")?;
        check(
            self.bus_speed_bonus.is_finite() && self.bus_speed_bonus >= 0.0,
            "bus_speed_bonus",
            "must be finite and not negative",
        )?;
        check(
            self.invincibility_ms.is_finite() && self.invincibility_ms >= 0.0,
            "invincibility_ms",
            "must be finite and not negative",
        )?;
        check(self.score_divisor > 0.0, "score_divisor", "must be positive")?;
        check(self.spawn_ramp_distance > 0.0, "spawn_ramp_distance", "must be positive")?;
        check(
            self.spawn_threshold_floor <= self.spawn_threshold_start,
            "spawn_threshold_floor",
            "must not exceed spawn_threshold_start",
        )?;
        check(
            self.spawn_weights.all_non_negative(),
            "spawn_weights",
            "weights must be finite and non-negative",
        )?;
        check(self.spawn_weights.total() > 0.0, "spawn_weights", "weights must not all be zero")?;
        check(self.credits_per_token > 0, "credits_per_token", "must be positive")?;
        check(self.boss_interval_ms > 0.0, "boss_interval_ms", "must be positive")?;
        check(self.boss_warning_ms > 0.0, "boss_warning_ms", "must be positive")?;
        check(self.boss_fight_ms > 0.0, "boss_fight_ms", "must be positive")?;
        check(self.reps_to_win >= 1, "reps_to_win", "must be at least 1")?;
        check(
            self.boss_clear_depth.is_finite() && self.boss_clear_depth >= 0.0,
            "boss_clear_depth",
            "must be finite and not negative",
        )?;
        check(self.hit_debounce_ms >= 0.0, "hit_debounce_ms", "must not be negative")?;
        check(self.gesture_threshold > 0.0, "gesture_threshold", "must be positive")?;
        Ok(())
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning: Tuning = serde_json::from_str(&json)?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Using default tuning ({e})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Tuning saved to {}", path.display());
        Ok(())
    }
}
