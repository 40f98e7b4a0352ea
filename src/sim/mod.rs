//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `advance(dt_ms)`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, capture or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod phase;
pub mod projection;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Contact;
pub use projection::{CameraConfig, ScreenPoint, project};
pub use state::{
    BossEncounter, Entity, EntityKind, GameEvent, GamePhase, GameState, Player, VisualEffect,
};
pub use tick::{GameInput, advance, apply_input, register_boss_hit};
