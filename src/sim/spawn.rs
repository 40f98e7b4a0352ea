//! Entity spawner

use rand::Rng;

use super::state::{EntityKind, GameState};
use crate::consts::LANE_COUNT;
use crate::tuning::{SpawnWeights, Tuning};

/// Map a roll in `[0, 1)` onto the weighted kind bands.
///
/// Band order: credit, shield, low, tall, weaver, bus (the remainder).
pub fn kind_for_roll(roll: f32, weights: &SpawnWeights) -> EntityKind {
    let bands = [
        (weights.credit, EntityKind::CreditToken),
        (weights.shield, EntityKind::ShieldToken),
        (weights.low_barrier, EntityKind::LowBarrier),
        (weights.tall_barrier, EntityKind::TallBarrier),
        (weights.weaver, EntityKind::Weaver),
    ];

    let total = weights.total();
    let target = roll * total;
    let mut upper = 0.0;
    for (weight, kind) in bands {
        upper += weight;
        if target < upper {
            return kind;
        }
    }
    EntityKind::Bus
}

/// Advance the spawn counter; spawns one entity at the spawn depth when the
/// distance-dependent threshold is exceeded. Returns the new entity's id.
pub fn step_spawner(state: &mut GameState, tuning: &Tuning, spawn_distance: f32) -> Option<u32> {
    state.spawn_ticks += 1;
    if state.spawn_ticks <= tuning.spawn_threshold(state.distance) {
        return None;
    }
    state.spawn_ticks = 0;

    let roll: f32 = state.rng.random();
    let kind = kind_for_roll(roll, &tuning.spawn_weights);
    let lane = state.rng.random_range(0..LANE_COUNT);
    let id = state.spawn_entity(kind, lane, spawn_distance);
    log::trace!("Spawned {:?} #{} in lane {}", kind, id, lane);
    Some(id)
}
