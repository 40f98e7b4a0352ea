//! Simple driver for demo and headless runs

use super::state::{Entity, EntityKind, GamePhase, GameState};
use super::tick::GameInput;
use crate::consts::{LANE_COUNT, PLAYER_HALF_WIDTH};
use crate::lane_center_x;

/// Barriers further than this are ignored
const LOOKAHEAD_Z: f32 = 600.0;
/// Jump a low barrier once it is this close
const JUMP_TRIGGER_Z: f32 = 110.0;

fn in_lane(entity: &Entity, lane: usize) -> bool {
    entity.pos.z > 0.0
        && entity.pos.z < LOOKAHEAD_Z
        && entity.overlaps_x(lane_center_x(lane), PLAYER_HALF_WIDTH)
}

/// Nearest barrier ahead in a lane
fn nearest_barrier(state: &GameState, lane: usize) -> Option<&Entity> {
    state
        .entities
        .iter()
        .filter(|e| !e.kind.is_collectible() && in_lane(e, lane))
        .min_by(|a, b| a.pos.z.total_cmp(&b.pos.z))
}

/// Credit or shield token ahead in a lane
fn has_collectible(state: &GameState, lane: usize) -> bool {
    state
        .entities
        .iter()
        .any(|e| e.kind.is_collectible() && in_lane(e, lane))
}

fn step_toward(from: usize, to: usize) -> Option<GameInput> {
    match to.cmp(&from) {
        std::cmp::Ordering::Less => Some(GameInput::LaneLeft),
        std::cmp::Ordering::Greater => Some(GameInput::LaneRight),
        std::cmp::Ordering::Equal => None,
    }
}

/// Suggest the next input for the current state, if any
pub fn suggest(state: &GameState) -> Option<GameInput> {
    match state.phase {
        GamePhase::Start => Some(GameInput::Confirm),
        GamePhase::Graduated => Some(GameInput::Continue),
        GamePhase::BossFight => Some(GameInput::Hit),
        GamePhase::BossWarning | GamePhase::GameOver => None,
        GamePhase::Playing => suggest_running(state),
    }
}

fn suggest_running(state: &GameState) -> Option<GameInput> {
    let player = &state.player;
    // Let the current lane change finish first
    if player.pos.x != player.target_x {
        return None;
    }
    let lane = player.lane;
    let neighbours = [lane.checked_sub(1), (lane + 1 < LANE_COUNT).then_some(lane + 1)];

    if let Some(threat) = nearest_barrier(state, lane) {
        if threat.kind == EntityKind::LowBarrier {
            return (threat.pos.z < JUMP_TRIGGER_Z && !player.jumping).then_some(GameInput::Jump);
        }
        let escape = neighbours
            .into_iter()
            .flatten()
            .find(|&n| nearest_barrier(state, n).is_none());
        return escape.and_then(|n| step_toward(lane, n));
    }

    if has_collectible(state, lane) {
        return None;
    }
    neighbours
        .into_iter()
        .flatten()
        .find(|&n| has_collectible(state, n) && nearest_barrier(state, n).is_none())
        .and_then(|n| step_toward(lane, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::phase::start_run;
    use crate::tuning::Tuning;

    fn running() -> GameState {
        let tuning = Tuning::default();
        let mut state = GameState::new(8, tuning.base_scroll_speed);
        start_run(&mut state, &tuning);
        state
    }

    #[test]
    fn test_phase_inputs() {
        let tuning = Tuning::default();
        let mut state = GameState::new(8, tuning.base_scroll_speed);
        assert_eq!(suggest(&state), Some(GameInput::Confirm));
        state.phase = GamePhase::BossFight;
        assert_eq!(suggest(&state), Some(GameInput::Hit));
        state.phase = GamePhase::GameOver;
        assert_eq!(suggest(&state), None);
    }

    #[test]
    fn test_dodges_tall_barrier() {
        let mut state = running();
        state.spawn_entity(EntityKind::TallBarrier, 1, 300.0);
        state.spawn_entity(EntityKind::Bus, 0, 350.0);
        assert_eq!(suggest(&state), Some(GameInput::LaneRight));
    }

    #[test]
    fn test_jumps_low_barrier_when_close() {
        let mut state = running();
        let id = state.spawn_entity(EntityKind::LowBarrier, 1, 300.0);
        assert_eq!(suggest(&state), None);
        if let Some(e) = state.entities.iter_mut().find(|e| e.id == id) {
            e.pos.z = 100.0;
        }
        assert_eq!(suggest(&state), Some(GameInput::Jump));
    }

    #[test]
    fn test_drifts_toward_credit() {
        let mut state = running();
        state.spawn_entity(EntityKind::CreditToken, 0, 400.0);
        assert_eq!(suggest(&state), Some(GameInput::LaneLeft));
    }

    #[test]
    fn test_drifts_toward_shield() {
        let mut state = running();
        state.spawn_entity(EntityKind::ShieldToken, 2, 400.0);
        assert_eq!(suggest(&state), Some(GameInput::LaneRight));
    }
}
