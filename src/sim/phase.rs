//! Phase transitions
//!
//! Every phase change goes through `transition`, which runs the exit side
//! effects of the old phase and the enter side effects of the new one.

use super::state::{GameEvent, GamePhase, GameState};
use crate::media::{FIGHT_RATE, NORMAL_RATE, WARNING_RATE};
use crate::tuning::Tuning;

fn set_playback(state: &mut GameState, rate: f32) {
    if let Some(rate) = state.playback.force(rate) {
        state.push_event(GameEvent::PlaybackRate(rate));
    }
}

/// Move the session to `to`, applying all side effects of the change
pub fn transition(state: &mut GameState, to: GamePhase, tuning: &Tuning) {
    let from = state.phase;
    if from == to {
        return;
    }

    // Exit
    if from == GamePhase::BossFight && to == GamePhase::Playing {
        // Won the encounter: clear anything that would hit the player immediately
        let before = state.entities.len();
        state.entities.retain(|e| e.pos.z > tuning.boss_clear_depth);
        state.boss_interval_ms = 0.0;
        log::debug!(
            "Boss cleared, pruned {} near entities",
            before - state.entities.len()
        );
    }

    state.phase = to;

    // Enter
    match to {
        GamePhase::Start => {}
        GamePhase::Playing => set_playback(state, NORMAL_RATE),
        GamePhase::BossWarning => {
            state.boss.timer_ms = 0.0;
            set_playback(state, WARNING_RATE);
        }
        GamePhase::BossFight => {
            state.boss.timer_ms = 0.0;
            state.boss.hits = 0;
            state.boss.last_hit_ms = state.clock_ms;
            set_playback(state, FIGHT_RATE);
        }
        GamePhase::GameOver | GamePhase::Graduated => {
            set_playback(state, NORMAL_RATE);
            let entry = state.score_entry();
            log::info!(
                "Run finished: score {} with {} credits",
                entry.score,
                entry.credits
            );
            state.push_event(GameEvent::ScoreRecorded(entry));
        }
    }

    log::info!("Phase {} -> {}", from.as_str(), to.as_str());
    state.push_event(GameEvent::PhaseChanged { from, to });
}

/// Begin a fresh run (from `Start`, `GameOver` or `Graduated`)
pub fn start_run(state: &mut GameState, tuning: &Tuning) {
    state.reset_run(tuning.base_scroll_speed);
    state.push_event(GameEvent::MediaRewind);
    transition(state, GamePhase::Playing, tuning);
}

/// Keep running after graduating, with goal checks switched off
pub fn continue_run(state: &mut GameState, tuning: &Tuning) {
    state.continued = true;
    transition(state, GamePhase::Playing, tuning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityKind;

    fn phase_changes(state: &GameState) -> Vec<(GamePhase, GamePhase)> {
        state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_run_resets_and_rewinds() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, tuning.base_scroll_speed);
        state.credits = 12;
        state.distance = 9000.0;
        start_run(&mut state, &tuning);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.credits, 0);
        assert_eq!(state.distance, 0.0);
        assert!(state.player.invincible);
        assert!(state.events.contains(&GameEvent::MediaRewind));
        assert_eq!(phase_changes(&state), vec![(GamePhase::Start, GamePhase::Playing)]);
    }

    #[test]
    fn test_boss_phases_drive_playback() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, tuning.base_scroll_speed);
        start_run(&mut state, &tuning);
        transition(&mut state, GamePhase::BossWarning, &tuning);
        assert_eq!(state.playback.rate, WARNING_RATE);
        transition(&mut state, GamePhase::BossFight, &tuning);
        assert_eq!(state.playback.rate, FIGHT_RATE);
        assert_eq!(state.boss.hits, 0);
        transition(&mut state, GamePhase::Playing, &tuning);
        assert_eq!(state.playback.rate, NORMAL_RATE);
    }

    #[test]
    fn test_boss_win_prunes_near_entities() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, tuning.base_scroll_speed);
        start_run(&mut state, &tuning);
        state.spawn_entity(EntityKind::Bus, 1, 500.0);
        state.spawn_entity(EntityKind::Bus, 1, 1999.0);
        let far = state.spawn_entity(EntityKind::Bus, 1, 3500.0);
        state.boss_interval_ms = 30_000.0;
        transition(&mut state, GamePhase::BossWarning, &tuning);
        transition(&mut state, GamePhase::BossFight, &tuning);
        assert_eq!(state.entities.len(), 3);
        transition(&mut state, GamePhase::Playing, &tuning);
        assert_eq!(state.entities.len(), 1);
        assert_eq!(state.entities[0].id, far);
        assert_eq!(state.boss_interval_ms, 0.0);
    }

    #[test]
    fn test_terminal_phases_record_score() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, tuning.base_scroll_speed);
        start_run(&mut state, &tuning);
        state.score = 33;
        state.credits = 8;
        transition(&mut state, GamePhase::GameOver, &tuning);
        let recorded: Vec<_> = state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::ScoreRecorded(entry) => Some((entry.score, entry.credits)),
                _ => None,
            })
            .collect();
        assert_eq!(recorded, vec![(33, 8)]);
    }

    #[test]
    fn test_continue_sets_mode() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, tuning.base_scroll_speed);
        start_run(&mut state, &tuning);
        state.credits = 160;
        transition(&mut state, GamePhase::Graduated, &tuning);
        continue_run(&mut state, &tuning);
        assert!(state.continued);
        assert_eq!(state.credits, 160);
        assert_eq!(state.phase, GamePhase::Playing);
    }
}
