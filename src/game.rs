//! Session façade
//!
//! Owns the simulation state together with its configuration and the
//! hand-tracking link, and wires phase changes to the link's lifecycle.

use crate::calibration::Calibration;
use crate::gesture::{GestureRecognizer, HandTracker, TrackingLink};
use crate::renderer::Frame;
use crate::renderer::scene::build_frame;
use crate::sim::{self, GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

pub use crate::sim::GameInput;

/// One play session
#[derive(Debug)]
pub struct Game {
    state: GameState,
    tuning: Tuning,
    calibration: Calibration,
    recognizer: GestureRecognizer,
    link: TrackingLink,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning, tracker: Box<dyn HandTracker>) -> Self {
        log::info!("New session with seed {seed}");
        Self {
            state: GameState::new(seed, tuning.base_scroll_speed),
            recognizer: GestureRecognizer::new(tuning.gesture_threshold),
            tuning,
            calibration: Calibration::default(),
            link: TrackingLink::new(tracker),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Replace the camera calibration; takes effect on the next frame
    pub fn apply_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration.sanitized();
    }

    /// Whether the hand-tracking link is currently running
    pub fn tracking_active(&self) -> bool {
        self.link.is_open()
    }

    pub fn handle_input(&mut self, input: GameInput) {
        let before = self.state.phase;
        sim::apply_input(&mut self.state, &self.tuning, input);
        self.after_phase_change(before);
    }

    /// Advance by `dt_ms`, consuming any queued hand samples first
    pub fn advance(&mut self, dt_ms: f32) {
        let before = self.state.phase;
        if before == GamePhase::BossFight {
            // Every completion drained here shares the current clock, so
            // after a stall at most one of them lands outside the debounce.
            for frame in self.link.poll() {
                if self.recognizer.process(&frame) {
                    sim::register_boss_hit(&mut self.state, &self.tuning);
                }
            }
        }
        sim::advance(&mut self.state, &self.tuning, &self.calibration, dt_ms);
        self.after_phase_change(before);
    }

    /// Draw list for the current state
    pub fn render(&self) -> Frame {
        build_frame(&self.state, &self.calibration.camera, &self.tuning)
    }

    /// Take all notifications produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    fn after_phase_change(&mut self, before: GamePhase) {
        let after = self.state.phase;
        if before == after {
            return;
        }
        if after == GamePhase::BossFight {
            self.recognizer.reset();
            self.link.open();
        } else if before == GamePhase::BossFight {
            self.link.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{HandFrame, NoTracker, ReplayTracker};
    use std::time::Duration;

    fn enter_boss_fight(game: &mut Game) {
        game.handle_input(GameInput::Confirm);
        let interval = game.tuning().boss_interval_ms;
        let warning = game.tuning().boss_warning_ms;
        game.advance(interval);
        assert_eq!(game.state().phase, GamePhase::BossWarning);
        game.advance(warning);
        assert_eq!(game.state().phase, GamePhase::BossFight);
    }

    #[test]
    fn test_keyboard_only_boss_win() {
        let mut game = Game::new(11, Tuning::default(), Box::new(NoTracker));
        enter_boss_fight(&mut game);
        assert!(!game.tracking_active());

        for _ in 0..6 {
            game.advance(200.0);
            game.handle_input(GameInput::Hit);
        }
        game.advance(16.0);
        assert_eq!(game.state().phase, GamePhase::Playing);

        let hits: Vec<u32> = game
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::BossHit { hits } => Some(hits),
                _ => None,
            })
            .collect();
        assert_eq!(hits, vec![1, 2, 3, 4, 5, 6]);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_gesture_boss_win_closes_link() {
        let trace = vec![HandFrame::two_hands(0.5, 0.5), HandFrame::two_hands(0.8, 0.8)];
        let tracker = ReplayTracker::new(trace, Duration::from_millis(1), true);
        let mut game = Game::new(11, Tuning::default(), Box::new(tracker));
        assert!(!game.tracking_active());
        enter_boss_fight(&mut game);
        assert!(game.tracking_active());

        for _ in 0..300 {
            if game.state().phase != GamePhase::BossFight {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
            game.advance(200.0);
        }
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert!(!game.tracking_active());
    }

    #[test]
    fn test_link_closed_after_lost_encounter() {
        let trace = vec![HandFrame::default()];
        let tracker = ReplayTracker::new(trace, Duration::from_millis(1), true);
        let mut game = Game::new(3, Tuning::default(), Box::new(tracker));
        enter_boss_fight(&mut game);
        assert!(game.tracking_active());
        let fight = game.tuning().boss_fight_ms;
        game.advance(fight);
        assert_eq!(game.state().phase, GamePhase::GameOver);
        assert!(!game.tracking_active());
        assert!(
            game.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::ScoreRecorded(_)))
        );
    }

    #[test]
    fn test_invalid_calibration_sanitized() {
        let mut game = Game::new(1, Tuning::default(), Box::new(NoTracker));
        let mut calibration = Calibration::default();
        calibration.camera.horizon_y = f32::NAN;
        game.apply_calibration(calibration);
        assert_eq!(game.calibration().camera, crate::sim::CameraConfig::default());
    }

    #[test]
    fn test_render_does_not_mutate() {
        let mut game = Game::new(1, Tuning::default(), Box::new(NoTracker));
        game.handle_input(GameInput::Confirm);
        for _ in 0..120 {
            game.advance(crate::consts::FRAME_MS);
        }
        let distance = game.state().distance;
        let events = game.state().events.len();
        let frame = game.render();
        assert!(!frame.vertices.is_empty());
        assert_eq!(game.state().distance, distance);
        assert_eq!(game.state().events.len(), events);
    }
}
