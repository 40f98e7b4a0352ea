//! Game state and core simulation types
//!
//! Everything a session mutates lives in `GameState`; configuration is
//! passed in alongside it.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::highscores::ScoreEntry;
use crate::lane_center_x;
use crate::media::PlaybackSync;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle, waiting for the confirm input
    Start,
    /// Running through the corridor
    Playing,
    /// Countdown before the boss encounter, world frozen
    BossWarning,
    /// Timed repetition challenge
    BossFight,
    /// Run ended by a collision or a lost encounter
    GameOver,
    /// Credit goal reached
    Graduated,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Start => "START",
            GamePhase::Playing => "PLAYING",
            GamePhase::BossWarning => "BOSS_WARNING",
            GamePhase::BossFight => "BOSS_FIGHT",
            GamePhase::GameOver => "GAME_OVER",
            GamePhase::Graduated => "GRADUATED",
        }
    }

    /// Terminal phases only exit through a restart or continue input
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Graduated)
    }
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// `x` lateral, `y` height above ground, `z` always 0
    pub pos: Vec3,
    pub lane: usize,
    /// Lane-center destination for lateral easing
    pub target_x: f32,
    pub y_velocity: f32,
    pub jumping: bool,
    pub invincible: bool,
    /// Session clock (ms) when invincibility was granted
    pub invincible_since_ms: f64,
    /// Animation frame counter
    pub frame: u64,
}

impl Player {
    /// A fresh runner in the middle lane with spawn protection
    pub fn spawn(now_ms: f64) -> Self {
        Self {
            pos: Vec3::ZERO,
            lane: 1,
            target_x: lane_center_x(1),
            y_velocity: 0.0,
            jumping: false,
            invincible: true,
            invincible_since_ms: now_ms,
            frame: 0,
        }
    }

    pub fn move_left(&mut self) {
        if self.lane > 0 {
            self.lane -= 1;
            self.target_x = lane_center_x(self.lane);
        }
    }

    pub fn move_right(&mut self) {
        if self.lane < LANE_COUNT - 1 {
            self.lane += 1;
            self.target_x = lane_center_x(self.lane);
        }
    }

    /// Start a jump; returns false while already airborne
    pub fn jump(&mut self, velocity: f32) -> bool {
        if self.jumping {
            return false;
        }
        self.jumping = true;
        self.y_velocity = velocity;
        true
    }

    pub fn grant_invincibility(&mut self, now_ms: f64) {
        self.invincible = true;
        self.invincible_since_ms = now_ms;
    }
}

/// Scrolling entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Low barrier, can be jumped
    LowBarrier,
    /// Tall barrier
    TallBarrier,
    /// Bus-class barrier, wider and faster
    Bus,
    /// Weaves sideways as it approaches
    Weaver,
    /// Primary credit token
    CreditToken,
    /// Shield credit token
    ShieldToken,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::LowBarrier,
        EntityKind::TallBarrier,
        EntityKind::Bus,
        EntityKind::Weaver,
        EntityKind::CreditToken,
        EntityKind::ShieldToken,
    ];

    /// Fixed (width, height) in world units
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            EntityKind::LowBarrier => (OBSTACLE_WIDTH, LOW_BARRIER_HEIGHT),
            EntityKind::TallBarrier => (OBSTACLE_WIDTH, TALL_BARRIER_HEIGHT),
            EntityKind::Bus => (OBSTACLE_WIDTH * BUS_WIDTH_FACTOR, BUS_HEIGHT),
            EntityKind::Weaver => (OBSTACLE_WIDTH, WEAVER_HEIGHT),
            EntityKind::CreditToken | EntityKind::ShieldToken => (OBSTACLE_WIDTH, TOKEN_HEIGHT),
        }
    }

    pub fn is_collectible(&self) -> bool {
        matches!(self, EntityKind::CreditToken | EntityKind::ShieldToken)
    }
}

/// An obstacle or collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub lane: usize,
    pub pos: Vec3,
    pub width: f32,
    pub height: f32,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, lane: usize, z: f32) -> Self {
        let (width, height) = kind.dimensions();
        Self {
            id,
            kind,
            lane,
            pos: Vec3::new(lane_center_x(lane), 0.0, z),
            width,
            height,
        }
    }

    /// Lateral overlap with a body centered at `x`
    pub fn overlaps_x(&self, x: f32, half_width: f32) -> bool {
        x - half_width < self.pos.x + self.width / 2.0 && x + half_width > self.pos.x - self.width / 2.0
    }
}

/// Floating text shown on pickups (cosmetic only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualEffect {
    pub pos: Vec3,
    /// Seconds remaining
    pub life: f32,
    pub text: String,
    pub color: [f32; 4],
}

/// Boss encounter counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BossEncounter {
    /// Time spent in the current boss phase (ms)
    pub timer_ms: f32,
    /// Counted repetitions
    pub hits: u32,
    /// Session clock of the last counted hit (ms)
    pub last_hit_ms: f64,
}

impl BossEncounter {
    /// Count a hit unless it lands inside the debounce window or the
    /// count is already at `cap`. Returns true when the hit was counted.
    pub fn register_hit(&mut self, now_ms: f64, debounce_ms: f64, cap: u32) -> bool {
        if self.hits >= cap || now_ms - self.last_hit_ms <= debounce_ms {
            return false;
        }
        self.hits += 1;
        self.last_hit_ms = now_ms;
        true
    }
}

/// Notifications for the presentation layer, drained every frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Jumped,
    CreditCollected { total: u32 },
    ShieldCollected { total: u32 },
    ShieldConsumed { remaining: u32 },
    BossHit { hits: u32 },
    /// Background video playback multiplier (0 = paused)
    PlaybackRate(f32),
    /// Background video should restart from the beginning
    MediaRewind,
    /// A run ended or graduated; the leaderboard should record this
    ScoreRecorded(ScoreEntry),
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Session clock (ms), advanced in every phase
    pub clock_ms: f64,
    pub player: Player,
    /// Active obstacles and collectibles
    pub entities: Vec<Entity>,
    /// Floating pickup text
    pub effects: Vec<VisualEffect>,
    /// Distance odometer
    pub distance: f32,
    pub score: u64,
    /// Primary credits
    pub credits: u32,
    /// Shield credits
    pub shields: u32,
    /// Current scroll speed (units per tick)
    pub speed: f32,
    /// Ticks since the last spawn
    pub spawn_ticks: u32,
    /// Time in `Playing` since the last boss encounter (ms)
    pub boss_interval_ms: f32,
    pub boss: BossEncounter,
    /// Graduation already happened; goal checks are suppressed
    pub continued: bool,
    pub playback: PlaybackSync,
    /// Pending notifications
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new session waiting in `Start`
    pub fn new(seed: u64, base_speed: f32) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            clock_ms: 0.0,
            player: Player::spawn(0.0),
            entities: Vec::new(),
            effects: Vec::new(),
            distance: 0.0,
            score: 0,
            credits: 0,
            shields: 0,
            speed: base_speed,
            spawn_ticks: 0,
            boss_interval_ms: 0.0,
            boss: BossEncounter::default(),
            continued: false,
            playback: PlaybackSync::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put a new entity at the given depth
    pub fn spawn_entity(&mut self, kind: EntityKind, lane: usize, z: f32) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind, lane, z));
        id
    }

    /// Reset the run in place (keeps seed stream and clock)
    pub fn reset_run(&mut self, base_speed: f32) {
        self.player = Player::spawn(self.clock_ms);
        self.entities.clear();
        self.effects.clear();
        self.distance = 0.0;
        self.score = 0;
        self.credits = 0;
        self.shields = 0;
        self.speed = base_speed;
        self.spawn_ticks = 0;
        self.boss_interval_ms = 0.0;
        self.boss = BossEncounter::default();
        self.continued = false;
    }

    /// Snapshot of the run for the leaderboard
    pub fn score_entry(&self) -> ScoreEntry {
        ScoreEntry::today(self.score, self.credits)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
