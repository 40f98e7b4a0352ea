//! Scene assembly: turns a session snapshot into a screen-space draw list
//!
//! Read-only over the state. Entities and the player are depth-sorted
//! far-to-near so nearer geometry is painted last.

use glam::{Vec2, Vec3};

use super::shapes;
use super::vertex::{Vertex, colors, faded};
use crate::consts::{LANE_WIDTH, PLAYER_HALF_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::{
    CameraConfig, Entity, EntityKind, GamePhase, GameState, Player, VisualEffect, project,
};
use crate::tuning::Tuning;

/// Player figure height in world units
const PLAYER_HEIGHT: f32 = 90.0;
/// Lane guideline sample spacing (world depth)
const GUIDE_STEP: f32 = 100.0;
const GUIDE_OFFSETS: [f32; 4] = [-1.5, -0.5, 0.5, 1.5];
const GUIDE_DASH: f32 = 20.0;
/// Boss figure drop-in
const BOSS_DROP_MS: f32 = 500.0;
const BOSS_START_Y: f32 = -400.0;
const BOSS_SCALE: f32 = 1.5;
/// Repetition bar geometry (pixels)
const REP_BAR_SIZE: Vec2 = Vec2::new(400.0, 40.0);
const REP_BAR_BORDER: f32 = 4.0;
/// Timer bar turns red below this (ms)
const TIMER_ALERT_MS: f32 = 10_000.0;

/// Triangles ready for rasterization
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub vertices: Vec<Vertex>,
}

/// Accumulates vertices with a global opacity
struct Painter {
    vertices: Vec<Vertex>,
    alpha: f32,
}

impl Painter {
    fn color(&self, color: [f32; 4]) -> [f32; 4] {
        faded(color, self.alpha)
    }

    fn extend(&mut self, vertices: impl IntoIterator<Item = Vertex>) {
        self.vertices.extend(vertices);
    }

    /// Rectangle centered horizontally on `x`, growing up from `bottom`
    fn column(&mut self, x: f32, bottom: f32, width: f32, height: f32, color: [f32; 4]) {
        let c = self.color(color);
        self.extend(shapes::rect(
            Vec2::new(x - width / 2.0, bottom - height),
            Vec2::new(width, height),
            c,
        ));
    }

    fn rect(&mut self, min: Vec2, size: Vec2, color: [f32; 4]) {
        let c = self.color(color);
        self.extend(shapes::rect(min, size, c));
    }

    fn ellipse(&mut self, center: Vec2, radii: Vec2, color: [f32; 4]) {
        let c = self.color(color);
        self.extend(shapes::ellipse(center, radii, c, 20));
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        let col = self.color(color);
        self.extend(shapes::triangle(a, b, c, col));
    }
}

/// Build the draw list for the current state
pub fn build_frame(state: &GameState, camera: &CameraConfig, tuning: &Tuning) -> Frame {
    let mut painter = Painter {
        vertices: Vec::with_capacity(4096),
        alpha: 1.0,
    };

    draw_background(&mut painter);

    match state.phase {
        GamePhase::BossWarning => {
            painter.rect(Vec2::ZERO, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT), colors::BOSS_DIM);
            let grounded = Player {
                pos: Vec3::new(state.player.pos.x, 0.0, 0.0),
                jumping: false,
                ..state.player.clone()
            };
            draw_player(&mut painter, &grounded, camera, false);
            draw_warning(&mut painter, state.boss.timer_ms, tuning.boss_warning_ms);
        }
        GamePhase::BossFight => {
            painter.rect(Vec2::ZERO, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT), colors::BOSS_DIM);
            let centered = Player {
                pos: Vec3::ZERO,
                jumping: false,
                ..state.player.clone()
            };
            draw_player(&mut painter, &centered, camera, false);
            draw_boss(&mut painter, state.boss.timer_ms);
            draw_boss_hud(&mut painter, state.boss.hits, state.boss.timer_ms, tuning);
        }
        GamePhase::Start | GamePhase::Playing | GamePhase::GameOver | GamePhase::Graduated => {
            draw_guidelines(&mut painter, camera);
            for fx in &state.effects {
                draw_effect(&mut painter, fx, camera);
            }
            draw_world(&mut painter, state, camera);
        }
    }

    Frame {
        width: SCREEN_WIDTH as u32,
        height: SCREEN_HEIGHT as u32,
        vertices: painter.vertices,
    }
}

fn draw_background(p: &mut Painter) {
    let half = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT / 2.0);
    p.extend(shapes::gradient_rect(Vec2::ZERO, half, colors::SKY_TOP, colors::SKY_MID));
    p.extend(shapes::gradient_rect(
        Vec2::new(0.0, half.y),
        half,
        colors::SKY_MID,
        colors::SKY_BOTTOM,
    ));
}

fn draw_guidelines(p: &mut Painter, camera: &CameraConfig) {
    for offset in GUIDE_OFFSETS {
        let x = offset * LANE_WIDTH;
        let mut points = Vec::new();
        let mut z = 0.0;
        while z <= camera.spawn_distance {
            if let Some(sp) = project(Vec3::new(x, 0.0, z), camera) {
                points.push(sp.pos);
            }
            z += GUIDE_STEP;
        }
        p.extend(shapes::dashed_polyline(&points, 2.0, GUIDE_DASH, colors::LANE_LINE));
    }
}

fn draw_effect(p: &mut Painter, fx: &VisualEffect, camera: &CameraConfig) {
    let Some(sp) = project(fx.pos, camera) else {
        return;
    };
    let alpha = fx.life.clamp(0.0, 1.0) * sp.alpha;
    if alpha <= 0.0 {
        return;
    }
    // Text badge sized from the label length
    let height = 24.0 * sp.scale;
    let width = height * 0.6 * fx.text.chars().count() as f32;
    p.alpha = alpha;
    p.rect(
        sp.pos - Vec2::new(width / 2.0 + 2.0, height + 2.0),
        Vec2::new(width + 4.0, height + 4.0),
        [0.0, 0.0, 0.0, 1.0],
    );
    p.rect(sp.pos - Vec2::new(width / 2.0, height), Vec2::new(width, height), fx.color);
    p.alpha = 1.0;
}

enum Drawable<'a> {
    Entity(&'a Entity),
    Player(&'a Player),
}

fn draw_world(p: &mut Painter, state: &GameState, camera: &CameraConfig) {
    let mut list: Vec<(f32, Drawable)> = state
        .entities
        .iter()
        .map(|e| (e.pos.z, Drawable::Entity(e)))
        .collect();
    list.push((state.player.pos.z, Drawable::Player(&state.player)));
    // Far to near; stable so equal depths keep spawn order
    list.sort_by(|a, b| b.0.total_cmp(&a.0));

    let running = state.phase == GamePhase::Playing;
    for (_, item) in list {
        match item {
            Drawable::Entity(entity) => draw_entity(p, entity, camera, state.player.frame),
            Drawable::Player(player) => draw_player(p, player, camera, running),
        }
    }
}

fn draw_entity(p: &mut Painter, entity: &Entity, camera: &CameraConfig, frame: u64) {
    let Some(sp) = project(entity.pos, camera) else {
        return;
    };
    if sp.alpha <= 0.0 {
        return;
    }
    let s = sp.pixel_scale;
    let (x, y) = (sp.pos.x, sp.pos.y);
    let w = entity.width * s;
    let h = entity.height * s;

    p.alpha = sp.alpha;
    p.ellipse(sp.pos, Vec2::new(w / 2.0, w / 6.0), colors::SHADOW);

    match entity.kind {
        EntityKind::LowBarrier => {
            // Table top and legs
            p.column(x, y - h + 10.0 * s, w, 10.0 * s, colors::LOW_BARRIER);
            p.column(x - w / 2.0 + 6.0 * s, y, 6.0 * s, h - 10.0 * s, colors::LOW_BARRIER);
            p.column(x + w / 2.0 - 6.0 * s, y, 6.0 * s, h - 10.0 * s, colors::LOW_BARRIER);
        }
        EntityKind::TallBarrier => {
            // Three people shoulder to shoulder
            for (dx, body) in [(-w / 3.0, 0.85), (0.0, 1.0), (w / 3.0, 0.9)] {
                let body_h = h * body - 20.0 * s;
                p.column(x + dx, y, w / 3.5, body_h, colors::TALL_BARRIER);
                p.column(x + dx, y - body_h, 16.0 * s, 18.0 * s, colors::SKIN);
            }
        }
        EntityKind::Bus => {
            p.column(x, y, w, h, colors::BUS);
            p.column(x, y - h * 0.4, w - 10.0 * s, h * 0.45, colors::BUS_WINDOW);
            p.column(x, y, w + 4.0 * s, h * 0.2, colors::WEAVER);
        }
        EntityKind::Weaver => {
            let hub = Vec2::new(x, y - h * 0.4);
            for i in 0..12 {
                let angle = std::f32::consts::PI * (1.0 + (i + 1) as f32 / 13.0);
                let tip = hub + Vec2::new(angle.cos(), angle.sin()) * w * 0.6;
                let c = p.color(colors::WEAVER_FEATHER);
                p.extend(shapes::segment(hub, tip, 2.0 * s, c));
                p.ellipse(tip, Vec2::splat(6.0 * s), colors::WEAVER_FEATHER);
            }
            p.ellipse(Vec2::new(x, y - h * 0.3), Vec2::new(w * 0.15, h * 0.25), colors::WEAVER);
            p.ellipse(Vec2::new(x, y - h * 0.65), Vec2::splat(12.0 * s), colors::WEAVER);
        }
        EntityKind::CreditToken => {
            let float = (frame as f32 * 0.08).sin() * 10.0 * s;
            let top = Vec2::new(x - 25.0 * s, y - 40.0 * s + float);
            p.rect(top, Vec2::new(50.0, 40.0) * s, colors::CREDIT);
            p.rect(top + Vec2::new(3.0, 3.0) * s, Vec2::new(20.0, 34.0) * s, colors::CREDIT_PAGE);
            p.rect(top + Vec2::new(27.0, 3.0) * s, Vec2::new(20.0, 34.0) * s, colors::CREDIT_PAGE);
        }
        EntityKind::ShieldToken => {
            let float = (frame as f32 * 0.08).sin() * 10.0 * s;
            let top = Vec2::new(x - 20.0 * s, y - 40.0 * s + float);
            p.rect(top - Vec2::splat(2.0 * s), Vec2::new(44.0, 24.0) * s, colors::SHIELD_RIM);
            p.rect(top, Vec2::new(40.0, 20.0) * s, colors::SHIELD);
            p.triangle(
                top + Vec2::new(0.0, 20.0) * s,
                top + Vec2::new(40.0, 20.0) * s,
                top + Vec2::new(20.0, 45.0) * s,
                colors::SHIELD,
            );
        }
    }
    p.alpha = 1.0;
}

fn draw_player(p: &mut Painter, player: &Player, camera: &CameraConfig, running: bool) {
    let Some(ground) = project(Vec3::new(player.pos.x, 0.0, player.pos.z), camera) else {
        return;
    };
    let Some(body) = project(player.pos, camera) else {
        return;
    };
    let s = body.pixel_scale;
    let w = PLAYER_HALF_WIDTH * 2.0 * s;
    let (x, feet) = (body.pos.x, body.pos.y);

    p.ellipse(ground.pos, Vec2::new(w / 2.0, w / 6.0), colors::SHADOW);

    let stride = if running && !player.jumping {
        (player.frame as f32 * 0.5).sin() * 6.0 * s
    } else {
        0.0
    };
    let leg_h = PLAYER_HEIGHT * 0.35 * s;
    let leg_w = w * 0.3;
    for (dx, lift) in [(-w / 4.0, stride), (w / 4.0, -stride)] {
        let bottom = feet - lift.max(0.0);
        p.column(x + dx, bottom, leg_w + 4.0, 6.0 * s, colors::SHOES);
        p.column(x + dx, bottom - 6.0 * s, leg_w, leg_h - 6.0 * s, colors::PANTS);
    }

    let torso_bottom = feet - leg_h;
    let torso_h = PLAYER_HEIGHT * 0.4 * s;
    p.column(x, torso_bottom + 2.0 * s, w * 1.1, torso_h * 0.85, colors::BACKPACK);
    p.column(x, torso_bottom, w * 0.8, torso_h, colors::SHIRT);

    let head = PLAYER_HEIGHT * 0.25 * s;
    let head_bottom = torso_bottom - torso_h;
    p.column(x, head_bottom, head, head, colors::SKIN);
    p.column(x, head_bottom - head * 0.7, head + 4.0 * s, head * 0.35, colors::HAIR);

    if player.invincible && (player.frame / 5) % 2 == 0 {
        let center = Vec2::new(x, feet - PLAYER_HEIGHT * 0.5 * s);
        let radius = PLAYER_HEIGHT * 0.6 * s;
        let c = p.color(colors::SHIELD_RING);
        p.extend(shapes::ring(center, radius - 3.0, radius, c, 32));
    }
}

/// Whole seconds left on the warning countdown
pub fn warning_seconds_left(timer_ms: f32, warning_ms: f32) -> u32 {
    ((warning_ms - timer_ms) / 1000.0).ceil().max(0.0) as u32
}

fn draw_warning(p: &mut Painter, timer_ms: f32, warning_ms: f32) {
    let mid = SCREEN_HEIGHT / 2.0;
    p.rect(Vec2::new(0.0, mid - 100.0), Vec2::new(SCREEN_WIDTH, 70.0), colors::WARNING);

    let pips = warning_seconds_left(timer_ms, warning_ms);
    let spacing = 50.0;
    let start = SCREEN_WIDTH / 2.0 - spacing * (pips as f32 - 1.0) / 2.0;
    for i in 0..pips {
        p.ellipse(Vec2::new(start + spacing * i as f32, mid + 110.0), Vec2::splat(16.0), colors::WHITE);
    }
}

/// Vertical position of the boss figure, easing in over the first 500 ms
pub fn boss_drop_y(timer_ms: f32) -> f32 {
    let t = (timer_ms / BOSS_DROP_MS).clamp(0.0, 1.0);
    let ease = 1.0 - (1.0 - t).powi(3);
    let target = SCREEN_HEIGHT / 2.0 - 50.0;
    BOSS_START_Y + (target - BOSS_START_Y) * ease
}

fn draw_boss(p: &mut Painter, timer_ms: f32) {
    let center = Vec2::new(SCREEN_WIDTH / 2.0, boss_drop_y(timer_ms));
    let k = BOSS_SCALE;
    let at = |x: f32, y: f32| center + Vec2::new(x, y) * k;
    let shake = (timer_ms * 0.05).sin() * 5.0;

    // Robe and raised fists
    p.triangle(at(0.0, -60.0), at(-40.0, 60.0), at(40.0, 60.0), colors::ROBE);
    p.rect(at(-50.0, -30.0 + shake), Vec2::new(20.0, 50.0) * k, colors::ROBE);
    p.rect(at(30.0, -30.0 - shake), Vec2::new(20.0, 50.0) * k, colors::ROBE);
    p.ellipse(at(-40.0, 20.0 + shake), Vec2::splat(10.0 * k), colors::SKIN);
    p.ellipse(at(40.0, 20.0 - shake), Vec2::splat(10.0 * k), colors::SKIN);
    // Head, beard, eyes
    p.rect(at(-25.0, -80.0), Vec2::new(50.0, 50.0) * k, colors::SKIN);
    p.triangle(at(-35.0, -50.0), at(35.0, -50.0), at(0.0, 10.0), colors::BEARD);
    p.rect(at(-20.0, -65.0), Vec2::new(15.0, 10.0) * k, colors::WHITE);
    p.rect(at(5.0, -65.0), Vec2::new(15.0, 10.0) * k, colors::WHITE);
    // Mortarboard
    let c = p.color([0.0, 0.0, 0.0, 1.0]);
    p.extend(shapes::quad(at(0.0, -85.0), at(50.0, -95.0), at(0.0, -105.0), at(-50.0, -95.0), c));
    p.rect(at(-25.0, -90.0), Vec2::new(50.0, 10.0) * k, [0.0, 0.0, 0.0, 1.0]);
}

fn draw_boss_hud(p: &mut Painter, hits: u32, timer_ms: f32, tuning: &Tuning) {
    let origin = Vec2::new(SCREEN_WIDTH / 2.0 - REP_BAR_SIZE.x / 2.0, SCREEN_HEIGHT - 120.0);
    let border = REP_BAR_BORDER;

    // Repetition progress
    p.rect(origin - Vec2::splat(border), REP_BAR_SIZE + Vec2::splat(border * 2.0), colors::WHITE);
    p.rect(origin, REP_BAR_SIZE, colors::BAR_BACK);
    let progress = if tuning.reps_to_win == 0 {
        1.0
    } else {
        (hits as f32 / tuning.reps_to_win as f32).min(1.0)
    };
    let fill = if progress >= 1.0 { colors::BAR_FULL } else { colors::BAR_FILL };
    let inner = REP_BAR_SIZE - Vec2::splat(border * 2.0);
    p.rect(origin + Vec2::splat(border), Vec2::new(inner.x * progress, inner.y), fill);

    // Time remaining
    let ms_left = (tuning.boss_fight_ms - timer_ms).max(0.0);
    let fraction = if tuning.boss_fight_ms > 0.0 {
        ms_left / tuning.boss_fight_ms
    } else {
        0.0
    };
    let color = if ms_left < TIMER_ALERT_MS { colors::WARNING } else { colors::WHITE };
    p.rect(
        origin - Vec2::new(0.0, 60.0),
        Vec2::new(REP_BAR_SIZE.x * fraction, 12.0),
        color,
    );
}
