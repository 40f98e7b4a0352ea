//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Screen-space vertex (pixels, y down) with straight-alpha color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Scale a color's alpha
#[inline]
pub fn faded(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Colors for game elements
pub mod colors {
    pub const SKY_TOP: [f32; 4] = [0.06, 0.09, 0.16, 1.0];
    pub const SKY_MID: [f32; 4] = [0.3, 0.11, 0.58, 1.0];
    pub const SKY_BOTTOM: [f32; 4] = [0.75, 0.09, 0.36, 1.0];
    pub const BOSS_DIM: [f32; 4] = [0.0, 0.0, 0.0, 0.6];
    pub const LANE_LINE: [f32; 4] = [0.78, 0.9, 1.0, 0.25];
    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.3];

    pub const LOW_BARRIER: [f32; 4] = [0.52, 0.37, 0.26, 1.0]; // Table brown
    pub const TALL_BARRIER: [f32; 4] = [0.73, 0.11, 0.11, 1.0];
    pub const BUS: [f32; 4] = [0.92, 0.35, 0.05, 1.0];
    pub const BUS_WINDOW: [f32; 4] = [0.58, 0.64, 0.72, 1.0];
    pub const WEAVER: [f32; 4] = [0.12, 0.23, 0.54, 1.0];
    pub const WEAVER_FEATHER: [f32; 4] = [0.98, 0.8, 0.08, 1.0];
    pub const CREDIT: [f32; 4] = [0.01, 0.52, 0.78, 1.0];
    pub const CREDIT_PAGE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const SHIELD: [f32; 4] = [0.49, 0.13, 0.81, 1.0];
    pub const SHIELD_RIM: [f32; 4] = [0.91, 0.84, 1.0, 1.0];

    pub const SKIN: [f32; 4] = [0.93, 0.73, 0.6, 1.0];
    pub const SHIRT: [f32; 4] = [0.15, 0.39, 0.92, 1.0];
    pub const PANTS: [f32; 4] = [0.12, 0.16, 0.22, 1.0];
    pub const SHOES: [f32; 4] = [0.95, 0.95, 0.95, 1.0];
    pub const BACKPACK: [f32; 4] = [0.55, 0.35, 0.17, 1.0];
    pub const HAIR: [f32; 4] = [0.1, 0.07, 0.05, 1.0];
    pub const SHIELD_RING: [f32; 4] = [0.0, 1.0, 1.0, 0.8];

    pub const ROBE: [f32; 4] = [0.07, 0.07, 0.1, 1.0];
    pub const BEARD: [f32; 4] = [0.85, 0.85, 0.85, 1.0];
    pub const WARNING: [f32; 4] = [0.94, 0.27, 0.27, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BAR_BACK: [f32; 4] = [0.07, 0.07, 0.07, 1.0];
    pub const BAR_FILL: [f32; 4] = [0.92, 0.7, 0.03, 1.0];
    pub const BAR_FULL: [f32; 4] = [0.13, 0.77, 0.37, 1.0];
}
