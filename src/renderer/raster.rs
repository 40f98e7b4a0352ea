//! Software rasterizer for `Frame`s
//!
//! Edge-function triangle fill with per-vertex color interpolation and
//! source-over blending into a packed ARGB buffer.

use std::path::Path;

use image::RgbaImage;

use super::scene::Frame;
use super::vertex::Vertex;

#[inline(always)]
fn pack_argb(c: [f32; 4]) -> u32 {
    let to_byte = |x: f32| x.clamp(0.0, 1.0).mul_add(255.0, 0.5) as u32;
    (to_byte(c[3]) << 24) | (to_byte(c[0]) << 16) | (to_byte(c[1]) << 8) | to_byte(c[2])
}

#[inline(always)]
fn unpack_argb(p: u32) -> [f32; 4] {
    let channel = |shift: u32| ((p >> shift) & 0xFF) as f32 / 255.0;
    [channel(16), channel(8), channel(0), channel(24)]
}

#[inline(always)]
fn edge_function(x0: f32, y0: f32, x1: f32, y1: f32, px: f32, py: f32) -> f32 {
    (px - x0).mul_add(y1 - y0, -((py - y0) * (x1 - x0)))
}

/// CPU render target
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(pack_argb(color));
    }

    /// Straight-alpha RGBA at a pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then(|| unpack_argb(self.pixels[y * self.width + x]))
    }

    /// Rasterize every triangle of the frame, in order
    pub fn draw(&mut self, frame: &Frame) -> u32 {
        let mut drawn = 0;
        for tri in frame.vertices.chunks_exact(3) {
            if self.fill_triangle(&tri[0], &tri[1], &tri[2]) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Returns false for degenerate or fully off-screen triangles
    pub fn fill_triangle(&mut self, v0: &Vertex, v1: &Vertex, v2: &Vertex) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let [x0, y0] = v0.position;
        let [x1, y1] = v1.position;
        let [x2, y2] = v2.position;
        if ![x0, y0, x1, y1, x2, y2].iter().all(|c| c.is_finite()) {
            return false;
        }

        let min_x = x0.min(x1).min(x2).floor().max(0.0) as i32;
        let max_x = x0.max(x1).max(x2).ceil().min((self.width - 1) as f32) as i32;
        let min_y = y0.min(y1).min(y2).floor().max(0.0) as i32;
        let max_y = y0.max(y1).max(y2).ceil().min((self.height - 1) as f32) as i32;
        if min_x > max_x || min_y > max_y {
            return false;
        }

        let denom = edge_function(x0, y0, x1, y1, x2, y2);
        if denom == 0.0 {
            return false;
        }
        let inv_denom = 1.0 / denom;

        for y in min_y..=max_y {
            let py = y as f32 + 0.5;
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let w0 = edge_function(x1, y1, x2, y2, px, py) * inv_denom;
                let w1 = edge_function(x2, y2, x0, y0, px, py) * inv_denom;
                let w2 = 1.0 - w0 - w1;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let mut src = [0.0; 4];
                for (i, s) in src.iter_mut().enumerate() {
                    *s = (v0.color[i].mul_add(w0, v1.color[i] * w1) + v2.color[i] * w2)
                        .clamp(0.0, 1.0);
                }
                let sa = src[3];
                if sa <= 0.0 {
                    continue;
                }

                let idx = y as usize * self.width + x as usize;
                let dst = unpack_argb(self.pixels[idx]);
                let inv = 1.0 - sa;
                self.pixels[idx] = pack_argb([
                    src[0].mul_add(sa, dst[0] * inv),
                    src[1].mul_add(sa, dst[1] * inv),
                    src[2].mul_add(sa, dst[2] * inv),
                    sa + dst[3] * inv,
                ]);
            }
        }
        true
    }

    pub fn to_image(&self) -> RgbaImage {
        let bytes: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|&p| {
                let [a, r, g, b] = p.to_be_bytes();
                [r, g, b, a]
            })
            .collect();
        RgbaImage::from_raw(self.width as u32, self.height as u32, bytes)
            .unwrap_or_else(|| RgbaImage::new(self.width as u32, self.height as u32))
    }

    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Wrote {}x{} snapshot to {:?}", self.width, self.height, path);
        Ok(())
    }
}

/// Rasterize a frame onto a fresh opaque black canvas
pub fn rasterize(frame: &Frame) -> Canvas {
    let mut canvas = Canvas::new(frame.width, frame.height);
    canvas.clear([0.0, 0.0, 0.0, 1.0]);
    canvas.draw(frame);
    canvas
}
