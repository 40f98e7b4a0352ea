//! Triangle generation for screen-space primitives

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

#[inline]
fn polar(center: Vec2, radii: Vec2, theta: f32) -> Vec2 {
    Vec2::new(center.x + radii.x * theta.cos(), center.y + radii.y * theta.sin())
}

/// Two triangles covering the quad `a b c d` (in winding order)
pub fn quad(a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    quad_colored([a, b, c, d], [color; 4])
}

/// Quad with a color per corner
pub fn quad_colored(corners: [Vec2; 4], colors: [[f32; 4]; 4]) -> [Vertex; 6] {
    let v = |i: usize| Vertex::new(corners[i].x, corners[i].y, colors[i]);
    [v(0), v(1), v(2), v(0), v(2), v(3)]
}

/// Axis-aligned rectangle from its top-left corner
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let max = min + size;
    quad(
        min,
        Vec2::new(max.x, min.y),
        max,
        Vec2::new(min.x, max.y),
        color,
    )
}

/// Rectangle with a vertical color gradient
pub fn gradient_rect(min: Vec2, size: Vec2, top: [f32; 4], bottom: [f32; 4]) -> [Vertex; 6] {
    let max = min + size;
    quad_colored(
        [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)],
        [top, top, bottom, bottom],
    )
}

pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> [Vertex; 3] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Filled ellipse as a triangle fan
pub fn ellipse(center: Vec2, radii: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let p1 = polar(center, radii, theta1);
        let p2 = polar(center, radii, theta2);
        vertices.extend(triangle(center, p1, p2, color));
    }

    vertices
}

/// Hollow circle
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let inner = Vec2::splat(inner_radius);
    let outer = Vec2::splat(outer_radius);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        vertices.extend(quad(
            polar(center, inner, theta1),
            polar(center, outer, theta1),
            polar(center, outer, theta2),
            polar(center, inner, theta2),
            color,
        ));
    }

    vertices
}

/// Thick line segment
pub fn segment(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> [Vertex; 6] {
    let dir = (to - from).normalize_or_zero();
    let half = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    quad(from + half, to + half, to - half, from - half, color)
}

/// Dashed polyline; dashes and gaps alternate every `dash` pixels of length
pub fn dashed_polyline(points: &[Vec2], width: f32, dash: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    if dash <= 0.0 {
        return vertices;
    }
    // Distance along the line where the current dash/gap started
    let mut travelled = 0.0;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = a.distance(b);
        if length <= f32::EPSILON {
            continue;
        }
        let mut t = 0.0;
        while t < length {
            let in_dash = (travelled / dash) as u32 % 2 == 0;
            let to_boundary = dash - travelled % dash;
            let step = to_boundary.min(length - t);
            if in_dash {
                let start = a.lerp(b, t / length);
                let end = a.lerp(b, (t + step) / length);
                vertices.extend(segment(start, end, width, color));
            }
            t += step;
            travelled += step;
        }
    }
    vertices
}
