//! Triangle generation for the shape stream (ray fans, overlays).

use std::f32::consts::TAU;

use glam::Vec2;

use crate::renderer::instance::ShapeVertex;

fn vertex(p: Vec2, rgba: [f32; 4]) -> ShapeVertex {
    ShapeVertex {
        x: p.x,
        y: p.y,
        r: rgba[0],
        g: rgba[1],
        b: rgba[2],
        a: rgba[3],
    }
}

/// Append `rays` triangles fanned evenly around `origin`.
///
/// Each ray has its apex at the origin and a flat far edge `length` away,
/// `2 * half_width` wide. Ray 0 points along +y before `rotation` is applied.
#[allow(clippy::too_many_arguments)]
pub fn ray_fan_triangles(
    origin: Vec2,
    rotation: f32,
    scale: Vec2,
    rays: u32,
    length: f32,
    half_width: f32,
    rgba: [f32; 4],
    out: &mut Vec<ShapeVertex>,
) {
    if rays == 0 {
        return;
    }
    out.reserve(rays as usize * 3);
    let left = Vec2::new(half_width, length);
    let right = Vec2::new(-half_width, length);
    for i in 0..rays {
        let angle = rotation + (i as f32 / rays as f32) * TAU;
        let dir = Vec2::from_angle(angle);
        let place = |p: Vec2| origin + dir.rotate(p) * scale;
        out.push(vertex(origin, rgba));
        out.push(vertex(place(left), rgba));
        out.push(vertex(place(right), rgba));
    }
}

/// Append an axis-aligned rectangle as two triangles.
pub fn rect_triangles(origin: Vec2, size: Vec2, rgba: [f32; 4], out: &mut Vec<ShapeVertex>) {
    let a = origin;
    let b = origin + Vec2::new(size.x, 0.0);
    let c = origin + size;
    let d = origin + Vec2::new(0.0, size.y);
    for p in [a, b, c, a, c, d] {
        out.push(vertex(p, rgba));
    }
}
