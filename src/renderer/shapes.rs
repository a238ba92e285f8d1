//! Shape generation for 2D primitives
//!
//! Everything is plain triangle lists in stage coordinates.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::intro::layers::rings::StrokeStyle;
use crate::palette::with_alpha;

/// Dash pattern for dashed rings: drawn fraction of each cell
const DASH_FILL: f32 = 0.6;
const DASH_COUNT: u32 = 24;
const DOT_COUNT: u32 = 48;

fn push_quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    // a-b-c-d counter-clockwise
    out.extend_from_slice(&[
        Vertex::at(a, color),
        Vertex::at(b, color),
        Vertex::at(c, color),
        Vertex::at(a, color),
        Vertex::at(c, color),
        Vertex::at(d, color),
    ]);
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        vertices.push(Vertex::at(center, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Soft disc: opaque center fading to transparent at the rim
pub fn glow(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let rim = with_alpha(color, 0.0);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        vertices.push(Vertex::at(center, color));
        vertices.push(Vertex::at(
            center + Vec2::from_angle(theta1) * radius,
            rim,
        ));
        vertices.push(Vertex::at(
            center + Vec2::from_angle(theta2) * radius,
            rim,
        ));
    }

    vertices
}

/// Thick arc band between two angles (radians)
pub fn arc_band(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    theta_start: f32,
    span: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(1);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = theta_start + span * i as f32 / segments as f32;
        let theta2 = theta_start + span * (i + 1) as f32 / segments as f32;
        let d1 = Vec2::from_angle(theta1);
        let d2 = Vec2::from_angle(theta2);

        push_quad(
            &mut vertices,
            center + d1 * inner_radius,
            center + d1 * outer_radius,
            center + d2 * outer_radius,
            center + d2 * inner_radius,
            color,
        );
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    arc_band(center, inner_radius, outer_radius, 0.0, TAU, color, segments)
}

/// Ring in one of the three stroke styles, turned by `rotation` radians
pub fn stroked_ring(
    center: Vec2,
    radius: f32,
    thickness: f32,
    rotation: f32,
    stroke: StrokeStyle,
    color: [f32; 4],
) -> Vec<Vertex> {
    let inner = (radius - thickness / 2.0).max(0.0);
    let outer = radius + thickness / 2.0;

    match stroke {
        StrokeStyle::Solid => ring(center, inner, outer, color, 64),
        StrokeStyle::Dashed => {
            let cell = TAU / DASH_COUNT as f32;
            (0..DASH_COUNT)
                .flat_map(|i| {
                    arc_band(
                        center,
                        inner,
                        outer,
                        rotation + i as f32 * cell,
                        cell * DASH_FILL,
                        color,
                        3,
                    )
                })
                .collect()
        }
        StrokeStyle::Dotted => {
            let cell = TAU / DOT_COUNT as f32;
            (0..DOT_COUNT)
                .flat_map(|i| {
                    let pos = center + Vec2::from_angle(rotation + i as f32 * cell) * radius;
                    circle(pos, thickness * 0.75, color, 6)
                })
                .collect()
        }
    }
}

/// Axis-aligned rectangle from its center
pub fn rect(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let h = size / 2.0;
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        Vec2::new(center.x - h.x, center.y - h.y),
        Vec2::new(center.x + h.x, center.y - h.y),
        Vec2::new(center.x + h.x, center.y + h.y),
        Vec2::new(center.x - h.x, center.y + h.y),
        color,
    );
    vertices
}

/// Line segment with width, colors fading from `from` to `to`
pub fn line(
    from: Vec2,
    to: Vec2,
    width: f32,
    from_color: [f32; 4],
    to_color: [f32; 4],
) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = dir.perp() * (width / 2.0);

    vec![
        Vertex::at(from + perp, from_color),
        Vertex::at(from - perp, from_color),
        Vertex::at(to + perp, to_color),
        Vertex::at(to + perp, to_color),
        Vertex::at(from - perp, from_color),
        Vertex::at(to - perp, to_color),
    ]
}
