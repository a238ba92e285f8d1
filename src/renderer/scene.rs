//! Frame tessellation
//!
//! Turns one `IntroFrame` into a triangle list in stage coordinates, drawn
//! back to front: grid, particles, rings, logo, title, flare, then the noise
//! overlay on top.

use glam::Vec2;

use super::glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph_pixels, logo_pixels};
use super::shapes;
use super::vertex::Vertex;
use crate::consts::{STAGE_HEIGHT, STAGE_WIDTH};
use crate::intro::IntroFrame;
use crate::intro::layers::glitch::{LOGO_GRID, LOGO_PIXEL, LogoFrame};
use crate::intro::layers::rings::RingsFrame;
use crate::intro::layers::typewriter::{TextLine, TitleFrame};
use crate::intro::layers::{FlareFrame, GridFrame, NoiseFrame, ParticleSprite};
use crate::palette::{self, with_alpha};

const GRID_LINE_WIDTH: f32 = 1.0;
const TITLE_Y: f32 = -40.0;
const TITLE_PIXEL: f32 = 5.0;
const TAGLINE_Y: f32 = -90.0;
const TAGLINE_PIXEL: f32 = 2.0;
const NODE_PIXEL: f32 = 2.2;

/// Build the whole frame
pub fn build_vertices(frame: &IntroFrame) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(8192);
    grid(&mut out, &frame.grid);
    particles(&mut out, &frame.particles);
    rings(&mut out, &frame.rings);
    logo(&mut out, &frame.logo);
    title(&mut out, &frame.title);
    flare(&mut out, &frame.flare);
    noise(&mut out, &frame.noise);
    out
}

fn grid(out: &mut Vec<Vertex>, frame: &GridFrame) {
    for l in &frame.lines {
        let color = with_alpha(palette::GRID, l.alpha);
        out.extend(shapes::line(l.from, l.to, GRID_LINE_WIDTH, color, color));
    }
}

fn particles(out: &mut Vec<Vertex>, sprites: &[ParticleSprite]) {
    for p in sprites {
        let color = with_alpha(p.color, p.alpha);
        if let Some(tail) = p.trail_tail {
            out.extend(shapes::line(tail, p.pos, p.size, with_alpha(p.color, 0.0), color));
        }
        if p.sparkle {
            out.extend(shapes::glow(p.pos, p.size * 3.0, with_alpha(p.color, p.alpha * 0.5), 8));
        }
        out.extend(shapes::circle(p.pos, p.size, color, 8));
    }
}

fn rings(out: &mut Vec<Vertex>, frame: &RingsFrame) {
    for r in &frame.rings {
        if r.glow {
            out.extend(shapes::ring(
                r.center,
                r.radius - r.thickness * 3.0,
                r.radius + r.thickness * 3.0,
                with_alpha(r.color, r.alpha * 0.15),
                64,
            ));
        }
        out.extend(shapes::stroked_ring(
            r.center,
            r.radius,
            r.thickness,
            r.rotation,
            r.stroke,
            with_alpha(r.color, r.alpha),
        ));
    }
    for n in &frame.nodes {
        let color = with_alpha(n.color, n.alpha);
        out.extend(shapes::ring(n.pos, 9.0 * n.scale, 10.5 * n.scale, color, 24));
        text(out, &n.icon.to_string(), n.pos, NODE_PIXEL * n.scale, color);
    }
}

fn logo(out: &mut Vec<Vertex>, frame: &LogoFrame) {
    if frame.opacity <= 0.0 {
        return;
    }
    let pixel = LOGO_PIXEL * frame.scale;
    let half = (LOGO_GRID as f32 - 1.0) / 2.0;
    let offset_for_row = |row: usize| {
        frame
            .slices
            .iter()
            .find(|s| (s.row_start..s.row_end).contains(&row))
            .map_or(0.0, |s| s.offset)
    };

    let mut draw = |shift: f32, color: [f32; 4]| {
        for (col, row) in logo_pixels() {
            let pos = frame.center
                + Vec2::new(col as f32 - half, half - row as f32) * pixel
                + Vec2::new(offset_for_row(row) + shift, 0.0);
            out.extend(shapes::rect(pos, Vec2::splat(pixel), color));
        }
    };

    if frame.rgb_split > 0.05 {
        draw(-frame.rgb_split, with_alpha(palette::SPLIT_RED, frame.opacity * 0.6));
        draw(frame.rgb_split, with_alpha(palette::SPLIT_CYAN, frame.opacity * 0.6));
    }
    draw(0.0, with_alpha(palette::GOLD, frame.opacity));

    for q in &frame.corruption {
        out.extend(shapes::rect(q.pos, q.size, with_alpha(q.color, q.alpha)));
    }
}

fn title(out: &mut Vec<Vertex>, frame: &TitleFrame) {
    if frame.opacity <= 0.0 {
        return;
    }
    let white = with_alpha(palette::WHITE, frame.opacity);
    let gold = with_alpha(palette::GOLD, frame.opacity);

    let title_end = text(out, &frame.title, Vec2::new(0.0, TITLE_Y), TITLE_PIXEL, white);
    let tagline_end = text(out, &frame.tagline, Vec2::new(0.0, TAGLINE_Y), TAGLINE_PIXEL, gold);

    let (pixel, end, color) = match frame.cursor_line {
        TextLine::Title => (TITLE_PIXEL, title_end, white),
        TextLine::Tagline => (TAGLINE_PIXEL, tagline_end, gold),
    };
    let cell = (GLYPH_WIDTH + 1) as f32 * pixel;
    let mut slot = end + Vec2::new(cell / 2.0, 0.0);
    if let Some(c) = frame.scramble {
        text(out, &c.to_string(), slot, pixel, with_alpha(palette::CYAN, frame.opacity));
        slot.x += cell;
    }
    if frame.cursor_visible {
        out.extend(shapes::rect(
            slot,
            Vec2::new(pixel * GLYPH_WIDTH as f32 * 0.6, pixel * GLYPH_HEIGHT as f32),
            color,
        ));
    }
}

fn flare(out: &mut Vec<Vertex>, frame: &FlareFrame) {
    if frame.intensity <= 0.0 {
        return;
    }
    let half = Vec2::new(frame.streak_length / 2.0, 0.0);
    let hot = with_alpha(palette::WHITE, frame.intensity * 0.8);
    let cold = with_alpha(palette::CYAN, 0.0);
    out.extend(shapes::line(frame.center - half, frame.center, 3.0, cold, hot));
    out.extend(shapes::line(frame.center, frame.center + half, 3.0, hot, cold));
    out.extend(shapes::glow(
        frame.center,
        frame.core_radius * 2.5,
        with_alpha(palette::GOLD, frame.intensity * 0.5),
        24,
    ));
    out.extend(shapes::glow(frame.center, frame.core_radius, hot, 24));
    for g in &frame.ghosts {
        out.extend(shapes::glow(g.pos, g.radius, with_alpha(g.color, g.alpha), 16));
    }
}

fn noise(out: &mut Vec<Vertex>, frame: &NoiseFrame) {
    if frame.opacity <= 0.0 {
        return;
    }
    if frame.scanline_count > 0 {
        let spacing = STAGE_HEIGHT / frame.scanline_count as f32;
        let color = with_alpha(palette::BACKGROUND, frame.opacity * 0.5);
        for i in 0..frame.scanline_count {
            let y = STAGE_HEIGHT / 2.0 - (i as f32 + frame.scan_offset) * spacing;
            out.extend(shapes::rect(Vec2::new(0.0, y), Vec2::new(STAGE_WIDTH, 1.0), color));
        }
    }
    for s in &frame.specks {
        out.extend(shapes::rect(
            s.pos,
            Vec2::splat(s.size),
            with_alpha(palette::WHITE, s.alpha),
        ));
    }
}

/// Draw `s` centered on `center`; returns the right edge center of the text
fn text(out: &mut Vec<Vertex>, s: &str, center: Vec2, pixel: f32, color: [f32; 4]) -> Vec2 {
    let count = s.chars().count();
    let cell = (GLYPH_WIDTH + 1) as f32 * pixel;
    let width = (count as f32 * cell - pixel).max(0.0);
    let left = center.x - width / 2.0;
    let top = center.y + (GLYPH_HEIGHT as f32 - 1.0) / 2.0 * pixel;

    for (i, c) in s.chars().enumerate() {
        let x0 = left + i as f32 * cell + pixel / 2.0;
        for (col, row) in glyph_pixels(c) {
            let pos = Vec2::new(x0 + col as f32 * pixel, top - row as f32 * pixel);
            out.extend(shapes::rect(pos, Vec2::splat(pixel), color));
        }
    }
    Vec2::new(left + width, center.y)
}
