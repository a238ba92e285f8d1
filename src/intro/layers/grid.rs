//! Perspective floor grid
//!
//! Vertical lines converge on a vanishing point at the horizon; horizontal
//! lines are spaced by depth squared and scroll toward the viewer.

use glam::Vec2;

use crate::consts::{STAGE_HEIGHT, STAGE_WIDTH};
use crate::intro::layer::{Crossing, Curve, Layer, Presence, Thresholds, count_animating};
use crate::intro::timeline::Phase;
use crate::intro::tween::{AnimatedValue, Easing};

const THRESHOLDS: Thresholds = Thresholds::new(Phase::BOOT, Some(Phase::FLARE));
const ENTER: Curve = Curve::new(0.28, 800.0, Easing::OutCubic);
const EXIT: Curve = Curve::new(0.0, 500.0, Easing::InQuad);

pub const HORIZON_Y: f32 = -90.0;
const FLOOR_Y: f32 = -STAGE_HEIGHT / 2.0;
/// Width covered at the bottom edge
const SPREAD: f32 = STAGE_WIDTH * 2.4;
pub const VERTICAL_LINES: usize = 15;
pub const HORIZONTAL_LINES: usize = 12;
const SCROLL_PERIOD_MS: f64 = 1800.0;
/// Lines grow out from the horizon over this long
const DRAW_IN_MS: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFrame {
    pub opacity: f32,
    pub lines: Vec<GridLine>,
}

#[derive(Debug, Clone)]
pub struct GridLayer {
    presence: Presence,
    draw_in: AnimatedValue,
    /// Scroll freezes instead of looping
    reduced_motion: bool,
}

impl GridLayer {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            presence: Presence::new(THRESHOLDS, ENTER, EXIT),
            draw_in: AnimatedValue::new(0.0),
            reduced_motion,
        }
    }

    /// Vanishing point
    pub fn horizon() -> Vec2 {
        Vec2::new(0.0, HORIZON_Y)
    }

    pub fn sample(&self, now_ms: f64) -> GridFrame {
        let opacity = self.presence.opacity(now_ms);
        if opacity <= 0.0 {
            return GridFrame::default();
        }
        let draw = self.draw_in.sample(now_ms);
        let horizon = Self::horizon();
        let mut lines = Vec::with_capacity(VERTICAL_LINES + HORIZONTAL_LINES);

        for i in 0..VERTICAL_LINES {
            let u = i as f32 / (VERTICAL_LINES - 1) as f32 - 0.5;
            let bottom = Vec2::new(u * SPREAD, FLOOR_Y);
            lines.push(GridLine {
                from: horizon,
                to: horizon.lerp(bottom, draw),
                alpha: opacity * (1.0 - u.abs() * 0.8),
            });
        }

        let scroll = if self.reduced_motion {
            0.0
        } else {
            let since = self.presence.since_enter(now_ms).unwrap_or(0.0);
            ((since % SCROLL_PERIOD_MS) / SCROLL_PERIOD_MS) as f32
        };
        for k in 0..HORIZONTAL_LINES {
            let z = (k as f32 + scroll) / HORIZONTAL_LINES as f32;
            let depth = z * z;
            if depth > draw {
                continue;
            }
            let y = HORIZON_Y + (FLOOR_Y - HORIZON_Y) * depth;
            let half = SPREAD / 2.0 * depth;
            lines.push(GridLine {
                from: Vec2::new(-half, y),
                to: Vec2::new(half, y),
                alpha: opacity * depth,
            });
        }

        GridFrame { opacity, lines }
    }
}

impl Layer for GridLayer {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn thresholds(&self) -> Thresholds {
        THRESHOLDS
    }

    fn opacity(&self, now_ms: f64) -> f32 {
        self.presence.opacity(now_ms)
    }

    fn sync(&mut self, phase: Phase, now_ms: f64) {
        if self.presence.sync(phase, now_ms) == Crossing::Entered {
            self.draw_in
                .animate_to(1.0, DRAW_IN_MS, Easing::OutCubic, now_ms);
        }
    }

    fn pending(&self, now_ms: f64) -> usize {
        count_animating([&self.draw_in], now_ms) + self.presence.is_animating(now_ms) as usize
    }

    fn cancel(&mut self, now_ms: f64) {
        self.presence.cancel(now_ms);
        self.draw_in.cancel(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_lines_meet_at_horizon() {
        let mut grid = GridLayer::new(false);
        grid.sync(Phase::BOOT, 0.0);
        let frame = grid.sample(1200.0);
        let verticals: Vec<_> = frame.lines.iter().take(VERTICAL_LINES).collect();
        assert!(verticals.iter().all(|l| l.from == GridLayer::horizon()));
        assert!(verticals.iter().all(|l| (l.to.y - FLOOR_Y).abs() < 1e-3));
    }

    #[test]
    fn test_horizontal_lines_stay_below_horizon() {
        let mut grid = GridLayer::new(false);
        grid.sync(Phase::BOOT, 0.0);
        for t in [1100.0, 1500.0, 2222.0, 3999.0] {
            let frame = grid.sample(t);
            for line in frame.lines.iter().skip(VERTICAL_LINES) {
                assert!(line.from.y <= HORIZON_Y && line.from.y >= FLOOR_Y);
                assert_eq!(line.from.y, line.to.y);
            }
        }
    }

    #[test]
    fn test_draw_in_grows_lines() {
        let mut grid = GridLayer::new(true);
        grid.sync(Phase::BOOT, 0.0);
        let early = grid.sample(100.0);
        let late = grid.sample(2000.0);
        let len = |f: &GridFrame| (f.lines[0].to - f.lines[0].from).length();
        assert!(len(&early) < len(&late));
        assert!(early.lines.len() <= late.lines.len());
    }

    #[test]
    fn test_hidden_outside_window() {
        let mut grid = GridLayer::new(false);
        assert!(grid.sample(0.0).lines.is_empty());
        grid.sync(Phase::BOOT, 0.0);
        grid.sync(Phase::FLARE, 4600.0);
        assert!(grid.sample(5200.0).lines.is_empty());
    }
}
