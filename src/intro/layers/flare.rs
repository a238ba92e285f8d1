//! Lens flare sweep
//!
//! One horizontal pass across the logo. Intensity rises and falls with the
//! sweep, so the curve ends dark without needing an exit threshold.

use glam::Vec2;

use crate::consts::STAGE_WIDTH;
use crate::intro::layer::{Crossing, Curve, Layer, Presence, Thresholds, count_animating};
use crate::intro::layers::glitch::LOGO_CENTER;
use crate::intro::timeline::Phase;
use crate::intro::tween::{AnimatedValue, Easing};
use crate::palette;

const THRESHOLDS: Thresholds = Thresholds::new(Phase::FLARE, None);
const ENTER: Curve = Curve::new(1.0, 150.0, Easing::OutQuad);
const EXIT: Curve = Curve::new(0.0, 150.0, Easing::Linear);

pub const SWEEP_MS: f64 = 1100.0;
const SWEEP_SPAN: f32 = STAGE_WIDTH * 0.75;
const STREAK_LENGTH: f32 = STAGE_WIDTH * 1.4;
const CORE_RADIUS: f32 = 22.0;

/// Ghost discs along the flare axis: (axis factor, radius, color)
const GHOSTS: [(f32, f32, [f32; 4]); 4] = [
    (-0.4, 18.0, palette::CYAN),
    (0.35, 10.0, palette::MAGENTA),
    (0.7, 26.0, palette::VIOLET),
    (1.3, 8.0, palette::GOLD),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FlareGhost {
    pub pos: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
    pub alpha: f32,
}

/// Flare snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlareFrame {
    pub center: Vec2,
    /// 0 dark, 1 brightest
    pub intensity: f32,
    pub core_radius: f32,
    pub streak_length: f32,
    pub ghosts: Vec<FlareGhost>,
}

#[derive(Debug, Clone)]
pub struct FlareLayer {
    presence: Presence,
    sweep: AnimatedValue,
}

impl Default for FlareLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl FlareLayer {
    pub fn new() -> Self {
        Self {
            presence: Presence::new(THRESHOLDS, ENTER, EXIT),
            sweep: AnimatedValue::new(0.0),
        }
    }

    pub fn sample(&self, now_ms: f64) -> FlareFrame {
        let opacity = self.presence.opacity(now_ms);
        let s = self.sweep.sample(now_ms);
        let intensity = opacity * (std::f32::consts::PI * s).sin().max(0.0);
        if intensity <= 1e-4 {
            return FlareFrame::default();
        }

        let center = Vec2::new(-SWEEP_SPAN + 2.0 * SWEEP_SPAN * s, LOGO_CENTER.y + 12.0);
        let axis = LOGO_CENTER - center;
        let ghosts = GHOSTS
            .iter()
            .map(|&(factor, radius, color)| FlareGhost {
                pos: center + axis * (1.0 + factor),
                radius,
                color,
                alpha: intensity * 0.35,
            })
            .collect();

        FlareFrame {
            center,
            intensity,
            core_radius: CORE_RADIUS,
            streak_length: STREAK_LENGTH * (0.6 + 0.4 * intensity),
            ghosts,
        }
    }
}

impl Layer for FlareLayer {
    fn name(&self) -> &'static str {
        "flare"
    }

    fn thresholds(&self) -> Thresholds {
        THRESHOLDS
    }

    fn opacity(&self, now_ms: f64) -> f32 {
        self.presence.opacity(now_ms)
    }

    fn sync(&mut self, phase: Phase, now_ms: f64) {
        if self.presence.sync(phase, now_ms) == Crossing::Entered {
            self.sweep
                .animate_to(1.0, SWEEP_MS, Easing::InOutSine, now_ms);
        }
    }

    fn pending(&self, now_ms: f64) -> usize {
        count_animating([&self.sweep], now_ms) + self.presence.is_animating(now_ms) as usize
    }

    fn cancel(&mut self, now_ms: f64) {
        self.presence.cancel(now_ms);
        self.sweep.cancel(now_ms);
    }
}
