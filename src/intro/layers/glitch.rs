//! Logo glitch assembly
//!
//! The pixel emblem is cut into horizontal bands. On entry the bands start
//! torn apart with an RGB split and corruption squares flickering on top,
//! then snap together. After assembly a short glitch burst repeats now and
//! then unless reduced motion is on.
//!
//! Per-frame jitter comes from hashing seeded values with a time bucket, so
//! it flickers without ever re-rolling the RNG.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::MAX_CORRUPTION_SQUARES;
use crate::hash_unit;
use crate::intro::layer::{Crossing, Curve, Layer, Presence, Thresholds, count_animating};
use crate::intro::timeline::Phase;
use crate::intro::tween::{AnimatedValue, Easing, Repeat};
use crate::palette::ACCENTS;

const THRESHOLDS: Thresholds = Thresholds::new(Phase::LOGO, None);
const ENTER: Curve = Curve::new(1.0, 300.0, Easing::OutQuad);
const EXIT: Curve = Curve::new(0.0, 300.0, Easing::InQuad);

/// Logo bitmap is LOGO_GRID x LOGO_GRID pixels
pub const LOGO_GRID: usize = 16;
/// Stage units per logo pixel
pub const LOGO_PIXEL: f32 = 7.0;
pub const LOGO_CENTER: Vec2 = Vec2::new(0.0, 60.0);

pub const SLICE_COUNT: usize = 6;
const MAX_SLICE_OFFSET: f32 = 28.0;
const RGB_SPLIT_MAX: f32 = 6.0;

const ASSEMBLE_MS: f64 = 1200.0;
const SCALE_FROM: f32 = 1.25;
const SCALE_MS: f64 = 900.0;
/// Jitter re-rolls every bucket
const JITTER_STEP_MS: f64 = 50.0;
/// Corruption squares vanish once chaos drops below this
const CORRUPTION_CUTOFF: f32 = 0.15;

const BURST_PERIOD_MS: f64 = 2400.0;
/// Fraction of each burst period spent glitching
const BURST_WINDOW: f32 = 0.06;
const BURST_CHAOS: f32 = 0.35;

/// A band of logo rows that tears sideways
#[derive(Debug, Clone, PartialEq)]
pub struct GlitchSlice {
    pub row_start: usize,
    /// Exclusive
    pub row_end: usize,
    pub max_offset: f32,
    pub seed: u32,
}

/// A flickering glitch rectangle over the logo
#[derive(Debug, Clone, PartialEq)]
pub struct CorruptionSquare {
    /// Offset from the logo centre
    pub pos: Vec2,
    pub size: Vec2,
    pub color: [f32; 4],
    pub seed: u32,
}

/// Cut the logo rows into exactly `SLICE_COUNT` bands at random rows
pub fn generate_slices(rng: &mut Pcg32) -> Vec<GlitchSlice> {
    let mut cuts: Vec<usize> = rand::seq::index::sample(rng, LOGO_GRID - 1, SLICE_COUNT - 1)
        .into_iter()
        .map(|c| c + 1)
        .collect();
    cuts.sort_unstable();
    cuts.push(LOGO_GRID);

    let mut start = 0;
    cuts.into_iter()
        .map(|end| {
            let slice = GlitchSlice {
                row_start: start,
                row_end: end,
                max_offset: rng.random_range(MAX_SLICE_OFFSET * 0.3..=MAX_SLICE_OFFSET),
                seed: rng.random(),
            };
            start = end;
            slice
        })
        .collect()
}

/// Exactly `count` squares (capped at `MAX_CORRUPTION_SQUARES`)
pub fn generate_corruption(count: usize, rng: &mut Pcg32) -> Vec<CorruptionSquare> {
    let half = LOGO_GRID as f32 * LOGO_PIXEL / 2.0;
    (0..count.min(MAX_CORRUPTION_SQUARES))
        .map(|_| CorruptionSquare {
            pos: Vec2::new(
                rng.random_range(-half * 1.2..half * 1.2),
                rng.random_range(-half..half),
            ),
            size: Vec2::new(
                rng.random_range(LOGO_PIXEL..LOGO_PIXEL * 5.0),
                rng.random_range(LOGO_PIXEL * 0.5..LOGO_PIXEL * 2.0),
            ),
            color: ACCENTS[rng.random_range(0..ACCENTS.len())],
            seed: rng.random(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogoSlice {
    pub row_start: usize,
    pub row_end: usize,
    /// Horizontal shift in stage units
    pub offset: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorruptionQuad {
    /// Centre in stage coordinates
    pub pos: Vec2,
    pub size: Vec2,
    pub color: [f32; 4],
    pub alpha: f32,
}

/// Logo snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogoFrame {
    pub opacity: f32,
    pub center: Vec2,
    pub scale: f32,
    /// Distance of the red/cyan ghost copies
    pub rgb_split: f32,
    pub slices: Vec<LogoSlice>,
    pub corruption: Vec<CorruptionQuad>,
}

#[derive(Debug, Clone)]
pub struct GlitchLayer {
    presence: Presence,
    slices: Vec<GlitchSlice>,
    squares: Vec<CorruptionSquare>,
    /// 0 torn apart, 1 assembled
    assemble: AnimatedValue,
    scale: AnimatedValue,
    burst: AnimatedValue,
    reduced_motion: bool,
}

impl GlitchLayer {
    pub fn new(corruption_count: usize, reduced_motion: bool, rng: &mut Pcg32) -> Self {
        Self {
            presence: Presence::new(THRESHOLDS, ENTER, EXIT),
            slices: generate_slices(rng),
            squares: generate_corruption(corruption_count, rng),
            assemble: AnimatedValue::new(0.0),
            scale: AnimatedValue::new(SCALE_FROM),
            burst: AnimatedValue::new(1.0),
            reduced_motion,
        }
    }

    pub fn slices(&self) -> &[GlitchSlice] {
        &self.slices
    }

    pub fn corruption_squares(&self) -> &[CorruptionSquare] {
        &self.squares
    }

    /// How torn the logo is right now (0-1)
    pub fn chaos(&self, now_ms: f64) -> f32 {
        let assemble = self.assemble.sample(now_ms);
        let mut chaos = 1.0 - assemble;
        if assemble >= 1.0 && !self.reduced_motion && self.burst.sample(now_ms) < BURST_WINDOW {
            chaos = chaos.max(BURST_CHAOS);
        }
        chaos
    }

    pub fn sample(&self, now_ms: f64) -> LogoFrame {
        let opacity = self.presence.opacity(now_ms);
        if opacity <= 0.0 {
            return LogoFrame::default();
        }
        let chaos = self.chaos(now_ms);
        let bucket = (now_ms / JITTER_STEP_MS) as u32;

        let slices = self
            .slices
            .iter()
            .map(|s| {
                let roll = if self.reduced_motion {
                    1.0
                } else {
                    hash_unit(s.seed ^ bucket.wrapping_mul(31)) * 2.0 - 1.0
                };
                LogoSlice {
                    row_start: s.row_start,
                    row_end: s.row_end,
                    offset: s.max_offset * chaos * roll,
                }
            })
            .collect();

        let corruption = if chaos > CORRUPTION_CUTOFF {
            self.squares
                .iter()
                .filter(|sq| hash_unit(sq.seed.wrapping_add(bucket)) > 0.4)
                .map(|sq| CorruptionQuad {
                    pos: LOGO_CENTER + sq.pos,
                    size: sq.size,
                    color: sq.color,
                    alpha: opacity * chaos,
                })
                .collect()
        } else {
            Vec::new()
        };

        LogoFrame {
            opacity,
            center: LOGO_CENTER,
            scale: self.scale.sample(now_ms),
            rgb_split: RGB_SPLIT_MAX * chaos,
            slices,
            corruption,
        }
    }
}

impl Layer for GlitchLayer {
    fn name(&self) -> &'static str {
        "glitch"
    }

    fn thresholds(&self) -> Thresholds {
        THRESHOLDS
    }

    fn opacity(&self, now_ms: f64) -> f32 {
        self.presence.opacity(now_ms)
    }

    fn sync(&mut self, phase: Phase, now_ms: f64) {
        if self.presence.sync(phase, now_ms) == Crossing::Entered {
            self.assemble
                .animate_to(1.0, ASSEMBLE_MS, Easing::OutExpo, now_ms);
            self.scale.set(SCALE_FROM);
            self.scale.animate_to(1.0, SCALE_MS, Easing::OutBack, now_ms);
            if !self.reduced_motion {
                self.burst.repeat(
                    0.0,
                    1.0,
                    BURST_PERIOD_MS,
                    Easing::Linear,
                    Repeat::Loop,
                    now_ms,
                );
            }
        }
    }

    fn pending(&self, now_ms: f64) -> usize {
        count_animating([&self.assemble, &self.scale, &self.burst], now_ms)
            + self.presence.is_animating(now_ms) as usize
    }

    fn cancel(&mut self, now_ms: f64) {
        self.presence.cancel(now_ms);
        self.assemble.cancel(now_ms);
        self.scale.cancel(now_ms);
        self.burst.cancel(now_ms);
    }
}
