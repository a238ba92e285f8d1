//! Noise and scanline overlay
//!
//! Dim flickering specks over the whole stage plus slowly scrolling
//! scanlines. Speck positions and flicker offsets are seeded once.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{MAX_NOISE_DOTS, STAGE_HEIGHT, STAGE_WIDTH};
use crate::intro::layer::{Crossing, Curve, Layer, Presence, Thresholds, count_animating};
use crate::intro::timeline::Phase;
use crate::intro::tween::{AnimatedValue, Easing, Repeat};

const THRESHOLDS: Thresholds = Thresholds::new(Phase::BOOT, Some(Phase::FLARE));
/// Overlay never goes fully opaque
const ENTER: Curve = Curve::new(0.35, 600.0, Easing::OutQuad);
const EXIT: Curve = Curve::new(0.0, 400.0, Easing::Linear);

pub const SCANLINE_COUNT: usize = 48;
const SCAN_PERIOD_MS: f64 = 2400.0;

/// A seeded noise speck
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseDot {
    pub pos: Vec2,
    pub size: f32,
    /// Flicker phase offset (radians)
    pub flicker_offset: f32,
    /// Flicker rate (Hz)
    pub flicker_hz: f32,
}

pub fn generate_noise_dots(count: usize, rng: &mut Pcg32) -> Vec<NoiseDot> {
    (0..count.min(MAX_NOISE_DOTS))
        .map(|_| NoiseDot {
            pos: Vec2::new(
                rng.random_range(-STAGE_WIDTH / 2.0..STAGE_WIDTH / 2.0),
                rng.random_range(-STAGE_HEIGHT / 2.0..STAGE_HEIGHT / 2.0),
            ),
            size: rng.random_range(1.0..2.5),
            flicker_offset: rng.random_range(0.0..std::f32::consts::TAU),
            flicker_hz: rng.random_range(0.5..3.0),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSpeck {
    pub pos: Vec2,
    pub size: f32,
    pub alpha: f32,
}

/// Overlay snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseFrame {
    pub opacity: f32,
    /// Scanline scroll, 0-1 of one line spacing
    pub scan_offset: f32,
    pub scanline_count: usize,
    pub specks: Vec<NoiseSpeck>,
}

#[derive(Debug, Clone)]
pub struct NoiseLayer {
    presence: Presence,
    dots: Vec<NoiseDot>,
    scan: AnimatedValue,
    reduced_motion: bool,
}

impl NoiseLayer {
    pub fn new(count: usize, reduced_motion: bool, rng: &mut Pcg32) -> Self {
        Self {
            presence: Presence::new(THRESHOLDS, ENTER, EXIT),
            dots: generate_noise_dots(count, rng),
            scan: AnimatedValue::new(0.0),
            reduced_motion,
        }
    }

    pub fn dots(&self) -> &[NoiseDot] {
        &self.dots
    }

    pub fn sample(&self, now_ms: f64) -> NoiseFrame {
        let opacity = self.presence.opacity(now_ms);
        if opacity <= 0.0 {
            return NoiseFrame::default();
        }
        let secs = now_ms as f32 / 1000.0;
        let specks = self
            .dots
            .iter()
            .map(|d| {
                let flicker = if self.reduced_motion {
                    0.6
                } else {
                    let cycle = secs * d.flicker_hz * std::f32::consts::TAU;
                    0.5 + 0.5 * (cycle + d.flicker_offset).sin()
                };
                NoiseSpeck {
                    pos: d.pos,
                    size: d.size,
                    alpha: opacity * flicker,
                }
            })
            .collect();

        NoiseFrame {
            opacity,
            scan_offset: self.scan.sample(now_ms),
            scanline_count: SCANLINE_COUNT,
            specks,
        }
    }
}

impl Layer for NoiseLayer {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn thresholds(&self) -> Thresholds {
        THRESHOLDS
    }

    fn opacity(&self, now_ms: f64) -> f32 {
        self.presence.opacity(now_ms)
    }

    fn sync(&mut self, phase: Phase, now_ms: f64) {
        if self.presence.sync(phase, now_ms) == Crossing::Entered && !self.reduced_motion {
            self.scan
                .repeat(0.0, 1.0, SCAN_PERIOD_MS, Easing::Linear, Repeat::Loop, now_ms);
        }
    }

    fn pending(&self, now_ms: f64) -> usize {
        count_animating([&self.scan], now_ms) + self.presence.is_animating(now_ms) as usize
    }

    fn cancel(&mut self, now_ms: f64) {
        self.presence.cancel(now_ms);
        self.scan.cancel(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_dots_seeded_once_within_stage() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut layer = NoiseLayer::new(120, false, &mut rng);
        assert_eq!(layer.dots().len(), 120);
        let before = layer.dots().to_vec();
        layer.sync(Phase::BOOT, 0.0);
        layer.sync(Phase::LOGO, 1500.0);
        assert_eq!(layer.dots(), before.as_slice());
        for d in layer.dots() {
            assert!(d.pos.x.abs() <= STAGE_WIDTH / 2.0);
            assert!(d.pos.y.abs() <= STAGE_HEIGHT / 2.0);
        }
    }

    #[test]
    fn test_specks_follow_opacity() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut layer = NoiseLayer::new(50, false, &mut rng);
        assert!(layer.sample(0.0).specks.is_empty());

        layer.sync(Phase::BOOT, 0.0);
        let frame = layer.sample(1000.0);
        assert!((frame.opacity - 0.35).abs() < 1e-5);
        assert_eq!(frame.specks.len(), 50);
        assert!(frame.specks.iter().all(|s| s.alpha <= 0.35 + 1e-5));
    }

    #[test]
    fn test_reduced_motion_is_static() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut layer = NoiseLayer::new(10, true, &mut rng);
        layer.sync(Phase::BOOT, 0.0);
        let a = layer.sample(1000.0);
        let b = layer.sample(1333.0);
        assert_eq!(a.specks, b.specks);
        assert_eq!(a.scan_offset, 0.0);
        assert_eq!(layer.pending(1000.0), 0);
    }

    #[test]
    fn test_scan_loop_pending_until_cancelled() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut layer = NoiseLayer::new(10, false, &mut rng);
        layer.sync(Phase::BOOT, 0.0);
        assert_eq!(layer.pending(50_000.0), 1);
        layer.cancel(50_000.0);
        assert_eq!(layer.pending(50_000.0), 0);
    }
}
