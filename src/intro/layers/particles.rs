//! Spiral particle field
//!
//! Particles sit on a golden-angle spiral. On entry they fly out from the
//! centre in a staggered burst, orbit while the logo assembles (pulling in
//! toward it once the logo phase is crossed), and scatter on exit.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{GOLDEN_ANGLE_DEG, MAX_PARTICLES};
use crate::intro::layer::{Curve, Layer, Presence, Thresholds, count_animating};
use crate::intro::timeline::Phase;
use crate::intro::tween::{AnimatedValue, Easing};
use crate::palette::ACCENTS;
use crate::polar_to_cartesian;

const THRESHOLDS: Thresholds = Thresholds::new(Phase::PARTICLES, Some(Phase::FLARE));
/// Spiral tightens toward the logo from here
const CONVERGE_AT: Phase = Phase::LOGO;

const ENTER: Curve = Curve::new(1.0, 500.0, Easing::OutQuad);
const EXIT: Curve = Curve::new(0.0, 600.0, Easing::InQuad);

/// Spiral radii (stage units)
const INNER_RADIUS: f32 = 40.0;
const OUTER_RADIUS: f32 = 185.0;
const RADIUS_JITTER: f32 = 6.0;

/// One particle's fly-out time
const FLIGHT_MS: f64 = 900.0;
/// Per-index spawn stagger, plus up to `SPAWN_JITTER_MS` random
const SPAWN_STAGGER_MS: f64 = 12.0;
const SPAWN_JITTER_MS: f64 = 60.0;

const CONVERGE_MS: f64 = 1400.0;
/// Radius multiplier once fully converged
const CONVERGE_FACTOR: f32 = 0.6;
const SCATTER_MS: f64 = 600.0;
const SCATTER_FACTOR: f32 = 0.7;

/// Orbit speed at `speed == 1.0`
const ORBIT_DEG_PER_SEC: f32 = 14.0;
/// Trail tail lags this far behind the head
const TRAIL_LAG_DEG: f32 = 9.0;

/// One spiral particle, fixed for the lifetime of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDescriptor {
    pub id: u32,
    /// Spiral angle in degrees, [0, 360)
    pub angle: f32,
    pub radius: f32,
    pub size: f32,
    pub color: [f32; 4],
    /// Orbit speed multiplier
    pub speed: f32,
    pub has_trail: bool,
    pub pulses: bool,
    pub is_sparkle: bool,
    pub spawn_delay_ms: f64,
}

/// Angle of spiral index `i`: `(i * 137.508) mod 360`
#[inline]
pub fn golden_angle(i: usize) -> f32 {
    ((i as f64 * GOLDEN_ANGLE_DEG) % 360.0) as f32
}

/// Generate `count` particles (capped at `MAX_PARTICLES`).
///
/// Placement is deterministic; size, color, speed and flags are drawn from `rng`.
pub fn generate_particles(count: usize, rng: &mut Pcg32) -> Vec<ParticleDescriptor> {
    let count = count.min(MAX_PARTICLES);
    (0..count)
        .map(|i| {
            let spread = ((i as f32 + 0.5) / count as f32).sqrt();
            let jitter = rng.random_range(-RADIUS_JITTER..=RADIUS_JITTER);
            ParticleDescriptor {
                id: i as u32,
                angle: golden_angle(i),
                radius: INNER_RADIUS + (OUTER_RADIUS - INNER_RADIUS) * spread + jitter,
                size: rng.random_range(1.5..4.0),
                color: ACCENTS[rng.random_range(0..ACCENTS.len())],
                speed: rng.random_range(0.6..1.4),
                has_trail: rng.random_bool(0.25),
                pulses: rng.random_bool(0.35),
                is_sparkle: rng.random_bool(0.12),
                spawn_delay_ms: i as f64 * SPAWN_STAGGER_MS
                    + rng.random_range(0.0..SPAWN_JITTER_MS),
            }
        })
        .collect()
}

/// Where one particle is this frame
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSprite {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub color: [f32; 4],
    pub alpha: f32,
    /// Tail end of the trail streak, when the particle has one
    pub trail_tail: Option<Vec2>,
    pub sparkle: bool,
}

/// Particle layer
#[derive(Debug, Clone)]
pub struct ParticleLayer {
    presence: Presence,
    particles: Vec<ParticleDescriptor>,
    /// 0-1 over the whole staggered burst
    flight: AnimatedValue,
    converge: AnimatedValue,
    scatter: AnimatedValue,
    converging: bool,
    flight_span_ms: f64,
}

impl ParticleLayer {
    pub fn new(count: usize, rng: &mut Pcg32) -> Self {
        let particles = generate_particles(count, rng);
        let last_spawn = particles
            .iter()
            .map(|p| p.spawn_delay_ms)
            .fold(0.0, f64::max);
        Self {
            presence: Presence::new(THRESHOLDS, ENTER, EXIT),
            particles,
            flight: AnimatedValue::new(0.0),
            converge: AnimatedValue::new(0.0),
            scatter: AnimatedValue::new(0.0),
            converging: false,
            flight_span_ms: last_spawn + FLIGHT_MS,
        }
    }

    pub fn descriptors(&self) -> &[ParticleDescriptor] {
        &self.particles
    }

    pub fn sample(&self, now_ms: f64) -> Vec<ParticleSprite> {
        let opacity = self.presence.opacity(now_ms);
        if opacity <= 0.0 {
            return Vec::new();
        }
        let since = self.presence.since_enter(now_ms).unwrap_or(0.0) as f32;
        let flown_ms = self.flight.sample(now_ms) as f64 * self.flight_span_ms;
        let converge = self.converge.sample(now_ms);
        let radius_scale = (1.0 + (CONVERGE_FACTOR - 1.0) * converge)
            * (1.0 + SCATTER_FACTOR * self.scatter.sample(now_ms));
        let orbit = since / 1000.0 * ORBIT_DEG_PER_SEC;

        self.particles
            .iter()
            .filter_map(|p| {
                let local = ((flown_ms - p.spawn_delay_ms) / FLIGHT_MS).clamp(0.0, 1.0) as f32;
                if local <= 0.0 {
                    return None;
                }
                let radius = p.radius * Easing::OutCubic.apply(local) * radius_scale;
                let angle = p.angle + orbit * p.speed;
                let pos = polar_to_cartesian(radius, angle.to_radians());

                let pulse = if p.pulses {
                    1.0 + 0.3 * (since * 0.006 * p.speed + p.id as f32).sin()
                } else {
                    1.0
                };
                let twinkle = if p.is_sparkle {
                    0.55 + 0.45 * (since * 0.012 + p.id as f32 * 1.7).sin()
                } else {
                    1.0
                };
                let trail_tail = p.has_trail.then(|| {
                    polar_to_cartesian(radius * 0.92, (angle - TRAIL_LAG_DEG).to_radians())
                });

                Some(ParticleSprite {
                    id: p.id,
                    pos,
                    size: p.size * pulse,
                    color: p.color,
                    alpha: opacity * local * twinkle,
                    trail_tail,
                    sparkle: p.is_sparkle,
                })
            })
            .collect()
    }
}

impl Layer for ParticleLayer {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn thresholds(&self) -> Thresholds {
        THRESHOLDS
    }

    fn opacity(&self, now_ms: f64) -> f32 {
        self.presence.opacity(now_ms)
    }

    fn sync(&mut self, phase: Phase, now_ms: f64) {
        use crate::intro::layer::Crossing;

        match self.presence.sync(phase, now_ms) {
            Crossing::Entered => {
                self.flight.animate_to(1.0, self.flight_span_ms, Easing::Linear, now_ms);
            }
            Crossing::Exited => {
                self.scatter
                    .animate_to(1.0, SCATTER_MS, Easing::InCubic, now_ms);
            }
            Crossing::None => {}
        }

        if !self.converging && self.presence.is_showing() && phase.has_crossed(CONVERGE_AT) {
            self.converging = true;
            self.converge
                .animate_to(1.0, CONVERGE_MS, Easing::InOutCubic, now_ms);
        }
    }

    fn pending(&self, now_ms: f64) -> usize {
        count_animating([&self.flight, &self.converge, &self.scatter], now_ms)
            + self.presence.is_animating(now_ms) as usize
    }

    fn cancel(&mut self, now_ms: f64) {
        self.presence.cancel(now_ms);
        self.flight.cancel(now_ms);
        self.converge.cancel(now_ms);
        self.scatter.cancel(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_generate_exact_count_every_run() {
        let mut rng = Pcg32::seed_from_u64(1);
        let first = generate_particles(60, &mut rng);
        let second = generate_particles(60, &mut rng);
        assert_eq!(first.len(), 60);
        assert_eq!(second.len(), 60);
        // Attributes differ between runs, placement does not
        assert_ne!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.angle, b.angle);
        }
    }

    #[test]
    fn test_golden_angle_exact_at_high_index() {
        // The product only keeps its fractional part in double precision
        for i in [119, 120, MAX_PARTICLES] {
            let expected = ((i as f64 * 137.508) % 360.0) as f32;
            assert_eq!(golden_angle(i), expected, "index {}", i);
        }
        assert_eq!(golden_angle(120), 300.96);
    }

    #[test]
    fn test_golden_angle_sequence() {
        let mut rng = Pcg32::seed_from_u64(99);
        let particles = generate_particles(60, &mut rng);
        for (i, p) in particles.iter().enumerate() {
            let expected = ((i as f64 * 137.508) % 360.0) as f32;
            assert!((p.angle - expected).abs() < 1e-3, "particle {}", i);
            assert!((0.0..360.0).contains(&p.angle));
        }
        assert!((particles[1].angle - 137.508).abs() < 1e-3);
        assert!((particles[3].angle - 52.524).abs() < 1e-3);
    }

    #[test]
    fn test_generate_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(generate_particles(10_000, &mut rng).len(), MAX_PARTICLES);
        assert!(generate_particles(0, &mut rng).is_empty());
    }

    #[test]
    fn test_attribute_ranges() {
        let mut rng = Pcg32::seed_from_u64(11);
        for p in generate_particles(100, &mut rng) {
            assert!((1.5..4.0).contains(&p.size));
            assert!((0.6..1.4).contains(&p.speed));
            assert!(p.radius > INNER_RADIUS - RADIUS_JITTER - 0.01);
            assert!(p.radius < OUTER_RADIUS + RADIUS_JITTER + 0.01);
            assert!(p.spawn_delay_ms >= p.id as f64 * SPAWN_STAGGER_MS);
        }
    }

    #[test]
    fn test_hidden_before_entry() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut layer = ParticleLayer::new(60, &mut rng);
        layer.sync(Phase::BOOT, 0.0);
        assert!(layer.sample(300.0).is_empty());
    }

    #[test]
    fn test_burst_spawns_all_particles() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut layer = ParticleLayer::new(60, &mut rng);
        layer.sync(Phase::PARTICLES, 400.0);

        // Early in the burst only the first particles are out
        let early = layer.sample(450.0);
        assert!(early.len() < 60);

        let settled = layer.sample(400.0 + layer.flight_span_ms + 10.0);
        assert_eq!(settled.len(), 60);
        assert!(settled.iter().all(|s| s.alpha > 0.0));
    }

    #[test]
    fn test_converge_pulls_inward() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut layer = ParticleLayer::new(20, &mut rng);
        layer.sync(Phase::PARTICLES, 0.0);
        let t = layer.flight_span_ms + 10.0;
        let before: f32 = layer.sample(t).iter().map(|s| s.pos.length()).sum();

        layer.sync(Phase::LOGO, t);
        let after: f32 = layer
            .sample(t + CONVERGE_MS + 10.0)
            .iter()
            .map(|s| s.pos.length())
            .sum();
        assert!(after < before * 0.7);
    }

    #[test]
    fn test_exit_fades_out_and_cancel_clears_pending() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut layer = ParticleLayer::new(20, &mut rng);
        layer.sync(Phase::PARTICLES, 0.0);
        layer.sync(Phase::FLARE, 2000.0);
        assert!(layer.pending(2100.0) > 0);
        assert!(layer.sample(2000.0 + SCATTER_MS + 10.0).is_empty());

        layer.cancel(2100.0);
        assert_eq!(layer.pending(2100.0), 0);
    }

    #[test]
    fn test_descriptors_not_regenerated_on_sync() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut layer = ParticleLayer::new(60, &mut rng);
        let before = layer.descriptors().to_vec();
        for p in 0..=6 {
            layer.sync(Phase(p), p as f64 * 1000.0);
        }
        assert_eq!(layer.descriptors(), before.as_slice());
    }
}
