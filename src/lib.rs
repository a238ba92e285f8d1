//! Cinematic Intro - the cold-start animation sequence of the finance app
//!
//! Core modules:
//! - `intro`: Phase driver, timing table and the seven visual layers
//! - `renderer`: WebGPU pipeline and frame tessellation
//! - `config`: Data-driven timing and quality settings
//! - `error`: Configuration errors

pub mod config;
pub mod error;
pub mod intro;
pub mod renderer;

pub use config::{IntroConfig, InterruptionPolicy, QualityPreset};
pub use error::{ConfigError, ScheduleError};
pub use intro::{IntroFrame, IntroSequencer, Phase, PhaseDriver, PhaseSchedule};

use glam::Vec2;

/// Sequence configuration constants
pub mod consts {
    /// Logical stage size (portrait phone, origin at centre, y up)
    pub const STAGE_WIDTH: f32 = 390.0;
    pub const STAGE_HEIGHT: f32 = 844.0;

    /// Frame step used by the headless runner (60 Hz)
    pub const FRAME_DT_MS: f64 = 1000.0 / 60.0;
    /// A frame gap this long is treated as the app having been backgrounded.
    /// Shorter gaps are slow frames and count in full.
    pub const INTERRUPTION_GAP_MS: f64 = 1000.0;

    /// Golden angle in degrees for spiral placement
    pub const GOLDEN_ANGLE_DEG: f64 = 137.508;

    /// Element caps (frame budget, not correctness)
    pub const MAX_PARTICLES: usize = 120;
    pub const MAX_CORRUPTION_SQUARES: usize = 24;
    pub const MAX_NOISE_DOTS: usize = 240;
}

/// Cinematic dark theme colors (linear RGBA)
pub mod palette {
    pub const BACKGROUND: [f32; 4] = [0.012, 0.016, 0.035, 1.0];
    pub const CYAN: [f32; 4] = [0.0, 0.9, 1.0, 1.0];
    pub const MAGENTA: [f32; 4] = [1.0, 0.17, 0.84, 1.0];
    pub const GOLD: [f32; 4] = [1.0, 0.78, 0.34, 1.0];
    pub const EMERALD: [f32; 4] = [0.17, 1.0, 0.69, 1.0];
    pub const VIOLET: [f32; 4] = [0.55, 0.36, 0.96, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const GRID: [f32; 4] = [0.25, 0.35, 0.9, 1.0];
    /// RGB split channels
    pub const SPLIT_RED: [f32; 4] = [1.0, 0.1, 0.25, 1.0];
    pub const SPLIT_CYAN: [f32; 4] = [0.1, 0.95, 1.0, 1.0];

    /// Accent colors particles and corruption squares pick from
    pub const ACCENTS: [[f32; 4]; 5] = [CYAN, MAGENTA, GOLD, EMERALD, VIOLET];

    /// Same color with its alpha multiplied
    #[inline]
    pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Wrap degrees into [0, 360)
#[inline]
pub fn normalize_degrees(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

/// Cheap integer hash for per-frame jitter derived from seeded values.
/// Same inputs always give the same output, so nothing re-randomizes.
#[inline]
pub fn hash_u32(mut x: u32) -> u32 {
    x = x.wrapping_mul(2654435761);
    x ^= x >> 16;
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x
}

/// `hash_u32` mapped to [0, 1)
#[inline]
pub fn hash_unit(x: u32) -> f32 {
    (hash_u32(x) & 0x00ff_ffff) as f32 / 16_777_216.0
}
