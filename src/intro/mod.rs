//! Intro sequence: timing table, phase driver, tweens and the seven layers

pub mod driver;
pub mod layer;
pub mod layers;
pub mod sequencer;
pub mod timeline;
pub mod tween;

pub use driver::{DriverState, PhaseDriver, PhaseStep};
pub use layer::{Layer, Thresholds};
pub use sequencer::{IntroFrame, IntroSequencer};
pub use timeline::{Phase, PhaseEntry, PhaseSchedule};
pub use tween::{AnimatedValue, Easing, Repeat};
