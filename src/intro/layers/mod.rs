//! The seven visual layers
//!
//! Each one reads only the phase and its own seeded data. None of them
//! talk to each other.

pub mod flare;
pub mod glitch;
pub mod grid;
pub mod noise;
pub mod particles;
pub mod rings;
pub mod typewriter;

pub use flare::{FlareFrame, FlareLayer};
pub use glitch::{CorruptionSquare, GlitchLayer, GlitchSlice, LogoFrame};
pub use grid::{GridFrame, GridLayer};
pub use noise::{NoiseFrame, NoiseLayer};
pub use particles::{ParticleDescriptor, ParticleLayer, ParticleSprite, generate_particles};
pub use rings::{DATA_NODES, DataNodeDescriptor, RINGS, RingDescriptor, RingsFrame, RingsLayer};
pub use typewriter::{TitleFrame, TypewriterLayer};
