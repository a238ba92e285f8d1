//! WebGPU rendering module
//!
//! Every layer is tessellated into one alpha-blended triangle list per frame.

pub mod glyphs;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{IntroRenderer, stage_to_ndc};
pub use scene::build_vertices;
pub use vertex::Vertex;
