//! Software rasterizer
//!
//! Features:
//! - Homogeneous row-vector transforms with a rigid-only quick inverse
//! - Plane clipping shared by the near plane and the screen edges
//! - Flat directional lighting and back-face culling
//! - Scanline fill with perspective-correct texturing against a 1/z depth buffer

mod camera;
mod clip;
mod math;
mod render;
mod types;

pub use camera::*;
pub use clip::*;
pub use math::*;
pub use render::*;
pub use types::*;

/// Default working resolution
pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 256;
