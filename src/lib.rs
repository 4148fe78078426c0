//! Scanline Engine: software 3D rasterizer
//!
//! Renders a triangle mesh from a moving first-person camera into a plain
//! RGBA buffer:
//! - World, view and perspective transforms on homogeneous row vectors
//! - Near-plane and screen-edge clipping
//! - Back-face culling with flat directional lighting
//! - Perspective-correct texture mapping with a reciprocal-depth buffer
//!
//! Window creation, key reading and presentation live in the binary.

pub mod config;
pub mod input;
pub mod rasterizer;
pub mod scene;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
