//! Scene module - mesh data, loading and the frame pipeline

mod engine;
mod mesh;
mod obj;

pub use engine::*;
pub use mesh::*;
pub use obj::*;
