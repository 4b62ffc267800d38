//! A small software rasterizer: OBJ mesh in, shaded and depth-tested pixels out.
//!
//! - `scene`: the render pipeline (transform, assembly, rasterization, shading, z-buffer)
//! - `mesh`: OBJ loading into the flat vertex list the pipeline consumes
//! - `logging`: logger setup for binaries

pub mod logging;
pub mod mesh;
pub mod scene;

pub use mesh::{load_mesh, Mesh, MeshError, MeshOptions};
pub use scene::{RenderConfig, RenderContext};
