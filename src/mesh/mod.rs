//! Earth discretization: tensor meshes, per-cell models and topography.
//!
//! These are the file-backed collaborators of the derived-property graph:
//! given a path they return a mesh, a full-mesh vector, or a surface.

pub mod model;
pub mod tensor;
pub mod topo;

pub use model::*;
pub use tensor::*;
pub use topo::*;
