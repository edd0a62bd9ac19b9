//! Mesh assembly (Ogre mesh XML -> indexed OBJ-ready arrays)

mod assemble;
mod merge;
mod types;

// Re-export public API
pub use merge::{flip_v, merge_geometry, MergeError, DEFAULT_NORMAL, DEFAULT_UV, MAX_VERTEX_COUNT};
pub use types::{Face, MergedGeometry, MeshAssembly, Submesh};
