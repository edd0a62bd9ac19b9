//! Text output formats for converted meshes
//!
//! OBJ geometry and its companion MTL material library.

mod mtl;
mod obj;

pub use mtl::{write_mtl, TextureBindings, TextureMap};
pub use obj::{write_obj, FaceFormat};
