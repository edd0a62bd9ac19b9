//! ogre-export library
//!
//! Converts Ogre mesh XML into OBJ/MTL and recalculates vertex normals in
//! mesh XML files.

pub mod batch;
pub mod config;
pub mod convert;
pub mod converter;
pub mod document;
pub mod formats;
pub mod mesh;
pub mod normals;
pub mod textures;
pub mod tree;

// Re-export key types for mesh conversion
pub use batch::{collect_inputs, convert_batch, BatchFailure, BatchReport};
pub use config::{load_config, ExportConfig};
pub use convert::{convert_xml_file, convert_xml_to_memory, obj_file_name, ConvertedObj};
pub use converter::{MeshXmlConverter, OgreXmlConverter};
pub use mesh::{MergeError, MeshAssembly};

// Re-export normal recalculation
pub use normals::{recalculate_normals, recalculate_normals_file, NormalReport};
