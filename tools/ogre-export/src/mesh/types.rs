//! Types for merged and assembled mesh data

/// Vertex data merged from all buffers of one geometry block
///
/// `normals` and `uvs` are either empty or exactly as long as `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedGeometry {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    /// Texture coordinates with V already flipped for OBJ
    pub uvs: Vec<[f64; 2]>,
}

impl MergedGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Triangle with 1-based indices into the mesh-wide vertex arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face(pub [usize; 3]);

/// A submesh after index resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Submesh {
    pub material: String,
    pub uses_shared_vertices: bool,
    pub faces: Vec<Face>,
    /// Declaration index, used for group names
    pub index: usize,
}

/// Per-file assembly context
///
/// Holds the mesh-wide vertex arrays (shared block first, then each
/// submesh's local block in declaration order) and the resolved submeshes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAssembly {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    pub submeshes: Vec<Submesh>,
}

impl MeshAssembly {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.faces.len()).sum()
    }

    /// Whether every vertex of the mesh has a normal
    ///
    /// Presence is decided per geometry block, so one block without normals
    /// leaves the arrays misaligned and turns normals off for the whole mesh.
    pub fn normals_available(&self) -> bool {
        !self.normals.is_empty() && self.normals.len() == self.positions.len()
    }

    /// Whether every vertex of the mesh has a texture coordinate
    ///
    /// Same mesh-wide rule as [`Self::normals_available`].
    pub fn uvs_available(&self) -> bool {
        !self.uvs.is_empty() && self.uvs.len() == self.positions.len()
    }
}
