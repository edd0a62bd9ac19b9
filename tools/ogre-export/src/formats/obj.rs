//! Wavefront OBJ writer

use std::io::{self, Write};

use crate::mesh::{Face, MeshAssembly};

/// Face reference layout, chosen once for the whole mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceFormat {
    /// `f v/vt/vn ...`
    PositionUvNormal,
    /// `f v/vt ...`
    PositionUv,
    /// `f v//vn ...`
    PositionNormal,
    /// `f v ...`
    Position,
}

impl FaceFormat {
    pub fn select(have_uvs: bool, have_normals: bool) -> Self {
        match (have_uvs, have_normals) {
            (true, true) => FaceFormat::PositionUvNormal,
            (true, false) => FaceFormat::PositionUv,
            (false, true) => FaceFormat::PositionNormal,
            (false, false) => FaceFormat::Position,
        }
    }

    /// Face format for a mesh, from its mesh-wide attribute availability
    pub fn for_mesh(mesh: &MeshAssembly) -> Self {
        Self::select(mesh.uvs_available(), mesh.normals_available())
    }
}

/// Write a complete OBJ file
///
/// Vertex, UV and normal arrays share one index space, so every face
/// reference repeats the vertex index in each slot.
pub fn write_obj<W: Write>(
    w: &mut W,
    mesh: &MeshAssembly,
    base_name: &str,
    mtl_file: Option<&str>,
) -> io::Result<()> {
    writeln!(w, "# Converted from Ogre mesh format")?;
    writeln!(w, "# Vertices: {}", mesh.vertex_count())?;
    writeln!(w, "# Faces: {}", mesh.face_count())?;
    writeln!(w)?;

    if let Some(mtl) = mtl_file {
        writeln!(w, "mtllib {}", mtl)?;
        writeln!(w)?;
    }

    for v in &mesh.positions {
        writeln!(w, "v {:.6} {:.6} {:.6}", v[0], v[1], v[2])?;
    }
    writeln!(w)?;

    for uv in &mesh.uvs {
        writeln!(w, "vt {:.6} {:.6}", uv[0], uv[1])?;
    }
    writeln!(w)?;

    for n in &mesh.normals {
        writeln!(w, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
    }
    writeln!(w)?;

    let format = FaceFormat::for_mesh(mesh);

    for submesh in &mesh.submeshes {
        writeln!(w, "# Submesh - {}", submesh.material)?;
        writeln!(w, "o {}_part{}", base_name, submesh.index)?;
        writeln!(w, "g {}", submesh.material)?;
        if mtl_file.is_some() {
            writeln!(w, "usemtl {}", submesh.material)?;
        }

        for face in &submesh.faces {
            write_face(w, format, face)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

fn write_face<W: Write>(w: &mut W, format: FaceFormat, face: &Face) -> io::Result<()> {
    let [a, b, c] = face.0;
    match format {
        FaceFormat::PositionUvNormal => writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}"),
        FaceFormat::PositionUv => writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}"),
        FaceFormat::PositionNormal => writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}"),
        FaceFormat::Position => writeln!(w, "f {a} {b} {c}"),
    }
}
