//! Wavefront MTL writer

use std::io::{self, Write};

use crate::mesh::MeshAssembly;

/// Texture slots filled by auto-discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureMap {
    Diffuse,
    Emissive,
    Bump,
    Specular,
}

impl TextureMap {
    /// All slots, in the order they are written
    pub const ALL: [TextureMap; 4] = [
        TextureMap::Diffuse,
        TextureMap::Emissive,
        TextureMap::Bump,
        TextureMap::Specular,
    ];

    /// File name suffix after the mesh name, e.g. `truck_d.tga`
    pub fn suffix(self) -> &'static str {
        match self {
            TextureMap::Diffuse => "_d",
            TextureMap::Emissive => "_e",
            TextureMap::Bump => "_n",
            TextureMap::Specular => "_s",
        }
    }

    pub fn mtl_key(self) -> &'static str {
        match self {
            TextureMap::Diffuse => "map_Kd",
            TextureMap::Emissive => "map_Ke",
            TextureMap::Bump => "map_Bump",
            TextureMap::Specular => "map_Ks",
        }
    }
}

/// Discovered texture paths, relative to the material file's directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureBindings {
    maps: Vec<(TextureMap, String)>,
}

impl TextureBindings {
    /// Bind a slot; an already bound slot keeps its first path
    pub fn bind(&mut self, map: TextureMap, path: impl Into<String>) {
        if self.get(map).is_none() {
            self.maps.push((map, path.into()));
        }
    }

    pub fn get(&self, map: TextureMap) -> Option<&str> {
        self.maps
            .iter()
            .find(|(m, _)| *m == map)
            .map(|(_, p)| p.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// Write a complete MTL file with one material block per submesh
pub fn write_mtl<W: Write>(
    w: &mut W,
    mesh: &MeshAssembly,
    textures: &TextureBindings,
) -> io::Result<()> {
    writeln!(w, "# Material library for Ogre mesh")?;
    writeln!(w)?;

    for submesh in &mesh.submeshes {
        writeln!(w, "newmtl {}", submesh.material)?;
        writeln!(w, "Ka 1.0 1.0 1.0")?;
        writeln!(w, "Kd 0.8 0.8 0.8")?;
        writeln!(w, "Ks 0.5 0.5 0.5")?;
        writeln!(w, "Ns 32.0")?;
        writeln!(w, "d 1.0")?;
        writeln!(w, "illum 2")?;

        for map in TextureMap::ALL {
            if let Some(path) = textures.get(map) {
                writeln!(w, "{} {}", map.mtl_key(), path)?;
            }
        }
        writeln!(w)?;
    }

    Ok(())
}
