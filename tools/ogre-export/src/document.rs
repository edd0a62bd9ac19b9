//! Typed view of an Ogre mesh XML tree
//!
//! Extracts only the fields the merge, assembly and normal passes need:
//! geometry blocks with their vertex buffers, and submeshes with their
//! faces. Everything else in the tree is ignored.

use std::str::FromStr;

use thiserror::Error;

use crate::tree::Element;

/// A numeric attribute that is present but cannot be parsed
#[derive(Error, Debug)]
#[error("Invalid {attribute}=\"{value}\" on <{element}> (element #{ordinal})")]
pub struct DocumentError {
    pub element: String,
    pub attribute: String,
    pub value: String,
    pub ordinal: usize,
}

/// Per-vertex attribute record inside a vertex buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexRecord {
    pub ordinal: usize,
    pub position: Option<[f64; 3]>,
    pub normal: Option<[f64; 3]>,
    /// First texture coordinate set, as stored in the source (V not flipped)
    pub texcoord: Option<[f64; 2]>,
}

/// One `<vertexbuffer>` fragment of a geometry block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffer {
    pub ordinal: usize,
    pub positions: bool,
    pub normals: bool,
    pub texture_coords: u32,
    pub vertices: Vec<VertexRecord>,
}

impl VertexBuffer {
    pub fn has_texcoords(&self) -> bool {
        self.texture_coords > 0
    }
}

/// A `<sharedgeometry>` or submesh `<geometry>` block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub ordinal: usize,
    /// Explicit `vertexcount`, if the element carries one
    pub vertex_count: Option<usize>,
    pub buffers: Vec<VertexBuffer>,
}

/// One triangle as declared in the source, 0-based and block-local
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRecord {
    pub ordinal: usize,
    /// `None` when any of v1/v2/v3 is missing or not a non-negative integer
    pub indices: Option<[usize; 3]>,
}

/// A `<submesh>` declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmeshDecl {
    /// Position among the mesh's submeshes
    pub index: usize,
    pub material: Option<String>,
    pub uses_shared_vertices: bool,
    pub geometry: Option<Geometry>,
    /// `None` when the submesh has no `<faces>` element at all
    pub faces: Option<Vec<FaceRecord>>,
}

/// Everything the mesh tooling reads from one mesh XML file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDocument {
    pub shared_geometry: Option<Geometry>,
    pub submeshes: Vec<SubmeshDecl>,
}

impl MeshDocument {
    /// Extract the mesh description from a parsed tree
    pub fn from_tree(root: &Element) -> Result<Self, DocumentError> {
        if root.name != "mesh" {
            tracing::warn!("Root element is <{}>, expected <mesh>", root.name);
        }

        let shared_geometry = root
            .child("sharedgeometry")
            .or_else(|| root.child("sharedvertexdata"))
            .map(parse_geometry)
            .transpose()?;

        let submeshes = match root.child("submeshes") {
            Some(list) => list
                .children_named("submesh")
                .enumerate()
                .map(|(index, submesh)| parse_submesh(submesh, index))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            shared_geometry,
            submeshes,
        })
    }
}

fn parse_submesh(element: &Element, index: usize) -> Result<SubmeshDecl, DocumentError> {
    let geometry = element.child("geometry").map(parse_geometry).transpose()?;

    let faces = element.child("faces").map(|faces| {
        faces
            .children_named("face")
            .map(|face| FaceRecord {
                ordinal: face.ordinal,
                indices: face_indices(face),
            })
            .collect()
    });

    Ok(SubmeshDecl {
        index,
        material: element.attr("material").map(str::to_owned),
        uses_shared_vertices: flag(element, "usesharedvertices"),
        geometry,
        faces,
    })
}

fn parse_geometry(element: &Element) -> Result<Geometry, DocumentError> {
    let buffers = element
        .children_named("vertexbuffer")
        .map(parse_vertex_buffer)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Geometry {
        ordinal: element.ordinal,
        vertex_count: number(element, "vertexcount")?,
        buffers,
    })
}

fn parse_vertex_buffer(element: &Element) -> Result<VertexBuffer, DocumentError> {
    let texture_coords = match element.attr("texture_coords").map(str::trim) {
        None | Some("") => 0,
        Some(_) => number(element, "texture_coords")?.unwrap_or(0),
    };

    let vertices = element
        .children_named("vertex")
        .map(parse_vertex)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VertexBuffer {
        ordinal: element.ordinal,
        positions: flag(element, "positions"),
        normals: flag(element, "normals"),
        texture_coords,
        vertices,
    })
}

fn parse_vertex(element: &Element) -> Result<VertexRecord, DocumentError> {
    let position = element.child("position").map(vec3).transpose()?;
    let normal = element.child("normal").map(vec3).transpose()?;

    // Some exporters number the set: texcoord0, texcoord1, ...
    let texcoord = element
        .child("texcoord")
        .or_else(|| element.children.iter().find(|c| c.name.starts_with("texcoord")))
        .map(|tc| Ok::<_, DocumentError>([coord(tc, "u")?, coord(tc, "v")?]))
        .transpose()?;

    Ok(VertexRecord {
        ordinal: element.ordinal,
        position,
        normal,
        texcoord,
    })
}

fn vec3(element: &Element) -> Result<[f64; 3], DocumentError> {
    Ok([
        coord(element, "x")?,
        coord(element, "y")?,
        coord(element, "z")?,
    ])
}

/// Coordinate component; a missing attribute reads as 0
fn coord(element: &Element, key: &str) -> Result<f64, DocumentError> {
    Ok(number(element, key)?.unwrap_or(0.0))
}

fn number<T: FromStr>(element: &Element, key: &str) -> Result<Option<T>, DocumentError> {
    match element.attr(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| DocumentError {
            element: element.name.clone(),
            attribute: key.to_owned(),
            value: raw.to_owned(),
            ordinal: element.ordinal,
        }),
    }
}

fn flag(element: &Element, key: &str) -> bool {
    element
        .attr(key)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn face_indices(face: &Element) -> Option<[usize; 3]> {
    let index = |key: &str| face.attr(key)?.trim().parse::<usize>().ok();
    Some([index("v1")?, index("v2")?, index("v3")?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    fn document(xml: &str) -> MeshDocument {
        MeshDocument::from_tree(&parse_document(xml).unwrap()).unwrap()
    }

    #[test]
    fn test_flags_are_case_insensitive() {
        let doc = document(
            r#"<mesh><sharedgeometry><vertexbuffer positions="True" normals="FALSE" texture_coords="2"/></sharedgeometry></mesh>"#,
        );
        let buffer = &doc.shared_geometry.unwrap().buffers[0];
        assert!(buffer.positions);
        assert!(!buffer.normals);
        assert_eq!(buffer.texture_coords, 2);
        assert!(buffer.has_texcoords());
    }

    #[test]
    fn test_empty_texture_coords_reads_as_zero() {
        let doc = document(
            r#"<mesh><sharedgeometry><vertexbuffer texture_coords=""/></sharedgeometry></mesh>"#,
        );
        assert_eq!(doc.shared_geometry.unwrap().buffers[0].texture_coords, 0);
    }

    #[test]
    fn test_numbered_texcoord_is_used_as_fallback() {
        let doc = document(
            r#"<mesh><sharedgeometry><vertexbuffer texture_coords="1">
                <vertex><texcoord0 u="0.25" v="0.75"/></vertex>
            </vertexbuffer></sharedgeometry></mesh>"#,
        );
        let vertex = &doc.shared_geometry.unwrap().buffers[0].vertices[0];
        assert_eq!(vertex.texcoord, Some([0.25, 0.75]));
    }

    #[test]
    fn test_missing_components_default_to_zero() {
        let doc = document(
            r#"<mesh><sharedgeometry><vertexbuffer positions="true">
                <vertex><position x="1.5"/></vertex>
            </vertexbuffer></sharedgeometry></mesh>"#,
        );
        let vertex = &doc.shared_geometry.unwrap().buffers[0].vertices[0];
        assert_eq!(vertex.position, Some([1.5, 0.0, 0.0]));
        assert_eq!(vertex.normal, None);
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let tree = parse_document(
            r#"<mesh><sharedgeometry vertexcount="lots"/></mesh>"#,
        )
        .unwrap();
        let err = MeshDocument::from_tree(&tree).unwrap_err();
        assert_eq!(err.attribute, "vertexcount");
        assert_eq!(err.value, "lots");
        assert!(err.to_string().contains("sharedgeometry"));
    }

    #[test]
    fn test_submesh_fields() {
        let doc = document(
            r#"<mesh><submeshes>
                <submesh material="Rock" usesharedvertices="true">
                    <faces><face v1="0" v2="1" v3="2"/><face v1="0" v2="-1" v3="2"/><face v1="3"/></faces>
                </submesh>
                <submesh/>
            </submeshes></mesh>"#,
        );
        assert_eq!(doc.submeshes.len(), 2);

        let first = &doc.submeshes[0];
        assert_eq!(first.index, 0);
        assert_eq!(first.material.as_deref(), Some("Rock"));
        assert!(first.uses_shared_vertices);
        let faces = first.faces.as_ref().unwrap();
        assert_eq!(faces[0].indices, Some([0, 1, 2]));
        assert_eq!(faces[1].indices, None);
        assert_eq!(faces[2].indices, None);

        let second = &doc.submeshes[1];
        assert_eq!(second.index, 1);
        assert_eq!(second.material, None);
        assert!(!second.uses_shared_vertices);
        assert!(second.faces.is_none());
        assert!(second.geometry.is_none());
    }

    #[test]
    fn test_sharedvertexdata_is_accepted() {
        let doc = document(r#"<mesh><sharedvertexdata vertexcount="4"/></mesh>"#);
        assert_eq!(doc.shared_geometry.unwrap().vertex_count, Some(4));
    }
}
