//! Submesh assembly
//!
//! Builds the mesh-wide vertex arrays and resolves each submesh's faces to
//! 1-based indices into them. The shared block is appended before any
//! submesh is processed, so shared submeshes always use offset 0; a local
//! block's offset is the vertex count before that block is appended.

use super::merge::{merge_geometry, MergeError};
use super::types::{Face, MergedGeometry, MeshAssembly, Submesh};
use crate::document::{MeshDocument, SubmeshDecl};

impl MeshAssembly {
    /// Merge and assemble every geometry block and submesh of a document
    pub fn from_document(document: &MeshDocument) -> Result<Self, MergeError> {
        let mut assembly = Self::default();

        let shared_count = match &document.shared_geometry {
            Some(geometry) => assembly.append(merge_geometry(geometry)?),
            None => 0,
        };

        for decl in &document.submeshes {
            assembly.assemble_submesh(decl, shared_count)?;
        }

        Ok(assembly)
    }

    /// Append a merged block to the mesh-wide arrays, returning its vertex count
    fn append(&mut self, merged: MergedGeometry) -> usize {
        let count = merged.vertex_count();
        self.positions.extend(merged.positions);
        self.normals.extend(merged.normals);
        self.uvs.extend(merged.uvs);
        count
    }

    fn assemble_submesh(
        &mut self,
        decl: &SubmeshDecl,
        shared_count: usize,
    ) -> Result<(), MergeError> {
        let material = decl
            .material
            .clone()
            .unwrap_or_else(|| format!("material_{}", decl.index));

        let (offset, block_len) = if decl.uses_shared_vertices {
            if shared_count == 0 {
                tracing::warn!(
                    "Submesh {} uses shared vertices but the mesh has no shared geometry",
                    decl.index
                );
            }
            (0, shared_count)
        } else {
            let offset = self.positions.len();
            let block_len = match &decl.geometry {
                Some(geometry) => self.append(merge_geometry(geometry)?),
                None => {
                    tracing::warn!("Submesh {} has no geometry", decl.index);
                    0
                }
            };
            (offset, block_len)
        };

        let mut faces = Vec::new();
        for (n, face) in decl.faces.iter().flatten().enumerate() {
            let Some(indices) = face.indices else {
                tracing::warn!("Submesh {}: face {} has invalid indices, skipping", decl.index, n);
                continue;
            };
            if indices.iter().any(|&i| i >= block_len) {
                tracing::warn!(
                    "Submesh {}: face {} indices {:?} out of range (block has {} vertices), skipping",
                    decl.index,
                    n,
                    indices,
                    block_len
                );
                continue;
            }
            faces.push(Face(indices.map(|i| i + offset + 1)));
        }

        tracing::debug!(
            "Assembled submesh {} ({}): {} faces, offset {}",
            decl.index,
            material,
            faces.len(),
            offset
        );

        self.submeshes.push(Submesh {
            material,
            uses_shared_vertices: decl.uses_shared_vertices,
            faces,
            index: decl.index,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MeshDocument;
    use crate::tree::parse_document;

    fn assemble(xml: &str) -> MeshAssembly {
        let doc = MeshDocument::from_tree(&parse_document(xml).unwrap()).unwrap();
        MeshAssembly::from_document(&doc).unwrap()
    }

    /// Geometry block with `count` vertices, optionally carrying normals
    fn geometry(tag: &str, count: usize, normals: bool) -> String {
        let mut xml = format!(
            r#"<{tag} vertexcount="{count}"><vertexbuffer positions="true" normals="{normals}">"#
        );
        for i in 0..count {
            xml.push_str(&format!(r#"<vertex><position x="{i}" y="0" z="0"/>"#));
            if normals {
                xml.push_str(r#"<normal x="0" y="0" z="1"/>"#);
            }
            xml.push_str("</vertex>");
        }
        xml.push_str(&format!("</vertexbuffer></{tag}>"));
        xml
    }

    #[test]
    fn test_local_offsets_follow_shared_block() {
        let xml = format!(
            r#"<mesh>{}<submeshes>
                <submesh material="a">{}<faces><face v1="0" v2="1" v3="2"/></faces></submesh>
                <submesh material="b">{}<faces><face v1="0" v2="1" v3="3"/></faces></submesh>
            </submeshes></mesh>"#,
            geometry("sharedgeometry", 4, false),
            geometry("geometry", 3, false),
            geometry("geometry", 5, false),
        );
        let mesh = assemble(&xml);

        assert_eq!(mesh.vertex_count(), 12);
        // Offset 4 for the first local block, 4 + 3 for the second
        assert_eq!(mesh.submeshes[0].faces, vec![Face([5, 6, 7])]);
        assert_eq!(mesh.submeshes[1].faces, vec![Face([8, 9, 11])]);
    }

    #[test]
    fn test_shared_submesh_uses_offset_zero() {
        let xml = format!(
            r#"<mesh>{}<submeshes>
                <submesh>{}<faces><face v1="0" v2="1" v3="2"/></faces></submesh>
                <submesh usesharedvertices="true"><faces><face v1="2" v2="1" v3="0"/></faces></submesh>
            </submeshes></mesh>"#,
            geometry("sharedgeometry", 3, true),
            geometry("geometry", 3, true),
        );
        let mesh = assemble(&xml);

        assert_eq!(mesh.submeshes[0].faces, vec![Face([4, 5, 6])]);
        assert_eq!(mesh.submeshes[1].faces, vec![Face([3, 2, 1])]);
        assert!(mesh.submeshes[1].uses_shared_vertices);
    }

    #[test]
    fn test_default_material_name() {
        let mesh = assemble(r#"<mesh><submeshes><submesh/><submesh material="m"/></submeshes></mesh>"#);
        assert_eq!(mesh.submeshes[0].material, "material_0");
        assert_eq!(mesh.submeshes[1].material, "m");
        assert_eq!(mesh.submeshes[1].index, 1);
    }

    #[test]
    fn test_invalid_and_out_of_range_faces_are_skipped() {
        let xml = format!(
            r#"<mesh><submeshes><submesh>{}<faces>
                <face v1="0" v2="1" v3="2"/>
                <face v1="0" v2="1" v3="3"/>
                <face v1="x" v2="1" v3="2"/>
                <face v1="2" v2="1" v3="0"/>
            </faces></submesh></submeshes></mesh>"#,
            geometry("geometry", 3, false),
        );
        let mesh = assemble(&xml);

        assert_eq!(mesh.submeshes[0].faces, vec![Face([1, 2, 3]), Face([3, 2, 1])]);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_submesh_without_geometry_keeps_material() {
        let mesh = assemble(
            r#"<mesh><submeshes><submesh material="ghost"><faces><face v1="0" v2="0" v3="0"/></faces></submesh></submeshes></mesh>"#,
        );
        assert_eq!(mesh.submeshes.len(), 1);
        assert_eq!(mesh.submeshes[0].material, "ghost");
        assert!(mesh.submeshes[0].faces.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    /// One block without normals disables normals for the whole mesh,
    /// even though the other blocks supplied them.
    #[test]
    fn test_block_without_normals_disables_normals_mesh_wide() {
        let xml = format!(
            r#"<mesh><submeshes>
                <submesh>{}</submesh>
                <submesh>{}</submesh>
            </submeshes></mesh>"#,
            geometry("geometry", 3, true),
            geometry("geometry", 2, false),
        );
        let mesh = assemble(&xml);

        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.normals.len(), 3);
        assert!(!mesh.normals_available());
        assert!(!mesh.uvs_available());
    }

    #[test]
    fn test_normals_available_when_every_block_has_them() {
        let xml = format!(
            r#"<mesh>{}<submeshes><submesh>{}</submesh></submeshes></mesh>"#,
            geometry("sharedgeometry", 2, true),
            geometry("geometry", 2, true),
        );
        let mesh = assemble(&xml);
        assert!(mesh.normals_available());
    }

    #[test]
    fn test_oversized_local_block_fails_the_mesh() {
        let xml = r#"<mesh><submeshes>
            <submesh><geometry vertexcount="18446744073709551615"/></submesh>
        </submeshes></mesh>"#;
        let doc = MeshDocument::from_tree(&parse_document(xml).unwrap()).unwrap();
        assert!(MeshAssembly::from_document(&doc).is_err());
    }
}
