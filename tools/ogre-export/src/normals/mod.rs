//! Vertex normal recalculation for Ogre mesh XML
//!
//! Recomputes each submesh's vertex normals by averaging the normals of the
//! faces that touch each vertex, then writes them back into the document.
//! Only `<normal>` values change; the rest of the file is copied verbatim.
//!
//! Submeshes are processed in declaration order and each writes the normals
//! of the block it resolves to. Several submeshes on the shared block
//! therefore overwrite each other, and the last one wins.

mod compute;
mod rewrite;

use std::path::Path;

use anyhow::{Context, Result};
use glam::DVec3;
use hashbrown::HashMap;

use crate::document::{Geometry, MeshDocument, SubmeshDecl};
use crate::mesh::{merge_geometry, MergeError};
use crate::tree::parse_document;

pub use compute::{
    face_normal, normalize_or_degenerate, vertex_normals, VertexNormals, DEGENERATE_EPSILON,
    DEGENERATE_NORMAL, UNREFERENCED_NORMAL,
};
pub use rewrite::apply_normal_patches;

/// Why a submesh was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoGeometry,
    NoVertexBuffer,
    NoNormals,
    NoPositions,
    NoFaces,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::NoGeometry => "no geometry found",
            SkipReason::NoVertexBuffer => "no vertex buffer found",
            SkipReason::NoNormals => "no normals in vertex buffer",
            SkipReason::NoPositions => "no positions found",
            SkipReason::NoFaces => "no faces found",
        };
        f.write_str(text)
    }
}

/// Outcome for one submesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmeshOutcome {
    Updated {
        faces: usize,
        normals: usize,
        faces_skipped: usize,
    },
    Skipped(SkipReason),
}

/// Summary of a recalculation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalReport {
    /// One entry per submesh, in declaration order
    pub submeshes: Vec<SubmeshOutcome>,
}

impl NormalReport {
    /// Vertices that received an averaged normal, summed over all submeshes
    pub fn total_updated(&self) -> usize {
        self.submeshes
            .iter()
            .map(|outcome| match outcome {
                SubmeshOutcome::Updated { normals, .. } => *normals,
                SubmeshOutcome::Skipped(_) => 0,
            })
            .sum()
    }
}

/// Recalculate normals in a mesh XML document, returning the rewritten text
pub fn recalculate_normals(xml: &str) -> Result<(String, NormalReport)> {
    let tree = parse_document(xml).context("Failed to parse mesh XML")?;
    let document = MeshDocument::from_tree(&tree)?;

    let mut patches: HashMap<usize, [f64; 3]> = HashMap::new();
    let mut report = NormalReport::default();

    for submesh in &document.submeshes {
        tracing::info!("Processing submesh {}...", submesh.index + 1);
        let outcome = recalculate_submesh(&document, submesh, &mut patches)?;
        match outcome {
            SubmeshOutcome::Updated { faces, normals, .. } => {
                tracing::info!("Updated {} normals from {} faces", normals, faces);
            }
            SubmeshOutcome::Skipped(reason) => {
                tracing::warn!("Submesh {}: {}, skipping", submesh.index + 1, reason);
            }
        }
        report.submeshes.push(outcome);
    }

    let rewritten = apply_normal_patches(xml, &patches).context("Failed to rewrite mesh XML")?;
    Ok((rewritten, report))
}

/// Recalculate normals in a mesh XML file, rewriting it in place
///
/// The file is only written once the complete new document exists, so a
/// failure leaves the original untouched.
pub fn recalculate_normals_file(path: &Path) -> Result<NormalReport> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mesh XML: {:?}", path))?;
    let (rewritten, report) =
        recalculate_normals(&xml).with_context(|| format!("Failed to process {:?}", path))?;
    std::fs::write(path, rewritten)
        .with_context(|| format!("Failed to write mesh XML: {:?}", path))?;

    tracing::info!(
        "Recalculated normals for {} vertices in {:?}",
        report.total_updated(),
        path
    );
    Ok(report)
}

fn recalculate_submesh(
    document: &MeshDocument,
    submesh: &SubmeshDecl,
    patches: &mut HashMap<usize, [f64; 3]>,
) -> Result<SubmeshOutcome, MergeError> {
    let resolved: Option<&Geometry> = if submesh.uses_shared_vertices {
        document.shared_geometry.as_ref()
    } else {
        submesh.geometry.as_ref()
    };
    let Some(geometry) = resolved else {
        return Ok(SubmeshOutcome::Skipped(SkipReason::NoGeometry));
    };
    if geometry.buffers.is_empty() {
        return Ok(SubmeshOutcome::Skipped(SkipReason::NoVertexBuffer));
    }

    // Positions and normals may live in different fragments of the block
    let Some(target) = geometry.buffers.iter().find(|buffer| buffer.normals) else {
        return Ok(SubmeshOutcome::Skipped(SkipReason::NoNormals));
    };

    let positions: Vec<DVec3> = merge_geometry(geometry)?
        .positions
        .into_iter()
        .map(DVec3::from_array)
        .collect();
    if positions.is_empty() {
        return Ok(SubmeshOutcome::Skipped(SkipReason::NoPositions));
    }

    let Some(faces) = submesh.faces.as_deref() else {
        return Ok(SubmeshOutcome::Skipped(SkipReason::NoFaces));
    };
    let result = vertex_normals(&positions, faces);

    for (vertex, normal) in target.vertices.iter().zip(&result.normals) {
        patches.insert(vertex.ordinal, normal.to_array());
    }

    Ok(SubmeshOutcome::Updated {
        faces: result.faces_used,
        normals: result.updated,
        faces_skipped: result.faces_skipped,
    })
}
