//! Face and vertex normal math

use glam::DVec3;

use crate::document::FaceRecord;

/// Lengths at or below this are treated as zero
pub const DEGENERATE_EPSILON: f64 = 1e-6;

/// Normal used when a vector is too short to normalize
pub const DEGENERATE_NORMAL: DVec3 = DVec3::Z;

/// Normal for vertices no face references
pub const UNREFERENCED_NORMAL: DVec3 = DVec3::Y;

/// Normalize, falling back to +Z for (near) zero-length vectors
pub fn normalize_or_degenerate(v: DVec3) -> DVec3 {
    let length = v.length();
    if length > DEGENERATE_EPSILON {
        v / length
    } else {
        DEGENERATE_NORMAL
    }
}

/// Unit normal of triangle (p1, p2, p3), counter-clockwise winding
pub fn face_normal(p1: DVec3, p2: DVec3, p3: DVec3) -> DVec3 {
    let edge1 = p2 - p1;
    let edge2 = p3 - p1;
    normalize_or_degenerate(edge1.cross(edge2))
}

/// Result of averaging face normals onto vertices
#[derive(Debug, Clone, PartialEq)]
pub struct VertexNormals {
    /// One normal per input position
    pub normals: Vec<DVec3>,
    /// Vertices that received an averaged normal (referenced by a face)
    pub updated: usize,
    /// Faces whose normal was accumulated
    pub faces_used: usize,
    /// Faces skipped for invalid or out-of-range indices
    pub faces_skipped: usize,
}

/// Average adjoining face normals onto each vertex
///
/// Every face contributes its unit normal equally (no area or angle
/// weighting). Unreferenced vertices get +Y and are not counted as updated.
pub fn vertex_normals(positions: &[DVec3], faces: &[FaceRecord]) -> VertexNormals {
    let vertex_count = positions.len();
    let mut sums = vec![DVec3::ZERO; vertex_count];
    let mut counts = vec![0u32; vertex_count];
    let mut faces_used = 0;
    let mut faces_skipped = 0;

    for (n, face) in faces.iter().enumerate() {
        let indices = match face.indices {
            Some(indices) if indices.iter().all(|&i| i < vertex_count) => indices,
            Some(indices) => {
                tracing::warn!(
                    "Face {} indices {:?} out of range ({} vertices), skipping",
                    n,
                    indices,
                    vertex_count
                );
                faces_skipped += 1;
                continue;
            }
            None => {
                tracing::warn!("Face {} has invalid indices, skipping", n);
                faces_skipped += 1;
                continue;
            }
        };

        let [a, b, c] = indices;
        let normal = face_normal(positions[a], positions[b], positions[c]);
        for i in indices {
            sums[i] += normal;
            counts[i] += 1;
        }
        faces_used += 1;
    }

    let mut updated = 0;
    let normals = sums
        .into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count > 0 {
                updated += 1;
                normalize_or_degenerate(sum / count as f64)
            } else {
                UNREFERENCED_NORMAL
            }
        })
        .collect();

    VertexNormals {
        normals,
        updated,
        faces_used,
        faces_skipped,
    }
}
