//! Vertex buffer merging
//!
//! A geometry block may split its vertices across several `<vertexbuffer>`
//! fragments (e.g. positions + normals in one, texture coordinates in
//! another). Fragments are applied in declaration order. Each fragment only
//! writes the attributes it declares, and for those it overwrites whatever an
//! earlier fragment wrote for the same vertex index.

use std::collections::TryReserveError;

use thiserror::Error;

use super::types::MergedGeometry;
use crate::document::Geometry;

/// Normal given to vertices no fragment supplied one for
pub const DEFAULT_NORMAL: [f64; 3] = [0.0, 1.0, 0.0];

/// Texture coordinate given to vertices no fragment supplied one for
pub const DEFAULT_UV: [f64; 2] = [0.0, 0.0];

/// Largest vertex count a geometry block may declare (32-bit vertex indices)
pub const MAX_VERTEX_COUNT: usize = u32::MAX as usize;

/// A geometry block whose declared size cannot be honoured
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Geometry block #{ordinal} declares {count} vertices (limit {})", MAX_VERTEX_COUNT)]
    TooManyVertices { ordinal: usize, count: usize },

    #[error("Geometry block #{ordinal}: cannot allocate {count} vertices: {source}")]
    Allocation {
        ordinal: usize,
        count: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Convert a source V coordinate to OBJ convention
pub fn flip_v(v: f64) -> f64 {
    1.0 - v
}

/// Merge all vertex buffers of a geometry block
///
/// The vertex count is the explicit `vertexcount`, else the number of
/// records in the first buffer. A block with neither contributes nothing.
/// Records beyond the vertex count are ignored.
pub fn merge_geometry(geometry: &Geometry) -> Result<MergedGeometry, MergeError> {
    let vertex_count = match geometry
        .vertex_count
        .or_else(|| geometry.buffers.first().map(|b| b.vertices.len()))
    {
        Some(count) => count,
        None => {
            tracing::warn!(
                "Geometry block #{} has no vertex count and no vertex buffers, skipping",
                geometry.ordinal
            );
            return Ok(MergedGeometry::default());
        }
    };
    if vertex_count > MAX_VERTEX_COUNT {
        return Err(MergeError::TooManyVertices {
            ordinal: geometry.ordinal,
            count: vertex_count,
        });
    }

    // Unset slots keep their default, so a later fragment simply overwrites
    let mut positions = filled(vertex_count, [0.0; 3], geometry.ordinal)?;
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut any_normals = false;
    let mut any_uvs = false;

    for buffer in &geometry.buffers {
        let has_texcoords = buffer.has_texcoords();

        for (i, vertex) in buffer.vertices.iter().take(vertex_count).enumerate() {
            if buffer.positions {
                if let Some(p) = vertex.position {
                    positions[i] = p;
                }
            }

            if buffer.normals {
                if let Some(n) = vertex.normal {
                    if !any_normals {
                        normals = filled(vertex_count, DEFAULT_NORMAL, geometry.ordinal)?;
                        any_normals = true;
                    }
                    normals[i] = n;
                }
            }

            if has_texcoords {
                if let Some([u, v]) = vertex.texcoord {
                    if !any_uvs {
                        uvs = filled(vertex_count, DEFAULT_UV, geometry.ordinal)?;
                        any_uvs = true;
                    }
                    uvs[i] = [u, flip_v(v)];
                }
            }
        }
    }

    tracing::debug!(
        "Merged geometry block #{}: {} vertices, {} buffers, normals={}, uvs={}",
        geometry.ordinal,
        vertex_count,
        geometry.buffers.len(),
        any_normals,
        any_uvs
    );

    Ok(MergedGeometry {
        positions,
        normals,
        uvs,
    })
}

/// `count` copies of `value`, failing instead of aborting when memory runs out
fn filled<T: Copy>(count: usize, value: T, ordinal: usize) -> Result<Vec<T>, MergeError> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(count)
        .map_err(|source| MergeError::Allocation {
            ordinal,
            count,
            source,
        })?;
    values.resize(count, value);
    Ok(values)
}
