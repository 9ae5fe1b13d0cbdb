//! Tangent space reconstruction.
//!
//! Tangents and bitangents are regenerated from triangle position and UV
//! gradients rather than trusted from the source: per-triangle directions are
//! accumulated onto the triangle's vertices, then each vertex's tangent is
//! Gram-Schmidt orthogonalised against its normal.

use glam::Vec3;

use crate::resources::vertex::SkinVertex;

/// Counters from one reconstruction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TangentStats {
    /// Triangles skipped because their UV mapping has (near) zero area.
    pub degenerate_triangles: usize,
    /// Vertices that touched no usable triangle and got the fallback basis.
    pub fallback_vertices: usize,
}

/// Recomputes `tangent` and `bitangent` for every vertex.
///
/// Deterministic: identical input yields bit-identical output.
pub fn reconstruct_tangents(vertices: &mut [SkinVertex], indices: &[u32]) -> TangentStats {
    let mut stats = TangentStats::default();
    let mut tan1 = vec![Vec3::ZERO; vertices.len()];
    let mut tan2 = vec![Vec3::ZERO; vertices.len()];

    // Pass 1: accumulate per-triangle UV-space directions
    for tri in indices.chunks_exact(3) {
        let (i1, i2, i3) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (v1, v2, v3) = (&vertices[i1], &vertices[i2], &vertices[i3]);

        let s1 = v2.uv.x - v1.uv.x;
        let s2 = v3.uv.x - v1.uv.x;
        let t1 = v2.uv.y - v1.uv.y;
        let t2 = v3.uv.y - v1.uv.y;

        let denom = s1 * t2 - s2 * t1;
        if denom.abs() < f32::EPSILON {
            // Zero-area UVs: this triangle says nothing about the tangent direction
            stats.degenerate_triangles += 1;
            continue;
        }
        let r = 1.0 / denom;
        debug_assert!(r.is_finite(), "non-finite UV determinant inverse");

        let e1 = v2.position - v1.position;
        let e2 = v3.position - v1.position;

        let sdir = (e1 * t2 - e2 * t1) * r;
        let tdir = (e2 * s1 - e1 * s2) * r;

        for i in [i1, i2, i3] {
            tan1[i] += sdir;
            tan2[i] += tdir;
            debug_assert!(tan1[i].is_finite() && tan2[i].is_finite(), "non-finite tangent accumulator at vertex {i}");
        }
    }

    // Pass 2: orthonormalise against the normal
    for (i, vertex) in vertices.iter_mut().enumerate() {
        let n = vertex.normal;
        debug_assert!(n.is_finite(), "non-finite normal at vertex {i}");

        let t = tan1[i];
        if t.length_squared() < f32::EPSILON {
            stats.fallback_vertices += 1;
            let tangent = fallback_tangent(n);
            debug_assert!(tangent.is_finite(), "non-finite fallback tangent at vertex {i}");
            vertex.tangent = finite_or_zero(tangent);
            vertex.bitangent = finite_or_zero(n.cross(tangent));
            continue;
        }

        let tangent = (t - n * n.dot(t)).normalize();
        debug_assert!(tangent.is_finite(), "non-finite tangent at vertex {i}");

        let handedness = if n.cross(t).dot(tan2[i]) < 0.0 { -1.0 } else { 1.0 };
        let bitangent = n.cross(tangent) * handedness;
        debug_assert!(bitangent.is_finite(), "non-finite bitangent at vertex {i}");

        vertex.tangent = finite_or_zero(tangent);
        vertex.bitangent = finite_or_zero(bitangent);
    }

    stats
}

/// A tangent perpendicular to `normal` picked without any UV information.
fn fallback_tangent(normal: Vec3) -> Vec3 {
    let mut t = normal.cross(Vec3::X);
    if t.length_squared() < f32::EPSILON {
        t = normal.cross(Vec3::Y);
    }
    t.normalize()
}

/// Replaces NaN / infinite components with zero.
#[inline]
pub(crate) fn finite_or_zero(v: Vec3) -> Vec3 {
    Vec3::new(finite(v.x), finite(v.y), finite(v.z))
}

#[inline]
fn finite(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}
