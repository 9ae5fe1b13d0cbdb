//! Geometry clean-up passes selected by [`QualityPreset`].
//!
//! All passes preserve the rendered result: they only merge bit-identical
//! vertices or remove data no visible triangle depends on.

use rustc_hash::FxHashMap;

use crate::assets::options::QualityPreset;
use crate::resources::mesh::SkinMesh;
use crate::resources::vertex::SkinVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptimizeStats {
    pub vertices_joined: usize,
    pub triangles_dropped: usize,
    pub vertices_removed: usize,
}

/// Runs the passes `preset` enables on `mesh`.
pub fn optimize_mesh(mesh: &mut SkinMesh, preset: QualityPreset) -> OptimizeStats {
    let mut stats = OptimizeStats::default();

    if preset.joins_identical_vertices() {
        stats.vertices_joined = join_identical_vertices(&mut mesh.vertices, &mut mesh.indices);
    }
    if preset.drops_degenerate_triangles() {
        stats.triangles_dropped = drop_degenerate_triangles(&mesh.vertices, &mut mesh.indices);
    }
    if preset.removes_unreferenced_vertices() {
        stats.vertices_removed = remove_unreferenced_vertices(&mut mesh.vertices, &mut mesh.indices);
    }

    if stats != OptimizeStats::default() {
        log::debug!("mesh '{}' optimised ({preset:?}): {stats:?}", mesh.name);
    }
    stats
}

/// Merges vertices whose every attribute is bit-identical. Returns the number
/// of vertices removed.
pub fn join_identical_vertices(vertices: &mut Vec<SkinVertex>, indices: &mut [u32]) -> usize {
    let mut unique: Vec<SkinVertex> = Vec::with_capacity(vertices.len());
    let mut remap = Vec::with_capacity(vertices.len());
    {
        let mut seen: FxHashMap<&[u8], u32> = FxHashMap::default();
        for vertex in vertices.iter() {
            let next = unique.len() as u32;
            let index = *seen.entry(bytemuck::bytes_of(vertex)).or_insert_with(|| {
                unique.push(*vertex);
                next
            });
            remap.push(index);
        }
    }

    let joined = vertices.len() - unique.len();
    if joined > 0 {
        for index in indices.iter_mut() {
            *index = remap[*index as usize];
        }
        *vertices = unique;
    }
    joined
}

/// Removes triangles with two coincident corners (by index or by position).
/// Returns the number of triangles removed.
pub fn drop_degenerate_triangles(vertices: &[SkinVertex], indices: &mut Vec<u32>) -> usize {
    let before = indices.len() / 3;
    let kept: Vec<u32> = indices
        .chunks_exact(3)
        .filter(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]];
            if a == b || b == c || a == c {
                return false;
            }
            let (pa, pb, pc) = (
                vertices[a as usize].position,
                vertices[b as usize].position,
                vertices[c as usize].position,
            );
            pa != pb && pb != pc && pa != pc
        })
        .flatten()
        .copied()
        .collect();

    *indices = kept;
    before - indices.len() / 3
}

/// Drops vertices no triangle references and compacts the index list.
/// Returns the number of vertices removed.
pub fn remove_unreferenced_vertices(vertices: &mut Vec<SkinVertex>, indices: &mut [u32]) -> usize {
    let mut used = vec![false; vertices.len()];
    for &index in indices.iter() {
        used[index as usize] = true;
    }

    let mut remap = vec![u32::MAX; vertices.len()];
    let mut compacted = Vec::with_capacity(vertices.len());
    for (old, vertex) in vertices.iter().enumerate() {
        if used[old] {
            remap[old] = compacted.len() as u32;
            compacted.push(*vertex);
        }
    }

    let removed = vertices.len() - compacted.len();
    if removed > 0 {
        for index in indices.iter_mut() {
            *index = remap[*index as usize];
        }
        *vertices = compacted;
    }
    removed
}
