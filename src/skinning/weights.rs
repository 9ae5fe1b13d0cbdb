//! Per-vertex bone influence assignment.
//!
//! Import sources list weights per bone (`bone -> [(vertex, weight)]`); the
//! skinning shader wants them per vertex in a fixed number of slots. This
//! module performs that restructuring.
//!
//! # Truncation policy
//!
//! Influences are recorded in the order bones are visited, and only the
//! first [`MAX_BONE_INFLUENCES`] recorded for a vertex are kept. Further
//! influences are dropped as-is: they are not re-ranked by weight and the
//! kept weights are not renormalised.

use glam::{UVec4, Vec4};
use smallvec::SmallVec;

use crate::errors::{Result, SkinError};
use crate::resources::vertex::{MAX_BONE_INFLUENCES, SkinVertex};

/// One bone's influence on one vertex, as provided by the import source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

impl VertexWeight {
    #[must_use]
    pub const fn new(vertex_id: u32, weight: f32) -> Self {
        Self { vertex_id, weight }
    }
}

/// The blend index / blend weight pair written into a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendSlots {
    pub indices: UVec4,
    pub weights: Vec4,
}

impl BlendSlots {
    /// Slot 0 bound to the identity bone with full weight.
    pub const IDENTITY_BONE: Self = Self {
        indices: UVec4::ZERO,
        weights: Vec4::new(1.0, 0.0, 0.0, 0.0),
    };
}

/// Summary of one assignment run, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeightStats {
    /// Vertices that received the identity-bone fallback.
    pub unweighted_vertices: usize,
    /// Vertices that had influences beyond the slot budget.
    pub truncated_vertices: usize,
    /// Total influences dropped by truncation.
    pub dropped_influences: usize,
}

/// Builds per-vertex blend slots from per-bone weight lists.
///
/// The `i`-th item of `bones` belongs to source bone `i`, which sits at flat
/// index `i + 1` in the mesh's bone list (index 0 is the identity bone).
/// At most `max_influences` (clamped to [`MAX_BONE_INFLUENCES`]) slots are
/// filled per vertex. Any vertex with no recorded influence is bound to the
/// identity bone with weight 1.0.
///
/// # Errors
/// [`SkinError::InvalidSource`] if a weight references a vertex id outside
/// `0..vertex_count`.
pub fn assign_weights<'a, I>(
    vertex_count: usize,
    bones: I,
    max_influences: usize,
) -> Result<(Vec<BlendSlots>, WeightStats)>
where
    I: IntoIterator<Item = &'a [VertexWeight]>,
{
    let cap = max_influences.clamp(1, MAX_BONE_INFLUENCES);

    // Per vertex: the first `cap` influences in discovery order, plus the total seen
    let mut recorded: Vec<SmallVec<[(u32, f32); MAX_BONE_INFLUENCES]>> = vec![SmallVec::new(); vertex_count];
    let mut seen = vec![0usize; vertex_count];

    for (source_index, weights) in bones.into_iter().enumerate() {
        let flat_bone = (source_index + 1) as u32;

        for w in weights {
            let vertex = w.vertex_id as usize;
            if vertex >= vertex_count {
                return Err(SkinError::InvalidSource(format!(
                    "bone {source_index} weights vertex {vertex}, mesh has {vertex_count} vertices"
                )));
            }

            seen[vertex] += 1;
            if recorded[vertex].len() < cap {
                recorded[vertex].push((flat_bone, w.weight));
            }
        }
    }

    let mut stats = WeightStats::default();
    let slots = recorded
        .iter()
        .zip(&seen)
        .map(|(influences, &count)| {
            if influences.is_empty() {
                stats.unweighted_vertices += 1;
                return BlendSlots::IDENTITY_BONE;
            }
            if count > cap {
                stats.truncated_vertices += 1;
                stats.dropped_influences += count - cap;
            }

            let mut indices = [0u32; MAX_BONE_INFLUENCES];
            let mut weights = [0.0f32; MAX_BONE_INFLUENCES];
            for (slot, &(bone, weight)) in influences.iter().enumerate() {
                indices[slot] = bone;
                weights[slot] = weight;
            }
            BlendSlots {
                indices: UVec4::from_array(indices),
                weights: Vec4::from_array(weights),
            }
        })
        .collect();

    Ok((slots, stats))
}

/// Writes blend slots into the matching vertices.
pub fn apply_blend_slots(vertices: &mut [SkinVertex], slots: &[BlendSlots]) {
    debug_assert_eq!(vertices.len(), slots.len(), "blend slot count must match vertex count");
    for (vertex, slot) in vertices.iter_mut().zip(slots) {
        vertex.blend_indices = slot.indices;
        vertex.blend_weights = slot.weights;
    }
}
