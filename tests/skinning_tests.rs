//! Skinning data tests
//!
//! Tests for:
//! - Weight assignment: slot budget, discovery order, identity fallback
//! - Tangent reconstruction on a textured cube, degenerate UV fallback
//! - Winding reversal
//! - Palette double buffer

use std::sync::Arc;

use glam::{Mat4, UVec4, Vec2, Vec3, Vec4};
use myth_skin::SkinError;
use myth_skin::resources::{SkinMesh, SkinVertex};
use myth_skin::skinning::{
    BlendSlots, PaletteExchange, SkinPalette, VertexWeight, apply_blend_slots, assign_weights, reconstruct_tangents,
};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Weights
// ============================================================================

#[test]
fn weights_keep_first_four_in_discovery_order() {
    // Six bones all influencing vertex 0; the heaviest comes last
    let bones: Vec<Vec<VertexWeight>> = [0.05, 0.1, 0.15, 0.2, 0.25, 0.9]
        .iter()
        .map(|&w| vec![VertexWeight::new(0, w)])
        .collect();

    let (slots, stats) = assign_weights(1, bones.iter().map(Vec::as_slice), 4).unwrap();

    assert_eq!(slots[0].indices, UVec4::new(1, 2, 3, 4));
    assert_eq!(slots[0].weights, Vec4::new(0.05, 0.1, 0.15, 0.2));
    assert_eq!(stats.truncated_vertices, 1);
    assert_eq!(stats.dropped_influences, 2);
}

#[test]
fn weights_fill_unused_slots_with_bone_zero() {
    let bones = [vec![VertexWeight::new(0, 0.7)], vec![VertexWeight::new(0, 0.3)]];
    let (slots, _) = assign_weights(1, bones.iter().map(Vec::as_slice), 4).unwrap();

    assert_eq!(slots[0].indices, UVec4::new(1, 2, 0, 0));
    assert_eq!(slots[0].weights, Vec4::new(0.7, 0.3, 0.0, 0.0));
}

#[test]
fn weights_without_bones_bind_identity() {
    let (slots, stats) = assign_weights(3, std::iter::empty::<&[VertexWeight]>(), 4).unwrap();

    assert_eq!(stats.unweighted_vertices, 3);
    for slot in slots {
        assert_eq!(slot, BlendSlots::IDENTITY_BONE);
        assert_eq!(slot.indices, UVec4::ZERO);
        assert_eq!(slot.weights, Vec4::new(1.0, 0.0, 0.0, 0.0));
    }
}

#[test]
fn weights_untouched_vertex_of_skinned_mesh_binds_identity() {
    let bones = [vec![VertexWeight::new(1, 1.0)]];
    let (slots, stats) = assign_weights(2, bones.iter().map(Vec::as_slice), 4).unwrap();

    assert_eq!(slots[0], BlendSlots::IDENTITY_BONE);
    assert_eq!(slots[1].indices.x, 1);
    assert_eq!(stats.unweighted_vertices, 1);
}

#[test]
fn weights_respect_lower_slot_budget() {
    let bones = [
        vec![VertexWeight::new(0, 0.5)],
        vec![VertexWeight::new(0, 0.3)],
        vec![VertexWeight::new(0, 0.2)],
    ];
    let (slots, _) = assign_weights(1, bones.iter().map(Vec::as_slice), 2).unwrap();

    assert_eq!(slots[0].indices, UVec4::new(1, 2, 0, 0));
    assert_eq!(slots[0].weights, Vec4::new(0.5, 0.3, 0.0, 0.0));
}

#[test]
fn weights_reject_out_of_range_vertex() {
    let bones = [vec![VertexWeight::new(5, 1.0)]];
    let result = assign_weights(2, bones.iter().map(Vec::as_slice), 4);
    assert!(matches!(result, Err(SkinError::InvalidSource(_))));
}

#[test]
fn blend_slots_are_written_into_vertices() {
    let mut vertices = vec![SkinVertex::default(); 2];
    let bones = [vec![VertexWeight::new(0, 1.0)]];
    let (slots, _) = assign_weights(2, bones.iter().map(Vec::as_slice), 4).unwrap();

    apply_blend_slots(&mut vertices, &slots);
    assert_eq!(vertices[0].influences().collect::<Vec<_>>(), vec![(1, 1.0)]);
    assert_eq!(vertices[1].influences().collect::<Vec<_>>(), vec![(0, 1.0)]);
}

// ============================================================================
// Tangents
// ============================================================================

/// 24-vertex cube; on every face `uv.x` runs along `u` and `uv.y` along `v`.
fn textured_cube() -> (Vec<SkinVertex>, Vec<u32>, Vec<(Vec3, Vec3)>) {
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut frames = Vec::new();
    for (n, u, v) in faces {
        let base = vertices.len() as u32;
        for (s, t) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = n + u * s + v * t;
            let uv = Vec2::new((s + 1.0) * 0.5, (t + 1.0) * 0.5);
            vertices.push(SkinVertex::new(position, n, uv));
            frames.push((u, v));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices, frames)
}

#[test]
fn tangents_follow_uv_directions_on_cube() {
    let (mut vertices, indices, frames) = textured_cube();
    let stats = reconstruct_tangents(&mut vertices, &indices);

    assert_eq!(stats.degenerate_triangles, 0);
    assert_eq!(stats.fallback_vertices, 0);
    for (vertex, (u, v)) in vertices.iter().zip(frames) {
        assert!(vec3_approx(vertex.tangent, u), "tangent {} expected {u}", vertex.tangent);
        assert!(vec3_approx(vertex.bitangent, v), "bitangent {} expected {v}", vertex.bitangent);
        assert!(vertex.tangent.dot(vertex.normal).abs() < EPSILON);
    }
}

#[test]
fn tangents_are_idempotent() {
    let (mut vertices, indices, _) = textured_cube();
    reconstruct_tangents(&mut vertices, &indices);
    let first = vertices.clone();

    reconstruct_tangents(&mut vertices, &indices);
    assert_eq!(vertices, first);
}

#[test]
fn tangents_fall_back_for_degenerate_uvs() {
    let mut vertices = vec![
        SkinVertex::new(Vec3::ZERO, Vec3::Z, Vec2::ZERO),
        SkinVertex::new(Vec3::X, Vec3::Z, Vec2::ZERO),
        SkinVertex::new(Vec3::Y, Vec3::Z, Vec2::ZERO),
    ];
    let stats = reconstruct_tangents(&mut vertices, &[0, 1, 2]);

    assert_eq!(stats.degenerate_triangles, 1);
    assert_eq!(stats.fallback_vertices, 3);
    for vertex in &vertices {
        assert!(vec3_approx(vertex.tangent, Vec3::Y));
        assert!(vec3_approx(vertex.bitangent, Vec3::NEG_X));
        assert!(vertex.tangent.is_finite() && vertex.bitangent.is_finite());
    }
}

#[test]
fn tangent_fallback_handles_normal_along_x() {
    let mut vertices = vec![SkinVertex::new(Vec3::ZERO, Vec3::X, Vec2::ZERO)];
    reconstruct_tangents(&mut vertices, &[]);

    // cross(X, X) is zero, so the Y axis is used
    assert!(vec3_approx(vertices[0].tangent, Vec3::Z));
    assert!(vertices[0].tangent.dot(Vec3::X).abs() < EPSILON);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "non-finite fallback tangent")]
fn tangent_fallback_rejects_zero_normal_in_debug() {
    let mut vertices = vec![SkinVertex::new(Vec3::ZERO, Vec3::ZERO, Vec2::ZERO)];
    reconstruct_tangents(&mut vertices, &[]);
}

// ============================================================================
// Winding
// ============================================================================

#[test]
fn reverse_winding_is_an_involution() {
    let mut mesh = SkinMesh::new("quad", 0);
    mesh.indices = vec![0, 1, 2, 0, 2, 3];

    mesh.reverse_winding();
    assert_eq!(mesh.indices, vec![0, 2, 1, 0, 3, 2]);

    mesh.reverse_winding();
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn new_mesh_has_dummy_bone_and_identity_matrix() {
    let mut mesh = SkinMesh::new("Body", 3);
    assert_eq!(mesh.bones.len(), 1);
    assert_eq!(mesh.bones[0].name, "Body");
    assert_eq!(mesh.bones[0].offset_matrix, Mat4::IDENTITY);
    assert_eq!(mesh.shader_matrices(), &[Mat4::IDENTITY]);

    let index = mesh.push_bone("Arm", Mat4::from_translation(Vec3::X), 12);
    assert_eq!(index, 1);
    assert_eq!(mesh.bones[1].mesh_index, 3);
    assert_eq!(mesh.shader_matrices().len(), mesh.bones.len());
    assert!(mesh.has_bones);
}

// ============================================================================
// Palette exchange
// ============================================================================

#[test]
fn palette_publish_swaps_buffers() {
    let exchange = PaletteExchange::new();
    assert_eq!(exchange.generation(), 0);
    assert_eq!(exchange.read().mesh_count(), 0);

    let mut back = SkinPalette {
        bone_matrices: vec![vec![Mat4::from_translation(Vec3::X)]],
        world: vec![Mat4::IDENTITY],
    };
    let generation = exchange.publish(&mut back);

    assert_eq!(generation, 1);
    assert_eq!(back.mesh_count(), 0, "back buffer receives the previous front");
    let front = exchange.read();
    assert_eq!(front.generation(), 1);
    assert_eq!(front.bone_matrices[0][0], Mat4::from_translation(Vec3::X));
}

#[test]
fn palette_is_readable_from_other_threads() {
    let exchange = Arc::new(PaletteExchange::new());
    let mut back = SkinPalette {
        bone_matrices: vec![vec![Mat4::IDENTITY; 3]],
        world: vec![Mat4::IDENTITY],
    };
    exchange.publish(&mut back);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let exchange = Arc::clone(&exchange);
            scope.spawn(move || {
                let palette = exchange.read();
                assert_eq!(palette.bone_matrices[0].len(), 3);
            });
        }
    });
}
