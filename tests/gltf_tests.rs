//! glTF decoder tests
//!
//! Tests for:
//! - Joint lists turned into per-bone weights with inverse bind offsets
//! - `Node_{i}` naming of unnamed nodes
//! - Channels grouped per target node, cubic-spline tangents dropped
//! - Skinned mesh nodes imported without their own transform

#![cfg(feature = "gltf")]

use std::f32::consts::FRAC_1_SQRT_2;
use std::fs;
use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3};
use serde_json::json;

use myth_skin::assets::loaders::gltf::GLTF_ROOT_NAME;
use myth_skin::assets::{GltfDecoder, ImportOptions, ImportScene, ModelImporter, SceneDecoder};
use myth_skin::skinning::VertexWeight;

const EPSILON: f32 = 1e-5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("myth_skin_gltf_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

// ============================================================================
// Fixture
// ============================================================================

/// Writes `rig.gltf` + `rig.bin` into `dir` and returns the `.gltf` path.
///
/// Node 0 (unnamed) instances the skinned "Body" mesh and sits at z = 5.
/// Node 1 "Hip" parents node 2 (unnamed, one unit along X). The skin joints
/// are [Hip, Node_2].
///
/// Vertex 0 follows joint 1, vertex 1 is split 50/50, vertex 2 follows
/// joint 0. The "wave" clip drives node 2 with a cubic-spline rotation and a
/// linear translation over one second.
fn write_rig(dir: &Path) -> PathBuf {
    let positions: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let joints: [[u16; 4]; 3] = [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]];
    let weights: [[f32; 4]; 3] = [[1.0, 0.0, 0.0, 0.0], [0.5, 0.5, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]];
    let inverse_binds: [[f32; 16]; 2] = [
        Mat4::IDENTITY.to_cols_array(),
        Mat4::from_translation(Vec3::NEG_X).to_cols_array(),
    ];
    let times: [f32; 2] = [0.0, 1.0];
    let s = FRAC_1_SQRT_2;
    // [in tangent, value, out tangent] per key
    let rotations: [[f32; 4]; 6] = [
        [0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, s, s],
        [0.0, 0.0, 0.0, 0.0],
    ];
    let translations: [[f32; 3]; 2] = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];

    let chunks: [&[u8]; 7] = [
        bytemuck::cast_slice(&positions),
        bytemuck::cast_slice(&joints),
        bytemuck::cast_slice(&weights),
        bytemuck::cast_slice(&inverse_binds),
        bytemuck::cast_slice(&times),
        bytemuck::cast_slice(&rotations),
        bytemuck::cast_slice(&translations),
    ];

    let mut bin = Vec::new();
    let mut views = Vec::new();
    for chunk in chunks {
        views.push(json!({ "buffer": 0, "byteOffset": bin.len(), "byteLength": chunk.len() }));
        bin.extend_from_slice(chunk);
    }

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "mesh": 0, "skin": 0, "translation": [0.0, 0.0, 5.0] },
            { "name": "Hip", "children": [2] },
            { "translation": [1.0, 0.0, 0.0] }
        ],
        "meshes": [{
            "name": "Body",
            "primitives": [{
                "attributes": { "POSITION": 0, "JOINTS_0": 1, "WEIGHTS_0": 2 }
            }]
        }],
        "skins": [{ "joints": [1, 2], "inverseBindMatrices": 3, "skeleton": 1 }],
        "animations": [{
            "name": "wave",
            "samplers": [
                { "input": 4, "output": 5, "interpolation": "CUBICSPLINE" },
                { "input": 4, "output": 6, "interpolation": "LINEAR" }
            ],
            "channels": [
                { "sampler": 0, "target": { "node": 2, "path": "rotation" } },
                { "sampler": 1, "target": { "node": 2, "path": "translation" } }
            ]
        }],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "VEC4" },
            { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4" },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "MAT4" },
            { "bufferView": 4, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [1.0] },
            { "bufferView": 5, "componentType": 5126, "count": 6, "type": "VEC4" },
            { "bufferView": 6, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "bufferViews": views,
        "buffers": [{ "uri": "rig.bin", "byteLength": bin.len() }]
    });

    fs::write(dir.join("rig.bin"), &bin).unwrap();
    let path = dir.join("rig.gltf");
    fs::write(&path, serde_json::to_vec_pretty(&document).unwrap()).unwrap();
    path
}

fn decode_rig(name: &str) -> ImportScene {
    init_logger();
    let path = write_rig(&temp_dir(name));
    GltfDecoder.decode(&path, &ImportOptions::default()).unwrap()
}

// ============================================================================
// Decoder
// ============================================================================

#[test]
fn decoder_names_unnamed_nodes_by_index() {
    let scene = decode_rig("names");

    assert_eq!(scene.root.name, GLTF_ROOT_NAME);
    let names: Vec<_> = scene.root.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["Node_0", "Hip"]);
    assert_eq!(scene.root.children[1].children[0].name, "Node_2");
    assert!(scene.root.children[1].children[0]
        .transform
        .abs_diff_eq(Mat4::from_translation(Vec3::X), EPSILON));
}

#[test]
fn decoder_ignores_skinned_mesh_node_transform() {
    let scene = decode_rig("skinned_node");

    let mesh_node = &scene.root.children[0];
    assert_eq!(mesh_node.mesh_indices, vec![0]);
    assert_eq!(mesh_node.transform, Mat4::IDENTITY);
}

#[test]
fn decoder_turns_joints_into_bone_weights() {
    let scene = decode_rig("weights");
    assert_eq!(scene.meshes.len(), 1);

    let mesh = &scene.meshes[0];
    assert_eq!(mesh.name, "Body");
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.faces.len(), 1, "non-indexed primitive reads as one triangle");

    let bones: Vec<_> = mesh.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(bones, ["Hip", "Node_2"]);
    assert_eq!(mesh.bones[0].offset_matrix, Mat4::IDENTITY);
    assert_eq!(mesh.bones[1].offset_matrix, Mat4::from_translation(Vec3::NEG_X));

    // Zero weights are skipped
    assert_eq!(
        mesh.bones[0].weights,
        vec![VertexWeight::new(1, 0.5), VertexWeight::new(2, 1.0)]
    );
    assert_eq!(
        mesh.bones[1].weights,
        vec![VertexWeight::new(0, 1.0), VertexWeight::new(1, 0.5)]
    );
}

#[test]
fn decoder_groups_channels_per_node_and_drops_cubic_tangents() {
    let scene = decode_rig("channels");
    assert_eq!(scene.animations.len(), 1);

    let animation = &scene.animations[0];
    assert_eq!(animation.name, "wave");
    assert_eq!(animation.duration_ticks, 1.0);
    assert_eq!(animation.ticks_per_second, 1.0);

    assert_eq!(animation.channels.len(), 1);
    let channel = &animation.channels[0];
    assert_eq!(channel.node_name, "Node_2");

    let rotations: Vec<_> = channel.rotation_keys.iter().map(|k| (k.time, k.value)).collect();
    assert_eq!(rotations.len(), 2);
    assert_eq!(rotations[0].0, 0.0);
    assert_eq!(rotations[1].0, 1.0);
    assert!(quat_approx(rotations[0].1, Quat::IDENTITY));
    assert!(quat_approx(rotations[1].1, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)));

    let positions: Vec<_> = channel.position_keys.iter().map(|k| k.value).collect();
    assert_eq!(positions, vec![Vec3::X, Vec3::new(2.0, 0.0, 0.0)]);
    assert!(channel.scaling_keys.is_empty());
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn load_gltf_binds_joints_and_animates() {
    init_logger();
    let dir = temp_dir("load");
    write_rig(&dir);

    let importer = ModelImporter::new(ImportOptions::default().with_search_root(&dir));
    let mut model = importer.load_gltf("rig.gltf").unwrap();

    let mesh = &model.meshes()[0];
    let bones: Vec<_> = mesh.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(bones, ["Body", "Hip", "Node_2"]);
    assert_eq!(mesh.bones[2].offset_matrix, Mat4::from_translation(Vec3::NEG_X));

    // Rest pose: joint at its bind pose, mesh node carries no offset
    assert!(mesh.shader_matrices()[2].abs_diff_eq(Mat4::IDENTITY, EPSILON));
    assert_eq!(model.mesh_world_matrix(0, Mat4::IDENTITY), Mat4::IDENTITY);

    let wave = model.find_action("wave").unwrap();
    model.begin_animation(wave, 0.0).unwrap();
    model.update(1.0);

    // Node_2 ends rotated a quarter turn about Z and two units along X
    let expected = Mat4::from_rotation_translation(
        Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        Vec3::new(2.0, 0.0, 0.0),
    ) * Mat4::from_translation(Vec3::NEG_X);
    assert!(model.meshes()[0].shader_matrices()[2].abs_diff_eq(expected, EPSILON));
}
