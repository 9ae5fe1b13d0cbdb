use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;
use rustc_hash::FxHashMap;

use crate::assets::options::ImportOptions;
use crate::assets::source::{
    ImportScene, SceneDecoder, SourceAnimation, SourceBone, SourceChannel, SourceKey, SourceMaterial, SourceMesh,
    SourceNode, SourceTexture, TextureKind,
};
use crate::errors::{Result, SkinError};
use crate::skinning::weights::VertexWeight;

/// Name given to the synthetic node above the glTF scene roots.
pub const GLTF_ROOT_NAME: &str = "gltf_root";

/// Decodes glTF 2.0 (`.gltf` + buffers, or `.glb`).
///
/// Key times are already seconds, so animations are emitted with one tick
/// per second.
///
/// glTF ignores the transform of a node instancing a skinned mesh. Such a
/// node is imported with an identity transform unless it has children, in
/// which case the transform is kept for them and a warning is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfDecoder;

impl SceneDecoder for GltfDecoder {
    fn decode(&self, path: &Path, _options: &ImportOptions) -> Result<ImportScene> {
        let decode_err = |err: gltf::Error| SkinError::Decode {
            path: path.to_path_buf(),
            message: err.to_string(),
        };

        let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(decode_err)?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(decode_err)?;

        let builder = SceneBuilder {
            document: &document,
            buffers: &buffers,
        };
        builder.build()
    }
}

struct SceneBuilder<'a> {
    document: &'a gltf::Document,
    buffers: &'a [gltf::buffer::Data],
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

impl SceneBuilder<'_> {
    fn buffer(&self, buffer: &gltf::Buffer) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(|data| data.0.as_slice())
    }

    fn build(&self) -> Result<ImportScene> {
        let mut root = SourceNode::new(GLTF_ROOT_NAME, Mat4::IDENTITY);
        let mut meshes = Vec::new();

        if let Some(scene) = self.document.default_scene().or_else(|| self.document.scenes().next()) {
            for node in scene.nodes() {
                root.children.push(self.build_node(&node, &mut meshes)?);
            }
        }

        let mut imported = ImportScene::new(root);
        imported.meshes = meshes;
        imported.materials = self.document.materials().map(|m| self.build_material(&m)).collect();
        imported.animations = self.document.animations().map(|a| self.build_animation(&a)).collect();

        log::debug!(
            "glTF decoded: {} meshes, {} materials, {} animations",
            imported.meshes.len(),
            imported.materials.len(),
            imported.animations.len()
        );
        Ok(imported)
    }

    fn build_node(&self, node: &gltf::Node, meshes: &mut Vec<SourceMesh>) -> Result<SourceNode> {
        let name = node_name(node);
        let mut transform = Mat4::from_cols_array_2d(&node.transform().matrix());
        if node.mesh().is_some() && node.skin().is_some() && transform != Mat4::IDENTITY {
            if node.children().next().is_none() {
                transform = Mat4::IDENTITY;
            } else {
                log::warn!("skinned node '{name}' has children, its transform also moves the mesh");
            }
        }
        let mut source = SourceNode::new(name, transform);

        // Skins belong to the instancing node, so each instance gets its own meshes
        if let Some(mesh) = node.mesh() {
            let bones = node.skin().map(|skin| self.skin_bones(&skin)).unwrap_or_default();

            for (i, primitive) in mesh.primitives().enumerate() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "mesh '{}' primitive {i}: mode {:?} is not supported, skipped",
                        mesh.name().unwrap_or_default(),
                        primitive.mode()
                    );
                    continue;
                }
                let mesh_name = match (mesh.name(), mesh.primitives().len()) {
                    (Some(n), 1) => n.to_string(),
                    (Some(n), _) => format!("{n}_{i}"),
                    (None, _) => format!("Mesh_{}_{i}", mesh.index()),
                };
                let source_mesh = self.build_primitive(mesh_name, &primitive, &bones)?;
                meshes.push(source_mesh);
                source.mesh_indices.push(meshes.len() - 1);
            }
        }

        for child in node.children() {
            source.children.push(self.build_node(&child, meshes)?);
        }
        Ok(source)
    }

    /// Bone names and offsets of a skin, in joint order.
    fn skin_bones(&self, skin: &gltf::Skin) -> Vec<(String, Mat4)> {
        let reader = skin.reader(|b| self.buffer(&b));
        let mut ibms: Vec<Mat4> = reader
            .read_inverse_bind_matrices()
            .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_default();

        let joints: Vec<_> = skin.joints().collect();
        ibms.resize(joints.len(), Mat4::IDENTITY);

        joints.iter().map(node_name).zip(ibms).collect()
    }

    fn build_primitive(&self, name: String, primitive: &gltf::Primitive, bones: &[(String, Mat4)]) -> Result<SourceMesh> {
        let reader = primitive.reader(|b| self.buffer(&b));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let uvs: Vec<Vec2> = reader
            .read_tex_coords(0)
            .map(|tc| tc.into_f32().map(Vec2::from_array).collect())
            .unwrap_or_default();

        let indices: Vec<u32> = reader
            .read_indices()
            .map_or_else(|| (0..positions.len() as u32).collect(), |i| i.into_u32().collect());

        let mut mesh = SourceMesh::new(name)
            .with_vertices(positions, normals, uvs)
            .with_triangles(&indices);
        mesh.material_index = primitive.material().index();

        if bones.is_empty() {
            return Ok(mesh);
        }

        let mut weights: Vec<Vec<VertexWeight>> = vec![Vec::new(); bones.len()];
        if let (Some(joints), Some(joint_weights)) = (reader.read_joints(0), reader.read_weights(0)) {
            for (vertex, (j, w)) in joints.into_u16().zip(joint_weights.into_f32()).enumerate() {
                for slot in 0..4 {
                    if w[slot] <= 0.0 {
                        continue;
                    }
                    let joint = j[slot] as usize;
                    let Some(list) = weights.get_mut(joint) else {
                        return Err(SkinError::InvalidSource(format!(
                            "mesh '{}' vertex {vertex} references joint {joint}, skin has {}",
                            mesh.name,
                            bones.len()
                        )));
                    };
                    list.push(VertexWeight::new(vertex as u32, w[slot]));
                }
            }
        }

        mesh.bones = bones
            .iter()
            .zip(weights)
            .map(|((name, offset), weights)| SourceBone::new(name.clone(), *offset, weights))
            .collect();
        Ok(mesh)
    }

    fn build_material(&self, material: &gltf::Material) -> SourceMaterial {
        let pbr = material.pbr_metallic_roughness();
        let base = Vec4::from_array(pbr.base_color_factor());

        let mut source = SourceMaterial::new(
            material
                .name()
                .map_or_else(|| format!("Material_{}", material.index().unwrap_or_default()), str::to_string),
        );
        source.diffuse = base;
        source.opacity = base.w;
        source.emissive = Vec3::from_array(material.emissive_factor()).extend(1.0);
        source.shininess = (1.0 - pbr.roughness_factor()) * 128.0;
        source.reflectivity = pbr.metallic_factor();
        source.two_sided = material.double_sided();

        let mut add_texture = |kind: TextureKind, texture: gltf::Texture| {
            if let Some(path) = texture_uri(&texture) {
                source.textures.push(SourceTexture { kind, path });
            } else {
                log::debug!("material '{}': embedded {kind:?} texture ignored", material.name().unwrap_or_default());
            }
        };

        if let Some(info) = pbr.base_color_texture() {
            add_texture(TextureKind::Diffuse, info.texture());
        }
        if let Some(info) = material.emissive_texture() {
            add_texture(TextureKind::Emissive, info.texture());
        }
        if let Some(info) = material.normal_texture() {
            add_texture(TextureKind::Normals, info.texture());
            source.bump_scale = info.scale();
        }
        source
    }

    fn build_animation(&self, animation: &gltf::Animation) -> SourceAnimation {
        let name = animation
            .name()
            .map_or_else(|| format!("Animation_{}", animation.index()), str::to_string);

        // One channel per target node, in first-seen order
        let mut channels: Vec<SourceChannel> = Vec::new();
        let mut by_node: FxHashMap<usize, usize> = FxHashMap::default();
        let mut duration = 0.0_f64;

        for channel in animation.channels() {
            let target = channel.target();
            let node = target.node();
            let reader = channel.reader(|b| self.buffer(&b));

            let Some(inputs) = reader.read_inputs() else {
                continue;
            };
            let times: Vec<f64> = inputs.map(f64::from).collect();
            duration = times.iter().copied().fold(duration, f64::max);

            let cubic = channel.sampler().interpolation() == gltf::animation::Interpolation::CubicSpline;
            let slot = *by_node.entry(node.index()).or_insert_with(|| {
                channels.push(SourceChannel::new(node_name(&node)));
                channels.len() - 1
            });
            let out = &mut channels[slot];

            match reader.read_outputs() {
                Some(ReadOutputs::Translations(iter)) => {
                    out.position_keys = keyframes(&times, keyframe_values(iter.map(Vec3::from_array), cubic));
                }
                Some(ReadOutputs::Rotations(iter)) => {
                    out.rotation_keys = keyframes(&times, keyframe_values(iter.into_f32().map(Quat::from_array), cubic));
                }
                Some(ReadOutputs::Scales(iter)) => {
                    out.scaling_keys = keyframes(&times, keyframe_values(iter.map(Vec3::from_array), cubic));
                }
                Some(ReadOutputs::MorphTargetWeights(_)) => {
                    log::debug!("animation '{name}': morph target weights skipped");
                }
                None => {}
            }
        }

        let mut source = SourceAnimation::new(name, duration, 1.0);
        source.channels = channels;
        source
    }
}

/// Cubic-spline outputs come as `[in tangent, value, out tangent]` triples;
/// only the values are kept.
fn keyframe_values<T>(values: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}

fn keyframes<T: Copy>(times: &[f64], values: Vec<T>) -> Vec<SourceKey<T>> {
    times
        .iter()
        .zip(values)
        .map(|(&time, value)| SourceKey::new(time, value))
        .collect()
}

fn texture_uri(texture: &gltf::Texture) -> Option<PathBuf> {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => Some(PathBuf::from(uri)),
        _ => None,
    }
}
