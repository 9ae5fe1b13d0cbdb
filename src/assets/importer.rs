//! Conversion of a decoded [`ImportScene`] into a runtime [`SkinModel`].
//!
//! The import runs in fixed steps, each exposed as its own function:
//!
//! 1. [`build_node_tree`]: mirror the source hierarchy
//! 2. [`build_meshes`]: bone lists, materials and processed geometry
//! 3. [`bind_bones`]: link nodes to the bones that share their name
//! 4. [`build_actions`]: convert animations and bind channels to nodes
//!
//! Structural problems in the source are fatal ([`SkinError::InvalidSource`]).
//! Missing channel targets and missing textures are binding gaps: they are
//! logged, listed in the model's [`ImportReport`], and the import continues.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};

use crate::animation::{AnimationAction, AnimationClip, KeyframeTrack, NodeChannel};
use crate::assets::locator::AssetLocator;
use crate::assets::optimize::optimize_mesh;
use crate::assets::options::ImportOptions;
use crate::assets::source::{ImportScene, SceneDecoder, SourceAnimation, SourceKey, SourceMesh, SourceNode};
use crate::assets::textures::{FsTextureResolver, TextureResolver, resolve_material_textures};
use crate::errors::{Result, SkinError};
use crate::model::SkinModel;
use crate::resources::material::MaterialParams;
use crate::resources::mesh::SkinMesh;
use crate::resources::vertex::SkinVertex;
use crate::scene::{MeshBoneRef, Node, NodeHandle, NodeTree};
use crate::skinning::{apply_blend_slots, assign_weights, reconstruct_tangents};

/// An animation channel whose target node does not exist in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundChannel {
    pub clip: String,
    pub node_name: String,
}

/// Recoverable problems met during an import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub unbound_channels: Vec<UnboundChannel>,
    /// Texture paths as requested by the source.
    pub missing_textures: Vec<PathBuf>,
    /// Point and line faces left out of the triangle lists.
    pub dropped_faces: usize,
}

impl ImportReport {
    /// `true` when the import had no binding gaps.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unbound_channels.is_empty() && self.missing_textures.is_empty()
    }
}

/// Builds [`SkinModel`]s from model files or decoded scenes.
pub struct ModelImporter {
    options: ImportOptions,
    texture_resolver: Option<Box<dyn TextureResolver>>,
}

impl ModelImporter {
    #[must_use]
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            texture_resolver: None,
        }
    }

    /// Replaces the filesystem texture lookup.
    #[must_use]
    pub fn with_texture_resolver(mut self, resolver: impl TextureResolver + 'static) -> Self {
        self.texture_resolver = Some(Box::new(resolver));
        self
    }

    #[must_use]
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Locates `request`, decodes it with `decoder` and imports the result.
    pub fn load(&self, request: impl AsRef<Path>, decoder: &dyn SceneDecoder) -> Result<SkinModel> {
        self.options.validate()?;

        let locator = self
            .options
            .search_root
            .as_ref()
            .map_or_else(AssetLocator::default, AssetLocator::new);
        let path = locator.resolve(request)?;
        log::info!("importing {}", path.display());

        let scene = decoder.decode(&path, &self.options)?;

        match &self.texture_resolver {
            Some(resolver) => self.import_with(&scene, resolver.as_ref()),
            None => {
                let model_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                let resolver = FsTextureResolver::new(model_dir, self.options.texture_dir.clone());
                self.import_with(&scene, &resolver)
            }
        }
    }

    /// Loads a glTF 2.0 file (`.gltf` or `.glb`).
    #[cfg(feature = "gltf")]
    pub fn load_gltf(&self, request: impl AsRef<Path>) -> Result<SkinModel> {
        self.load(request, &crate::assets::loaders::gltf::GltfDecoder)
    }

    /// Imports an already decoded scene. Textures are looked up relative to
    /// the working directory unless a resolver was supplied.
    pub fn import_scene(&self, scene: &ImportScene) -> Result<SkinModel> {
        self.options.validate()?;
        match &self.texture_resolver {
            Some(resolver) => self.import_with(scene, resolver.as_ref()),
            None => {
                let resolver = FsTextureResolver::new(".", self.options.texture_dir.clone());
                self.import_with(scene, &resolver)
            }
        }
    }

    fn import_with(&self, scene: &ImportScene, textures: &dyn TextureResolver) -> Result<SkinModel> {
        let mut report = ImportReport::default();

        let (mut tree, mesh_nodes) = build_node_tree(&scene.root, scene.meshes.len(), self.options.rescale)?;
        log::debug!("node tree built: {} nodes", tree.len());

        let meshes = build_meshes(scene, &mesh_nodes, &self.options, textures, &mut report)?;
        log::debug!("{} meshes built", meshes.len());

        bind_bones(&mut tree, &meshes);

        let actions = build_actions(&scene.animations, &tree, &self.options, &mut report)?;

        log::info!(
            "import complete: {} nodes, {} meshes, {} bones, {} animations, {} binding gaps",
            tree.len(),
            meshes.len(),
            meshes.iter().map(|m| m.bones.len() - 1).sum::<usize>(),
            actions.len(),
            report.unbound_channels.len() + report.missing_textures.len(),
        );

        Ok(SkinModel::new(tree, meshes, actions, report))
    }
}

/// Conjugates an affine matrix by a uniform scale: rotation and scale stay,
/// the translation is scaled.
fn rescale_affine(matrix: Mat4, factor: f32) -> Mat4 {
    if factor == 1.0 {
        return matrix;
    }
    let mut m = matrix;
    m.w_axis.x *= factor;
    m.w_axis.y *= factor;
    m.w_axis.z *= factor;
    m
}

/// Mirrors the source hierarchy into a [`NodeTree`].
///
/// Returns the tree and, per source mesh, the node that references it (the
/// last referencing node when several do).
pub fn build_node_tree(root: &SourceNode, mesh_count: usize, rescale: f32) -> Result<(NodeTree, Vec<Option<NodeHandle>>)> {
    let mut tree = NodeTree::new(root.name.clone(), rescale_affine(root.transform, rescale));
    let mut mesh_nodes = vec![None; mesh_count];

    let root_handle = tree.root();
    link_meshes(&mut tree, root_handle, root, &mut mesh_nodes)?;
    for child in &root.children {
        add_subtree(&mut tree, root_handle, child, rescale, &mut mesh_nodes)?;
    }

    Ok((tree, mesh_nodes))
}

fn add_subtree(
    tree: &mut NodeTree,
    parent: NodeHandle,
    source: &SourceNode,
    rescale: f32,
    mesh_nodes: &mut [Option<NodeHandle>],
) -> Result<()> {
    let handle = tree.add_child(parent, Node::new(source.name.clone(), rescale_affine(source.transform, rescale)));
    link_meshes(tree, handle, source, mesh_nodes)?;

    for child in &source.children {
        add_subtree(tree, handle, child, rescale, mesh_nodes)?;
    }
    Ok(())
}

fn link_meshes(tree: &mut NodeTree, handle: NodeHandle, source: &SourceNode, mesh_nodes: &mut [Option<NodeHandle>]) -> Result<()> {
    let mesh_count = mesh_nodes.len();
    for &mesh_index in &source.mesh_indices {
        let slot = mesh_nodes.get_mut(mesh_index).ok_or_else(|| {
            SkinError::InvalidSource(format!(
                "node '{}' references mesh {mesh_index}, scene has {mesh_count}",
                source.name
            ))
        })?;
        *slot = Some(handle);
        tree[handle].is_mesh_node = true;
    }
    Ok(())
}

/// Builds one [`SkinMesh`] per source mesh: material, bone list and fully
/// processed geometry.
pub fn build_meshes(
    scene: &ImportScene,
    mesh_nodes: &[Option<NodeHandle>],
    options: &ImportOptions,
    textures: &dyn TextureResolver,
    report: &mut ImportReport,
) -> Result<Vec<SkinMesh>> {
    scene
        .meshes
        .iter()
        .enumerate()
        .map(|(mesh_index, source)| -> Result<SkinMesh> {
            let mut mesh = SkinMesh::new(source.name.clone(), mesh_index);
            mesh.node = mesh_nodes.get(mesh_index).copied().flatten();
            mesh.material = build_material(scene, source, textures, report)?;

            for bone in &source.bones {
                mesh.push_bone(
                    bone.name.clone(),
                    rescale_affine(bone.offset_matrix, options.rescale),
                    bone.weights.len(),
                );
            }

            build_geometry(&mut mesh, source, options, report)?;
            Ok(mesh)
        })
        .collect()
}

fn build_material(
    scene: &ImportScene,
    source: &SourceMesh,
    textures: &dyn TextureResolver,
    report: &mut ImportReport,
) -> Result<MaterialParams> {
    let Some(material_index) = source.material_index else {
        return Ok(MaterialParams::default());
    };
    let material = scene.materials.get(material_index).ok_or_else(|| {
        SkinError::InvalidSource(format!(
            "mesh '{}' uses material {material_index}, scene has {}",
            source.name,
            scene.materials.len()
        ))
    })?;

    let (slots, missing) = resolve_material_textures(material, textures);
    report.missing_textures.extend(missing);

    Ok(MaterialParams {
        name: material.name.clone(),
        material_index,
        ambient: material.ambient,
        diffuse: material.diffuse,
        specular: material.specular,
        emissive: material.emissive,
        opacity: material.opacity,
        reflectivity: material.reflectivity,
        shininess: material.shininess,
        shine_strength: material.shine_strength,
        bump_scale: material.bump_scale,
        two_sided: material.two_sided,
        textures: slots,
    })
}

/// Vertices, triangles, weights, tangents, winding, optimisation and bounds.
fn build_geometry(mesh: &mut SkinMesh, source: &SourceMesh, options: &ImportOptions, report: &mut ImportReport) -> Result<()> {
    let vertex_count = source.positions.len();
    check_attribute_len(&source.name, "normals", source.normals.len(), vertex_count)?;
    check_attribute_len(&source.name, "uvs", source.uvs.len(), vertex_count)?;

    mesh.vertices = (0..vertex_count)
        .map(|i| {
            SkinVertex::new(
                source.positions[i] * options.rescale,
                source.normals.get(i).copied().unwrap_or(Vec3::Z),
                source.uvs.get(i).copied().unwrap_or(Vec2::ZERO),
            )
        })
        .collect();

    let (indices, dropped) = triangulate(source)?;
    mesh.indices = indices;
    report.dropped_faces += dropped;

    let (slots, stats) = assign_weights(
        vertex_count,
        source.bones.iter().map(|b| b.weights.as_slice()),
        options.max_bone_influences,
    )?;
    apply_blend_slots(&mut mesh.vertices, &slots);
    if mesh.has_bones && stats.unweighted_vertices > 0 {
        log::debug!(
            "mesh '{}': {} vertices without influences bound to the identity bone",
            mesh.name,
            stats.unweighted_vertices
        );
    }
    if stats.truncated_vertices > 0 {
        log::debug!(
            "mesh '{}': {} influences dropped over {} vertices",
            mesh.name,
            stats.dropped_influences,
            stats.truncated_vertices
        );
    }

    let tangent_stats = reconstruct_tangents(&mut mesh.vertices, &mesh.indices);
    if tangent_stats.degenerate_triangles > 0 {
        log::debug!(
            "mesh '{}': {} triangles with degenerate UVs skipped for tangents",
            mesh.name,
            tangent_stats.degenerate_triangles
        );
    }

    if options.reverse_winding {
        mesh.reverse_winding();
    }

    optimize_mesh(mesh, options.preset);
    mesh.compute_bounds();
    Ok(())
}

fn check_attribute_len(mesh: &str, attribute: &str, len: usize, vertex_count: usize) -> Result<()> {
    if len != 0 && len != vertex_count {
        return Err(SkinError::InvalidSource(format!(
            "mesh '{mesh}' has {len} {attribute} for {vertex_count} vertices"
        )));
    }
    Ok(())
}

/// Flattens source faces to a triangle list. Polygons are fan-triangulated;
/// points and lines are dropped and counted.
fn triangulate(source: &SourceMesh) -> Result<(Vec<u32>, usize)> {
    let vertex_count = source.positions.len();
    let mut indices = Vec::with_capacity(source.faces.len() * 3);
    let mut dropped = 0;
    let mut fanned = 0;

    for face in &source.faces {
        if let Some(&bad) = face.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(SkinError::InvalidSource(format!(
                "mesh '{}' face references vertex {bad}, mesh has {vertex_count}",
                source.name
            )));
        }

        match face.len() {
            0..=2 => dropped += 1,
            3 => indices.extend_from_slice(face),
            _ => {
                fanned += 1;
                for i in 1..face.len() - 1 {
                    indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
        }
    }

    if dropped > 0 {
        log::warn!("mesh '{}': {dropped} point/line faces dropped", source.name);
    }
    if fanned > 0 {
        log::warn!("mesh '{}': {fanned} polygons triangulated", source.name);
    }
    Ok((indices, dropped))
}

/// Links every node to the bones named after it, one per mesh, and marks the
/// bone route.
///
/// A node whose ancestor is on the bone route is on the route too.
pub fn bind_bones(tree: &mut NodeTree, meshes: &[SkinMesh]) {
    let order: Vec<NodeHandle> = tree.depth_first().collect();

    for handle in order {
        let inherited = tree[handle].parent().is_some_and(|p| tree[p].is_on_bone_route);
        let node = &mut tree[handle];

        for mesh in meshes {
            if let Some(bone_index) = mesh.find_bone(&node.name) {
                let bone_ref = MeshBoneRef {
                    mesh_index: mesh.mesh_index,
                    bone_index,
                };
                if !node.mesh_bones.contains(&bone_ref) {
                    node.mesh_bones.push(bone_ref);
                }
                node.has_real_bone = true;
                node.is_on_bone_route = true;
            }
        }

        if inherited {
            node.is_on_bone_route = true;
        }
    }
}

/// Converts source animations to clips and binds each to `tree`.
pub fn build_actions(
    animations: &[SourceAnimation],
    tree: &NodeTree,
    options: &ImportOptions,
    report: &mut ImportReport,
) -> Result<Vec<AnimationAction>> {
    animations
        .iter()
        .map(|source| -> Result<AnimationAction> {
            let clip = Arc::new(convert_animation(source, options)?);
            let action = AnimationAction::new(clip, tree);

            report.unbound_channels.extend(action.unbound_channels().map(|name| UnboundChannel {
                clip: action.name().to_string(),
                node_name: name.to_string(),
            }));
            log::debug!(
                "clip '{}': {}/{} channels bound, period {:.3}s",
                action.name(),
                action.bound_count(),
                action.bindings.len(),
                action.period()
            );
            Ok(action)
        })
        .collect()
}

/// Converts tick-timed source keys into a clip timed in seconds.
///
/// A non-positive tick rate means the keys are already in seconds.
pub fn convert_animation(source: &SourceAnimation, options: &ImportOptions) -> Result<AnimationClip> {
    let ticks_per_second = if source.ticks_per_second > 0.0 {
        source.ticks_per_second
    } else {
        log::warn!("animation '{}' has no tick rate, assuming seconds", source.name);
        1.0
    };

    let channels = source
        .channels
        .iter()
        .map(|channel| -> Result<NodeChannel> {
            let context = |track: &str| format!("animation '{}' channel '{}' {track}", source.name, channel.node_name);
            Ok(NodeChannel {
                target_node_name: channel.node_name.clone(),
                rotation: convert_keys(&channel.rotation_keys, ticks_per_second, |q| q.normalize(), || context("rotation"))?,
                position: convert_keys(&channel.position_keys, ticks_per_second, |p| p * options.rescale, || context("position"))?,
                scale: convert_keys(&channel.scaling_keys, ticks_per_second, |s| s, || context("scaling"))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let duration = (source.duration_ticks / ticks_per_second) as f32;
    Ok(AnimationClip::new(source.name.clone(), duration, channels).with_loop_pad(options.loop_pad_seconds))
}

fn convert_keys<T, U>(
    keys: &[SourceKey<T>],
    ticks_per_second: f64,
    map: impl Fn(T) -> U,
    context: impl Fn() -> String,
) -> Result<KeyframeTrack<U>>
where
    T: Copy,
    U: crate::animation::Interpolatable,
{
    if keys.windows(2).any(|w| w[0].time >= w[1].time) {
        return Err(SkinError::InvalidSource(format!(
            "{}: key times are not strictly increasing",
            context()
        )));
    }

    let times = keys.iter().map(|k| (k.time / ticks_per_second) as f32).collect();
    let values = keys.iter().map(|k| map(k.value)).collect();
    Ok(KeyframeTrack::new(times, values))
}
