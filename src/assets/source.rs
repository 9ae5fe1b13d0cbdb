//! Decoded import scene.
//!
//! A [`SceneDecoder`] turns a file into an [`ImportScene`]: a format-neutral,
//! in-memory description of the node hierarchy, meshes, materials and
//! animations. The importer consumes only this structure, so tests can build
//! scenes directly without touching the filesystem.

use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use smallvec::SmallVec;

use crate::assets::options::ImportOptions;
use crate::errors::Result;
use crate::skinning::weights::VertexWeight;

/// Decodes a model file into an [`ImportScene`].
pub trait SceneDecoder {
    /// Decodes the file at `path`, which the locator has already resolved.
    fn decode(&self, path: &Path, options: &ImportOptions) -> Result<ImportScene>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportScene {
    pub root: SourceNode,
    pub meshes: Vec<SourceMesh>,
    pub materials: Vec<SourceMaterial>,
    pub animations: Vec<SourceAnimation>,
}

impl ImportScene {
    #[must_use]
    pub fn new(root: SourceNode) -> Self {
        Self {
            root,
            meshes: Vec::new(),
            materials: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Adds a mesh and returns its index.
    pub fn push_mesh(&mut self, mesh: SourceMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Adds a material and returns its index.
    pub fn push_material(&mut self, material: SourceMaterial) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    #[must_use]
    pub fn with_animation(mut self, animation: SourceAnimation) -> Self {
        self.animations.push(animation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub name: String,
    /// Local transform relative to the parent.
    pub transform: Mat4,
    /// Indices into [`ImportScene::meshes`].
    pub mesh_indices: Vec<usize>,
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh_indices: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh_index: usize) -> Self {
        self.mesh_indices.push(mesh_index);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A bone as stored by the source: per-bone weight list plus offset matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBone {
    pub name: String,
    pub offset_matrix: Mat4,
    pub weights: Vec<VertexWeight>,
}

impl SourceBone {
    #[must_use]
    pub fn new(name: impl Into<String>, offset_matrix: Mat4, weights: Vec<VertexWeight>) -> Self {
        Self {
            name: name.into(),
            offset_matrix,
            weights,
        }
    }
}

/// A polygonal face; 1 index is a point, 2 a line, 3+ a polygon.
pub type SourceFace = SmallVec<[u32; 4]>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Empty or one per position.
    pub normals: Vec<Vec3>,
    /// Empty or one per position (first UV channel).
    pub uvs: Vec<Vec2>,
    pub faces: Vec<SourceFace>,
    pub bones: Vec<SourceBone>,
    pub material_index: Option<usize>,
}

impl SourceMesh {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_vertices(mut self, positions: Vec<Vec3>, normals: Vec<Vec3>, uvs: Vec<Vec2>) -> Self {
        self.positions = positions;
        self.normals = normals;
        self.uvs = uvs;
        self
    }

    /// Adds faces from a flat triangle list.
    #[must_use]
    pub fn with_triangles(mut self, indices: &[u32]) -> Self {
        self.faces
            .extend(indices.chunks_exact(3).map(SmallVec::from_slice));
        self
    }

    #[must_use]
    pub fn with_face(mut self, face: &[u32]) -> Self {
        self.faces.push(SmallVec::from_slice(face));
        self
    }

    #[must_use]
    pub fn with_bone(mut self, bone: SourceBone) -> Self {
        self.bones.push(bone);
        self
    }

    #[must_use]
    pub fn with_material(mut self, material_index: usize) -> Self {
        self.material_index = Some(material_index);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Normals,
    Specular,
    Height,
    Reflection,
    Emissive,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceTexture {
    pub kind: TextureKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceMaterial {
    pub name: String,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub emissive: Vec4,
    pub opacity: f32,
    pub reflectivity: f32,
    pub shininess: f32,
    pub shine_strength: f32,
    pub bump_scale: f32,
    pub two_sided: bool,
    pub textures: Vec<SourceTexture>,
}

impl Default for SourceMaterial {
    fn default() -> Self {
        Self {
            name: String::from("Default"),
            ambient: Vec4::ONE,
            diffuse: Vec4::ONE,
            specular: Vec4::ONE,
            emissive: Vec4::ONE,
            opacity: 1.0,
            reflectivity: 0.0,
            shininess: 0.0,
            shine_strength: 1.0,
            bump_scale: 0.0,
            two_sided: false,
            textures: Vec::new(),
        }
    }
}

impl SourceMaterial {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_texture(mut self, kind: TextureKind, path: impl Into<PathBuf>) -> Self {
        self.textures.push(SourceTexture {
            kind,
            path: path.into(),
        });
        self
    }
}

/// A key at `time` ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceKey<T> {
    pub time: f64,
    pub value: T,
}

impl<T> SourceKey<T> {
    pub const fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceChannel {
    pub node_name: String,
    pub rotation_keys: Vec<SourceKey<Quat>>,
    pub position_keys: Vec<SourceKey<Vec3>>,
    pub scaling_keys: Vec<SourceKey<Vec3>>,
}

impl SourceChannel {
    #[must_use]
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotation_key(mut self, time: f64, value: Quat) -> Self {
        self.rotation_keys.push(SourceKey::new(time, value));
        self
    }

    #[must_use]
    pub fn with_position_key(mut self, time: f64, value: Vec3) -> Self {
        self.position_keys.push(SourceKey::new(time, value));
        self
    }

    #[must_use]
    pub fn with_scaling_key(mut self, time: f64, value: Vec3) -> Self {
        self.scaling_keys.push(SourceKey::new(time, value));
        self
    }
}

/// An animation as stored by the source, timed in ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAnimation {
    pub name: String,
    pub duration_ticks: f64,
    /// Zero or negative when the source does not specify a rate.
    pub ticks_per_second: f64,
    pub channels: Vec<SourceChannel>,
}

impl SourceAnimation {
    #[must_use]
    pub fn new(name: impl Into<String>, duration_ticks: f64, ticks_per_second: f64) -> Self {
        Self {
            name: name.into(),
            duration_ticks,
            ticks_per_second,
            channels: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: SourceChannel) -> Self {
        self.channels.push(channel);
        self
    }
}
