use glam::{Mat4, Vec3};

use crate::resources::material::MaterialParams;
use crate::resources::vertex::SkinVertex;
use crate::scene::NodeHandle;

/// A bone entry of one mesh's flat bone list.
///
/// Bone 0 of every mesh is a synthetic identity bone named after the mesh;
/// real bones follow at index `source index + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneRef {
    pub name: String,
    pub mesh_index: usize,
    pub bone_index: usize,
    /// Bind-pose inverse: takes a vertex from mesh space into bone space.
    pub offset_matrix: Mat4,
    pub weighted_vertex_count: usize,
}

impl BoneRef {
    /// The identity bone placed at index 0 of a mesh's bone list.
    #[must_use]
    pub fn dummy(mesh_name: &str, mesh_index: usize) -> Self {
        Self {
            name: mesh_name.to_string(),
            mesh_index,
            bone_index: 0,
            offset_matrix: Mat4::IDENTITY,
            weighted_vertex_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Tight box around `points`, or a zero box when there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };

        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self { min, max }
    }
}

/// One drawable mesh of a skinned model.
///
/// # Invariant
/// `shader_matrices.len() == bones.len()`. Entries start as identity and are
/// rewritten by the pose evaluator for every bone bound to a node.
#[derive(Debug, Clone)]
pub struct SkinMesh {
    pub name: String,
    pub mesh_index: usize,

    // === Geometry ===
    pub vertices: Vec<SkinVertex>,
    /// Triangle list, 3 indices per face.
    pub indices: Vec<u32>,

    // === Skinning ===
    pub has_bones: bool,
    pub bones: Vec<BoneRef>,
    pub(crate) shader_matrices: Vec<Mat4>,
    /// Node carrying this mesh's animated transform.
    pub node: Option<NodeHandle>,

    pub material: MaterialParams,

    // === Bounds (mesh space) ===
    pub bounds: BoundingBox,
    pub centroid: Vec3,
}

impl SkinMesh {
    /// Creates a mesh with only the dummy bone and no geometry.
    #[must_use]
    pub fn new(name: impl Into<String>, mesh_index: usize) -> Self {
        let name = name.into();
        let dummy = BoneRef::dummy(&name, mesh_index);
        Self {
            name,
            mesh_index,
            vertices: Vec::new(),
            indices: Vec::new(),
            has_bones: false,
            bones: vec![dummy],
            shader_matrices: vec![Mat4::IDENTITY],
            node: None,
            material: MaterialParams::default(),
            bounds: BoundingBox::default(),
            centroid: Vec3::ZERO,
        }
    }

    /// Appends a real bone, keeping the shader matrix array in step.
    pub fn push_bone(&mut self, name: impl Into<String>, offset_matrix: Mat4, weighted_vertex_count: usize) -> usize {
        let bone_index = self.bones.len();
        self.bones.push(BoneRef {
            name: name.into(),
            mesh_index: self.mesh_index,
            bone_index,
            offset_matrix,
            weighted_vertex_count,
        });
        self.shader_matrices.push(Mat4::IDENTITY);
        self.has_bones = true;
        bone_index
    }

    /// Final per-bone matrices for the skinning shader.
    #[inline]
    #[must_use]
    pub fn shader_matrices(&self) -> &[Mat4] {
        &self.shader_matrices
    }

    /// Index of the bone named `name`; the last match wins when names repeat.
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().rposition(|b| b.name == name)
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recomputes `bounds` and `centroid` from the current vertices.
    pub fn compute_bounds(&mut self) {
        self.bounds = BoundingBox::from_points(self.vertices.iter().map(|v| v.position));
        self.centroid = if self.vertices.is_empty() {
            Vec3::ZERO
        } else {
            let sum: Vec3 = self.vertices.iter().map(|v| v.position).sum();
            sum / self.vertices.len() as f32
        };
    }

    /// Swaps the 2nd and 3rd index of every triangle. Applying it twice
    /// restores the original order.
    pub fn reverse_winding(&mut self) {
        reverse_winding(&mut self.indices);
    }

    /// Resets every shader matrix to identity.
    pub fn reset_shader_matrices(&mut self) {
        self.shader_matrices.fill(Mat4::IDENTITY);
    }
}

/// Swaps index 1 and 2 of every triangle in a triangle list.
pub fn reverse_winding(indices: &mut [u32]) {
    for tri in indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
}
