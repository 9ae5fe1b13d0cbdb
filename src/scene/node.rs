use glam::Mat4;
use smallvec::SmallVec;

use crate::scene::NodeHandle;

/// Locates one bone inside one mesh's bone list.
///
/// A single skeleton node may drive bones in several meshes, each with its
/// own offset matrix, so a node keeps a small list of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshBoneRef {
    pub mesh_index: usize,
    pub bone_index: usize,
}

/// A named node of the model hierarchy.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child relationships:
/// - `parent`: handle to the parent node (`None` only for the root)
/// - `children`: ordered child handles, owned by this node
///
/// # Transforms
///
/// - `local_transform`: relative to the parent; overwritten by the pose
///   evaluator whenever an animation channel targets this node
/// - `combined_transform`: model-space transform, recomputed top-down every
///   evaluation as `parent.combined * local`
/// - `bind_transform`: the local transform as imported, kept to restore the
///   rest pose and to fill channel components that carry no keys
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Core Spatial Data ===
    pub local_transform: Mat4,
    pub(crate) combined_transform: Mat4,
    pub(crate) bind_transform: Mat4,

    // === Classification ===
    pub is_mesh_node: bool,
    pub has_real_bone: bool,
    pub is_on_bone_route: bool,

    /// Bones (in any mesh) whose name matches this node.
    pub(crate) mesh_bones: SmallVec<[MeshBoneRef; 2]>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>, local_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform,
            combined_transform: local_transform,
            bind_transform: local_transform,
            is_mesh_node: false,
            has_real_bone: false,
            is_on_bone_route: false,
            mesh_bones: SmallVec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Model-space transform as of the last hierarchy update.
    #[inline]
    #[must_use]
    pub fn combined_transform(&self) -> &Mat4 {
        &self.combined_transform
    }

    /// Local transform as it was imported.
    #[inline]
    #[must_use]
    pub fn bind_transform(&self) -> &Mat4 {
        &self.bind_transform
    }

    #[inline]
    #[must_use]
    pub fn mesh_bones(&self) -> &[MeshBoneRef] {
        &self.mesh_bones
    }

    /// Puts the node back into its imported rest pose.
    pub fn reset_to_bind_pose(&mut self) {
        self.local_transform = self.bind_transform;
    }
}
