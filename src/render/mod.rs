//! Rendering boundary.
//!
//! The crate never talks to a graphics API. A model hands every mesh to a
//! [`RenderSink`] as a [`MeshDraw`], which carries everything the shader
//! binding layer needs: geometry in the fixed
//! [`SKIN_VERTEX_LAYOUT`](crate::resources::SKIN_VERTEX_LAYOUT), the bone
//! matrix array, material parameters and the camera.

use glam::{Mat4, Vec3};

use crate::resources::material::MaterialParams;
use crate::resources::vertex::SkinVertex;

/// Read-only camera state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub view: Mat4,
    pub view_projection: Mat4,
    pub world_position: Vec3,
    pub up: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            world_position: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl CameraView {
    /// Right-handed perspective camera at `eye` looking at `target`.
    /// `fov_y` is in degrees; depth maps to `[0, 1]`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        let projection = Mat4::perspective_rh(fov_y.to_radians(), aspect, near, far);
        Self {
            view,
            view_projection: projection * view,
            world_position: eye,
            up,
        }
    }
}

/// One mesh submission.
#[derive(Debug, Clone, Copy)]
pub struct MeshDraw<'a> {
    pub mesh_index: usize,
    pub name: &'a str,
    pub world: Mat4,
    /// One matrix per bone, indexed by the vertices' blend indices.
    pub bone_matrices: &'a [Mat4],
    pub material: &'a MaterialParams,
    pub vertices: &'a [SkinVertex],
    pub indices: &'a [u32],
    pub camera: &'a CameraView,
}

impl MeshDraw<'_> {
    /// Raw vertex bytes ready for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }

    /// Raw bone matrix bytes ready for upload.
    #[must_use]
    pub fn bone_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.bone_matrices)
    }
}

/// Receives mesh submissions from [`SkinModel::draw`](crate::model::SkinModel::draw).
pub trait RenderSink {
    fn draw_mesh(&mut self, draw: &MeshDraw<'_>);
}

/// Collects submissions into a list; handy for tests and for deferring work
/// to another stage.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub draws: Vec<RecordedDraw>,
}

/// Owned summary of a [`MeshDraw`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub mesh_index: usize,
    pub name: String,
    pub world: Mat4,
    pub bone_matrices: Vec<Mat4>,
    pub index_count: usize,
}

impl RenderSink for DrawList {
    fn draw_mesh(&mut self, draw: &MeshDraw<'_>) {
        self.draws.push(RecordedDraw {
            mesh_index: draw.mesh_index,
            name: draw.name.to_string(),
            world: draw.world,
            bone_matrices: draw.bone_matrices.to_vec(),
            index_count: draw.indices.len(),
        });
    }
}
