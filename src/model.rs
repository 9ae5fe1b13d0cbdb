use glam::Mat4;

use crate::animation::{AnimationAction, AnimationPlayer, PoseEvaluator};
use crate::assets::importer::ImportReport;
use crate::errors::{Result, SkinError};
use crate::render::{CameraView, MeshDraw, RenderSink};
use crate::resources::mesh::SkinMesh;
use crate::scene::transform_system::update_combined;
use crate::scene::{NodeHandle, NodeTree};

/// An imported skinned model: node tree, meshes, bound animations and the
/// playback clock.
///
/// Cloning a model shares the clip data and copies the pose buffers, so
/// clones animate independently.
#[derive(Debug, Clone)]
pub struct SkinModel {
    tree: NodeTree,
    meshes: Vec<SkinMesh>,
    actions: Vec<AnimationAction>,
    pub player: AnimationPlayer,
    report: ImportReport,
}

impl SkinModel {
    /// Assembles a model and evaluates its rest pose once.
    #[must_use]
    pub fn new(tree: NodeTree, meshes: Vec<SkinMesh>, actions: Vec<AnimationAction>, report: ImportReport) -> Self {
        let mut model = Self {
            tree,
            meshes,
            actions,
            player: AnimationPlayer::new(),
            report,
        };
        model.refresh_pose();
        model
    }

    #[inline]
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable tree access for manual posing; call [`refresh_pose`](Self::refresh_pose)
    /// afterwards.
    #[inline]
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    #[inline]
    #[must_use]
    pub fn meshes(&self) -> &[SkinMesh] {
        &self.meshes
    }

    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    #[must_use]
    pub fn find_action(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.name() == name)
    }

    #[inline]
    #[must_use]
    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    #[must_use]
    pub fn current_action(&self) -> Option<&AnimationAction> {
        self.player.current().and_then(|i| self.actions.get(i))
    }

    /// Starts animation `index` at time `now` (seconds), from the rest pose.
    pub fn begin_animation(&mut self, index: usize, now: f32) -> Result<()> {
        if index >= self.actions.len() {
            return Err(SkinError::AnimationIndexOutOfBounds {
                index,
                count: self.actions.len(),
            });
        }
        self.tree.reset_to_bind_pose();
        self.player.begin(index, now);
        log::debug!("animation '{}' started", self.actions[index].name());
        Ok(())
    }

    /// Stops playback and returns to the rest pose.
    pub fn stop_animation(&mut self) {
        self.player.stop();
        self.tree.reset_to_bind_pose();
        self.refresh_pose();
    }

    /// Evaluates the pose at wall-clock time `now` (seconds).
    ///
    /// Advances the clock and applies the current clip when playing, then
    /// recomputes combined transforms and every mesh's shader matrices.
    pub fn update(&mut self, now: f32) {
        if self.player.is_running()
            && let Some(action) = self.player.current().and_then(|i| self.actions.get(i))
        {
            let time = self.player.advance(now, action.period());
            if action.clip().has_channels() {
                PoseEvaluator::apply_action(&mut self.tree, action, time);
            }
        }
        self.refresh_pose();
    }

    /// Recomputes combined transforms and shader matrices from the current
    /// local transforms.
    pub fn refresh_pose(&mut self) {
        update_combined(&mut self.tree);
        PoseEvaluator::write_shader_matrices(&self.tree, &mut self.meshes);
    }

    /// World matrix to draw mesh `mesh_index` with, given the model's world
    /// matrix.
    ///
    /// While an animation with channels is selected the node transform is
    /// already carried by the bone matrices; otherwise the mesh follows its
    /// node.
    #[must_use]
    pub fn mesh_world_matrix(&self, mesh_index: usize, world: Mat4) -> Mat4 {
        let animated = self.current_action().is_some_and(|a| a.clip().has_channels());
        if animated {
            return world;
        }

        self.meshes
            .get(mesh_index)
            .and_then(|m| m.node)
            .and_then(|node: NodeHandle| self.tree.get(node))
            .map_or(world, |node| world * *node.combined_transform())
    }

    /// Submits every mesh to `sink`.
    pub fn draw(&self, world: Mat4, camera: &CameraView, sink: &mut dyn RenderSink) {
        for (i, mesh) in self.meshes.iter().enumerate() {
            debug_assert_eq!(mesh.shader_matrices().len(), mesh.bones.len());
            sink.draw_mesh(&MeshDraw {
                mesh_index: i,
                name: &mesh.name,
                world: self.mesh_world_matrix(i, world),
                bone_matrices: mesh.shader_matrices(),
                material: &mesh.material,
                vertices: &mesh.vertices,
                indices: &mesh.indices,
                camera,
            });
        }
    }
}
