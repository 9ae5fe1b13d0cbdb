use crate::animation::action::AnimationAction;
use crate::resources::mesh::SkinMesh;
use crate::scene::NodeTree;

/// Per-frame pose evaluation.
///
/// A full frame is [`apply_action`](Self::apply_action), then
/// [`update_combined`](crate::scene::transform_system::update_combined), then
/// [`write_shader_matrices`](Self::write_shader_matrices).
pub struct PoseEvaluator;

impl PoseEvaluator {
    /// Writes the interpolated local transform of every bound channel at
    /// clip time `time` into its node. Unbound channels are skipped.
    pub fn apply_action(tree: &mut NodeTree, action: &AnimationAction, time: f32) {
        let clip = action.clip();
        let period = clip.period();

        for binding in &action.bindings {
            let Some(handle) = binding.node else {
                continue;
            };
            let Some(node) = tree.get_mut(handle) else {
                continue;
            };
            let channel = &clip.channels[binding.channel_index];
            node.local_transform = channel.local_transform(time, period, &binding.rest);
        }
    }

    /// Recomputes `shader[mesh][bone] = node.combined * offset` for every
    /// node bound to a bone. Bones without a node keep their last matrix.
    pub fn write_shader_matrices(tree: &NodeTree, meshes: &mut [SkinMesh]) {
        for (_, node) in tree.iter() {
            let combined = *node.combined_transform();
            for bone_ref in node.mesh_bones() {
                let Some(mesh) = meshes.get_mut(bone_ref.mesh_index) else {
                    continue;
                };
                let offset = mesh.bones[bone_ref.bone_index].offset_matrix;
                mesh.shader_matrices[bone_ref.bone_index] = combined * offset;
            }
        }

        debug_assert!(
            meshes.iter().all(|m| m.shader_matrices.len() == m.bones.len()),
            "shader matrix count must match bone count"
        );
    }
}
