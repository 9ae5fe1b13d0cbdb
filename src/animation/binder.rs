use crate::animation::binding::ChannelBinding;
use crate::animation::clip::{AnimationClip, RestPose};
use crate::scene::NodeTree;

pub struct Binder;

impl Binder {
    /// Resolves every channel of `clip` to a node of `tree` by exact name.
    ///
    /// One binding is produced per channel, in channel order. When several
    /// nodes share a name, the first in pre-order wins.
    pub fn bind(tree: &NodeTree, clip: &AnimationClip) -> Vec<ChannelBinding> {
        clip.channels
            .iter()
            .enumerate()
            .map(|(channel_index, channel)| {
                let name = &channel.target_node_name;
                let node = tree.find_by_name(name);

                match node {
                    Some(handle) => log::trace!("clip '{}': channel '{name}' bound to {handle:?}", clip.name),
                    None => log::warn!("clip '{}': no node named '{name}', channel left unbound", clip.name),
                }

                let rest = node
                    .map(|handle| RestPose::from_matrix(tree[handle].bind_transform()))
                    .unwrap_or_default();

                ChannelBinding {
                    channel_index,
                    node,
                    rest,
                }
            })
            .collect()
    }
}
