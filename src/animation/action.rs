use std::sync::Arc;

use crate::animation::binder::Binder;
use crate::animation::binding::ChannelBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::NodeTree;

/// A clip bound to the nodes of one model.
///
/// The clip itself is shared; bindings belong to the model instance.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,
    pub bindings: Vec<ChannelBinding>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, tree: &NodeTree) -> Self {
        let bindings = Binder::bind(tree, &clip);
        Self { clip, bindings }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.clip.name
    }

    #[inline]
    #[must_use]
    pub fn period(&self) -> f32 {
        self.clip.period()
    }

    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_bound()).count()
    }

    /// Target names of channels that matched no node.
    pub fn unbound_channels(&self) -> impl Iterator<Item = &str> {
        self.bindings
            .iter()
            .filter(|b| !b.is_bound())
            .map(|b| self.clip.channels[b.channel_index].target_node_name.as_str())
    }

    /// Re-resolves the bindings, e.g. after the tree was rebuilt.
    pub fn rebind(&mut self, tree: &NodeTree) {
        self.bindings = Binder::bind(tree, &self.clip);
    }
}
