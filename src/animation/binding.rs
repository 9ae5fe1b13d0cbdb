use crate::animation::clip::RestPose;
use crate::scene::NodeHandle;

/// Maps channel `channel_index` of a clip to the node it animates.
///
/// `node` is `None` when no node carries the channel's target name; such a
/// binding is inert during pose evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBinding {
    pub channel_index: usize,
    pub node: Option<NodeHandle>,
    /// The bound node's bind pose, decomposed once at bind time.
    pub rest: RestPose,
}

impl ChannelBinding {
    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.node.is_some()
    }
}
