mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod binding;
pub mod binder;
pub mod player;
pub mod system;

pub use values::Interpolatable;
pub use clip::{AnimationClip, NodeChannel, RestPose};
pub use action::AnimationAction;
pub use binder::Binder;
pub use binding::ChannelBinding;
pub use player::AnimationPlayer;
pub use system::PoseEvaluator;
pub use tracks::{KeyframeTrack, Segment};
