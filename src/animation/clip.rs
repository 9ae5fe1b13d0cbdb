use glam::{Mat4, Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;

/// Rest pose components of a node, used for any channel track without keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestPose {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for RestPose {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }
}

impl RestPose {
    #[must_use]
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            scale,
            rotation,
            translation,
        }
    }
}

/// Keyframes for one target node. The three tracks are independent in key
/// count and timing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeChannel {
    pub target_node_name: String,
    pub rotation: KeyframeTrack<Quat>,
    pub position: KeyframeTrack<Vec3>,
    pub scale: KeyframeTrack<Vec3>,
}

impl NodeChannel {
    #[must_use]
    pub fn new(target_node_name: impl Into<String>) -> Self {
        Self {
            target_node_name: target_node_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, track: KeyframeTrack<Quat>) -> Self {
        self.rotation = track;
        self
    }

    #[must_use]
    pub fn with_position(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.position = track;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.scale = track;
        self
    }

    /// Latest key time over all three tracks.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.rotation
            .end_time()
            .max(self.position.end_time())
            .max(self.scale.end_time())
    }

    /// Local transform `T * R * S` at `time`. Tracks without keys take their
    /// component from `rest`.
    #[must_use]
    pub fn local_transform(&self, time: f32, period: f32, rest: &RestPose) -> Mat4 {
        let rotation = self.rotation.sample(time, period).unwrap_or(rest.rotation);
        let translation = self.position.sample(time, period).unwrap_or(rest.translation);
        let scale = self.scale.sample(time, period).unwrap_or(rest.scale);
        Mat4::from_scale_rotation_translation(scale, rotation, translation)
    }
}

/// A named set of node channels sharing one timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration_seconds: f32,
    /// Extra time appended after the last key before the clip repeats,
    /// during which the pose blends from the last key back to the first.
    pub loop_pad_seconds: f32,
    pub channels: Vec<NodeChannel>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, duration_seconds: f32, channels: Vec<NodeChannel>) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
            loop_pad_seconds: 0.0,
            channels,
        }
    }

    /// A clip whose duration is the latest key time of its channels.
    #[must_use]
    pub fn from_channels(name: impl Into<String>, channels: Vec<NodeChannel>) -> Self {
        let duration = channels.iter().map(NodeChannel::end_time).fold(0.0_f32, f32::max);
        Self::new(name, duration, channels)
    }

    #[must_use]
    pub fn with_loop_pad(mut self, seconds: f32) -> Self {
        self.loop_pad_seconds = seconds;
        self
    }

    /// Length of one loop: duration plus the loop pad.
    #[inline]
    #[must_use]
    pub fn period(&self) -> f32 {
        self.duration_seconds + self.loop_pad_seconds
    }

    #[inline]
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }
}
