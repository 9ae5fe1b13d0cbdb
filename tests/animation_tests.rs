//! Animation Tests
//!
//! Tests for:
//! - KeyframeTrack segment search, including the loop seam
//! - Exact key queries and linear / slerp interpolation
//! - NodeChannel composition and rest pose fallback
//! - AnimationPlayer clock wrapping and frame override
//! - Binder name resolution

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use myth_skin::animation::{
    AnimationAction, AnimationClip, AnimationPlayer, Binder, KeyframeTrack, NodeChannel, RestPose,
};
use myth_skin::scene::{Node, NodeTree};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn track_0_10() -> KeyframeTrack<f32> {
    KeyframeTrack::new(vec![0.0, 1.0], vec![0.0, 10.0])
}

// ============================================================================
// KeyframeTrack: segment search
// ============================================================================

#[test]
fn track_midpoint_linear() {
    let track = track_0_10();
    let seg = track.segment(0.5, 1.0).unwrap();
    assert_eq!((seg.lower, seg.upper), (0, 1));
    assert!(approx(seg.factor, 0.5));
    assert!(approx(track.sample(0.5, 1.0).unwrap(), 5.0));
}

#[test]
fn track_exact_key_queries_return_key_values() {
    let track = KeyframeTrack::new(vec![0.0, 1.0, 2.0], vec![0.0_f32, 10.0, 20.0]);

    // Bit-exact, not approximate
    assert_eq!(track.sample(0.0, 2.0), Some(0.0));
    assert_eq!(track.sample(1.0, 2.0), Some(10.0));
    assert_eq!(track.sample(2.0, 2.0), Some(20.0));
}

#[test]
fn track_exact_key_queries_quaternion() {
    let q0 = Quat::from_rotation_y(0.3);
    let q1 = Quat::from_rotation_y(1.2);
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![q0, q1]);

    assert_eq!(track.sample(1.0, 1.0), Some(q1));
}

#[test]
fn track_wraps_past_last_key() {
    // Keys at 0 and 1, period 1: query 1.5 blends last -> first half way
    let track = track_0_10();
    let seg = track.segment(1.5, 1.0).unwrap();

    assert_eq!((seg.lower, seg.upper), (1, 0));
    assert!(approx(seg.t_lower, 1.0));
    assert!(approx(seg.t_upper, 2.0));
    assert!(approx(seg.factor, 0.5), "factor was {}", seg.factor);
    assert!(approx(track.sample(1.5, 1.0).unwrap(), 5.0));
}

#[test]
fn track_wraps_with_loop_pad() {
    // Keys span 0..1, period 2: the first key recurs at 2
    let track = track_0_10();
    let seg = track.segment(1.5, 2.0).unwrap();
    assert!(approx(seg.t_upper, 2.0));
    assert!(approx(seg.factor, 0.5));
}

#[test]
fn track_wraps_before_first_key() {
    let track = KeyframeTrack::new(vec![0.25, 0.75], vec![0.0_f32, 10.0]);
    let seg = track.segment(0.125, 1.0).unwrap();

    assert_eq!((seg.lower, seg.upper), (1, 0));
    assert!(approx(seg.t_lower, -0.25));
    assert!(approx(seg.factor, 0.75));
    assert!(approx(track.sample(0.125, 1.0).unwrap(), 2.5));
}

#[test]
fn track_without_period_holds_end_values() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f32, 20.0]);
    assert_eq!(track.sample(5.0, 0.0), Some(20.0));
    assert_eq!(track.sample(0.5, 0.0), Some(10.0));
}

#[test]
fn track_single_key_is_constant() {
    let track = KeyframeTrack::new(vec![0.4], vec![Vec3::new(1.0, 2.0, 3.0)]);
    assert_eq!(track.sample(0.0, 1.0), Some(Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(track.sample(0.9, 1.0), Some(Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn track_empty_has_no_value() {
    let track: KeyframeTrack<Vec3> = KeyframeTrack::default();
    assert!(track.is_empty());
    assert!(track.segment(0.5, 1.0).is_none());
    assert!(track.sample(0.5, 1.0).is_none());
}

#[test]
fn track_quaternion_slerp_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)]);
    let q = track.sample(0.5, 1.0).unwrap();

    let rotated = q * Vec3::X;
    let expected = Vec3::new(0.5_f32.sqrt(), 0.5_f32.sqrt(), 0.0);
    assert!(vec3_approx(rotated, expected), "got {rotated}");
}

// ============================================================================
// NodeChannel / AnimationClip
// ============================================================================

#[test]
fn channel_composes_translation_rotation_scale() {
    let channel = NodeChannel::new("Arm")
        .with_position(KeyframeTrack::new(vec![0.0], vec![Vec3::new(1.0, 0.0, 0.0)]))
        .with_rotation(KeyframeTrack::new(vec![0.0], vec![Quat::from_rotation_z(FRAC_PI_2)]))
        .with_scale(KeyframeTrack::new(vec![0.0], vec![Vec3::splat(2.0)]));

    let m = channel.local_transform(0.0, 1.0, &RestPose::default());
    // Scale, then rotate, then translate
    let p = m.transform_point3(Vec3::X);
    assert!(vec3_approx(p, Vec3::new(1.0, 2.0, 0.0)), "got {p}");
}

#[test]
fn channel_empty_tracks_use_rest_pose() {
    let rest = RestPose {
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
        translation: Vec3::new(0.0, 5.0, 0.0),
    };
    let channel = NodeChannel::new("Arm")
        .with_rotation(KeyframeTrack::new(vec![0.0], vec![Quat::from_rotation_x(0.5)]));

    let m = channel.local_transform(0.3, 1.0, &rest);
    let (_, _, translation) = m.to_scale_rotation_translation();
    assert!(vec3_approx(translation, Vec3::new(0.0, 5.0, 0.0)));
}

#[test]
fn clip_period_includes_loop_pad() {
    let clip = AnimationClip::new("walk", 1.5, Vec::new()).with_loop_pad(0.25);
    assert!(approx(clip.period(), 1.75));
    assert!(!clip.has_channels());
}

#[test]
fn clip_duration_from_channels() {
    let clip = AnimationClip::from_channels(
        "wave",
        vec![
            NodeChannel::new("A").with_position(KeyframeTrack::new(vec![0.0, 0.8], vec![Vec3::ZERO, Vec3::X])),
            NodeChannel::new("B").with_scale(KeyframeTrack::new(vec![0.0, 1.2], vec![Vec3::ONE, Vec3::ONE])),
        ],
    );
    assert!(approx(clip.duration_seconds, 1.2));
}

// ============================================================================
// AnimationPlayer
// ============================================================================

#[test]
fn player_time_is_relative_to_epoch() {
    let mut player = AnimationPlayer::new();
    player.begin(0, 10.0);
    assert!(player.is_running());
    assert!(approx(player.advance(10.25, 1.0), 0.25));
}

#[test]
fn player_wraps_and_restarts_epoch() {
    let mut player = AnimationPlayer::new();
    player.begin(0, 10.0);

    assert!(approx(player.advance(11.5, 1.0), 0.5));
    // Epoch is now 11.0
    assert!(approx(player.advance(11.75, 1.0), 0.75));
}

#[test]
fn player_wraps_several_periods_in_one_step() {
    let mut player = AnimationPlayer::new();
    player.begin(0, 0.0);

    // A stalled first update lands more than two periods past the start
    assert!(approx(player.advance(4.0, 1.5), 1.0));
    assert!(approx(player.advance(4.25, 1.5), 1.25));
    assert!(player.time() <= 1.5);
}

#[test]
fn player_frame_override_resets_past_period() {
    let mut player = AnimationPlayer::new();
    player.begin(0, 0.0);

    player.set_frame_override(Some(0.4));
    assert!(approx(player.advance(100.0, 1.0), 0.4));

    player.set_frame_override(Some(2.0));
    assert_eq!(player.advance(100.0, 1.0), 0.0);
    assert_eq!(player.frame_override(), Some(0.0));
}

#[test]
fn player_pause_and_resume_keep_clip_time() {
    let mut player = AnimationPlayer::new();
    player.begin(0, 0.0);
    player.advance(0.5, 10.0);
    player.pause();
    assert!(!player.is_running());

    player.resume(7.0);
    assert!(approx(player.advance(7.25, 10.0), 0.75));
}

// ============================================================================
// Binder
// ============================================================================

fn small_tree() -> NodeTree {
    let mut tree = NodeTree::new("Root", Mat4::IDENTITY);
    let root = tree.root();
    let hips = tree.add_child(root, Node::new("Hips", Mat4::from_translation(Vec3::Y)));
    tree.add_child(hips, Node::new("Spine", Mat4::IDENTITY));
    tree
}

#[test]
fn binder_resolves_names_and_leaves_gaps() {
    let tree = small_tree();
    let clip = AnimationClip::new("idle", 1.0, vec![NodeChannel::new("Spine"), NodeChannel::new("Tail")]);

    let bindings = Binder::bind(&tree, &clip);
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0].node, tree.find_by_name("Spine"));
    assert!(bindings[0].is_bound());
    assert!(bindings[1].node.is_none());
}

#[test]
fn binder_captures_rest_pose() {
    let tree = small_tree();
    let clip = AnimationClip::new("idle", 1.0, vec![NodeChannel::new("Hips")]);

    let bindings = Binder::bind(&tree, &clip);
    assert!(vec3_approx(bindings[0].rest.translation, Vec3::Y));
}

#[test]
fn action_lists_unbound_channels() {
    let tree = small_tree();
    let clip = Arc::new(AnimationClip::new(
        "idle",
        1.0,
        vec![NodeChannel::new("Hips"), NodeChannel::new("Ghost")],
    ));

    let action = AnimationAction::new(clip, &tree);
    assert_eq!(action.bound_count(), 1);
    assert_eq!(action.unbound_channels().collect::<Vec<_>>(), vec!["Ghost"]);
}
