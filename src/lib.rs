#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Skinned character import and pose evaluation.
//!
//! A model file is located and decoded into an [`ImportScene`], which the
//! [`ModelImporter`] turns into a [`SkinModel`]: a node tree, meshes with
//! flat bone lists and skinning-ready vertices, and animation clips bound to
//! the tree. Each frame [`SkinModel::update`] evaluates the pose into one
//! matrix array per mesh, and [`SkinModel::draw`] hands the meshes to a
//! [`RenderSink`].

pub mod animation;
pub mod assets;
pub mod errors;
pub mod model;
pub mod render;
pub mod resources;
pub mod scene;
pub mod skinning;

pub use animation::{AnimationAction, AnimationClip, AnimationPlayer, Binder, KeyframeTrack, NodeChannel, PoseEvaluator};
#[cfg(feature = "gltf")]
pub use assets::GltfDecoder;
pub use assets::{ImportOptions, ImportReport, ImportScene, ModelImporter, QualityPreset, SceneDecoder};
pub use errors::{Result, SkinError};
pub use model::SkinModel;
pub use render::{CameraView, MeshDraw, RenderSink};
pub use resources::{BoneRef, MaterialParams, SkinMesh, SkinVertex, TextureRef};
pub use scene::{Node, NodeHandle, NodeTree};
pub use skinning::{PaletteExchange, SkinPalette};
