//! Model import: locating sources, decoding them into an [`ImportScene`] and
//! converting the result into a [`SkinModel`](crate::model::SkinModel).

pub mod importer;
pub mod loaders;
pub mod locator;
pub mod optimize;
pub mod options;
pub mod source;
pub mod textures;

pub use importer::{ImportReport, ModelImporter, UnboundChannel};
#[cfg(feature = "gltf")]
pub use loaders::GltfDecoder;
pub use locator::AssetLocator;
pub use optimize::OptimizeStats;
pub use options::{ImportOptions, QualityPreset};
pub use source::{
    ImportScene, SceneDecoder, SourceAnimation, SourceBone, SourceChannel, SourceKey, SourceMaterial, SourceMesh,
    SourceNode, SourceTexture, TextureKind,
};
pub use textures::{FsTextureResolver, TextureResolver};
