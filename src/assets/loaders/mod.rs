//! File format decoders producing an [`ImportScene`](crate::assets::ImportScene).

#[cfg(feature = "gltf")]
pub mod gltf;

#[cfg(feature = "gltf")]
pub use self::gltf::GltfDecoder;
