use std::path::{Path, PathBuf};

use glam::Vec4;

/// Texture binding of one material slot.
///
/// A slot whose file could not be resolved stays on the placeholder, which
/// the renderer substitutes with its default texture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextureRef {
    #[default]
    Placeholder,
    File(PathBuf),
}

impl TextureRef {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            TextureRef::Placeholder => None,
            TextureRef::File(path) => Some(path),
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, TextureRef::Placeholder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureSlots {
    pub diffuse: TextureRef,
    pub normal_map: TextureRef,
    pub specular: TextureRef,
    pub height_map: TextureRef,
    pub reflection_map: TextureRef,
}

/// Scalar material parameters handed to the shader binder per draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
    pub name: String,
    pub material_index: usize,

    /// Minimum light color
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    /// Glow without light
    pub emissive: Vec4,
    pub opacity: f32,
    pub reflectivity: f32,
    pub shininess: f32,
    /// Specular power
    pub shine_strength: f32,
    /// Normal-map strength
    pub bump_scale: f32,
    pub two_sided: bool,

    pub textures: TextureSlots,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            name: String::from("Default"),
            material_index: 0,
            ambient: Vec4::ONE,
            diffuse: Vec4::ONE,
            specular: Vec4::ONE,
            emissive: Vec4::ONE,
            opacity: 1.0,
            reflectivity: 0.0,
            shininess: 0.0,
            shine_strength: 1.0,
            bump_scale: 0.0,
            two_sided: false,
            textures: TextureSlots::default(),
        }
    }
}
