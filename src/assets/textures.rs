use std::path::{Path, PathBuf};

use crate::assets::source::{SourceMaterial, TextureKind};
use crate::resources::material::{TextureRef, TextureSlots};

/// Maps a texture path stored in a model file to a file that exists.
pub trait TextureResolver {
    /// `None` when the texture cannot be found.
    fn resolve(&self, requested: &Path) -> Option<PathBuf>;
}

/// Looks for textures next to the model, then by file name in an optional
/// texture directory.
#[derive(Debug, Clone, Default)]
pub struct FsTextureResolver {
    pub model_dir: PathBuf,
    pub texture_dir: Option<PathBuf>,
}

impl FsTextureResolver {
    pub fn new(model_dir: impl Into<PathBuf>, texture_dir: Option<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            texture_dir,
        }
    }
}

impl TextureResolver for FsTextureResolver {
    fn resolve(&self, requested: &Path) -> Option<PathBuf> {
        let beside_model = self.model_dir.join(requested);
        if beside_model.is_file() {
            return Some(beside_model);
        }

        let dir = self.texture_dir.as_ref()?;
        let in_texture_dir = dir.join(requested.file_name()?);
        in_texture_dir.is_file().then_some(in_texture_dir)
    }
}

/// Resolves every texture of `material` into slots. Returns the slots and the
/// requested paths that could not be found; those slots stay on the
/// placeholder.
pub fn resolve_material_textures(
    material: &SourceMaterial,
    resolver: &dyn TextureResolver,
) -> (TextureSlots, Vec<PathBuf>) {
    let mut slots = TextureSlots::default();
    let mut missing = Vec::new();

    for texture in &material.textures {
        let slot = match texture.kind {
            TextureKind::Diffuse => &mut slots.diffuse,
            TextureKind::Normals => &mut slots.normal_map,
            TextureKind::Specular => &mut slots.specular,
            TextureKind::Height => &mut slots.height_map,
            TextureKind::Reflection => &mut slots.reflection_map,
            TextureKind::Emissive | TextureKind::Other => continue,
        };

        match resolver.resolve(&texture.path) {
            Some(path) => *slot = TextureRef::File(path),
            None => {
                log::warn!(
                    "material '{}': {:?} texture {} not found, using placeholder",
                    material.name,
                    texture.kind,
                    texture.path.display()
                );
                missing.push(texture.path.clone());
            }
        }
    }

    (slots, missing)
}
