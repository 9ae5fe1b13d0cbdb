use parking_lot::{RwLock, RwLockReadGuard};
use glam::Mat4;

use crate::model::SkinModel;

/// A snapshot of everything a renderer needs to skin one model for a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinPalette {
    /// Per mesh: the bone matrices in bone-list order.
    pub bone_matrices: Vec<Vec<Mat4>>,
    /// Per mesh: the world matrix to draw it with.
    pub world: Vec<Mat4>,
}

impl SkinPalette {
    /// Copies the model's current shader matrices and per-mesh world matrices.
    #[must_use]
    pub fn capture(model: &SkinModel, world: Mat4) -> Self {
        let mut palette = Self::default();
        palette.recapture(model, world);
        palette
    }

    /// Like [`capture`](Self::capture), reusing this palette's allocations.
    pub fn recapture(&mut self, model: &SkinModel, world: Mat4) {
        let meshes = model.meshes();
        self.bone_matrices.resize_with(meshes.len(), Vec::new);
        self.world.resize(meshes.len(), Mat4::IDENTITY);

        for (i, mesh) in meshes.iter().enumerate() {
            let dst = &mut self.bone_matrices[i];
            dst.clear();
            dst.extend_from_slice(mesh.shader_matrices());
            self.world[i] = model.mesh_world_matrix(i, world);
        }
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.bone_matrices.len()
    }
}

struct Front {
    palette: SkinPalette,
    generation: u64,
}

/// Double buffer between one pose-evaluating producer and any number of
/// render-side readers.
///
/// The producer fills a back buffer it owns, then [`publish`](Self::publish)es
/// it; readers only ever see complete palettes.
pub struct PaletteExchange {
    front: RwLock<Front>,
}

impl Default for PaletteExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteExchange {
    #[must_use]
    pub fn new() -> Self {
        Self {
            front: RwLock::new(Front {
                palette: SkinPalette::default(),
                generation: 0,
            }),
        }
    }

    /// Swaps `back` with the front buffer. On return `back` holds the
    /// previously published palette, ready to be refilled.
    pub fn publish(&self, back: &mut SkinPalette) -> u64 {
        let mut front = self.front.write();
        std::mem::swap(&mut front.palette, back);
        front.generation += 1;
        front.generation
    }

    /// Read access to the most recently published palette.
    pub fn read(&self) -> PaletteGuard<'_> {
        PaletteGuard {
            guard: self.front.read(),
        }
    }

    /// Number of palettes published so far.
    pub fn generation(&self) -> u64 {
        self.front.read().generation
    }
}

/// Read guard over the front palette. Hold it only for the duration of a draw.
pub struct PaletteGuard<'a> {
    guard: RwLockReadGuard<'a, Front>,
}

impl PaletteGuard<'_> {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.guard.generation
    }
}

impl std::ops::Deref for PaletteGuard<'_> {
    type Target = SkinPalette;

    fn deref(&self) -> &SkinPalette {
        &self.guard.palette
    }
}
