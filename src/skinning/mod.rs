//! Vertex skinning data preparation: bone weights, tangent frames and the
//! cross-thread bone matrix palette.

pub mod palette;
pub mod tangents;
pub mod weights;

pub use palette::{PaletteExchange, PaletteGuard, SkinPalette};
pub use tangents::{TangentStats, reconstruct_tangents};
pub use weights::{BlendSlots, VertexWeight, WeightStats, apply_blend_slots, assign_weights};
