//! Mesh, material and vertex data of an imported model.

pub mod material;
pub mod mesh;
pub mod vertex;

pub use material::{MaterialParams, TextureRef, TextureSlots};
pub use mesh::{BoneRef, BoundingBox, SkinMesh};
pub use vertex::{
    MAX_BONE_INFLUENCES, SKIN_VERTEX_LAYOUT, SKIN_VERTEX_STRIDE, SkinVertex, VertexAttribute,
    VertexFormat, VertexSemantic,
};
