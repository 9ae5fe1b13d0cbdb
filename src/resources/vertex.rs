use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::{UVec4, Vec2, Vec3, Vec4};

/// Maximum number of bones that may influence one vertex.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// The fixed vertex layout consumed by the skinning shader.
///
/// Tightly packed (no padding), so a `&[SkinVertex]` can be handed to a GPU
/// upload as bytes via [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SkinVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    /// Bone slots; unused slots hold bone 0.
    pub blend_indices: UVec4,
    /// Weights matching `blend_indices`; unused slots hold 0.0.
    pub blend_weights: Vec4,
}

impl SkinVertex {
    #[must_use]
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
            ..Default::default()
        }
    }

    /// Occupied `(bone, weight)` slots, i.e. those with a non-zero weight.
    pub fn influences(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.blend_indices
            .to_array()
            .into_iter()
            .zip(self.blend_weights.to_array())
            .filter(|&(_, w)| w != 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexSemantic {
    Position,
    Normal,
    TexCoord,
    Tangent,
    Bitangent,
    BlendIndices,
    BlendWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    Uint32x4,
}

impl VertexFormat {
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 | VertexFormat::Uint32x4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
    pub offset: usize,
}

/// Byte stride of [`SkinVertex`].
pub const SKIN_VERTEX_STRIDE: usize = size_of::<SkinVertex>();

/// Attribute table describing [`SkinVertex`] for the rendering sink.
pub const SKIN_VERTEX_LAYOUT: [VertexAttribute; 7] = [
    VertexAttribute {
        semantic: VertexSemantic::Position,
        format: VertexFormat::Float32x3,
        offset: offset_of!(SkinVertex, position),
    },
    VertexAttribute {
        semantic: VertexSemantic::Normal,
        format: VertexFormat::Float32x3,
        offset: offset_of!(SkinVertex, normal),
    },
    VertexAttribute {
        semantic: VertexSemantic::TexCoord,
        format: VertexFormat::Float32x2,
        offset: offset_of!(SkinVertex, uv),
    },
    VertexAttribute {
        semantic: VertexSemantic::Tangent,
        format: VertexFormat::Float32x3,
        offset: offset_of!(SkinVertex, tangent),
    },
    VertexAttribute {
        semantic: VertexSemantic::Bitangent,
        format: VertexFormat::Float32x3,
        offset: offset_of!(SkinVertex, bitangent),
    },
    VertexAttribute {
        semantic: VertexSemantic::BlendIndices,
        format: VertexFormat::Uint32x4,
        offset: offset_of!(SkinVertex, blend_indices),
    },
    VertexAttribute {
        semantic: VertexSemantic::BlendWeights,
        format: VertexFormat::Float32x4,
        offset: offset_of!(SkinVertex, blend_weights),
    },
];
