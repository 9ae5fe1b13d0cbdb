use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SkinError};
use crate::resources::vertex::MAX_BONE_INFLUENCES;

/// Post-import mesh optimisation level.
///
/// Every preset only merges or removes data that cannot change the rendered
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualityPreset {
    /// Join identical vertices, drop degenerate triangles, remove
    /// unreferenced vertices.
    MaxQuality,
    /// Join identical vertices and drop degenerate triangles.
    Quality,
    /// Join identical vertices.
    Fast,
    /// Geometry is kept exactly as decoded.
    #[default]
    Custom,
}

impl QualityPreset {
    #[must_use]
    pub fn joins_identical_vertices(self) -> bool {
        !matches!(self, QualityPreset::Custom)
    }

    #[must_use]
    pub fn drops_degenerate_triangles(self) -> bool {
        matches!(self, QualityPreset::Quality | QualityPreset::MaxQuality)
    }

    #[must_use]
    pub fn removes_unreferenced_vertices(self) -> bool {
        matches!(self, QualityPreset::MaxQuality)
    }
}

/// Settings for one import.
///
/// Can be built in code with the `with_*` setters or parsed from JSON; any
/// field missing from the JSON keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Uniform scale applied to the whole scene.
    pub rescale: f32,
    /// Flip triangle winding after import.
    pub reverse_winding: bool,
    /// Seconds appended after each clip before it loops.
    pub loop_pad_seconds: f32,
    /// Blend slots filled per vertex, 1..=4.
    pub max_bone_influences: usize,
    pub preset: QualityPreset,
    /// Root of the source search paths; the working directory when unset.
    pub search_root: Option<PathBuf>,
    /// Fallback directory searched for texture files by file name.
    pub texture_dir: Option<PathBuf>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            rescale: 1.0,
            reverse_winding: false,
            loop_pad_seconds: 0.0,
            max_bone_influences: MAX_BONE_INFLUENCES,
            preset: QualityPreset::default(),
            search_root: None,
            texture_dir: None,
        }
    }
}

impl ImportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates options from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rescale.is_finite() || self.rescale <= 0.0 {
            return Err(SkinError::InvalidOptions(format!(
                "rescale must be a positive finite number, got {}",
                self.rescale
            )));
        }
        if !self.loop_pad_seconds.is_finite() || self.loop_pad_seconds < 0.0 {
            return Err(SkinError::InvalidOptions(format!(
                "loop_pad_seconds must be finite and non-negative, got {}",
                self.loop_pad_seconds
            )));
        }
        if !(1..=MAX_BONE_INFLUENCES).contains(&self.max_bone_influences) {
            return Err(SkinError::InvalidOptions(format!(
                "max_bone_influences must be within 1..={MAX_BONE_INFLUENCES}, got {}",
                self.max_bone_influences
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_rescale(mut self, rescale: f32) -> Self {
        self.rescale = rescale;
        self
    }

    #[must_use]
    pub fn with_reverse_winding(mut self, reverse: bool) -> Self {
        self.reverse_winding = reverse;
        self
    }

    #[must_use]
    pub fn with_loop_pad(mut self, seconds: f32) -> Self {
        self.loop_pad_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_bone_influences(mut self, count: usize) -> Self {
        self.max_bone_influences = count;
        self
    }

    #[must_use]
    pub fn with_preset(mut self, preset: QualityPreset) -> Self {
        self.preset = preset;
        self
    }

    #[must_use]
    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_texture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.texture_dir = Some(dir.into());
        self
    }
}
