//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`SkinError`] covers the fatal failure modes of an
//! import:
//! - the source file could not be located after every search-path fallback
//! - the source could not be decoded
//! - the decoded scene is structurally invalid
//!
//! Recoverable binding gaps (an animation channel naming a missing node, a
//! material referencing a missing texture) are *not* errors. They are logged
//! and collected in [`ImportReport`](crate::assets::ImportReport) while the
//! import carries on.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, SkinError>`.
//!
//! ```rust,ignore
//! use myth_skin::errors::{SkinError, Result};
//!
//! fn load_character() -> Result<()> {
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the importer and the pose evaluator.
#[derive(Error, Debug)]
pub enum SkinError {
    // ========================================================================
    // Source Resolution & Decoding
    // ========================================================================
    /// The requested source could not be found at any of the attempted paths.
    #[error("Source not found: {request} (tried: {attempted:?})")]
    SourceNotFound {
        /// The path or file name that was requested
        request: String,
        /// Every path that was checked, in order
        attempted: Vec<PathBuf>,
    },

    /// The source file exists but could not be decoded into a scene.
    #[error("Failed to decode {path}: {message}")]
    Decode {
        /// The resolved file path
        path: PathBuf,
        /// Decoder-provided description
        message: String,
    },

    /// The decoded scene violates a structural requirement
    /// (index out of range, mismatched attribute lengths, ...).
    #[error("Invalid import source: {0}")]
    InvalidSource(String),

    // ========================================================================
    // Configuration
    // ========================================================================
    /// Import options failed validation.
    #[error("Invalid import options: {0}")]
    InvalidOptions(String),

    /// JSON parsing error (import options).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Playback
    // ========================================================================
    /// Requested animation index does not exist on the model.
    #[error("Animation index out of bounds: {index} (model has {count})")]
    AnimationIndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Number of animations on the model
        count: usize,
    },

    // ========================================================================
    // I/O & Format Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    Gltf(String),
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for SkinError {
    fn from(err: gltf::Error) -> Self {
        SkinError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, SkinError>`.
pub type Result<T> = std::result::Result<T, SkinError>;
