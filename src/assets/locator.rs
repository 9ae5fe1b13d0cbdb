use std::path::{Path, PathBuf};

use crate::errors::{Result, SkinError};

/// Resolves a requested model path against a fixed list of search locations.
///
/// For a request `r` under root `R` the candidates are, in order:
/// `R/Content/r`, `R/Assets/r`, `R/r`, then `r` as given.
#[derive(Debug, Clone)]
pub struct AssetLocator {
    root: PathBuf,
}

impl Default for AssetLocator {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetLocator {
    pub const SEARCH_DIRS: [&'static str; 2] = ["Content", "Assets"];

    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate paths for `request`, in search order.
    pub fn candidates(&self, request: impl AsRef<Path>) -> Vec<PathBuf> {
        let request = request.as_ref();
        let mut paths: Vec<PathBuf> = Self::SEARCH_DIRS
            .iter()
            .map(|dir| self.root.join(dir).join(request))
            .collect();
        paths.push(self.root.join(request));
        paths.push(request.to_path_buf());
        paths
    }

    /// First existing candidate for `request`.
    pub fn resolve(&self, request: impl AsRef<Path>) -> Result<PathBuf> {
        let request = request.as_ref();
        let attempted = self.candidates(request);

        for path in &attempted {
            if path.is_file() {
                log::debug!("located {} at {}", request.display(), path.display());
                return Ok(path.clone());
            }
            log::debug!("{} not found", path.display());
        }

        Err(SkinError::SourceNotFound {
            request: request.display().to_string(),
            attempted,
        })
    }
}
