//! Image loading as a result-returning operation.
//!
//! Every place that waits on an image (the connection probe, the grid's full
//! image pass, the lightbox) goes through [`ImageLoader`]. A load either
//! yields the decoded dimensions or a [`LoadError`]; there are no callbacks
//! to register, so a loader can never fire twice for the same request.
//!
//! [`FsImageLoader`] resolves site-relative URLs against the asset root on
//! disk. Query strings (cache busters) are ignored, and only the header is
//! decoded.

use crate::types::Dimensions;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Image not found: {0}")]
    NotFound(String),
    #[error("Image failed to decode: {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("Unsupported image URL: {0}")]
    Unsupported(String),
}

/// A successfully loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width as f64,
            height: self.height as f64,
        }
    }
}

/// Loads (fetches and decodes) an image by URL.
///
/// `Sync` so that independent loads can run on the rayon pool.
pub trait ImageLoader: Sync {
    fn load(&self, url: &str) -> Result<LoadedImage, LoadError>;
}

/// Loader for a site whose assets live under `root` on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a site URL to a path under the asset root.
    ///
    /// Returns `None` for remote URLs (`http:`, `data:`, `//host`) and for
    /// paths that try to climb out of the root.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = strip_query(url);
        if path.is_empty() || path.starts_with("//") || path.contains(':') {
            return None;
        }
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, url: &str) -> Result<LoadedImage, LoadError> {
        let path = self
            .resolve(url)
            .ok_or_else(|| LoadError::Unsupported(url.to_string()))?;
        if !path.is_file() {
            return Err(LoadError::NotFound(url.to_string()));
        }
        let (width, height) = image::image_dimensions(&path).map_err(|e| LoadError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(LoadedImage { width, height })
    }
}

/// `images/a.jpg?cb=1#x` → `images/a.jpg`
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
