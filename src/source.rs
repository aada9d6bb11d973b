//! Read-only access to the six JSON collections.
//!
//! A [`DataSource`] hands out the raw text of one named collection. The
//! production source is a directory ([`DirSource`]); tests use an in-memory
//! map. [`load_tables`] fetches all six collections at once and parses them
//! into [`Tables`].
//!
//! ## All or nothing
//!
//! The collections are independent reads, so they are fetched in parallel on
//! the rayon pool. The join needs every one of them: if any fetch or parse
//! fails, the whole load fails with that error and no partial tables are
//! returned. There are no retries.

use crate::tables::{COLLECTIONS, Tables};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Collection not found: {0}")]
    NotFound(String),
    #[error("Failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Provider of raw collection documents, keyed by collection name
/// (`"images"`, `"exif"`, ...).
pub trait DataSource: Sync {
    fn fetch(&self, name: &str) -> Result<String, FetchError>;
}

/// Collections stored as `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl DataSource for DirSource {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        let path = self.path_of(name);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.display().to_string())
            } else {
                FetchError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }
}

fn fetch_json<T: DeserializeOwned>(source: &dyn DataSource, name: &str) -> Result<Vec<T>, FetchError> {
    let text = source.fetch(name)?;
    serde_json::from_str(&text).map_err(|source| FetchError::Json {
        name: name.to_string(),
        source,
    })
}

/// Fetch and parse all six collections in parallel.
pub fn load_tables(source: &dyn DataSource) -> Result<Tables, FetchError> {
    let [images, exif, camera, lens, series, visibility] = COLLECTIONS;

    let ((images, exif), ((cameras, lenses), (series, visibility))) = rayon::join(
        || {
            rayon::join(
                || fetch_json(source, images),
                || fetch_json(source, exif),
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || fetch_json(source, camera),
                        || fetch_json(source, lens),
                    )
                },
                || {
                    rayon::join(
                        || fetch_json(source, series),
                        || fetch_json(source, visibility),
                    )
                },
            )
        },
    );

    let tables = Tables {
        images: images?,
        exif: exif?,
        cameras: cameras?,
        lenses: lenses?,
        series: series?,
        visibility: visibility?,
    };
    log::debug!(
        "Loaded {} images, {} exif rows, {} cameras, {} lenses, {} series, {} visibility rows",
        tables.images.len(),
        tables.exif.len(),
        tables.cameras.len(),
        tables.lenses.len(),
        tables.series.len(),
        tables.visibility.len()
    );
    Ok(tables)
}
