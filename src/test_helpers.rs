//! Shared test utilities for the photofolio test suite.
//!
//! Provides the sample catalog built from `fixtures/json/`, an in-memory
//! [`DataSource`], a scripted [`ImageLoader`], and small record builders.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let catalog = sample_catalog();
//! let images = catalog.images(&ImageFilter::series(1));
//! assert_eq!(image_ids(&images), vec![1, 3]);
//!
//! let loader = ScriptedLoader::new().failing(&images[1].src);
//! ```
//!
//! The fixture holds four images: 1 and 3 in series "Coast" and visible on
//! the homepage, 2 in "Night Streets" and hidden from the homepage, and 4
//! with no series, no EXIF row, and no visibility row.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::join::Catalog;
use crate::loader::{ImageLoader, LoadError, LoadedImage, strip_query};
use crate::source::{DataSource, FetchError, load_tables};
use crate::tables::{COLLECTIONS, Tables};
use crate::types::{Dimensions, ExifSummary, ImageRecord, Visibility};
use crate::view::{Container, Page, Section};

// =========================================================================
// Data sources
// =========================================================================

/// Collections held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    /// All six collections present and empty.
    pub fn empty() -> Self {
        let mut source = Self::default();
        for name in COLLECTIONS {
            source.insert(name, "[]");
        }
        source
    }

    pub fn insert(&mut self, name: &str, text: &str) {
        self.documents.insert(name.to_string(), text.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.documents.remove(name);
    }
}

impl DataSource for MemorySource {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(name.to_string()))
    }
}

/// The six fixture collections from `fixtures/json/`.
pub fn sample_source() -> MemorySource {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/json");
    let mut source = MemorySource::default();
    for name in COLLECTIONS {
        let path = dir.join(format!("{name}.json"));
        let text = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("fixture {} unreadable: {e}", path.display()));
        source.insert(name, &text);
    }
    source
}

pub fn sample_tables() -> Tables {
    load_tables(&sample_source()).unwrap()
}

pub fn sample_catalog() -> Catalog {
    Catalog::new(sample_tables())
}

// =========================================================================
// Records
// =========================================================================

/// A complete landscape record with id-derived URLs
/// (`images/{id}.jpg`, `images/thumbs/{id}-thumb.jpg`).
pub fn record(image_id: i64, title: &str) -> ImageRecord {
    ImageRecord {
        image_id,
        src: format!("images/{image_id}.jpg"),
        thumbnail: format!("images/thumbs/{image_id}-thumb.jpg"),
        title: title.to_string(),
        date: "2024-06-01".to_string(),
        location: "Aberdeen".to_string(),
        alt: format!("Photo of {title}"),
        dimensions: Dimensions {
            width: 3000.0,
            height: 2000.0,
        },
        series_name: None,
        series_id: None,
        exif: ExifSummary {
            camera: Some("Test Camera".to_string()),
            lens: Some("Test Lens".to_string()),
            focal_display: Some("50mm".to_string()),
            aperture: Some("f/4".to_string()),
            shutter: Some("1/125s".to_string()),
            iso: Some(100),
        },
        visibility: Visibility {
            homepage: true,
            series: true,
        },
    }
}

pub fn image_ids(records: &[ImageRecord]) -> Vec<i64> {
    records.iter().map(|r| r.image_id).collect()
}

/// A page with one empty grid container.
pub fn grid_page(selector: &str) -> Page {
    let mut page = Page::new("Test");
    page.push(Section::Grid(Container::new(selector)));
    page
}

// =========================================================================
// Image loading
// =========================================================================

/// Loader that succeeds for every URL except the ones marked failing,
/// optionally after a fixed delay. Records every requested URL.
#[derive(Debug, Default)]
pub struct ScriptedLoader {
    failing: HashSet<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail loads of `url`, with or without a query string.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(strip_query(url).to_string());
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ImageLoader for ScriptedLoader {
    fn load(&self, url: &str) -> Result<LoadedImage, LoadError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if self.failing.contains(strip_query(url)) {
            return Err(LoadError::NotFound(url.to_string()));
        }
        Ok(LoadedImage {
            width: 3,
            height: 2,
        })
    }
}
