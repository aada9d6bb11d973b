//! Display-ready records produced by the join.
//!
//! These types are what every renderer consumes and what the site writer
//! serializes into `data/catalog.json` for the client script, so field names
//! stay stable across releases.

use serde::{Deserialize, Serialize};

/// Stored pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Height as a percentage of width, used as the placeholder's padding ratio.
    pub fn aspect_ratio_percent(&self) -> f64 {
        self.height / self.width * 100.0
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Formatted camera settings of one image. Absent values are `None`, never
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifSummary {
    pub camera: Option<String>,
    pub lens: Option<String>,
    /// `"50mm"`, or `"50mm (80.0mm)"` for cropped-sensor formats.
    pub focal_display: Option<String>,
    /// `"f/2.8"`
    pub aperture: Option<String>,
    /// `"1/200s"`
    pub shutter: Option<String>,
    pub iso: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub homepage: bool,
    pub series: bool,
}

/// One image joined with its EXIF, camera, lens, series and visibility rows.
///
/// Built once per load and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_id: i64,
    pub src: String,
    /// Low-resolution preview URL. Empty when the image has none.
    pub thumbnail: String,
    pub title: String,
    pub date: String,
    pub location: String,
    pub alt: String,
    pub dimensions: Dimensions,
    pub series_name: Option<String>,
    /// Raw `series_id` of the source row, kept for scoping pages.
    pub series_id: Option<i64>,
    pub exif: ExifSummary,
    pub visibility: Visibility,
}

impl ImageRecord {
    pub fn thumbnail(&self) -> Option<&str> {
        Some(self.thumbnail.as_str()).filter(|t| !t.is_empty())
    }

    /// File name of the thumbnail (`images/thumbs/a.jpg` → `a.jpg`).
    pub fn thumbnail_file_name(&self) -> Option<&str> {
        self.thumbnail()
            .and_then(|t| t.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// A series as listed on the series overview page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub series_id: i64,
    pub name: String,
    pub description: String,
}
