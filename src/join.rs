//! The data join: six normalized collections in, display-ready
//! [`ImageRecord`]s out.
//!
//! ```text
//! images ──┬── exif (image_id) ──┬── camera (camera_id)
//!          │                     └── lens   (lens_id)
//!          ├── series     (series_id)
//!          └── visibility (image_id)
//! ```
//!
//! [`Catalog::new`] builds one id-keyed lookup map per referenced collection
//! (last row wins when an id repeats). Queries are pure reads over those maps;
//! the source tables are never modified and nothing is cached beyond the
//! catalog itself.
//!
//! ## Filters
//!
//! An [`ImageFilter`] narrows the image list in a fixed order:
//! `image_id` → `series_id` → `homepage_only`. Every filter that is set
//! applies, so an `image_id` query for an image outside the requested series
//! finds nothing. `homepage_only` treats an image without a visibility row as
//! hidden.
//!
//! ## Formatting
//!
//! - Focal length: `"50mm"`; cropped-sensor images (`format_id == 1`) get the
//!   full-frame equivalent appended, `"50mm (80.0mm)"`.
//! - Aperture: `"f/2.8"`. Shutter: `"1/200s"`. ISO: the raw number.
//! - Zero or empty values are absent (`None`).

use crate::source::{DataSource, FetchError, load_tables};
use crate::tables::{
    CROPPED_FORMAT_ID, CameraRow, ExifRow, ImageRow, LensRow, Scalar, SeriesRow, Tables,
    VisibilityRow, display_number,
};
use crate::types::{Dimensions, ExifSummary, ImageRecord, SeriesRecord, Visibility};
use std::collections::HashMap;

/// Crop factor used to derive the full-frame equivalent focal length.
pub const CROP_FACTOR: f64 = 1.6;

/// Which images a query should return. The default returns everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageFilter {
    pub image_id: Option<i64>,
    pub series_id: Option<i64>,
    pub homepage_only: bool,
}

impl ImageFilter {
    pub fn image(image_id: i64) -> Self {
        Self {
            image_id: Some(image_id),
            ..Self::default()
        }
    }

    pub fn series(series_id: i64) -> Self {
        Self {
            series_id: Some(series_id),
            ..Self::default()
        }
    }

    pub fn homepage() -> Self {
        Self {
            homepage_only: true,
            ..Self::default()
        }
    }
}

/// Result of a query: a single lookup when the filter named an image id,
/// a list otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    One(Option<ImageRecord>),
    Many(Vec<ImageRecord>),
}

impl ImageData {
    /// Flatten into a list (a miss becomes an empty list).
    pub fn into_vec(self) -> Vec<ImageRecord> {
        match self {
            ImageData::One(record) => record.into_iter().collect(),
            ImageData::Many(records) => records,
        }
    }
}

/// Joined view over one load of the six collections.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: Tables,
    cameras: HashMap<i64, usize>,
    lenses: HashMap<i64, usize>,
    series: HashMap<i64, usize>,
    visibility: HashMap<i64, usize>,
    exif: HashMap<i64, usize>,
}

/// Map each id to the index of the last row carrying it.
fn index_by<T>(rows: &[T], key: impl Fn(&T) -> i64) -> HashMap<i64, usize> {
    rows.iter().enumerate().map(|(i, row)| (key(row), i)).collect()
}

impl Catalog {
    pub fn new(tables: Tables) -> Self {
        Self {
            cameras: index_by(&tables.cameras, |c| c.camera_id),
            lenses: index_by(&tables.lenses, |l| l.lens_id),
            series: index_by(&tables.series, |s| s.series_id),
            visibility: index_by(&tables.visibility, |v| v.image_id),
            exif: index_by(&tables.exif, |e| e.image_id),
            tables,
        }
    }

    /// Fetch all collections from `source` and join them.
    pub fn load(source: &dyn DataSource) -> Result<Self, FetchError> {
        Ok(Self::new(load_tables(source)?))
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    fn camera(&self, id: i64) -> Option<&CameraRow> {
        self.cameras.get(&id).map(|&i| &self.tables.cameras[i])
    }

    fn lens(&self, id: i64) -> Option<&LensRow> {
        self.lenses.get(&id).map(|&i| &self.tables.lenses[i])
    }

    fn series_row(&self, id: i64) -> Option<&SeriesRow> {
        self.series.get(&id).map(|&i| &self.tables.series[i])
    }

    fn visibility_row(&self, image_id: i64) -> Option<&VisibilityRow> {
        self.visibility.get(&image_id).map(|&i| &self.tables.visibility[i])
    }

    fn exif_row(&self, image_id: i64) -> Option<&ExifRow> {
        self.exif.get(&image_id).map(|&i| &self.tables.exif[i])
    }

    fn matches(&self, row: &ImageRow, filter: &ImageFilter) -> bool {
        if filter.image_id.is_some_and(|id| row.image_id != id) {
            return false;
        }
        if filter.series_id.is_some_and(|id| row.series_id != Some(id)) {
            return false;
        }
        if filter.homepage_only
            && !self
                .visibility_row(row.image_id)
                .is_some_and(|v| v.is_visible_homepage)
        {
            return false;
        }
        true
    }

    /// Run a query. Returns [`ImageData::One`] iff `filter.image_id` is set.
    pub fn query(&self, filter: &ImageFilter) -> ImageData {
        let mut matching = self
            .tables
            .images
            .iter()
            .filter(|row| self.matches(row, filter))
            .map(|row| self.enrich(row));

        match filter.image_id {
            Some(_) => ImageData::One(matching.next()),
            None => ImageData::Many(matching.collect()),
        }
    }

    /// All images matching the filter's series/homepage constraints, in source order.
    pub fn images(&self, filter: &ImageFilter) -> Vec<ImageRecord> {
        self.query(filter).into_vec()
    }

    /// Look up one image by id. A miss is `None`, not an error.
    pub fn image(&self, image_id: i64) -> Option<ImageRecord> {
        match self.query(&ImageFilter::image(image_id)) {
            ImageData::One(record) => record,
            ImageData::Many(_) => None,
        }
    }

    /// Series available for listing. Ids ≤ 0 mark "uncategorized" and are skipped.
    pub fn series_list(&self) -> Vec<SeriesRecord> {
        self.tables
            .series
            .iter()
            .filter(|s| s.series_id > 0)
            .map(series_record)
            .collect()
    }

    /// Look up one listed series by id. The uncategorized sentinel is not a
    /// series of its own and is never returned.
    pub fn series(&self, series_id: i64) -> Option<SeriesRecord> {
        self.series_row(series_id)
            .filter(|s| s.series_id > 0)
            .map(series_record)
    }

    fn enrich(&self, row: &ImageRow) -> ImageRecord {
        let exif = self.exif_row(row.image_id);
        let visibility = self.visibility_row(row.image_id);

        ImageRecord {
            image_id: row.image_id,
            src: row.src.clone(),
            thumbnail: row.thumbnail.clone(),
            title: row.title.clone(),
            date: row.date.clone(),
            location: row.location.clone(),
            alt: row.alt.clone(),
            dimensions: Dimensions {
                width: row.width,
                height: row.height,
            },
            series_name: row
                .series_id
                .and_then(|id| self.series_row(id))
                .map(|s| s.series_name.clone())
                .filter(|name| !name.is_empty()),
            series_id: row.series_id,
            exif: exif
                .map(|e| self.summarize_exif(e, row.format_id))
                .unwrap_or_default(),
            visibility: visibility
                .map(|v| Visibility {
                    homepage: v.is_visible_homepage,
                    series: v.is_visible_series,
                })
                .unwrap_or_default(),
        }
    }

    fn summarize_exif(&self, exif: &ExifRow, format_id: Option<i64>) -> ExifSummary {
        ExifSummary {
            camera: exif
                .camera_id
                .and_then(|id| self.camera(id))
                .map(|c| c.camera_name.clone())
                .filter(|name| !name.is_empty()),
            lens: exif
                .lens_id
                .and_then(|id| self.lens(id))
                .map(|l| l.lens_name.clone())
                .filter(|name| !name.is_empty()),
            focal_display: focal_display(
                exif.focallength.as_ref().and_then(Scalar::as_f64),
                format_id,
            ),
            aperture: present(&exif.aperture).map(|a| format!("f/{a}")),
            shutter: present(&exif.shutter).map(|s| format!("{s}s")),
            iso: present(&exif.iso)
                .and_then(Scalar::as_f64)
                .filter(|iso| *iso > 0.0)
                .map(|iso| iso.round() as u32),
        }
    }
}

fn present(value: &Option<Scalar>) -> Option<&Scalar> {
    value.as_ref().filter(|v| v.is_present())
}

fn series_record(row: &SeriesRow) -> SeriesRecord {
    SeriesRecord {
        series_id: row.series_id,
        name: row.series_name.clone(),
        description: row.series_description.clone(),
    }
}

/// Display string for a raw focal length.
///
/// ```text
/// focal_display(Some(50.0), Some(1)) → Some("50mm (80.0mm)")
/// focal_display(Some(50.0), Some(2)) → Some("50mm")
/// focal_display(None, Some(1))       → None
/// ```
pub fn focal_display(focal_length: Option<f64>, format_id: Option<i64>) -> Option<String> {
    let focal = focal_length?;
    let mut display = format!("{}mm", display_number(focal));
    if format_id == Some(CROPPED_FORMAT_ID) {
        display.push_str(&format!(" ({:.1}mm)", focal * CROP_FACTOR));
    }
    Some(display)
}

/// Load every collection from `source`, join, and run one query.
pub fn get_image_data(
    source: &dyn DataSource,
    filter: &ImageFilter,
) -> Result<ImageData, FetchError> {
    Ok(Catalog::load(source)?.query(filter))
}

/// Load the series collection and list the real (id > 0) series.
pub fn get_series_list(source: &dyn DataSource) -> Result<Vec<SeriesRecord>, FetchError> {
    let text = source.fetch("series")?;
    let rows: Vec<SeriesRow> = serde_json::from_str(&text).map_err(|e| FetchError::Json {
        name: "series".to_string(),
        source: e,
    })?;
    Ok(rows
        .iter()
        .filter(|s| s.series_id > 0)
        .map(series_record)
        .collect())
}
