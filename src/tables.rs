//! Raw rows of the six normalized JSON collections.
//!
//! Each collection is a JSON array of flat objects that reference each other
//! through integer ids:
//!
//! ```text
//! images.json      image_id, src, thumbnail, title, date, location, alt,
//!                  width, height, series_id, format_id
//! exif.json        image_id, camera_id, lens_id, focallength, aperture, shutter, iso
//! camera.json      camera_id, camera_name
//! lens.json        lens_id, lens_name
//! series.json      series_id, series_name, series_description
//! visibility.json  image_id, is_visible_homepage, is_visible_series
//! ```
//!
//! The files are hand-maintained exports, so the rows are lenient where the
//! data is known to drift: optional text defaults to empty, visibility flags
//! accept `true`/`false` as well as `1`/`0`, and EXIF values accept numbers
//! or strings. Ids stay strict: an id of `"3"` is not the id `3`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Collection names, in the order they are fetched.
pub const COLLECTIONS: [&str; 6] = ["images", "exif", "camera", "lens", "series", "visibility"];

/// `format_id` of images shot on a cropped (APS-C) sensor.
pub const CROPPED_FORMAT_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageRow {
    pub image_id: i64,
    pub src: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alt: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub series_id: Option<i64>,
    #[serde(default)]
    pub format_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExifRow {
    pub image_id: i64,
    #[serde(default)]
    pub camera_id: Option<i64>,
    #[serde(default)]
    pub lens_id: Option<i64>,
    #[serde(default)]
    pub focallength: Option<Scalar>,
    #[serde(default)]
    pub aperture: Option<Scalar>,
    #[serde(default)]
    pub shutter: Option<Scalar>,
    #[serde(default)]
    pub iso: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CameraRow {
    pub camera_id: i64,
    pub camera_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LensRow {
    pub lens_id: i64,
    pub lens_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SeriesRow {
    pub series_id: i64,
    pub series_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub series_description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VisibilityRow {
    pub image_id: i64,
    #[serde(default, deserialize_with = "flag")]
    pub is_visible_homepage: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_visible_series: bool,
}

/// All six collections of one data directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub images: Vec<ImageRow>,
    pub exif: Vec<ExifRow>,
    pub cameras: Vec<CameraRow>,
    pub lenses: Vec<LensRow>,
    pub series: Vec<SeriesRow>,
    pub visibility: Vec<VisibilityRow>,
}

/// An EXIF value that may be stored as a JSON number or a string
/// (`2.8`, `"2.8"`, `"1/200"`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Zero, NaN and empty strings count as "not recorded".
    pub fn is_present(&self) -> bool {
        match self {
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
            Scalar::Text(s) => !s.trim().is_empty(),
        }
    }

    /// Numeric value, parsing strings when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&display_number(*n)),
            Scalar::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// Format a number the way it reads in the data: `50.0` prints as `50`,
/// `35.5` stays `35.5`.
pub fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Visibility flags are exported as booleans by some tools and as 0/1 by others.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        None => false,
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Number(n)) => n != 0.0,
        Some(RawFlag::Text(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
    })
}
