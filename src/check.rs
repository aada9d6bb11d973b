//! Catalog validation against the asset tree.
//!
//! Used by the `check` command: counts what the join produced and loads every
//! image, thumbnail and lightbox placeholder once through the [`ImageLoader`]
//! to find assets that are missing or undecodable, and images whose shape
//! disagrees with the stored dimensions. Nothing is written.

use crate::join::{Catalog, ImageFilter};
use crate::lightbox::placeholder_url;
use crate::loader::{ImageLoader, LoadError};
use crate::types::{Dimensions, ImageRecord, SeriesRecord};
use rayon::prelude::*;

/// Largest tolerated difference between stored and on-disk aspect ratio, in
/// percentage points of `height / width * 100`. Stored sizes are often those
/// of the original while the site serves a downscaled copy.
pub const ASPECT_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum AssetIssue {
    /// Stored width or height is not positive; the grid skips the image.
    InvalidDimensions(Dimensions),
    /// The full image could not be loaded.
    Image(LoadError),
    /// The thumbnail could not be loaded.
    Thumbnail(LoadError),
    /// The lightbox placeholder could not be loaded.
    Placeholder(LoadError),
    /// The file's shape disagrees with the stored dimensions.
    AspectMismatch { stored: f64, actual: f64 },
}

impl std::fmt::Display for AssetIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetIssue::InvalidDimensions(d) => {
                write!(f, "invalid dimensions {}x{}", d.width, d.height)
            }
            AssetIssue::Image(e) => write!(f, "{e}"),
            AssetIssue::Thumbnail(e) => write!(f, "thumbnail: {e}"),
            AssetIssue::Placeholder(e) => write!(f, "placeholder: {e}"),
            AssetIssue::AspectMismatch { stored, actual } => write!(
                f,
                "aspect ratio {stored:.1}% in data, {actual:.1}% on disk"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageIssue {
    pub image_id: i64,
    pub title: String,
    pub issue: AssetIssue,
}

/// What `check` reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    /// Real series with their image counts, in source order.
    pub series: Vec<(SeriesRecord, usize)>,
    pub images: usize,
    pub homepage: usize,
    /// Images without a known series.
    pub unassigned: usize,
    /// Problems in image order; an image may appear more than once.
    pub issues: Vec<ImageIssue>,
}

fn check_image(
    image: &ImageRecord,
    loader: &dyn ImageLoader,
    placeholder_dir: &str,
) -> Vec<AssetIssue> {
    let mut issues = Vec::new();
    if !image.dimensions.is_valid() {
        issues.push(AssetIssue::InvalidDimensions(image.dimensions));
    }
    match loader.load(&image.src) {
        Ok(loaded) => {
            if image.dimensions.is_valid() {
                let stored = image.dimensions.aspect_ratio_percent();
                let actual = loaded.dimensions().aspect_ratio_percent();
                if (stored - actual).abs() > ASPECT_TOLERANCE {
                    issues.push(AssetIssue::AspectMismatch { stored, actual });
                }
            }
        }
        Err(e) => issues.push(AssetIssue::Image(e)),
    }
    if let Some(Err(e)) = image.thumbnail().map(|t| loader.load(t)) {
        issues.push(AssetIssue::Thumbnail(e));
    }
    if let Some(Err(e)) = placeholder_url(placeholder_dir, image).map(|url| loader.load(&url)) {
        issues.push(AssetIssue::Placeholder(e));
    }
    issues
}

/// Count the catalog and load every asset once. Loads run in parallel.
///
/// Placeholders are looked up under `placeholder_dir`, the lightbox's
/// configured directory.
pub fn check_catalog(
    catalog: &Catalog,
    loader: &dyn ImageLoader,
    placeholder_dir: &str,
) -> Inventory {
    let images = catalog.images(&ImageFilter::default());
    let series: Vec<_> = catalog
        .series_list()
        .into_iter()
        .map(|s| {
            let count = images
                .iter()
                .filter(|img| img.series_id == Some(s.series_id))
                .count();
            (s, count)
        })
        .collect();

    let unassigned = images
        .iter()
        .filter(|img| img.series_name.is_none())
        .count();
    let homepage = images.iter().filter(|img| img.visibility.homepage).count();

    let issues = images
        .par_iter()
        .map(|image| {
            check_image(image, loader, placeholder_dir)
                .into_iter()
                .map(|issue| ImageIssue {
                    image_id: image.image_id,
                    title: image.title.clone(),
                    issue,
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    Inventory {
        series,
        images: images.len(),
        homepage,
        unassigned,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedLoader, sample_catalog};

    const PLACEHOLDERS: &str = "images/placeholders";

    #[test]
    fn counts_series_and_visibility() {
        let inventory = check_catalog(&sample_catalog(), &ScriptedLoader::new(), PLACEHOLDERS);
        assert_eq!(inventory.images, 4);
        assert_eq!(inventory.homepage, 2);
        assert_eq!(inventory.unassigned, 1);
        let counts: Vec<(&str, usize)> = inventory
            .series
            .iter()
            .map(|(s, n)| (s.name.as_str(), *n))
            .collect();
        assert_eq!(counts, vec![("Coast", 2), ("Night Streets", 1)]);
    }

    #[test]
    fn reports_missing_images_and_thumbnails() {
        let catalog = sample_catalog();
        let two = catalog.image(2).unwrap();
        let loader = ScriptedLoader::new()
            .failing(&two.src)
            .failing(&two.thumbnail);
        let inventory = check_catalog(&catalog, &loader, PLACEHOLDERS);

        let for_two: Vec<&AssetIssue> = inventory
            .issues
            .iter()
            .filter(|i| i.image_id == 2)
            .map(|i| &i.issue)
            .collect();
        assert_eq!(for_two.len(), 2);
        assert!(matches!(for_two[0], AssetIssue::Image(LoadError::NotFound(_))));
        assert!(matches!(for_two[1], AssetIssue::Thumbnail(_)));
    }

    #[test]
    fn reports_missing_placeholder() {
        let catalog = sample_catalog();
        let one = catalog.image(1).unwrap();
        let name = one.thumbnail_file_name().unwrap();
        let loader = ScriptedLoader::new().failing(&format!("images/placeholders/{name}"));
        let inventory = check_catalog(&catalog, &loader, "images/placeholders/");

        let placeholders: Vec<&ImageIssue> = inventory
            .issues
            .iter()
            .filter(|i| matches!(i.issue, AssetIssue::Placeholder(_)))
            .collect();
        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].image_id, 1);
    }

    #[test]
    fn reports_aspect_mismatch() {
        // The scripted loader answers 3x2 for every image; image 1 is 3000x2000
        let inventory = check_catalog(&sample_catalog(), &ScriptedLoader::new(), PLACEHOLDERS);
        let ids: Vec<i64> = inventory
            .issues
            .iter()
            .filter(|i| matches!(i.issue, AssetIssue::AspectMismatch { .. }))
            .map(|i| i.image_id)
            .collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn issue_display() {
        let issue = AssetIssue::AspectMismatch {
            stored: 75.0,
            actual: 66.666,
        };
        assert_eq!(issue.to_string(), "aspect ratio 75.0% in data, 66.7% on disk");
        let issue = AssetIssue::Image(LoadError::NotFound("images/a.jpg".into()));
        assert_eq!(issue.to_string(), "Image not found: images/a.jpg");
        let issue = AssetIssue::Placeholder(LoadError::NotFound("images/placeholders/a.jpg".into()));
        assert_eq!(
            issue.to_string(),
            "placeholder: Image not found: images/placeholders/a.jpg"
        );
    }
}
