//! Progressive image grid.
//!
//! A grid is filled in three passes over a container of the [`Page`] model:
//!
//! ```text
//! 1. create_placeholders   one item per record, sized by aspect ratio
//! 2. append_thumbnails     blurred low-res background   (slow connections only)
//! 3. render_full_images    lazy full image + overlay    → PendingLoad per item
//!    finish_load           Loaded (sharp, overlay text) | Errored (failure text)
//! ```
//!
//! Every pass matches items to records by `image_id`. Item order is fixed in
//! pass 1 and never depends on the order in which loads complete, because each
//! item exists before any load starts.
//!
//! The full-image pass is deferred in the browser so it does not compete with
//! first paint: an idle callback where the host has one, a fixed timer
//! otherwise. The choice is recorded on the container as an [`IdleSchedule`].

use crate::loader::{ImageLoader, LoadError, LoadedImage};
use crate::types::ImageRecord;
use crate::view::{
    FAILED_TEXT, GridItem, GridItemState, ImageWrapper, LazyImage, Overlay, Page, ThumbnailLayer,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

/// Fallback delay for the full-image pass when no idle callback exists.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(200);

/// When the full-image pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleSchedule {
    IdleCallback,
    Timer(Duration),
}

impl IdleSchedule {
    /// Value of the `data-full-pass` attribute read by the client script.
    pub fn attr_value(&self) -> String {
        match self {
            IdleSchedule::IdleCallback => "idle".to_string(),
            IdleSchedule::Timer(delay) => format!("timer:{}", delay.as_millis()),
        }
    }
}

/// Prefer the host's idle callback, fall back to a timer.
pub fn schedule_full_pass(idle_available: bool, fallback: Duration) -> IdleSchedule {
    if idle_available {
        IdleSchedule::IdleCallback
    } else {
        IdleSchedule::Timer(fallback)
    }
}

/// An outstanding full-image load for one grid item.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLoad {
    pub container: String,
    pub image_id: i64,
    pub src: String,
}

/// Pass 1: append one placeholder per image, in input order.
///
/// Returns the number of placeholders created. Does nothing when the
/// container does not exist. Images with non-positive dimensions and ids
/// already present in the container are skipped.
pub fn create_placeholders(
    page: &mut Page,
    images: &[ImageRecord],
    container: &str,
    item_class: &str,
) -> usize {
    let Some(grid) = page.container_mut(container) else {
        log::debug!("No container {container}, skipping placeholders");
        return 0;
    };

    let mut created = 0;
    for image in images {
        if !image.dimensions.is_valid() {
            log::warn!(
                "Image {} has invalid dimensions {}x{}, not placing it",
                image.image_id,
                image.dimensions.width,
                image.dimensions.height
            );
            continue;
        }
        if grid.item(image.image_id).is_some() {
            continue;
        }
        grid.items.push(GridItem {
            image_id: image.image_id,
            class: item_class.to_string(),
            aspect_ratio_percent: image.dimensions.aspect_ratio_percent(),
            thumbnail_url: image.thumbnail().map(str::to_string),
            thumbnail: None,
            wrapper: None,
            state: GridItemState::Placeholder,
            href: None,
        });
        created += 1;
    }
    created
}

/// Point every item of `container` at the URL produced by `href`.
pub fn link_items(page: &mut Page, container: &str, href: impl Fn(i64) -> String) {
    if let Some(grid) = page.container_mut(container) {
        for item in &mut grid.items {
            item.href = Some(href(item.image_id));
        }
    }
}

fn by_id(images: &[ImageRecord]) -> HashMap<i64, &ImageRecord> {
    images.iter().map(|img| (img.image_id, img)).collect()
}

/// Pass 2: give each placeholder whose image has a thumbnail a blurred
/// background layer. Returns the number of layers added.
pub fn append_thumbnails(
    page: &mut Page,
    images: &[ImageRecord],
    container: &str,
    item_class: &str,
    blur_class: &str,
) -> usize {
    let Some(grid) = page.container_mut(container) else {
        return 0;
    };
    let records = by_id(images);

    let mut added = 0;
    for item in grid.items.iter_mut().filter(|i| i.class == item_class) {
        if item.thumbnail.is_some() {
            continue;
        }
        let Some(url) = records.get(&item.image_id).and_then(|r| r.thumbnail()) else {
            continue;
        };
        item.thumbnail = Some(ThumbnailLayer {
            class: blur_class.to_string(),
            url: url.to_string(),
        });
        if item.state == GridItemState::Placeholder {
            item.state = GridItemState::ThumbnailShown;
        }
        added += 1;
    }
    added
}

/// Pass 3: insert the full-resolution image (and optional overlay) into every
/// placeholder of class `placeholder_class`.
///
/// Returns one [`PendingLoad`] per inserted image; feed each result back
/// through [`finish_load`]. Items that already hold an image are skipped, so
/// calling this twice never registers a second load.
pub fn render_full_images(
    page: &mut Page,
    images: &[ImageRecord],
    container: &str,
    placeholder_class: &str,
    blur_class: &str,
    use_overlay: bool,
) -> Vec<PendingLoad> {
    let Some(grid) = page.container_mut(container) else {
        return Vec::new();
    };
    let records = by_id(images);

    let mut pending = Vec::new();
    for item in grid.items.iter_mut().filter(|i| i.class == placeholder_class) {
        if item.wrapper.is_some() {
            continue;
        }
        let Some(record) = records.get(&item.image_id) else {
            continue;
        };
        item.wrapper = Some(ImageWrapper {
            class: blur_class.to_string(),
            loaded: false,
            image: LazyImage {
                src: record.src.clone(),
                alt: record.alt.clone(),
            },
            caption: Overlay {
                title: record.title.clone(),
                date: record.date.clone(),
            },
            overlay: use_overlay.then(Overlay::loading),
        });
        pending.push(PendingLoad {
            container: container.to_string(),
            image_id: record.image_id,
            src: record.src.clone(),
        });
    }
    pending
}

/// Apply the outcome of one full-image load.
///
/// Success marks the wrapper loaded and fills the overlay with title and
/// date; failure puts the failure text in the overlay title and leaves the
/// wrapper unloaded. Returns `false` when the item is gone or already settled.
pub fn finish_load(
    page: &mut Page,
    load: &PendingLoad,
    result: &Result<LoadedImage, LoadError>,
) -> bool {
    let Some(item) = page
        .container_mut(&load.container)
        .and_then(|grid| grid.item_mut(load.image_id))
    else {
        return false;
    };
    if item.state.is_settled() {
        return false;
    }
    let Some(wrapper) = item.wrapper.as_mut() else {
        return false;
    };

    match result {
        Ok(_) => {
            wrapper.loaded = true;
            if let Some(overlay) = wrapper.overlay.as_mut() {
                *overlay = wrapper.caption.clone();
            }
            item.state = GridItemState::Loaded;
        }
        Err(e) => {
            log::warn!("Grid image {} failed to load: {e}", load.image_id);
            if let Some(overlay) = wrapper.overlay.as_mut() {
                overlay.title = FAILED_TEXT.to_string();
            }
            item.state = GridItemState::Errored;
        }
    }
    true
}

/// Class names and flags for one run of the pipeline.
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub item_class: String,
    pub blur_class: String,
    pub use_overlay: bool,
    pub schedule: IdleSchedule,
}

/// Counts of settled items after [`run_grid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridReport {
    pub placed: usize,
    pub thumbnails: usize,
    pub loaded: usize,
    pub errored: usize,
}

/// Run all three passes on `container`, loading full images with `loader`.
///
/// Loads run in parallel; their results are applied one by one on the
/// calling thread.
pub fn run_grid(
    page: &mut Page,
    images: &[ImageRecord],
    container: &str,
    options: &GridOptions,
    loader: &dyn ImageLoader,
    slow: bool,
) -> GridReport {
    let mut report = GridReport {
        placed: create_placeholders(page, images, container, &options.item_class),
        ..GridReport::default()
    };

    if slow {
        report.thumbnails = append_thumbnails(
            page,
            images,
            container,
            &options.item_class,
            &options.blur_class,
        );
    }

    if let Some(grid) = page.container_mut(container) {
        grid.full_pass = Some(options.schedule);
    }
    let pending = render_full_images(
        page,
        images,
        container,
        &options.item_class,
        &options.blur_class,
        options.use_overlay,
    );

    let results: Vec<_> = pending
        .par_iter()
        .map(|load| loader.load(&load.src))
        .collect();

    for (load, result) in pending.iter().zip(&results) {
        if finish_load(page, load, result) {
            match result {
                Ok(_) => report.loaded += 1,
                Err(_) => report.errored += 1,
            }
        }
    }

    log::debug!(
        "Grid {container}: {} placed, {} thumbnails, {} loaded, {} failed",
        report.placed,
        report.thumbnails,
        report.loaded,
        report.errored
    );
    report
}
