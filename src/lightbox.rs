//! Lightbox controller.
//!
//! Shows one image of a list at full size with its metadata, and pages
//! through the list with wraparound:
//!
//! ```text
//!            open(id)                 close() / backdrop click
//! Closed ──────────────▶ Open(i) ─────────────────────────────▶ Closed
//!                        │   ▲
//!                        └───┘ next() / previous()
//! ```
//!
//! ## Stale loads
//!
//! Each [`Lightbox::display_image`] updates the text fields immediately and
//! returns a [`LoadTicket`] for the full-resolution image. The caller loads
//! the image and hands the result back through [`Lightbox::complete`]. Every
//! display issues a new, strictly increasing token, and `complete` drops any
//! result whose token is no longer the active one. Paging faster than images
//! load therefore never flips the view back to an earlier image. The load
//! itself is never cancelled, only ignored.
//!
//! A failed load is dropped silently: the background preview and metadata
//! of the current image stay as they are.

use crate::loader::{ImageLoader, LoadError, LoadedImage};
use crate::types::{ExifSummary, ImageRecord};
use crate::view::{LazyImage, LightboxView, Page};

/// Mutable position of one lightbox instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightboxSession {
    pub current_index: usize,
    /// Token of the most recent display request.
    pub active_token: u64,
}

/// Handle for the full-image load of one display request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: u64,
    pub image_id: i64,
    pub src: String,
    alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOutcome {
    /// The image replaced the view's content.
    Shown,
    /// A newer display request superseded this one; nothing changed.
    Stale,
    /// The image failed to load; nothing changed.
    Failed,
}

/// What a click on the open lightbox landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    CloseButton,
    Content,
}

#[derive(Debug, Clone)]
pub struct LightboxOptions {
    /// Directory holding the low-resolution background previews.
    pub placeholder_dir: String,
    /// Separator between camera settings.
    pub separator: String,
}

impl Default for LightboxOptions {
    fn default() -> Self {
        Self {
            placeholder_dir: "images/placeholders".to_string(),
            separator: " • ".to_string(),
        }
    }
}

/// Non-empty settings in display order: focal length, aperture, shutter, ISO.
pub fn settings_parts(exif: &ExifSummary) -> Vec<String> {
    [
        exif.focal_display.clone(),
        exif.aperture.clone(),
        exif.shutter.clone(),
        exif.iso.map(|iso| format!("ISO {iso}")),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect()
}

/// Background preview of `record`: its thumbnail's file name under
/// `placeholder_dir`.
pub fn placeholder_url(placeholder_dir: &str, record: &ImageRecord) -> Option<String> {
    record
        .thumbnail_file_name()
        .map(|name| format!("{}/{}", placeholder_dir.trim_end_matches('/'), name))
}

pub struct Lightbox {
    images: Vec<ImageRecord>,
    session: LightboxSession,
    view: LightboxView,
    options: LightboxOptions,
}

impl Lightbox {
    pub fn new(images: Vec<ImageRecord>, options: LightboxOptions) -> Self {
        Self {
            view: LightboxView::new(options.separator.clone()),
            images,
            session: LightboxSession::default(),
            options,
        }
    }

    pub fn session(&self) -> LightboxSession {
        self.session
    }

    pub fn view(&self) -> &LightboxView {
        &self.view
    }

    pub fn is_open(&self) -> bool {
        self.view.active
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.images.get(self.session.current_index)
    }

    /// Open on the image with `image_id`. Unknown ids leave the lightbox as is.
    pub fn open(&mut self, image_id: i64) -> Option<LoadTicket> {
        let index = self.images.iter().position(|img| img.image_id == image_id)?;
        self.session.current_index = index;
        let ticket = self.display_image(index);
        self.view.active = true;
        ticket
    }

    pub fn next(&mut self) -> Option<LoadTicket> {
        self.step(1)
    }

    pub fn previous(&mut self) -> Option<LoadTicket> {
        self.step(-1)
    }

    fn step(&mut self, direction: isize) -> Option<LoadTicket> {
        let len = self.images.len();
        if len == 0 {
            return None;
        }
        let current = self.session.current_index as isize;
        let index = (current + direction).rem_euclid(len as isize) as usize;
        self.session.current_index = index;
        self.display_image(index)
    }

    pub fn close(&mut self) {
        self.view.active = false;
    }

    /// Close on backdrop or close-button clicks; clicks on the content do nothing.
    pub fn click(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Backdrop | ClickTarget::CloseButton => {
                self.close();
                true
            }
            ClickTarget::Content => false,
        }
    }

    /// Show the metadata of the image at `index` and start a new display
    /// request for its full-resolution image.
    pub fn display_image(&mut self, index: usize) -> Option<LoadTicket> {
        let record = self.images.get(index)?;
        self.session.active_token += 1;

        let view = &mut self.view;
        view.title = record.title.clone();
        view.camera = record.exif.camera.clone().unwrap_or_default();
        view.lens = record.exif.lens.clone().unwrap_or_default();
        view.location = record.location.clone();
        view.date = record.date.clone();
        view.settings = settings_parts(&record.exif);
        if let Some(url) = placeholder_url(&self.options.placeholder_dir, record) {
            view.background = Some(url);
        }
        view.image = None;
        view.loaded = false;

        Some(LoadTicket {
            token: self.session.active_token,
            image_id: record.image_id,
            src: record.src.clone(),
            alt: record.alt.clone(),
        })
    }

    /// Apply the result of a ticket's load, unless a newer request superseded it.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: &Result<LoadedImage, LoadError>,
    ) -> DisplayOutcome {
        if ticket.token != self.session.active_token {
            log::debug!(
                "Dropping stale lightbox load for image {} (token {} < {})",
                ticket.image_id,
                ticket.token,
                self.session.active_token
            );
            return DisplayOutcome::Stale;
        }
        match result {
            Ok(_) => {
                self.view.image = Some(LazyImage {
                    src: ticket.src.clone(),
                    alt: ticket.alt.clone(),
                });
                self.view.loaded = true;
                DisplayOutcome::Shown
            }
            Err(e) => {
                log::debug!("Lightbox image {} failed to load: {e}", ticket.image_id);
                DisplayOutcome::Failed
            }
        }
    }

    /// Open on `image_id` and load its image synchronously.
    pub fn open_with(&mut self, loader: &dyn ImageLoader, image_id: i64) -> Option<DisplayOutcome> {
        let ticket = self.open(image_id)?;
        let result = loader.load(&ticket.src);
        Some(self.complete(&ticket, &result))
    }

    /// Ids of the images before and after the current one, with wraparound.
    pub fn neighbours(&self) -> Option<(i64, i64)> {
        let len = self.images.len();
        if len == 0 {
            return None;
        }
        let current = self.session.current_index;
        let prev = &self.images[(current + len - 1) % len];
        let next = &self.images[(current + 1) % len];
        Some((prev.image_id, next.image_id))
    }

    /// Copy the lightbox state onto a page; scroll is locked while open.
    pub fn sync(&self, page: &mut Page) {
        page.scroll_locked = self.view.active;
        page.lightbox = Some(self.view.clone());
    }
}
