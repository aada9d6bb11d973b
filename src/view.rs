//! Page view model.
//!
//! A [`Page`] is the document a browser would build, expressed as typed data:
//! grid containers with their items, series cards, and the lightbox. The grid
//! pipeline and the lightbox controller only ever mutate this model; the site
//! writer renders it to HTML afterwards. Nothing reads state back out of the
//! rendered markup, so the model stays the single source of truth and the
//! markup is only a projection of it.
//!
//! Grid items are addressed by `image_id`, never by position.

use crate::grid::IdleSchedule;

/// Sentinel overlay title shown until the full image has loaded.
pub const LOADING_TEXT: &str = "Loading...";
/// Overlay title shown when the full image fails to load.
pub const FAILED_TEXT: &str = "Failed to load image";

/// Lifecycle of one grid item. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridItemState {
    Placeholder,
    ThumbnailShown,
    Loaded,
    Errored,
}

impl GridItemState {
    pub fn is_settled(self) -> bool {
        matches!(self, GridItemState::Loaded | GridItemState::Errored)
    }
}

/// An `<img>` that the browser loads lazily and decodes off the main thread.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyImage {
    pub src: String,
    pub alt: String,
}

/// Title/date text shown over a grid image on hover.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub title: String,
    pub date: String,
}

impl Overlay {
    pub fn loading() -> Self {
        Self {
            title: LOADING_TEXT.to_string(),
            date: String::new(),
        }
    }
}

/// Blurred low-resolution background layer of a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailLayer {
    pub class: String,
    pub url: String,
}

/// Wrapper around the full-resolution image. Marked `loaded` once the image
/// decodes, which triggers the blur-to-sharp transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageWrapper {
    pub class: String,
    pub loaded: bool,
    pub image: LazyImage,
    /// Title and date the overlay switches to once the image has loaded.
    pub caption: Overlay,
    pub overlay: Option<Overlay>,
}

/// One placeholder in a grid, sized by its aspect ratio before any image loads.
#[derive(Debug, Clone, PartialEq)]
pub struct GridItem {
    pub image_id: i64,
    pub class: String,
    pub aspect_ratio_percent: f64,
    /// Thumbnail URL the browser uses when its own connection check finds
    /// the connection slow.
    pub thumbnail_url: Option<String>,
    pub thumbnail: Option<ThumbnailLayer>,
    pub wrapper: Option<ImageWrapper>,
    pub state: GridItemState,
    /// Target of the item's link (lightbox permalink).
    pub href: Option<String>,
}

/// A grid container, identified by its CSS selector (`.grid`,
/// `.series-card-images.coast`).
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub selector: String,
    pub items: Vec<GridItem>,
    pub full_pass: Option<IdleSchedule>,
}

impl Container {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            items: Vec::new(),
            full_pass: None,
        }
    }

    /// Class attribute for the container element (`.a.b` → `a b`).
    pub fn class_list(&self) -> String {
        self.selector
            .split('.')
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn item(&self, image_id: i64) -> Option<&GridItem> {
        self.items.iter().find(|i| i.image_id == image_id)
    }

    pub fn item_mut(&mut self, image_id: i64) -> Option<&mut GridItem> {
        self.items.iter_mut().find(|i| i.image_id == image_id)
    }
}

/// Title block of a series detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesHeader {
    pub title: String,
    pub description: String,
    pub photo_count: String,
    pub back_href: String,
}

/// One card on the series overview page.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCard {
    pub series_id: i64,
    pub href: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub photo_count: String,
    pub grid: Container,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Header(SeriesHeader),
    Grid(Container),
    Cards(Vec<SeriesCard>),
}

/// Links shown in a static lightbox permalink page.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxLinks {
    pub prev: String,
    pub next: String,
    pub close: String,
}

/// State of the lightbox overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxView {
    pub active: bool,
    pub title: String,
    pub camera: String,
    pub lens: String,
    pub location: String,
    pub date: String,
    /// Non-empty camera settings, rendered joined by `separator`.
    pub settings: Vec<String>,
    pub separator: String,
    /// Low-resolution background shown while the full image loads.
    pub background: Option<String>,
    pub image: Option<LazyImage>,
    pub loaded: bool,
    pub links: Option<LightboxLinks>,
}

impl LightboxView {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            active: false,
            title: String::new(),
            camera: String::new(),
            lens: String::new(),
            location: String::new(),
            date: String::new(),
            settings: Vec::new(),
            separator: separator.into(),
            background: None,
            image: None,
            loaded: false,
            links: None,
        }
    }

    /// Settings joined into one line (`50mm • 1/200s • ISO 400`).
    pub fn settings_line(&self) -> String {
        self.settings.join(&self.separator)
    }
}

/// A whole page: sections in document order plus the optional lightbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub body_class: Option<String>,
    /// Page scroll is locked while the lightbox is open.
    pub scroll_locked: bool,
    pub sections: Vec<Section>,
    pub lightbox: Option<LightboxView>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body_class: None,
            scroll_locked: false,
            sections: Vec::new(),
            lightbox: None,
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Find a grid container by selector, including the mini grids inside
    /// series cards.
    pub fn container(&self, selector: &str) -> Option<&Container> {
        self.sections.iter().find_map(|section| match section {
            Section::Grid(c) if c.selector == selector => Some(c),
            Section::Cards(cards) => cards
                .iter()
                .map(|card| &card.grid)
                .find(|c| c.selector == selector),
            _ => None,
        })
    }

    pub fn container_mut(&mut self, selector: &str) -> Option<&mut Container> {
        self.sections.iter_mut().find_map(|section| match section {
            Section::Grid(c) if c.selector == selector => Some(c),
            Section::Cards(cards) => cards
                .iter_mut()
                .map(|card| &mut card.grid)
                .find(|c| c.selector == selector),
            _ => None,
        })
    }

    pub fn card_mut(&mut self, series_id: i64) -> Option<&mut SeriesCard> {
        self.sections.iter_mut().find_map(|section| match section {
            Section::Cards(cards) => cards.iter_mut().find(|c| c.series_id == series_id),
            _ => None,
        })
    }

    pub fn header(&self) -> Option<&SeriesHeader> {
        self.sections.iter().find_map(|section| match section {
            Section::Header(h) => Some(h),
            _ => None,
        })
    }
}
