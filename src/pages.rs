//! Page composition.
//!
//! Builds the [`Page`] models of the site from a joined [`Catalog`]:
//!
//! | Page              | Images                    | Grid                          |
//! |-------------------|---------------------------|-------------------------------|
//! | homepage          | homepage-visible          | `.grid`, overlays, lightbox   |
//! | series list       | per series, one card each | mini grid per card, no overlay|
//! | series detail     | one series                | `.series-view`, lightbox      |
//! | photo permalink   | one image of a list       | lightbox only, open           |
//!
//! Every grid goes through [`run_grid`], so the three passes and the
//! loaded/errored bookkeeping are the same everywhere.

use crate::config::SiteConfig;
use crate::grid::{GridReport, link_items, run_grid};
use crate::join::{Catalog, ImageFilter};
use crate::lightbox::Lightbox;
use crate::loader::ImageLoader;
use crate::naming::{
    LOADING_PHOTOS, photo_count_label, photo_page_name, series_page_name, series_slug,
};
use crate::types::ImageRecord;
use crate::view::{Container, LightboxLinks, Page, Section, SeriesCard, SeriesHeader};

pub const HOME_GRID: &str = ".grid";
pub const SERIES_GRID: &str = ".series-view";
pub const HOME_PAGE: &str = "index.html";
pub const SERIES_LIST_PAGE: &str = "series.html";
/// Permalink scope of homepage images.
pub const HOME_SCOPE: &str = "photo";

/// Everything a page builder needs besides the catalog.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub loader: &'a dyn ImageLoader,
    /// Result of the connection probe; adds the thumbnail pass.
    pub slow: bool,
}

/// A page model together with the images its grid shows, so permalink pages
/// can be generated for the same list.
pub struct BuiltPage {
    pub page: Page,
    pub images: Vec<ImageRecord>,
    pub report: GridReport,
}

/// Permalink scope of the images of series `series_id`.
pub fn series_scope(series_id: i64) -> String {
    format!("series-{series_id}-photo")
}

/// Selector of the mini grid on a series card. The id keeps two series whose
/// names slug to the same string apart.
pub fn card_selector(slug: &str, series_id: i64) -> String {
    if slug.is_empty() {
        format!(".series-card-images.series-{series_id}")
    } else {
        format!(".series-card-images.{slug}.series-{series_id}")
    }
}

/// `series_id` from a query string: its numeric value, or 0 when the
/// parameter is missing, not a number, or zero.
///
/// ```text
/// "series_id=3"        → 3
/// "?page=2&series_id=7" → 7
/// "series_id=abc"      → 0
/// ""                   → 0
/// ```
pub fn series_id_from_query(query: &str) -> i64 {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == "series_id")
        .and_then(|(_, value)| parse_numeric(value))
        .unwrap_or(0)
}

// Whole numbers only; "2.0" is accepted, "2.5" and non-finite values are not.
fn parse_numeric(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let n: f64 = value.parse().ok()?;
    (n.is_finite() && n.fract() == 0.0).then_some(n as i64)
}

fn page_title(config: &SiteConfig, heading: &str) -> String {
    if heading.is_empty() {
        config.site.title.clone()
    } else {
        format!("{heading} · {}", config.site.title)
    }
}

/// Attach a closed lightbox over `images` so the markup carries it.
fn attach_lightbox(page: &mut Page, images: &[ImageRecord], ctx: &RenderContext) {
    Lightbox::new(images.to_vec(), ctx.config.lightbox.options()).sync(page);
}

/// Homepage: every homepage-visible image in one grid, with a lightbox.
pub fn homepage(catalog: &Catalog, ctx: &RenderContext) -> BuiltPage {
    let images = catalog.images(&ImageFilter::homepage());
    let mut page = Page::new(page_title(ctx.config, ""));
    page.body_class = Some("home".to_string());
    page.push(Section::Grid(Container::new(HOME_GRID)));

    let grid = &ctx.config.grid;
    let options = grid.options(&grid.item_class, grid.use_overlay);
    let report = run_grid(&mut page, &images, HOME_GRID, &options, ctx.loader, ctx.slow);
    link_items(&mut page, HOME_GRID, |id| photo_page_name(HOME_SCOPE, id));
    attach_lightbox(&mut page, &images, ctx);

    log::info!("Homepage: {} images", images.len());
    BuiltPage {
        page,
        images,
        report,
    }
}

/// Series overview: one card per series with its photo count and a small
/// grid of its images. The whole card links to the series detail page, so
/// the card's grid items carry no link of their own.
pub fn series_list_page(catalog: &Catalog, ctx: &RenderContext) -> Page {
    let series = catalog.series_list();
    let mut page = Page::new(page_title(ctx.config, "Series"));
    page.body_class = Some("series-list".to_string());

    let cards = series
        .iter()
        .map(|s| {
            let slug = series_slug(&s.name);
            SeriesCard {
                series_id: s.series_id,
                href: series_page_name(s.series_id),
                grid: Container::new(card_selector(&slug, s.series_id)),
                slug,
                title: s.name.clone(),
                description: s.description.clone(),
                photo_count: LOADING_PHOTOS.to_string(),
            }
        })
        .collect();
    page.push(Section::Cards(cards));

    let grid = &ctx.config.grid;
    let options = grid.options(&grid.series_item_class, false);
    for s in &series {
        let images = catalog.images(&ImageFilter::series(s.series_id));
        let Some(card) = page.card_mut(s.series_id) else {
            continue;
        };
        card.photo_count = photo_count_label(images.len());
        let selector = card.grid.selector.clone();
        run_grid(&mut page, &images, &selector, &options, ctx.loader, ctx.slow);
    }

    log::info!("Series list: {} series", series.len());
    page
}

/// Detail page of one series: header, grid with overlays, lightbox over the
/// series' images.
///
/// An unknown series renders with an empty title and description and
/// `"0 photos"`, like a series that has no images.
pub fn series_detail_page(catalog: &Catalog, series_id: i64, ctx: &RenderContext) -> BuiltPage {
    let images = catalog.images(&ImageFilter::series(series_id));
    let series = catalog.series(series_id);
    let (name, description) = series
        .map(|s| (s.name, s.description))
        .unwrap_or_default();
    if name.is_empty() {
        log::debug!("Series {series_id} not found, rendering empty detail page");
    }

    let mut page = Page::new(page_title(ctx.config, &name));
    page.body_class = Some("series-detail".to_string());
    page.push(Section::Header(SeriesHeader {
        title: name,
        description,
        photo_count: photo_count_label(images.len()),
        back_href: SERIES_LIST_PAGE.to_string(),
    }));
    page.push(Section::Grid(Container::new(SERIES_GRID)));

    let grid = &ctx.config.grid;
    let options = grid.options(&grid.item_class, grid.use_overlay);
    let report = run_grid(&mut page, &images, SERIES_GRID, &options, ctx.loader, ctx.slow);
    let scope = series_scope(series_id);
    link_items(&mut page, SERIES_GRID, |id| photo_page_name(&scope, id));
    attach_lightbox(&mut page, &images, ctx);

    BuiltPage {
        page,
        images,
        report,
    }
}

/// One page per image with the lightbox open on it.
///
/// Previous/next links wrap around `images`; the close link returns to
/// `close_href`. Returns `(file name, page)` pairs in list order.
pub fn photo_pages(
    images: &[ImageRecord],
    scope: &str,
    close_href: &str,
    ctx: &RenderContext,
) -> Vec<(String, Page)> {
    let mut lightbox = Lightbox::new(images.to_vec(), ctx.config.lightbox.options());
    let mut pages = Vec::with_capacity(images.len());

    for image in images {
        if lightbox.open_with(ctx.loader, image.image_id).is_none() {
            continue;
        }
        let Some((prev, next)) = lightbox.neighbours() else {
            continue;
        };

        let mut page = Page::new(page_title(ctx.config, &image.title));
        page.body_class = Some("photo".to_string());
        lightbox.sync(&mut page);
        if let Some(view) = page.lightbox.as_mut() {
            view.links = Some(LightboxLinks {
                prev: photo_page_name(scope, prev),
                next: photo_page_name(scope, next),
                close: close_href.to_string(),
            });
        }
        pages.push((photo_page_name(scope, image.image_id), page));
    }
    pages
}
