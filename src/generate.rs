//! HTML site generation.
//!
//! Takes the joined [`Catalog`], builds every [`Page`] model through
//! [`crate::pages`], and writes the static site.
//!
//! ## Generated Files
//!
//! ```text
//! dist/
//! ├── index.html                  # Homepage grid
//! ├── photo-1.html                # Lightbox permalink, homepage order
//! ├── series.html                 # Series overview cards
//! ├── series-1.html               # Series detail grid
//! ├── series-1-photo-1.html       # Lightbox permalink, series order
//! ├── series-view.html            # ?series_id=N → series-N.html
//! ├── style.css                   # Config colors + layout + static styles
//! ├── portfolio.js                # Full-image pass and lightbox
//! ├── data/catalog.json           # Joined records for reuse
//! └── images/...                  # Asset tree (copied)
//! ```
//!
//! Pages are flat in the output root so that the site-relative image URLs of
//! the catalog resolve from every page.
//!
//! ## Grid Markup
//!
//! Grid markup is the settled model with the full images deferred. Every
//! wrapper carries its image as `data-src` and its caption as
//! `data-title`/`data-date`; the overlay starts at `Loading...` and the
//! wrapper without `loaded`. Items the build saw fail keep the failure text
//! and `data-state="errored"`. The script moves `data-src` to `src` on the
//! pass scheduled by the container's `data-full-pass` and settles each item
//! from the browser's own load events.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors and layout injected from config)
//! - `static/portfolio.js`: Deferred full-image pass and lightbox

use crate::config::{self, SiteConfig};
use crate::join::{Catalog, ImageFilter};
use crate::naming::series_page_name;
use crate::pages::{
    self, HOME_PAGE, HOME_SCOPE, RenderContext, SERIES_LIST_PAGE, series_scope,
};
use crate::types::{ImageRecord, SeriesRecord};
use crate::view::{
    Container, FAILED_TEXT, GridItem, GridItemState, ImageWrapper, LOADING_TEXT, LightboxView,
    Page, Section, SeriesCard, SeriesHeader,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Asset copy error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/portfolio.js");

pub const STYLESHEET: &str = "style.css";
pub const SCRIPT: &str = "portfolio.js";
pub const SERIES_VIEW_PAGE: &str = "series-view.html";
pub const CATALOG_JSON: &str = "data/catalog.json";

/// File extensions copied from the asset tree.
const ASSET_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "avif", "svg", "tif", "tiff", "ico", "woff", "woff2",
];

/// What a [`generate`] run wrote.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// Files written, relative to the output directory, in write order.
    pub files: Vec<String>,
    /// Asset files copied.
    pub assets: usize,
    /// Grid images that loaded at build time (homepage and series pages).
    pub loaded: usize,
    /// Grid images that failed to load at build time.
    pub failed: usize,
    /// Listing pages with the permalinks generated for their images.
    pub pages: Vec<PageEntry>,
}

/// One listing page of the build and the photo pages under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub title: String,
    pub file: String,
    /// `(image title, file)` per permalink, in grid order.
    pub photos: Vec<(String, String)>,
}

impl PageEntry {
    fn new(title: &str, file: &str) -> Self {
        Self {
            title: title.to_string(),
            file: file.to_string(),
            photos: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct CatalogDocument<'a> {
    images: &'a [ImageRecord],
    series: &'a [SeriesRecord],
}

/// Write the whole site into `output_dir`.
///
/// `assets_dir`, when given, is walked for image and font files which are
/// copied with their relative paths; the output directory itself and hidden
/// entries are skipped.
pub fn generate(
    catalog: &Catalog,
    ctx: &RenderContext,
    assets_dir: Option<&Path>,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let config = ctx.config;
    let mut report = GenerateReport::default();
    fs::create_dir_all(output_dir)?;

    write_file(output_dir, STYLESHEET, &stylesheet(config), &mut report)?;
    write_file(output_dir, SCRIPT, JS, &mut report)?;

    // Homepage and its permalinks
    let home = pages::homepage(catalog, ctx);
    report.loaded += home.report.loaded;
    report.failed += home.report.errored;
    write_page(output_dir, HOME_PAGE, &home.page, &home.images, config, &mut report)?;
    let mut entry = PageEntry::new("Home", HOME_PAGE);
    for (name, page) in pages::photo_pages(&home.images, HOME_SCOPE, HOME_PAGE, ctx) {
        write_page(output_dir, &name, &page, &[], config, &mut report)?;
        entry.photos.push((lightbox_title(&page), name));
    }
    report.pages.push(entry);

    // Series overview
    let list = pages::series_list_page(catalog, ctx);
    write_page(output_dir, SERIES_LIST_PAGE, &list, &[], config, &mut report)?;
    report.pages.push(PageEntry::new("Series", SERIES_LIST_PAGE));

    // Series detail pages and their permalinks
    let series = catalog.series_list();
    for s in &series {
        let detail_name = series_page_name(s.series_id);
        let detail = pages::series_detail_page(catalog, s.series_id, ctx);
        report.loaded += detail.report.loaded;
        report.failed += detail.report.errored;
        write_page(output_dir, &detail_name, &detail.page, &detail.images, config, &mut report)?;

        let scope = series_scope(s.series_id);
        let mut entry = PageEntry::new(&s.name, &detail_name);
        for (name, page) in pages::photo_pages(&detail.images, &scope, &detail_name, ctx) {
            write_page(output_dir, &name, &page, &[], config, &mut report)?;
            entry.photos.push((lightbox_title(&page), name));
        }
        report.pages.push(entry);
    }

    let redirect = render_series_redirect(config).into_string();
    write_file(output_dir, SERIES_VIEW_PAGE, &redirect, &mut report)?;

    let images = catalog.images(&ImageFilter::default());
    let document = serde_json::to_string_pretty(&CatalogDocument {
        images: &images,
        series: &series,
    })?;
    fs::create_dir_all(output_dir.join("data"))?;
    write_file(output_dir, CATALOG_JSON, &document, &mut report)?;

    if let Some(dir) = assets_dir {
        report.assets = copy_assets(dir, output_dir)?;
    }

    log::info!(
        "Site generated at {} ({} files, {} assets)",
        output_dir.display(),
        report.files.len(),
        report.assets
    );
    Ok(report)
}

fn lightbox_title(page: &Page) -> String {
    page.lightbox
        .as_ref()
        .map(|view| view.title.clone())
        .unwrap_or_default()
}

fn write_file(
    output_dir: &Path,
    name: &str,
    contents: &str,
    report: &mut GenerateReport,
) -> Result<(), GenerateError> {
    fs::write(output_dir.join(name), contents)?;
    log::debug!("Wrote {name}");
    report.files.push(name.to_string());
    Ok(())
}

fn write_page(
    output_dir: &Path,
    name: &str,
    page: &Page,
    images: &[ImageRecord],
    config: &SiteConfig,
    report: &mut GenerateReport,
) -> Result<(), GenerateError> {
    let html = render_page(page, config, images)?;
    write_file(output_dir, name, &html.into_string(), report)
}

/// Full stylesheet: color and layout variables from config, then the static styles.
pub fn stylesheet(config: &SiteConfig) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&config.colors),
        config::generate_theme_css(&config.theme),
        CSS_STATIC
    )
}

/// Copy image and font files from `src` into `dst`, keeping relative paths.
///
/// Returns the number of files copied.
pub fn copy_assets(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    let output = dst.canonicalize().ok();
    let walker = WalkDir::new(src).into_iter().filter_entry(|entry| {
        let hidden = entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
        let is_output = entry.file_type().is_dir()
            && output
                .as_deref()
                .is_some_and(|out| entry.path().canonicalize().is_ok_and(|p| p == out));
        !hidden && !is_output
    });

    let mut copied = 0;
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_asset(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    log::debug!("Copied {copied} assets from {}", src.display());
    Ok(copied)
}

fn is_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ASSET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image list for the client lightbox, safe to embed in a `<script>` element.
fn page_data_json(images: &[ImageRecord]) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(images)?.replace("</", "<\\/"))
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
///
/// `slow_ms` is the load time above which the browser treats its connection
/// as slow and shows thumbnails before the full images.
fn base_document(
    title: &str,
    body_class: Option<&str>,
    slow_ms: Option<u64>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(STYLESHEET);
            }
            body class=[body_class] data-slow-ms=[slow_ms] {
                (content)
                script src=(SCRIPT) defer {}
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavTarget {
    Home,
    Series,
    None,
}

fn nav_target(page: &Page) -> NavTarget {
    match page.body_class.as_deref() {
        Some("home") => NavTarget::Home,
        Some("series-list") | Some("series-detail") => NavTarget::Series,
        _ => NavTarget::None,
    }
}

/// Renders the site header with title and navigation
fn site_header(title: &str, current: NavTarget) -> Markup {
    html! {
        header.site-header {
            a.site-title href=(HOME_PAGE) { (title) }
            nav.site-nav {
                a.current[current == NavTarget::Home] href=(HOME_PAGE) { "Home" }
                a.current[current == NavTarget::Series] href=(SERIES_LIST_PAGE) { "Series" }
            }
        }
    }
}

/// Renders the footer; the year is filled in by the script.
fn site_footer(config: &SiteConfig) -> Markup {
    html! {
        footer.site-footer {
            "© "
            span #current-year {}
            @if !config.site.author.is_empty() {
                " " (config.site.author)
            }
        }
    }
}

fn item_state_attr(item: &GridItem) -> &'static str {
    match item.state {
        GridItemState::Errored => "errored",
        _ if item.thumbnail.is_some() => "thumbnail",
        _ => "placeholder",
    }
}

fn render_wrapper(wrapper: &ImageWrapper, errored: bool) -> Markup {
    let initial_title = if errored { FAILED_TEXT } else { LOADING_TEXT };
    html! {
        div class=(wrapper.class) {
            img data-src=(wrapper.image.src) alt=(wrapper.image.alt) loading="lazy" decoding="async";
            @if wrapper.overlay.is_some() {
                div.grid-overlay {
                    div.content-overlay {
                        div.hover-overlay-1 {}
                        div.hover-overlay-2 {}
                        div.hover-overlay-3 {}
                        div.hover-overlay-4 {}
                        p.grid-title data-title=(wrapper.caption.title) { (initial_title) }
                        p.grid-date data-date=(wrapper.caption.date) {}
                    }
                }
            }
        }
    }
}

/// Renders one grid item; linked items become anchors.
fn render_item(item: &GridItem) -> Markup {
    let style = format!("--aspect-ratio: {}%", item.aspect_ratio_percent);
    let state = item_state_attr(item);
    let body = html! {
        @if let Some(thumb) = &item.thumbnail {
            div class={ (thumb.class) " blur-thumb" } style={ "background-image: url('" (thumb.url) "')" } {}
        }
        @if let Some(wrapper) = &item.wrapper {
            (render_wrapper(wrapper, item.state == GridItemState::Errored))
        }
    };
    html! {
        @if let Some(href) = &item.href {
            a class=(item.class) href=(href) data-id=(item.image_id) data-thumb=[item.thumbnail_url.as_deref()] data-state=(state) style=(style) {
                (body)
            }
        } @else {
            div class=(item.class) data-id=(item.image_id) data-thumb=[item.thumbnail_url.as_deref()] data-state=(state) style=(style) {
                (body)
            }
        }
    }
}

fn render_container(container: &Container) -> Markup {
    html! {
        div class=(container.class_list()) data-full-pass=[container.full_pass.map(|s| s.attr_value())] {
            @for item in &container.items {
                (render_item(item))
            }
        }
    }
}

fn render_series_header(header: &SeriesHeader) -> Markup {
    html! {
        header.series-header {
            a #navigation-back.navigation-back href=(header.back_href) { "← All series" }
            h1 #series-title { (header.title) }
            p #series-description { (header.description) }
            p #series-photo-count { (header.photo_count) }
        }
    }
}

fn render_card(card: &SeriesCard) -> Markup {
    html! {
        a.series-card-link href=(card.href) {
            div.series-cards-container {
                div class={ "series-card " (card.slug) } {
                    div.series-card-info {
                        div.series-card-title { (card.title) }
                        div.series-card-description { (card.description) }
                        div.series-card-photo-count { (card.photo_count) }
                    }
                    (render_container(&card.grid))
                }
            }
        }
    }
}

fn render_section(section: &Section) -> Markup {
    match section {
        Section::Header(header) => render_series_header(header),
        Section::Grid(container) => render_container(container),
        Section::Cards(cards) => html! {
            div.series {
                @for card in cards {
                    (render_card(card))
                }
            }
        },
    }
}

/// Renders the lightbox. Permalink pages get links, grid pages get buttons
/// wired up by the script.
fn render_lightbox(view: &LightboxView, placeholder_dir: &str) -> Markup {
    let background = view
        .background
        .as_ref()
        .map(|url| format!("--lightbox-bg: url('{url}')"));
    html! {
        div #lightbox.lightbox.active[view.active] data-placeholder-dir=(placeholder_dir) data-separator=(view.separator) {
            div.lightbox-content {
                div #lightbox-image-background.lightbox-image-background style=[background] {}
                @if let Some(links) = &view.links {
                    a #navigation-close.navigation-close href=(links.close) aria-label="Close" { "×" }
                    a #navigation-prev.lightbox-nav.navigation-prev href=(links.prev) aria-label="Previous" { "‹" }
                    a #navigation-next.lightbox-nav.navigation-next href=(links.next) aria-label="Next" { "›" }
                } @else {
                    button #navigation-close.navigation-close type="button" aria-label="Close" { "×" }
                    button #navigation-prev.lightbox-nav.navigation-prev type="button" aria-label="Previous" { "‹" }
                    button #navigation-next.lightbox-nav.navigation-next type="button" aria-label="Next" { "›" }
                }
                div #lightbox-image.lightbox-image.loaded[view.loaded] {
                    @if let Some(image) = &view.image {
                        img src=(image.src) alt=(image.alt) decoding="async";
                    }
                }
                div.lightbox-info {
                    div #title.title { (view.title) }
                    div #camera { (view.camera) }
                    div #lens { (view.lens) }
                    div #location { (view.location) }
                    div #date { (view.date) }
                    div #settings.settings {
                        @for (i, part) in view.settings.iter().enumerate() {
                            @if i > 0 {
                                span.dot { (view.separator) }
                            }
                            span.setting-part { (part) }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a page model. `images` is the list the client lightbox pages
/// through; empty for pages without a client lightbox.
pub fn render_page(
    page: &Page,
    config: &SiteConfig,
    images: &[ImageRecord],
) -> Result<Markup, GenerateError> {
    let data = if images.is_empty() {
        None
    } else {
        Some(page_data_json(images)?)
    };
    let body_class = match (&page.body_class, page.scroll_locked) {
        (Some(class), true) => Some(format!("{class} scroll-locked")),
        (Some(class), false) => Some(class.clone()),
        (None, true) => Some("scroll-locked".to_string()),
        (None, false) => None,
    };

    let content = html! {
        (site_header(&config.site.title, nav_target(page)))
        main {
            @for section in &page.sections {
                (render_section(section))
            }
        }
        @if let Some(view) = &page.lightbox {
            (render_lightbox(view, &config.lightbox.placeholder_dir))
        }
        (site_footer(config))
        @if let Some(json) = data {
            script #page-data type="application/json" { (PreEscaped(json)) }
        }
    };

    Ok(base_document(
        &page.title,
        body_class.as_deref(),
        Some(config.probe.threshold_ms),
        content,
    ))
}

const REDIRECT_JS: &str = "var id = Number(new URLSearchParams(window.location.search).get('series_id')) || 0;\n\
window.location.replace(Number.isInteger(id) && id > 0 ? 'series-' + id + '.html' : 'series.html');";

/// Renders `series-view.html`, which forwards `?series_id=N` to the static
/// detail page of series N and anything else to the overview.
pub fn render_series_redirect(config: &SiteConfig) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (config.site.title) }
                script { (PreEscaped(REDIRECT_JS)) }
            }
            body {
                noscript {
                    a href=(SERIES_LIST_PAGE) { "All series" }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::IdleSchedule;
    use crate::test_helpers::{ScriptedLoader, record, sample_catalog};
    use crate::view::{LazyImage, LightboxLinks, Overlay, ThumbnailLayer};
    use std::time::Duration;
    use tempfile::TempDir;

    fn item(state: GridItemState, href: Option<&str>) -> GridItem {
        GridItem {
            image_id: 7,
            class: "grid-item".to_string(),
            aspect_ratio_percent: 75.0,
            thumbnail_url: Some("images/thumbs/7.jpg".to_string()),
            thumbnail: None,
            wrapper: Some(ImageWrapper {
                class: "blur-load".to_string(),
                loaded: state == GridItemState::Loaded,
                image: LazyImage {
                    src: "images/7.jpg".to_string(),
                    alt: "Seven".to_string(),
                },
                caption: Overlay {
                    title: "Seventh Heaven".to_string(),
                    date: "2024-01-07".to_string(),
                },
                overlay: Some(Overlay::loading()),
            }),
            state,
            href: href.map(str::to_string),
        }
    }

    // =========================================================================
    // Grid markup
    // =========================================================================

    #[test]
    fn item_carries_id_and_aspect_ratio() {
        let html = render_item(&item(GridItemState::Loaded, None)).into_string();
        assert!(html.contains(r#"data-id="7""#));
        assert!(html.contains("--aspect-ratio: 75%"));
        assert!(html.starts_with("<div"));
    }

    #[test]
    fn item_carries_thumbnail_url_for_client_pass() {
        let html = render_item(&item(GridItemState::Placeholder, None)).into_string();
        assert!(html.contains(r#"data-thumb="images/thumbs/7.jpg""#));

        let mut bare = item(GridItemState::Placeholder, None);
        bare.thumbnail_url = None;
        assert!(!render_item(&bare).into_string().contains("data-thumb"));
    }

    #[test]
    fn linked_item_is_anchor() {
        let html = render_item(&item(GridItemState::Loaded, Some("photo-7.html"))).into_string();
        assert!(html.starts_with("<a"));
        assert!(html.contains(r#"href="photo-7.html""#));
    }

    #[test]
    fn wrapper_defers_image_and_starts_loading() {
        let html = render_item(&item(GridItemState::Loaded, None)).into_string();
        assert!(html.contains(r#"data-src="images/7.jpg""#));
        assert!(!html.contains(" src="));
        assert!(html.contains(r#"loading="lazy""#));
        assert!(html.contains(r#"data-title="Seventh Heaven""#));
        assert!(html.contains(LOADING_TEXT));
        assert!(html.contains("hover-overlay-4"));
        assert!(html.contains(r#"class="blur-load""#));
    }

    #[test]
    fn errored_item_keeps_failure_text() {
        let html = render_item(&item(GridItemState::Errored, None)).into_string();
        assert!(html.contains(r#"data-state="errored""#));
        assert!(html.contains(FAILED_TEXT));
    }

    #[test]
    fn thumbnail_layer_sets_background() {
        let mut it = item(GridItemState::ThumbnailShown, None);
        it.thumbnail = Some(ThumbnailLayer {
            class: "blur-load".to_string(),
            url: "images/thumbs/7.jpg".to_string(),
        });
        let html = render_item(&it).into_string();
        assert!(html.contains("background-image: url(&#39;images/thumbs/7.jpg&#39;)")
            || html.contains("background-image: url('images/thumbs/7.jpg')"));
        assert!(html.contains(r#"data-state="thumbnail""#));
    }

    #[test]
    fn container_records_full_pass_schedule() {
        let mut container = Container::new(".series-card-images.coast.series-1");
        container.full_pass = Some(IdleSchedule::Timer(Duration::from_millis(200)));
        let html = render_container(&container).into_string();
        assert!(html.contains(r#"class="series-card-images coast series-1""#));
        assert!(html.contains(r#"data-full-pass="timer:200""#));

        let bare = render_container(&Container::new(".grid")).into_string();
        assert!(!bare.contains("data-full-pass"));
    }

    #[test]
    fn card_has_single_link() {
        let mut grid = Container::new(".series-card-images.coast.series-1");
        grid.items.push(item(GridItemState::Loaded, None));
        let card = SeriesCard {
            series_id: 1,
            href: "series-1.html".to_string(),
            slug: "coast".to_string(),
            title: "Coast".to_string(),
            description: "Shorelines".to_string(),
            photo_count: "1 photo".to_string(),
            grid,
        };
        let html = render_card(&card).into_string();
        assert_eq!(html.matches("<a").count(), 1);
        assert!(html.contains(r#"class="series-card coast""#));
        assert!(html.contains("1 photo"));
    }

    // =========================================================================
    // Lightbox markup
    // =========================================================================

    #[test]
    fn lightbox_settings_joined_with_separator() {
        let mut view = LightboxView::new(" • ");
        view.settings = vec!["50mm".into(), "1/200s".into(), "ISO 400".into()];
        let html = render_lightbox(&view, "images/placeholders").into_string();
        assert_eq!(html.matches(r#"class="dot""#).count(), 2);
        assert_eq!(html.matches("setting-part").count(), 3);
        assert!(html.contains(r#"data-placeholder-dir="images/placeholders""#));
        assert!(!html.contains("active"));
        assert!(html.contains("<button"));
    }

    #[test]
    fn permalink_lightbox_renders_links_and_image() {
        let mut view = LightboxView::new(" • ");
        view.active = true;
        view.loaded = true;
        view.background = Some("images/placeholders/7.jpg".to_string());
        view.image = Some(LazyImage {
            src: "images/7.jpg".to_string(),
            alt: "Seven".to_string(),
        });
        view.links = Some(LightboxLinks {
            prev: "photo-6.html".to_string(),
            next: "photo-8.html".to_string(),
            close: "index.html".to_string(),
        });
        let html = render_lightbox(&view, "images/placeholders").into_string();
        assert!(html.contains(r#"class="lightbox active""#));
        assert!(html.contains(r#"class="lightbox-image loaded""#));
        assert!(html.contains(r#"src="images/7.jpg""#));
        assert!(html.contains(r#"href="photo-6.html""#));
        assert!(html.contains(r#"href="photo-8.html""#));
        assert!(html.contains("--lightbox-bg"));
        assert!(!html.contains("<button"));
    }

    #[test]
    fn lightbox_elements_keep_their_ids() {
        let html = render_lightbox(&LightboxView::new(" • "), "images/placeholders").into_string();
        for id in [
            "lightbox",
            "lightbox-image-background",
            "navigation-close",
            "navigation-prev",
            "navigation-next",
            "lightbox-image",
            "title",
            "camera",
            "lens",
            "settings",
        ] {
            assert!(html.contains(&format!(r#"id="{id}""#)), "missing id {id}");
        }
    }

    // =========================================================================
    // Documents
    // =========================================================================

    #[test]
    fn base_document_includes_doctype_and_assets() {
        let doc = base_document("Test", None, None, html! { p { "test" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(r#"href="style.css""#));
        assert!(doc.contains(r#"src="portfolio.js""#));
    }

    #[test]
    fn render_page_marks_nav_and_scroll_lock() {
        let config = SiteConfig::default();
        let mut page = Page::new("Series · Portfolio");
        page.body_class = Some("series-list".to_string());
        page.scroll_locked = true;
        let html = render_page(&page, &config, &[]).unwrap().into_string();
        assert!(html.contains(r#"class="series-list scroll-locked""#));
        assert_eq!(html.matches(r#"class="current""#).count(), 1);
        assert!(html.contains("current-year"));
        assert!(!html.contains("page-data"));
    }

    #[test]
    fn render_page_sets_slow_threshold_and_ids() {
        let config = SiteConfig::default();
        let mut page = Page::new("Coast");
        page.push(Section::Header(SeriesHeader {
            title: "Coast".to_string(),
            description: "Shorelines".to_string(),
            photo_count: "2 photos".to_string(),
            back_href: "series.html".to_string(),
        }));
        let html = render_page(&page, &config, &[]).unwrap().into_string();
        assert!(html.contains(r#"data-slow-ms="100""#));
        for id in [
            "navigation-back",
            "series-title",
            "series-description",
            "series-photo-count",
            "current-year",
        ] {
            assert!(html.contains(&format!(r#"id="{id}""#)), "missing id {id}");
        }
    }

    #[test]
    fn page_data_is_embedded_and_escaped() {
        let config = SiteConfig::default();
        let mut image = record(1, "</script><b>");
        image.alt = "a".to_string();
        let html = render_page(&Page::new("Home"), &config, &[image])
            .unwrap()
            .into_string();
        assert!(html.contains(r#"id="page-data""#));
        assert!(html.contains(r#"<\/script>"#));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn text_is_escaped() {
        let config = SiteConfig::default();
        let mut page = Page::new("<script>alert('xss')</script>");
        page.push(Section::Header(SeriesHeader {
            title: "<b>bold</b>".to_string(),
            description: String::new(),
            photo_count: "0 photos".to_string(),
            back_href: "series.html".to_string(),
        }));
        let html = render_page(&page, &config, &[]).unwrap().into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn series_redirect_reads_query() {
        let html = render_series_redirect(&SiteConfig::default()).into_string();
        assert!(html.contains("get('series_id')) || 0"));
        assert!(html.contains("'series-' + id + '.html'"));
        assert!(html.contains(r#"href="series.html""#));
    }

    #[test]
    fn stylesheet_starts_with_config_variables() {
        let css = stylesheet(&SiteConfig::default());
        assert!(css.starts_with(":root"));
        assert!(css.contains("--grid-gap"));
        assert!(css.contains(".blur-load.loaded img"));
    }

    // =========================================================================
    // Files
    // =========================================================================

    #[test]
    fn copy_assets_takes_images_and_skips_output() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("images/thumbs")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("images/a.jpg"), b"jpg").unwrap();
        fs::write(root.join("images/thumbs/a.JPG"), b"jpg").unwrap();
        fs::write(root.join("images/notes.txt"), b"text").unwrap();
        fs::write(root.join(".git/logo.png"), b"png").unwrap();

        let out = root.join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("old.png"), b"png").unwrap();

        let copied = copy_assets(root, &out).unwrap();
        assert_eq!(copied, 2);
        assert!(out.join("images/a.jpg").exists());
        assert!(out.join("images/thumbs/a.JPG").exists());
        assert!(!out.join("images/notes.txt").exists());
        assert!(!out.join(".git").exists());
        assert!(!out.join("dist").exists());
    }

    #[test]
    fn generate_writes_every_page() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let loader = ScriptedLoader::new();
        let ctx = RenderContext {
            config: &config,
            loader: &loader,
            slow: false,
        };
        let report = generate(&sample_catalog(), &ctx, None, tmp.path()).unwrap();

        for name in [
            "index.html",
            "photo-1.html",
            "photo-3.html",
            "series.html",
            "series-1.html",
            "series-2.html",
            "series-1-photo-3.html",
            "series-2-photo-2.html",
            "series-view.html",
            "style.css",
            "portfolio.js",
            "data/catalog.json",
        ] {
            assert!(tmp.path().join(name).exists(), "missing {name}");
            assert!(report.files.iter().any(|f| f == name), "unreported {name}");
        }
        assert!(!tmp.path().join("series-0.html").exists());
        assert_eq!(report.loaded, 5);
        assert_eq!(report.failed, 0);

        let listed: Vec<(&str, usize)> = report
            .pages
            .iter()
            .map(|p| (p.file.as_str(), p.photos.len()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("index.html", 2),
                ("series.html", 0),
                ("series-1.html", 2),
                ("series-2.html", 1)
            ]
        );
        assert_eq!(
            report.pages[0].photos[0],
            ("Harbour at Dawn".to_string(), "photo-1.html".to_string())
        );

        let catalog: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join(CATALOG_JSON)).unwrap())
                .unwrap();
        assert_eq!(catalog["images"].as_array().unwrap().len(), 4);
        assert_eq!(catalog["series"].as_array().unwrap().len(), 2);
    }
}
