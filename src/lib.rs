//! # Photofolio
//!
//! A static site generator for photography portfolios backed by a small JSON
//! catalog. Six collections (images, EXIF, cameras, lenses, series, homepage
//! visibility) are joined into display records, and the site is rendered as
//! plain HTML with a progressive image grid, a lightbox and series pages.
//!
//! # Architecture: Load, Join, Render
//!
//! ```text
//! 1. Load      json/*.json  →  Tables         (six collections, fetched in parallel)
//! 2. Join      Tables       →  Catalog        (display-ready ImageRecords)
//! 3. Render    Catalog      →  dist/          (pages, permalinks, catalog.json)
//! ```
//!
//! Rendering does not write HTML directly. Page builders produce a typed
//! [`view::Page`] model, the grid and lightbox mutate that model the way the
//! browser script later mutates the DOM, and [`generate`] turns the final model
//! into markup with Maud. This keeps the grid lifecycle testable without a
//! browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Fetches collections by name from a [`source::DataSource`] |
//! | [`tables`] | Raw row types of the six collections, with lenient numeric parsing |
//! | [`join`] | The [`join::Catalog`]: filters, EXIF formatting, series lookup |
//! | [`types`] | Display records shared by every renderer and `catalog.json` |
//! | [`loader`] | Result-returning image loads ([`loader::ImageLoader`]) |
//! | [`probe`] | Connection probe deciding whether the thumbnail pass runs |
//! | [`view`] | The page model: containers, grid items, overlays, lightbox view |
//! | [`grid`] | Three-pass progressive grid: placeholders, thumbnails, full images |
//! | [`lightbox`] | Lightbox session with stale-load tokens and wraparound paging |
//! | [`pages`] | Homepage, series overview, series detail and permalink pages |
//! | [`generate`] | Writes the site: HTML via Maud, CSS, script, assets, catalog |
//! | [`check`] | Validates the catalog against the asset tree |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`naming`] | Slugs, page file names, photo count labels |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Filters Intersect
//!
//! An image query may restrict by image id, series and homepage visibility at
//! once. Every constraint applies; none of them short-circuits the others.
//!
//! ## Loads Are Results, Not Callbacks
//!
//! Every image wait (probe, grid, lightbox) is a call that returns
//! `Result<LoadedImage, LoadError>`. A load cannot report twice, and the
//! lightbox drops results that arrive for an image it no longer shows by
//! comparing load tickets.
//!
//! ## Flat Output
//!
//! All pages live at the output root (`series-3.html`,
//! `series-3-photo-12.html`), so every relative link works from every page and
//! the site can be served from any subdirectory.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup
//! is a compile error and all interpolation is escaped.

pub mod check;
pub mod config;
pub mod generate;
pub mod grid;
pub mod join;
pub mod lightbox;
pub mod loader;
pub mod naming;
pub mod output;
pub mod pages;
pub mod probe;
pub mod source;
pub mod tables;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
