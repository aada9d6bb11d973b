//! Names derived from catalog data: CSS class slugs, page file names, and
//! count labels.
//!
//! - `"Night Streets"` → `night-streets` (series card class)
//! - series 3 → `series-3.html`, image 12 → `photo-12.html`
//! - 1 → `"1 photo"`, 4 → `"4 photos"`

/// Photo-count text shown on a series card before its images are counted.
pub const LOADING_PHOTOS: &str = "Loading photos...";

/// CSS-safe slug for a series name.
///
/// Whitespace runs become a single dash and the result is lowercased.
/// Characters that are not valid in a bare class name are dropped.
pub fn series_slug(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// `"0 photos"`, `"1 photo"`, `"2 photos"`.
pub fn photo_count_label(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} photo{plural}")
}

pub fn series_page_name(series_id: i64) -> String {
    format!("series-{series_id}.html")
}

/// Lightbox permalink page of an image, namespaced by the list it pages through
/// (`photo` for the homepage, `series-3-photo` inside series 3).
pub fn photo_page_name(scope: &str, image_id: i64) -> String {
    format!("{scope}-{image_id}.html")
}
