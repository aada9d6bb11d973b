//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (series,
//! image, page) is shown by its identity first, a positional index and its
//! title, with file names as secondary context after an arrow or on an
//! indented line. The output doubles as a content inventory of the site.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Series
//! 001 Coast (2 photos)
//! 002 Night Streets (1 photo)
//!
//! Images: 4 (2 on homepage, 1 without series)
//!
//! Issues
//!     #2 Neon Alley
//!         Image not found: images/neon-alley.jpg
//! ```
//!
//! ## Build
//!
//! ```text
//! Connection: fast (full images only)
//! Home → index.html
//!     001 Harbour at Dawn → photo-1.html
//! Series → series.html
//! Coast → series-1.html
//!     001 Harbour at Dawn → series-1-photo-1.html
//!
//! Generated 14 files, 3 assets (5 images loaded, 0 failed)
//! ```
//!
//! ## Probe
//!
//! ```text
//! images/harbour.jpg: 12ms (threshold 100ms) → fast
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::check::Inventory;
use crate::generate::GenerateReport;
use crate::naming::photo_count_label;
use crate::probe::ProbeReport;
use std::time::Duration;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional photo count.
///
/// ```text
/// 001 Coast (2 photos)
/// 001 Coast
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, photo_count_label(n)),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Format a page line: titled pages show the title, untitled show the file in
/// parens.
///
/// ```text
/// 001 Harbour at Dawn → photo-1.html
/// 002 (photo-4.html)
/// ```
fn page_line(index: usize, title: &str, file: &str) -> String {
    if title.is_empty() {
        format!("{} ({})", format_index(index), file)
    } else {
        format!("{} {} \u{2192} {}", format_index(index), title, file)
    }
}

fn format_millis(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

// ============================================================================
// Check output
// ============================================================================

/// Format the inventory printed by `check`.
pub fn format_check_output(inventory: &Inventory) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Series".to_string());
    if inventory.series.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, (series, count)) in inventory.series.iter().enumerate() {
        lines.push(entity_header(i + 1, &series.name, Some(*count)));
        if !series.description.is_empty() {
            lines.push(format!("{}{}", indent(1), series.description));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Images: {} ({} on homepage, {} without series)",
        inventory.images, inventory.homepage, inventory.unassigned
    ));

    lines.push(String::new());
    if inventory.issues.is_empty() {
        lines.push("No issues found".to_string());
        return lines;
    }

    lines.push("Issues".to_string());
    let mut current = None;
    for issue in &inventory.issues {
        if current != Some(issue.image_id) {
            current = Some(issue.image_id);
            let title = if issue.title.is_empty() {
                "(untitled)"
            } else {
                issue.title.as_str()
            };
            lines.push(format!("{}#{} {}", indent(1), issue.image_id, title));
        }
        lines.push(format!("{}{}", indent(2), issue.issue));
    }
    lines
}

pub fn print_check_output(inventory: &Inventory) {
    for line in format_check_output(inventory) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the summary printed after a build.
pub fn format_build_output(report: &GenerateReport, slow: bool) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(if slow {
        "Connection: slow (thumbnails first)".to_string()
    } else {
        "Connection: fast (full images only)".to_string()
    });

    for page in &report.pages {
        lines.push(format!("{} \u{2192} {}", page.title, page.file));
        for (i, (title, file)) in page.photos.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), page_line(i + 1, title, file)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} files, {} assets ({} images loaded, {} failed)",
        report.files.len(),
        report.assets,
        report.loaded,
        report.failed
    ));
    lines
}

pub fn print_build_output(report: &GenerateReport, slow: bool) {
    for line in format_build_output(report, slow) {
        println!("{}", line);
    }
}

// ============================================================================
// Probe output
// ============================================================================

/// Format one probe result.
///
/// ```text
/// images/a.jpg: 12ms (threshold 100ms) → fast
/// images/a.jpg: failed to load → slow
/// ```
pub fn format_probe_output(url: &str, report: &ProbeReport, threshold: Duration) -> Vec<String> {
    let verdict = if report.slow { "slow" } else { "fast" };
    let line = if report.loaded {
        format!(
            "{}: {} (threshold {}) \u{2192} {}",
            url,
            format_millis(report.elapsed),
            format_millis(threshold),
            verdict
        )
    } else {
        format!("{}: failed to load \u{2192} {}", url, verdict)
    };
    vec![line]
}

pub fn print_probe_output(url: &str, report: &ProbeReport, threshold: Duration) {
    for line in format_probe_output(url, report, threshold) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
