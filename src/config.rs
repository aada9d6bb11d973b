//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives next
//! to the JSON collections in the data directory and is optional: stock
//! defaults are used for everything it does not mention.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Portfolio"
//! author = ""
//!
//! [grid]
//! item_class = "grid-item"                    # Placeholder class on home/series pages
//! series_item_class = "series-card-grid-item" # Placeholder class in series cards
//! blur_class = "blur-load"                    # Blur-up wrapper class
//! use_overlay = true                          # Title/date overlay on hover
//! prefer_idle_callback = true                 # Defer full images to an idle callback
//! idle_timeout_ms = 200                       # Timer fallback when there is none
//!
//! [probe]
//! threshold_ms = 100        # Sample loads slower than this show thumbnails first
//! # sample = "images/probe.jpg"  # Defaults to the first homepage image
//!
//! [lightbox]
//! placeholder_dir = "images/placeholders"
//! separator = " • "
//!
//! [theme]
//! grid_gap = "0.75rem"
//! column_width = "18rem"
//!
//! [colors.light]
//! background = "#fafafa"
//! text = "#1a1a1a"
//! text_muted = "#6b6b6b"
//! overlay = "rgba(0, 0, 0, 0.55)"
//!
//! [colors.dark]
//! background = "#111111"
//! text = "#eeeeee"
//! text_muted = "#9a9a9a"
//! overlay = "rgba(0, 0, 0, 0.7)"
//!
//! [processing]
//! max_processes = 4         # Max parallel loads (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [probe]
//! threshold_ms = 250
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::grid::{GridOptions, schedule_full_pass};
use crate::lightbox::LightboxOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title and author shown in the header and footer.
    pub site: SiteSection,
    /// Grid class names and full-image scheduling.
    pub grid: GridConfig,
    /// Connection probe settings.
    pub probe: ProbeConfig,
    /// Lightbox background previews and settings separator.
    pub lightbox: LightboxConfig,
    /// Layout settings (grid gap, column width).
    pub theme: ThemeConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel loading settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("grid.item_class", &self.grid.item_class),
            ("grid.series_item_class", &self.grid.series_item_class),
            ("grid.blur_class", &self.grid.blur_class),
        ] {
            if !is_class_name(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a single non-empty class name, got {value:?}"
                )));
            }
        }
        if self.grid.idle_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "grid.idle_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.probe.threshold_ms == 0 {
            return Err(ConfigError::Validation(
                "probe.threshold_ms must be greater than 0".into(),
            ));
        }
        if self.lightbox.placeholder_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "lightbox.placeholder_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn is_class_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: String,
    pub author: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: String::new(),
        }
    }
}

/// Grid class names and full-image scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Placeholder class on the homepage and series detail pages.
    pub item_class: String,
    /// Placeholder class of the mini grids inside series cards.
    pub series_item_class: String,
    /// Class of the blur-up wrapper and thumbnail layer.
    pub blur_class: String,
    /// Show the title/date overlay on homepage and series detail grids.
    pub use_overlay: bool,
    /// Defer the full-image pass to an idle callback when the browser has one.
    pub prefer_idle_callback: bool,
    /// Delay of the timer fallback, in milliseconds.
    pub idle_timeout_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            item_class: "grid-item".to_string(),
            series_item_class: "series-card-grid-item".to_string(),
            blur_class: "blur-load".to_string(),
            use_overlay: true,
            prefer_idle_callback: true,
            idle_timeout_ms: 200,
        }
    }
}

impl GridConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Pipeline options for a grid whose placeholders use `item_class`.
    pub fn options(&self, item_class: &str, use_overlay: bool) -> GridOptions {
        GridOptions {
            item_class: item_class.to_string(),
            blur_class: self.blur_class.clone(),
            use_overlay,
            schedule: schedule_full_pass(self.prefer_idle_callback, self.idle_timeout()),
        }
    }
}

/// Connection probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Loads slower than this many milliseconds count as a slow connection.
    pub threshold_ms: u64,
    /// Image URL to time. When absent, the first homepage image is used.
    pub sample: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 100,
            sample: None,
        }
    }
}

impl ProbeConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }
}

/// Lightbox settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightboxConfig {
    /// Directory of the low-resolution previews used as lightbox background.
    pub placeholder_dir: String,
    /// Separator between camera settings.
    pub separator: String,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        let defaults = LightboxOptions::default();
        Self {
            placeholder_dir: defaults.placeholder_dir,
            separator: defaults.separator,
        }
    }
}

impl LightboxConfig {
    pub fn options(&self) -> LightboxOptions {
        LightboxOptions {
            placeholder_dir: self.placeholder_dir.clone(),
            separator: self.separator.clone(),
        }
    }
}

/// Layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Gap between grid items (CSS value).
    pub grid_gap: String,
    /// Minimum column width of the responsive grid (CSS value).
    pub column_width: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            grid_gap: "0.75rem".to_string(),
            column_width: "18rem".to_string(),
        }
    }
}

/// Parallel loading settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Background color.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (dates, counts, EXIF labels).
    pub text_muted: String,
    /// Grid hover overlay and lightbox backdrop.
    pub overlay: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fafafa".to_string(),
            text: "#1a1a1a".to_string(),
            text_muted: "#6b6b6b".to_string(),
            overlay: "rgba(0, 0, 0, 0.55)".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#111111".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#9a9a9a".to_string(),
            overlay: "rgba(0, 0, 0, 0.7)".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    log::debug!("Loaded config from {}", root.display());
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photofolio Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to images.json in the data directory.
# Unknown keys will cause an error.

[site]
# Shown in the page title, header and footer.
title = "Portfolio"
author = ""

# ---------------------------------------------------------------------------
# Image grid
# ---------------------------------------------------------------------------
[grid]
# Placeholder class on the homepage and series detail pages.
item_class = "grid-item"
# Placeholder class of the small grids inside series cards.
series_item_class = "series-card-grid-item"
# Class of the blur-up wrapper; gets "loaded" once the full image decodes.
blur_class = "blur-load"
# Title/date overlay on hover.
use_overlay = true
# Insert full images from an idle callback where the browser supports it...
prefer_idle_callback = true
# ...otherwise after this many milliseconds.
idle_timeout_ms = 200

# ---------------------------------------------------------------------------
# Connection probe
# ---------------------------------------------------------------------------
[probe]
# A sample image slower than this (ms) shows blurred thumbnails first.
threshold_ms = 100
# Image to time. Defaults to the first homepage image.
# sample = "images/probe.jpg"

# ---------------------------------------------------------------------------
# Lightbox
# ---------------------------------------------------------------------------
[lightbox]
# Low-resolution previews shown behind the full image while it loads.
placeholder_dir = "images/placeholders"
# Separator between camera settings (focal length, aperture, ...).
separator = " • "

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[theme]
grid_gap = "0.75rem"
column_width = "18rem"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fafafa"
text = "#1a1a1a"
text_muted = "#6b6b6b"
overlay = "rgba(0, 0, 0, 0.55)"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#111111"
text = "#eeeeee"
text_muted = "#9a9a9a"
overlay = "rgba(0, 0, 0, 0.7)"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image loads while building.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-overlay: {light_overlay};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-overlay: {dark_overlay};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_overlay = colors.light.overlay,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_overlay = colors.dark.overlay,
    )
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --grid-gap: {grid_gap};
    --column-width: {column_width};
}}"#,
        grid_gap = theme.grid_gap,
        column_width = theme.column_width,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "Portfolio");
        assert_eq!(config.grid.item_class, "grid-item");
        assert_eq!(config.grid.blur_class, "blur-load");
        assert_eq!(config.grid.idle_timeout(), Duration::from_millis(200));
        assert_eq!(config.probe.threshold(), Duration::from_millis(100));
        assert_eq!(config.probe.sample, None);
        assert_eq!(config.lightbox.placeholder_dir, "images/placeholders");
        assert_eq!(config.lightbox.separator, " • ");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[probe]
threshold_ms = 250

[colors.light]
background = "#ffffff"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.probe.threshold_ms, 250);
        assert_eq!(config.colors.light.background, "#ffffff");
        // Defaults preserved
        assert_eq!(config.colors.light.text, "#1a1a1a");
        assert_eq!(config.grid.item_class, "grid-item");
    }

    #[test]
    fn grid_options_follow_config() {
        let mut config = GridConfig::default();
        config.prefer_idle_callback = false;
        config.idle_timeout_ms = 350;
        let options = config.options("series-card-grid-item", false);
        assert_eq!(options.item_class, "series-card-grid-item");
        assert_eq!(options.blur_class, "blur-load");
        assert!(!options.use_overlay);
        assert_eq!(
            options.schedule,
            crate::grid::IdleSchedule::Timer(Duration::from_millis(350))
        );
    }

    #[test]
    fn lightbox_options_follow_config() {
        let config = LightboxConfig {
            placeholder_dir: "previews".into(),
            separator: " | ".into(),
        };
        let options = config.options();
        assert_eq!(options.placeholder_dir, "previews");
        assert_eq!(options.separator, " | ");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.probe.threshold_ms, 100);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[site]
title = "Harbour Lights"

[lightbox]
separator = " / "
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Harbour Lights");
        assert_eq!(config.lightbox.separator, " / ");
        assert_eq!(config.lightbox.placeholder_dir, "images/placeholders");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[grid]\nitem_clas = \"x\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[thumbnails]\nsize = 3\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let mut config = SiteConfig::default();
        config.probe.threshold_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_idle_timeout() {
        let mut config = SiteConfig::default();
        config.grid.idle_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_compound_class_names() {
        let mut config = SiteConfig::default();
        config.grid.item_class = "grid item".into();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.grid.blur_class = String::new();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.grid.series_item_class = ".dotted".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[probe]\nthreshold_ms = 0\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Merging
    // =========================================================================

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let merged = merge_toml(toml::Value::Integer(1), toml::Value::Integer(2));
        assert_eq!(merged.as_integer(), Some(2));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.grid.item_class, defaults.grid.item_class);
        assert_eq!(config.grid.idle_timeout_ms, defaults.grid.idle_timeout_ms);
        assert_eq!(config.probe.threshold_ms, defaults.probe.threshold_ms);
        assert_eq!(config.lightbox.separator, defaults.lightbox.separator);
        assert_eq!(config.colors.dark.background, defaults.colors.dark.background);
        assert_eq!(config.theme.grid_gap, defaults.theme.grid_gap);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value().unwrap();
        let table = value.as_table().unwrap();
        for section in ["site", "grid", "probe", "lightbox", "theme", "colors", "processing"] {
            assert!(table.contains_key(section), "missing section {section}");
        }
    }

    // =========================================================================
    // CSS generation
    // =========================================================================

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    #[test]
    fn generate_theme_css_includes_variables() {
        let css = generate_theme_css(&ThemeConfig::default());
        assert!(css.contains("--grid-gap: 0.75rem"));
        assert!(css.contains("--column-width: 18rem"));
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
