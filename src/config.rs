//! Branding and layout configuration.
//!
//! Loads configuration from `${ROADMAP_DECK_HOME}/config.toml` with sensible
//! defaults. The file is created from an embedded commented template on first
//! run; any load or parse failure falls back to the built-in defaults with a
//! warning. The loaded value is immutable and passed by reference into every
//! composer function.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

pub mod paths {
    //! Path resolution for the per-user configuration directory.
    //!
    //! ROADMAP_DECK_HOME resolution order:
    //! 1. ROADMAP_DECK_HOME environment variable (if set)
    //! 2. ~/.config/roadmap-deck (default)

    use std::path::PathBuf;

    /// Returns the roadmap-deck home directory.
    pub fn deck_home() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("ROADMAP_DECK_HOME") {
            return Some(PathBuf::from(home));
        }

        dirs::home_dir().map(|h| h.join(".config").join("roadmap-deck"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> Option<PathBuf> {
        deck_home().map(|h| h.join("config.toml"))
    }
}

/// Logo placement on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogoPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

/// Branding, layout and pagination settings.
///
/// Colors are hex RGB strings ("RRGGBB", a leading '#' is tolerated), lengths
/// are in inches, font sizes in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Branding colors
    pub brand_primary_color: String,
    pub brand_secondary_color: String,
    pub brand_accent_color: String,
    pub brand_text_color: String,
    pub brand_background_color: String,
    pub content_box_color: String,

    // Logo
    pub logo_path: Option<PathBuf>,
    pub logo_position: LogoPosition,

    // Fonts
    pub title_font_name: String,
    pub body_font_name: String,
    pub title_font_pt: f64,
    pub subtitle_font_pt: f64,
    pub heading_font_pt: f64,
    pub body_font_pt: f64,

    // Slide dimensions and margins (inches)
    pub slide_width_in: f64,
    pub slide_height_in: f64,
    pub title_top_margin_in: f64,
    pub content_top_margin_in: f64,
    pub side_margin_in: f64,
    pub bottom_margin_in: f64,

    // Visual style
    pub use_shapes: bool,

    // Pagination estimates (inches)
    pub key_element_height_in: f64,
    pub workpackage_height_in: f64,
    pub north_star_min_height_in: f64,
    pub north_star_max_height_in: f64,
    pub text_box_margin_in: f64,

    // Optional template presentations
    pub title_slide_template: Option<PathBuf>,
    pub content_slide_template: Option<PathBuf>,
    pub template_slide_index: usize,

    // Overview slide
    pub overview_shape_color: String,
    pub overview_text_color: String,
    pub overview_shape_width_in: f64,
    pub overview_shape_height_in: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brand_primary_color: "003366".to_string(),
            brand_secondary_color: "0066CC".to_string(),
            brand_accent_color: "FF9900".to_string(),
            brand_text_color: "333333".to_string(),
            brand_background_color: "FFFFFF".to_string(),
            content_box_color: "F5F5F5".to_string(),
            logo_path: None,
            logo_position: LogoPosition::TopRight,
            title_font_name: "Calibri".to_string(),
            body_font_name: "Calibri".to_string(),
            title_font_pt: 44.0,
            subtitle_font_pt: 28.0,
            heading_font_pt: 32.0,
            body_font_pt: 18.0,
            slide_width_in: 10.0,
            slide_height_in: 7.5,
            title_top_margin_in: 1.0,
            content_top_margin_in: 1.5,
            side_margin_in: 0.5,
            bottom_margin_in: 0.5,
            use_shapes: true,
            key_element_height_in: 0.5,
            workpackage_height_in: 0.5,
            north_star_min_height_in: 0.8,
            north_star_max_height_in: 3.0,
            text_box_margin_in: 0.2,
            title_slide_template: None,
            content_slide_template: None,
            template_slide_index: 0,
            overview_shape_color: "003366".to_string(),
            overview_text_color: "FFFFFF".to_string(),
            overview_shape_width_in: 2.2,
            overview_shape_height_in: 1.3,
        }
    }
}

impl Config {
    /// Loads configuration from the per-user config file, creating it from
    /// the embedded template on first run. Never fails: any error falls back
    /// to the built-in defaults with a warning.
    pub fn load_or_default() -> Self {
        let Some(path) = paths::config_path() else {
            warn!("could not determine home directory; using built-in defaults");
            return Self::default();
        };

        if !path.exists() {
            match write_default_config(&path) {
                Ok(()) => {
                    info!("created default config at {}", path.display());
                    info!("edit this file to customize your branding");
                }
                Err(e) => warn!("could not create config at {}: {e}", path.display()),
            }
        }

        Self::load_from(&path)
    }

    /// Loads configuration from a specific path, falling back to defaults
    /// (with a warning) on any read or parse error.
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    "could not read config from {}: {e}; using built-in defaults",
                    path.display()
                );
                return Self::default();
            }
        };

        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "could not parse config from {}: {e}; using built-in defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Usable content width between the side margins, in inches.
    pub fn content_width_in(&self) -> f64 {
        self.slide_width_in - 2.0 * self.side_margin_in
    }
}

fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
}

/// Normalize a hex color string for DrawingML (`srgbClr val` wants "RRGGBB").
pub fn normalize_color(color: &str) -> &str {
    color.trim_start_matches('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.slide_width_in, 10.0);
        assert_eq!(config.slide_height_in, 7.5);
        assert_eq!(config.logo_position, LogoPosition::TopRight);
        assert!(config.use_shapes);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let from_template: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let defaults = Config::default();
        assert_eq!(
            from_template.brand_primary_color,
            defaults.brand_primary_color
        );
        assert_eq!(from_template.body_font_pt, defaults.body_font_pt);
        assert_eq!(from_template.key_element_height_in, defaults.key_element_height_in);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("brand_primary_color = \"112233\"").unwrap();
        assert_eq!(config.brand_primary_color, "112233");
        assert_eq!(config.slide_height_in, 7.5);
    }

    #[test]
    fn test_load_from_missing_file_falls_back() {
        let config = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.brand_primary_color, "003366");
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#FF9900"), "FF9900");
        assert_eq!(normalize_color("FF9900"), "FF9900");
    }
}
