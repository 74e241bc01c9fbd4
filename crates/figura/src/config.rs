//! Configuration types for Figura diagram rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from an
//! external file; every section and field is optional.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`CanvasConfig`] - Canvas dimensions shared by both output formats.
//! - [`FontConfig`] - Ordered font candidates and fallback policy.
//! - [`StyleConfig`] - Visual overrides such as the background color.
//!
//! # Example
//!
//! ```
//! # use figura::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.canvas().width(), 1600);
//! assert!(config.style().background_color().is_ok());
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use figura_core::{
    color::Color,
    font::{FontCandidate, default_candidates},
    text::FontWeight,
};

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1600;

/// Narrowest canvas that still fits three work-package columns.
pub const MIN_CANVAS_WIDTH: u32 = 480;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    canvas: CanvasConfig,

    #[serde(default)]
    fonts: FontConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    pub fn new(canvas: CanvasConfig, fonts: FontConfig, style: StyleConfig) -> Self {
        Self {
            canvas,
            fonts,
            style,
        }
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn fonts(&self) -> &FontConfig {
        &self.fonts
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Canvas dimensions.
///
/// The height is always computed from the content; only the width is fixed.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    width: u32,
}

impl CanvasConfig {
    pub fn new(width: u32) -> Self {
        Self { width }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH)
    }
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

/// Font resolution settings.
///
/// Candidates are tried in order per weight; the first readable file wins.
#[derive(Debug, Clone, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_regular_fonts")]
    regular: Vec<PathBuf>,

    #[serde(default = "default_bold_fonts")]
    bold: Vec<PathBuf>,

    /// Load system fonts when no candidate resolves.
    #[serde(default = "default_true")]
    system_fallback: bool,

    /// Treat a missing font as a configuration error instead of falling back
    /// to built-in metrics.
    #[serde(default)]
    require: bool,
}

impl FontConfig {
    /// Candidate lists per weight plus the fallback and strictness switches.
    pub fn new(
        regular: Vec<PathBuf>,
        bold: Vec<PathBuf>,
        system_fallback: bool,
        require: bool,
    ) -> Self {
        Self {
            regular,
            bold,
            system_fallback,
            require,
        }
    }

    /// Configuration that never touches the filesystem: no candidates and no
    /// system fonts, so the built-in metrics face is always used.
    ///
    /// Output produced with this configuration does not depend on installed fonts.
    pub fn builtin() -> Self {
        Self::new(Vec::new(), Vec::new(), false, false)
    }

    /// All candidates, regular weight first.
    pub fn candidates(&self) -> Vec<FontCandidate> {
        let regular = self
            .regular
            .iter()
            .map(|path| FontCandidate::new(path.clone(), FontWeight::Regular));
        let bold = self
            .bold
            .iter()
            .map(|path| FontCandidate::new(path.clone(), FontWeight::Bold));
        regular.chain(bold).collect()
    }

    pub fn system_fallback(&self) -> bool {
        self.system_fallback
    }

    pub fn require(&self) -> bool {
        self.require
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self::new(default_regular_fonts(), default_bold_fonts(), true, false)
    }
}

fn default_fonts(weight: FontWeight) -> Vec<PathBuf> {
    default_candidates()
        .into_iter()
        .filter(|candidate| candidate.weight() == weight)
        .map(|candidate| candidate.path().to_path_buf())
        .collect()
}

fn default_regular_fonts() -> Vec<PathBuf> {
    default_fonts(FontWeight::Regular)
}

fn default_bold_fonts() -> Vec<PathBuf> {
    default_fonts(FontWeight::Bold)
}

fn default_true() -> bool {
    true
}

/// Visual styling overrides.
///
/// Fields that are not set fall back to the diagram theme.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] for diagrams, as a CSS color string.
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    pub fn new(background_color: Option<String>) -> Self {
        Self { background_color }
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }
}
