//! Font resolution and shaping.
//!
//! Fonts are resolved once from an ordered list of [`FontCandidate`]s through
//! an injectable [`FontProvider`], producing an immutable [`FontCatalog`]. Each
//! render call then builds its own [`Typesetter`] from the catalog, so no
//! shaping state is shared between calls.
//!
//! # Resolution order
//!
//! 1. The first readable candidate of each weight (bold falls back to regular).
//! 2. System fonts, when no candidate resolves and the system fallback is enabled.
//! 3. The built-in [`ApproxMetrics`] face, which measures text but cannot draw glyphs.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use figura_core::font::{FontCandidate, FontCatalog, FontProvider, FontSource};
//! use figura_core::text::FontWeight;
//!
//! struct NoFonts;
//!
//! impl FontProvider for NoFonts {
//!     fn load(&self, _path: &Path) -> Option<Vec<u8>> {
//!         None
//!     }
//! }
//!
//! let candidates = [FontCandidate::new("/missing/font.ttf", FontWeight::Regular)];
//! let catalog = FontCatalog::resolve(&candidates, &NoFonts, false);
//! assert_eq!(catalog.source(), FontSource::BuiltIn);
//! ```

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use cosmic_text::{
    Attrs, Buffer, Color as GlyphColor, Family, FontSystem, Metrics, Shaping, SwashCache, Weight,
    fontdb,
};
use log::{debug, info, warn};

use crate::text::{ApproxMetrics, FontSpec, FontWeight, TextMeasure};

/// Locale handed to cosmic-text for script fallback.
const LOCALE: &str = "zh-CN";

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Distance from the top of a line box to the text baseline, as a multiple of the font size.
pub const BASELINE_FACTOR: f32 = 0.95;

/// A font file to try during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontCandidate {
    path: PathBuf,
    weight: FontWeight,
}

impl FontCandidate {
    pub fn new(path: impl Into<PathBuf>, weight: FontWeight) -> Self {
        Self {
            path: path.into(),
            weight,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }
}

/// Platform font files tried by default, in priority order.
///
/// CJK-capable faces come first so Chinese content shapes correctly when
/// available; DejaVu Sans is the last resort on Linux.
pub fn default_candidates() -> Vec<FontCandidate> {
    use FontWeight::{Bold, Regular};

    [
        ("C:/Windows/Fonts/msyh.ttc", Regular),
        ("C:/Windows/Fonts/msyhbd.ttc", Bold),
        ("C:/Windows/Fonts/simsun.ttc", Regular),
        ("C:/Windows/Fonts/simhei.ttf", Bold),
        ("/System/Library/Fonts/PingFang.ttc", Regular),
        ("/System/Library/Fonts/PingFang.ttc", Bold),
        ("/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc", Regular),
        ("/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc", Bold),
        ("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", Regular),
        ("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf", Bold),
    ]
    .into_iter()
    .map(|(path, weight)| FontCandidate::new(path, weight))
    .collect()
}

/// Read-only access to font resources.
pub trait FontProvider {
    /// Returns the raw bytes of the font at `path`, or `None` when it is unavailable.
    fn load(&self, path: &Path) -> Option<Vec<u8>>;
}

/// [`FontProvider`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFontProvider;

impl FontProvider for FsFontProvider {
    fn load(&self, path: &Path) -> Option<Vec<u8>> {
        match fs::read(path) {
            Ok(data) => Some(data),
            Err(err) => {
                debug!(path = path.display().to_string(), err:err; "Font candidate unavailable");
                None
            }
        }
    }
}

/// Where the faces of a [`FontCatalog`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource {
    /// At least one configured candidate resolved.
    Candidates,
    /// No candidate resolved; system fonts were loaded instead.
    System,
    /// No usable faces; text is measured by [`ApproxMetrics`] and not drawn.
    BuiltIn,
}

/// Immutable set of resolved font faces.
#[derive(Clone)]
pub struct FontCatalog {
    database: fontdb::Database,
    regular_family: Option<String>,
    bold_family: Option<String>,
    source: FontSource,
}

impl FontCatalog {
    /// Resolves `candidates` in order through `provider`.
    ///
    /// The first loadable candidate of each weight wins. A missing bold face
    /// reuses the regular family (shaped with bold weight).
    pub fn resolve(
        candidates: &[FontCandidate],
        provider: &dyn FontProvider,
        system_fallback: bool,
    ) -> Self {
        let mut database = fontdb::Database::new();
        let mut regular_family = None;
        let mut bold_family = None;

        for candidate in candidates {
            let slot = match candidate.weight() {
                FontWeight::Regular => &mut regular_family,
                FontWeight::Bold => &mut bold_family,
            };
            if slot.is_some() {
                continue;
            }
            let Some(data) = provider.load(candidate.path()) else {
                continue;
            };

            let ids = database.load_font_source(fontdb::Source::Binary(Arc::new(data)));
            let family = ids
                .first()
                .and_then(|id| database.face(*id))
                .and_then(|face| face.families.first())
                .map(|(name, _)| name.clone());

            match family {
                Some(family) => {
                    info!(
                        path = candidate.path().display().to_string(),
                        family = family.as_str(),
                        weight:? = candidate.weight();
                        "Resolved font",
                    );
                    *slot = Some(family);
                }
                None => {
                    warn!(
                        path = candidate.path().display().to_string();
                        "Font file contains no usable face"
                    );
                }
            }
        }

        if regular_family.is_none() {
            regular_family = bold_family.clone();
        }
        if bold_family.is_none() {
            bold_family = regular_family.clone();
        }

        if regular_family.is_some() {
            return Self {
                database,
                regular_family,
                bold_family,
                source: FontSource::Candidates,
            };
        }

        if system_fallback {
            database.load_system_fonts();
            if database.len() > 0 {
                warn!(faces = database.len(); "No font candidate resolved, using system fonts");
                return Self {
                    database,
                    regular_family: None,
                    bold_family: None,
                    source: FontSource::System,
                };
            }
        }

        warn!("No usable font faces, falling back to built-in metrics");
        Self::builtin()
    }

    /// Catalog without faces, using the built-in metrics face.
    pub fn builtin() -> Self {
        Self {
            database: fontdb::Database::new(),
            regular_family: None,
            bold_family: None,
            source: FontSource::BuiltIn,
        }
    }

    pub fn source(&self) -> FontSource {
        self.source
    }

    /// Resolved family name for `weight`, if a candidate supplied one.
    pub fn family(&self, weight: FontWeight) -> Option<&str> {
        match weight {
            FontWeight::Regular => self.regular_family.as_deref(),
            FontWeight::Bold => self.bold_family.as_deref(),
        }
    }

    /// Builds a fresh typesetter over this catalog's faces.
    pub fn typesetter(&self) -> Typesetter {
        let font_system = match self.source {
            FontSource::BuiltIn => None,
            FontSource::Candidates | FontSource::System => Some(
                FontSystem::new_with_locale_and_db(LOCALE.to_string(), self.database.clone()),
            ),
        };

        Typesetter {
            font_system,
            swash_cache: SwashCache::new(),
            regular_family: self.regular_family.clone(),
            bold_family: self.bold_family.clone(),
        }
    }
}

impl fmt::Debug for FontCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCatalog")
            .field("faces", &self.database.len())
            .field("regular_family", &self.regular_family)
            .field("bold_family", &self.bold_family)
            .field("source", &self.source)
            .finish()
    }
}

/// Per-call shaping state: measures text and rasterizes glyphs.
pub struct Typesetter {
    font_system: Option<FontSystem>,
    swash_cache: SwashCache,
    regular_family: Option<String>,
    bold_family: Option<String>,
}

impl Typesetter {
    /// Returns `true` if glyphs can be drawn (a real face is loaded).
    pub fn can_draw(&self) -> bool {
        self.font_system.is_some()
    }

    /// Rasterizes `text` as a single line whose line box starts at the origin.
    ///
    /// `put` receives pixel rectangles `(x, y, width, height, rgba)` relative
    /// to the top-left of the line box, with coverage folded into the alpha.
    /// Does nothing when only the built-in face is available.
    pub fn draw_text<F>(&mut self, text: &str, font: FontSpec, rgba: [u8; 4], mut put: F)
    where
        F: FnMut(i32, i32, u32, u32, [u8; 4]),
    {
        let family = self.family_name(font.weight()).map(str::to_string);
        let Some(font_system) = self.font_system.as_mut() else {
            return;
        };

        let metrics = Metrics::new(font.size(), font.size() * LINE_HEIGHT_FACTOR);
        let mut buffer = Buffer::new(font_system, metrics);
        let mut buffer = buffer.borrow_with(font_system);
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs_for(family.as_deref(), font), Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let [r, g, b, a] = rgba;
        buffer.draw(
            &mut self.swash_cache,
            GlyphColor::rgba(r, g, b, a),
            |x, y, w, h, color| put(x, y, w, h, [color.r(), color.g(), color.b(), color.a()]),
        );
    }

    fn family_name(&self, weight: FontWeight) -> Option<&str> {
        match weight {
            FontWeight::Regular => self.regular_family.as_deref(),
            FontWeight::Bold => self.bold_family.as_deref(),
        }
    }
}

impl TextMeasure for Typesetter {
    fn measure(&mut self, text: &str, font: FontSpec) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        let family = self.family_name(font.weight()).map(str::to_string);
        let Some(font_system) = self.font_system.as_mut() else {
            return ApproxMetrics.measure(text, font);
        };

        let metrics = Metrics::new(font.size(), font.size() * LINE_HEIGHT_FACTOR);
        let mut buffer = Buffer::new(font_system, metrics);
        let mut buffer = buffer.borrow_with(font_system);
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs_for(family.as_deref(), font), Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let width = buffer
            .layout_runs()
            .filter_map(|run| run.glyphs.last().map(|last| last.x + last.w))
            .fold(0.0_f32, f32::max);

        // Faces without glyphs for this script produce no runs.
        if width > 0.0 {
            width
        } else {
            ApproxMetrics.measure(text, font)
        }
    }
}

fn attrs_for(family: Option<&str>, font: FontSpec) -> Attrs<'_> {
    let family = family.map_or(Family::SansSerif, Family::Name);
    let weight = match font.weight() {
        FontWeight::Regular => Weight::NORMAL,
        FontWeight::Bold => Weight::BOLD,
    };
    Attrs::new().family(family).weight(weight)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::text::wrap_bullet;

    /// Provider serving fixed bytes and recording which paths were requested.
    #[derive(Default)]
    struct FakeProvider {
        files: HashMap<PathBuf, Vec<u8>>,
        requested: RefCell<Vec<PathBuf>>,
    }

    impl FontProvider for FakeProvider {
        fn load(&self, path: &Path) -> Option<Vec<u8>> {
            self.requested.borrow_mut().push(path.to_path_buf());
            self.files.get(path).cloned()
        }
    }

    #[test]
    fn test_resolve_without_fonts_is_builtin() {
        let provider = FakeProvider::default();
        let catalog = FontCatalog::resolve(&default_candidates(), &provider, false);
        assert_eq!(catalog.source(), FontSource::BuiltIn);
        assert!(catalog.family(FontWeight::Regular).is_none());
        assert_eq!(provider.requested.borrow().len(), default_candidates().len());
    }

    #[test]
    fn test_resolve_skips_unparseable_fonts() {
        let mut provider = FakeProvider::default();
        provider
            .files
            .insert(PathBuf::from("/fonts/broken.ttf"), b"not a font".to_vec());
        let candidates = [FontCandidate::new("/fonts/broken.ttf", FontWeight::Regular)];

        let catalog = FontCatalog::resolve(&candidates, &provider, false);
        assert_eq!(catalog.source(), FontSource::BuiltIn);
    }

    #[test]
    fn test_builtin_typesetter_measures_approximately() {
        let mut typesetter = FontCatalog::builtin().typesetter();
        assert!(!typesetter.can_draw());

        let font = FontSpec::regular(22.0);
        assert_approx_eq!(
            f32,
            typesetter.measure("Roadmap", font),
            ApproxMetrics.measure("Roadmap", font)
        );
    }

    #[test]
    fn test_builtin_typesetter_draws_nothing() {
        let mut typesetter = FontCatalog::builtin().typesetter();
        let mut pixels = 0;
        typesetter.draw_text("Roadmap", FontSpec::bold(44.0), [0, 0, 0, 255], |_, _, _, _, _| {
            pixels += 1;
        });
        assert_eq!(pixels, 0);
    }

    /// Catalog over the host's default font files, or `None` when none is installed.
    fn host_catalog() -> Option<FontCatalog> {
        let catalog = FontCatalog::resolve(&default_candidates(), &FsFontProvider, false);
        if catalog.source() == FontSource::BuiltIn {
            eprintln!("no default font file installed, skipping");
            return None;
        }
        Some(catalog)
    }

    #[test]
    fn test_host_font_measures_shaped_width() {
        let Some(catalog) = host_catalog() else {
            return;
        };
        assert!(catalog.family(FontWeight::Regular).is_some());
        assert!(catalog.family(FontWeight::Bold).is_some());

        let mut typesetter = catalog.typesetter();
        assert!(typesetter.can_draw());

        let font = FontSpec::bold(44.0);
        let shaped = typesetter.measure("Technical Roadmap", font);
        assert!(shaped > 0.0);
        assert!((shaped - ApproxMetrics.measure("Technical Roadmap", font)).abs() > 0.5);
        assert!(typesetter.measure("Roadmap!", font) > typesetter.measure("Roadmap", font));
    }

    #[test]
    fn test_host_font_wraps_within_budget() {
        let Some(catalog) = host_catalog() else {
            return;
        };
        let mut typesetter = catalog.typesetter();
        let font = FontSpec::regular(22.0);
        let budget = 300.0;
        let text = "Collect multi-source observations, align them in time and space, \
                    then validate the fused estimates against held-out field measurements.";

        let lines = wrap_bullet(&mut typesetter, text, font, budget);
        assert!(lines.len() > 2);
        let tolerance = typesetter.measure(" ", font) / 2.0 + 0.5;
        for line in &lines {
            let width = typesetter.measure(line, font);
            assert!(width <= budget + tolerance, "{line:?} is {width}px wide");
        }
    }

    #[test]
    fn test_host_font_draws_glyphs() {
        let Some(catalog) = host_catalog() else {
            return;
        };
        let mut typesetter = catalog.typesetter();
        let font = FontSpec::bold(44.0);
        let line_height = (font.size() * LINE_HEIGHT_FACTOR).ceil() as i32;

        let mut covered = 0;
        let mut max_x = 0;
        typesetter.draw_text("Roadmap", font, [15, 23, 42, 255], |x, y, w, h, [_, _, _, a]| {
            if a == 0 {
                return;
            }
            covered += (w * h) as usize;
            max_x = max_x.max(x + w as i32);
            assert!((-2..=line_height + 2).contains(&y), "glyph row {y} outside the line box");
        });

        assert!(covered > 100);
        let width = typesetter.measure("Roadmap", font);
        assert!((max_x as f32) <= width + 4.0);
    }

    #[test]
    fn test_default_candidates_cover_both_weights() {
        let candidates = default_candidates();
        assert!(candidates.iter().any(|c| c.weight() == FontWeight::Regular));
        assert!(candidates.iter().any(|c| c.weight() == FontWeight::Bold));
    }
}
