//! Figura - Roadmap and framework diagrams from loosely structured content.
//!
//! Figura turns an untrusted, loosely shaped content object into a PNG image
//! and an editable SVG document that share one layout. The pipeline is:
//!
//! 1. [`spec::normalize`] converts the raw value into a bounded [`NormalizedSpec`].
//! 2. The archetype's layout engine computes a backend-agnostic [`layout::Layout`].
//! 3. [`render::RasterRenderer`] and [`render::SvgRenderer`] both draw that layout.
//!
//! Normalization never fails; the only errors are configuration problems at
//! construction time, unknown diagram types, and backend failures.
//!
//! # Threading
//!
//! Rendering is synchronous and CPU-bound and can take a noticeable fraction
//! of a second for large content. Callers running inside an async executor
//! must move each call onto a blocking worker (for example
//! `spawn_blocking`) instead of calling [`DiagramEngine::render`] inline.
//! A [`DiagramEngine`] is immutable after construction and can be shared
//! between threads; every call allocates its own canvas and shaping state.

pub mod config;
pub mod layout;
pub mod render;
pub mod spec;
pub mod theme;

mod error;

pub use figura_core::{color, font, geometry, text};

pub use config::AppConfig;
pub use error::FiguraError;
pub use spec::{DiagramKind, NormalizedSpec};

use log::{debug, info, warn};
use serde_json::Value;

use figura_core::{
    color::Color,
    font::{FontCatalog, FontProvider, FontSource, FsFontProvider},
};

use config::MIN_CANVAS_WIDTH;
use layout::{Layout, hierarchical, sequential};
use render::{RasterRenderer, Renderer, SvgRenderer};
use theme::Theme;

/// Output of one render call.
#[derive(Debug, Clone)]
pub struct Rendered {
    png: Vec<u8>,
    svg: String,
    spec: NormalizedSpec,
}

impl Rendered {
    /// Encoded PNG image (RGB, fixed width, computed height).
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Self-contained SVG document in the same coordinate space as the PNG.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// The normalized content that was drawn.
    pub fn spec(&self) -> &NormalizedSpec {
        &self.spec
    }

    pub fn into_parts(self) -> (Vec<u8>, String, NormalizedSpec) {
        (self.png, self.svg, self.spec)
    }
}

/// Validated rendering setup: resolved fonts, canvas width and style overrides.
///
/// # Examples
///
/// ```rust
/// use figura::{DiagramEngine, AppConfig};
/// use figura::config::{CanvasConfig, FontConfig, StyleConfig};
/// use serde_json::json;
///
/// let config = AppConfig::new(
///     CanvasConfig::default(),
///     FontConfig::builtin(),
///     StyleConfig::default(),
/// );
/// let engine = DiagramEngine::new(config).expect("valid configuration");
///
/// let rendered = engine
///     .render("sequential_flow", &json!({ "stages": [] }), "Roadmap")
///     .expect("render succeeds");
/// assert!(rendered.svg().starts_with("<svg"));
/// ```
#[derive(Debug, Clone)]
pub struct DiagramEngine {
    fonts: FontCatalog,
    canvas_width: u32,
    background: Option<Color>,
}

impl DiagramEngine {
    /// Creates an engine, resolving fonts from the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`FiguraError::Config`] if the canvas width is unusable, the
    /// background color cannot be parsed, or fonts are required but none
    /// could be resolved.
    pub fn new(config: AppConfig) -> Result<Self, FiguraError> {
        Self::with_font_provider(config, &FsFontProvider)
    }

    /// Creates an engine that loads font candidates through `provider`.
    ///
    /// # Errors
    ///
    /// Same as [`DiagramEngine::new`].
    pub fn with_font_provider(
        config: AppConfig,
        provider: &dyn FontProvider,
    ) -> Result<Self, FiguraError> {
        let canvas_width = config.canvas().width();
        if canvas_width < MIN_CANVAS_WIDTH {
            return Err(FiguraError::Config(format!(
                "Canvas width {canvas_width} is below the minimum of {MIN_CANVAS_WIDTH}"
            )));
        }
        RasterRenderer::check_canvas(canvas_width)
            .map_err(|err| FiguraError::Config(err.to_string()))?;

        let background = config
            .style()
            .background_color()
            .map_err(FiguraError::Config)?;

        let font_config = config.fonts();
        let fonts = FontCatalog::resolve(
            &font_config.candidates(),
            provider,
            font_config.system_fallback(),
        );
        if fonts.source() == FontSource::BuiltIn {
            if font_config.require() {
                return Err(FiguraError::Config(
                    "No font could be resolved and fonts.require is set".to_string(),
                ));
            }
            warn!("Text will be measured with built-in metrics and not drawn in PNG output");
        }

        info!(
            canvas_width = canvas_width,
            font_source:? = fonts.source();
            "Diagram engine ready",
        );
        Ok(Self {
            fonts,
            canvas_width,
            background,
        })
    }

    /// Renders `raw_spec` as the diagram type named by `diagram_type`.
    ///
    /// `title` overrides any title inside `raw_spec`; pass an empty string to
    /// keep the embedded one (or the archetype default).
    ///
    /// # Errors
    ///
    /// Returns [`FiguraError::InvalidDiagramType`] before any work is done if
    /// `diagram_type` is not recognized, or [`FiguraError::Render`] if a
    /// backend fails.
    pub fn render(
        &self,
        diagram_type: &str,
        raw_spec: &Value,
        title: &str,
    ) -> Result<Rendered, FiguraError> {
        let kind: DiagramKind = diagram_type.parse()?;
        self.render_kind(kind, raw_spec, title)
    }

    /// Renders `raw_spec` as a diagram of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`FiguraError::Render`] if a backend fails.
    pub fn render_kind(
        &self,
        kind: DiagramKind,
        raw_spec: &Value,
        title: &str,
    ) -> Result<Rendered, FiguraError> {
        info!(diagram_kind:? = kind; "Normalizing diagram content");
        let spec = spec::normalize(kind, raw_spec, title);

        let mut typesetter = self.fonts.typesetter();
        let layout = self.layout(&spec, &mut typesetter);
        info!(
            boxes = layout.boxes().len(),
            connectors = layout.connectors().len(),
            height = layout.canvas().height();
            "Layout calculated",
        );

        let png = RasterRenderer::new(&mut typesetter).render(&layout)?;
        let svg = SvgRenderer::new(&self.fonts).render(&layout)?;

        Ok(Rendered { png, svg, spec })
    }

    fn layout(&self, spec: &NormalizedSpec, typesetter: &mut font::Typesetter) -> Layout {
        let width = self.canvas_width as f32;
        match spec {
            NormalizedSpec::Sequential(spec) => {
                let theme = self.theme(Theme::sequential());
                sequential::Engine::new(width).calculate(spec, theme, typesetter)
            }
            NormalizedSpec::Hierarchical(spec) => {
                let theme = self.theme(Theme::hierarchical());
                hierarchical::Engine::new(width).calculate(spec, theme, typesetter)
            }
        }
    }

    fn theme(&self, theme: Theme) -> Theme {
        match self.background {
            Some(background) => {
                debug!(background = background.to_string(); "Overriding theme background");
                theme.with_background(background)
            }
            None => theme,
        }
    }
}

/// Renders with a default [`DiagramEngine`].
///
/// The diagram type is checked before fonts are resolved.
///
/// # Errors
///
/// See [`DiagramEngine::new`] and [`DiagramEngine::render`].
pub fn render(diagram_type: &str, raw_spec: &Value, title: &str) -> Result<Rendered, FiguraError> {
    let kind: DiagramKind = diagram_type.parse()?;
    DiagramEngine::new(AppConfig::default())?.render_kind(kind, raw_spec, title)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;
    use crate::config::{CanvasConfig, FontConfig, StyleConfig};

    struct NoFonts;

    impl FontProvider for NoFonts {
        fn load(&self, _path: &Path) -> Option<Vec<u8>> {
            None
        }
    }

    fn config(width: u32, fonts: FontConfig, background: Option<&str>) -> AppConfig {
        AppConfig::new(
            CanvasConfig::new(width),
            fonts,
            StyleConfig::new(background.map(str::to_string)),
        )
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiagramEngine>();
    }

    #[test]
    fn test_rejects_narrow_canvas() {
        let err = DiagramEngine::new(config(100, FontConfig::builtin(), None)).unwrap_err();
        assert!(matches!(err, FiguraError::Config(_)));
    }

    #[test]
    fn test_rejects_invalid_background() {
        let err = DiagramEngine::new(config(1600, FontConfig::builtin(), Some("not-a-color")))
            .unwrap_err();
        assert!(matches!(err, FiguraError::Config(_)));
    }

    #[test]
    fn test_required_fonts_missing() {
        let fonts = FontConfig::new(vec!["/missing/regular.ttf".into()], Vec::new(), false, true);
        let err = DiagramEngine::with_font_provider(config(1600, fonts, None), &NoFonts)
            .unwrap_err();
        assert!(matches!(err, FiguraError::Config(_)));
    }

    #[test]
    fn test_background_override_reaches_both_outputs() {
        let engine =
            DiagramEngine::new(config(800, FontConfig::builtin(), Some("#102030"))).unwrap();
        let rendered = engine.render("sequential_flow", &json!({}), "Roadmap").unwrap();

        assert!(rendered.svg().contains("fill=\"#102030\""));
        let image = image::load_from_memory(rendered.png()).unwrap().to_rgb8();
        assert_eq!(image.get_pixel(1, 1).0, [0x10, 0x20, 0x30]);
    }

    #[test]
    fn test_unknown_type_is_rejected_first() {
        let err = render("unknown_type", &json!({}), "Z").unwrap_err();
        assert!(matches!(err, FiguraError::InvalidDiagramType(name) if name == "unknown_type"));
    }
}
