//! Bitmap backend.
//!
//! Shapes are filled and stroked with tiny-skia; glyphs are rasterized by the
//! [`Typesetter`] and blended in pixel by pixel. The finished canvas is
//! flattened to RGB and encoded as PNG.

use image::{
    ExtendedColorType, ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};
use log::{debug, info};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};

use figura_core::{
    color::Color,
    font::{BASELINE_FACTOR, Typesetter},
    geometry::{Bounds, Point},
    text::{FontSpec, TextMeasure},
};

use super::{ArrowHead, RenderError, Renderer};
use crate::layout::{BADGE_FONT, BODY_FONT, Connector, HEADER_FONT, Layout, LayoutBox, TITLE_FONT};

/// Control point distance of a cubic quarter circle, relative to its radius.
const KAPPA: f32 = 0.552_284_8;

const BOX_STROKE_WIDTH: f32 = 2.0;
const BADGE_STROKE_WIDTH: f32 = 1.0;
const BADGE_RADIUS: f32 = 14.0;

/// Draws a [`Layout`] into a PNG image.
pub struct RasterRenderer<'a> {
    typesetter: &'a mut Typesetter,
}

impl<'a> RasterRenderer<'a> {
    /// Creates a renderer that measures and draws text with `typesetter`.
    pub fn new(typesetter: &'a mut Typesetter) -> Self {
        Self { typesetter }
    }

    /// Checks that a canvas `width` pixels wide can be allocated.
    pub fn check_canvas(width: u32) -> Result<(), RenderError> {
        Pixmap::new(width, 1)
            .map(|_| ())
            .ok_or(RenderError::Canvas { width, height: 1 })
    }

    fn draw_title(&mut self, pixmap: &mut Pixmap, layout: &Layout) {
        let anchor = layout.title_anchor();
        let width = self.typesetter.measure(layout.title(), TITLE_FONT);
        let origin = Point::new((anchor.x() - width / 2.0).floor(), anchor.y());
        self.draw_text(pixmap, layout.title(), TITLE_FONT, origin, layout.theme().text());
    }

    fn draw_box(&mut self, pixmap: &mut Pixmap, layout_box: &LayoutBox, layout: &Layout) {
        let theme = layout.theme();
        let radius = layout_box.style().radius();

        fill_rounded(pixmap, layout_box.shadow_bounds(), radius, theme.shadow());
        fill_rounded(pixmap, layout_box.bounds(), radius, layout_box.fill_color());
        stroke_rounded(
            pixmap,
            layout_box.bounds(),
            radius,
            layout_box.stroke_color(),
            BOX_STROKE_WIDTH,
        );

        if let Some(stripe) = layout_box.stripe_bounds() {
            fill_rounded(pixmap, stripe, radius, theme.accent());
        }

        if let (Some(pill), Some(anchor), Some(number)) = (
            layout_box.badge_bounds(),
            layout_box.badge_anchor(),
            layout_box.badge(),
        ) {
            fill_rounded(pixmap, pill, BADGE_RADIUS, theme.badge());
            stroke_rounded(pixmap, pill, BADGE_RADIUS, theme.border(), BADGE_STROKE_WIDTH);

            let number = number.to_string();
            let width = self.typesetter.measure(&number, BADGE_FONT);
            let origin = Point::new((anchor.x() - width / 2.0).floor(), anchor.y());
            self.draw_text(pixmap, &number, BADGE_FONT, origin, theme.muted());
        }

        self.draw_text(
            pixmap,
            layout_box.content().title(),
            HEADER_FONT,
            layout_box.header_origin(),
            theme.text(),
        );

        for (origin, line) in layout_box.body_lines() {
            self.draw_text(pixmap, line, BODY_FONT, origin, theme.muted());
        }
    }

    /// Draws one line of text whose left end sits on `origin` (x, baseline).
    fn draw_text(
        &mut self,
        pixmap: &mut Pixmap,
        text: &str,
        font: FontSpec,
        origin: Point,
        color: Color,
    ) {
        let left = origin.x().round() as i32;
        let top = (origin.y() - BASELINE_FACTOR * font.size()).round() as i32;

        let mut paint = Paint::default();
        self.typesetter
            .draw_text(text, font, color.to_rgba8(), |x, y, w, h, [r, g, b, a]| {
                let Some(rect) =
                    Rect::from_xywh((left + x) as f32, (top + y) as f32, w as f32, h as f32)
                else {
                    return;
                };
                paint.set_color_rgba8(r, g, b, a);
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            });
    }
}

impl Renderer for RasterRenderer<'_> {
    type Output = Vec<u8>;

    fn render(&mut self, layout: &Layout) -> Result<Vec<u8>, RenderError> {
        let canvas = layout.canvas();
        let width = canvas.width() as u32;
        let height = canvas.height() as u32;

        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        pixmap.fill(skia_color(layout.theme().background()));

        self.draw_title(&mut pixmap, layout);
        for layout_box in layout.boxes() {
            self.draw_box(&mut pixmap, layout_box, layout);
        }
        for connector in layout.connectors() {
            draw_connector(&mut pixmap, layout, connector);
        }

        let png = encode_png(&pixmap)?;
        info!(width = width, height = height, bytes = png.len(); "Rendered raster image");
        Ok(png)
    }
}

fn draw_connector(pixmap: &mut Pixmap, layout: &Layout, connector: &Connector) {
    let (start, end) = layout.anchors(connector);
    let paint = solid_paint(layout.connector_color(connector));

    let mut builder = PathBuilder::new();
    builder.move_to(start.x(), start.y());
    builder.line_to(end.x(), end.y());
    if let Some(line) = builder.finish() {
        let stroke = Stroke {
            width: connector.weight().stroke_width(),
            ..Stroke::default()
        };
        pixmap.stroke_path(&line, &paint, &stroke, Transform::identity(), None);
    }

    let [tip, left, right] = ArrowHead::new(start, end).points();
    let mut builder = PathBuilder::new();
    builder.move_to(tip.x(), tip.y());
    builder.line_to(left.x(), left.y());
    builder.line_to(right.x(), right.y());
    builder.close();
    if let Some(head) = builder.finish() {
        pixmap.fill_path(&head, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn fill_rounded(pixmap: &mut Pixmap, bounds: Bounds, radius: f32, color: Color) {
    let Some(path) = rounded_rect(bounds, radius) else {
        debug!(bounds:? = bounds; "Skipping degenerate rectangle");
        return;
    };
    pixmap.fill_path(
        &path,
        &solid_paint(color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
}

fn stroke_rounded(pixmap: &mut Pixmap, bounds: Bounds, radius: f32, color: Color, width: f32) {
    let Some(path) = rounded_rect(bounds, radius) else {
        return;
    };
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid_paint(color), &stroke, Transform::identity(), None);
}

/// Rounded rectangle outline built from four cubic corners.
///
/// The radius is clamped to half the shorter side, matching how SVG treats
/// an oversized `rx`.
fn rounded_rect(bounds: Bounds, radius: f32) -> Option<Path> {
    let (x0, y0, x1, y1) = (bounds.min_x(), bounds.min_y(), bounds.max_x(), bounds.max_y());
    let r = radius
        .min(bounds.width() / 2.0)
        .min(bounds.height() / 2.0)
        .max(0.0);
    let k = r * KAPPA;

    let mut builder = PathBuilder::new();
    builder.move_to(x0 + r, y0);
    builder.line_to(x1 - r, y0);
    builder.cubic_to(x1 - r + k, y0, x1, y0 + r - k, x1, y0 + r);
    builder.line_to(x1, y1 - r);
    builder.cubic_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1);
    builder.line_to(x0 + r, y1);
    builder.cubic_to(x0 + r - k, y1, x0, y1 - r + k, x0, y1 - r);
    builder.line_to(x0, y0 + r);
    builder.cubic_to(x0, y0 + r - k, x0 + r - k, y0, x0 + r, y0);
    builder.close();
    builder.finish()
}

fn solid_paint(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

/// Drops the alpha channel and encodes the canvas as an RGB PNG.
///
/// Pixels are demultiplied first, so a translucent background keeps the RGB
/// of its color as written in the SVG `fill`.
fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let rgb: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let px = px.demultiply();
            [px.red(), px.green(), px.blue()]
        })
        .collect();

    let mut png = Vec::new();
    PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive).write_image(
        &rgb,
        pixmap.width(),
        pixmap.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(png)
}
