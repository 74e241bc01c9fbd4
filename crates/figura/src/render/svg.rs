//! SVG backend.
//!
//! Emits an editable document in the same coordinate space as the raster
//! canvas. Boxes are grouped per content box (`<g id="stage-1">`) with the
//! outline rectangle tagged `class="box"`; connectors are `<line
//! class="connector">` elements ending in an arrowhead marker.

use std::collections::BTreeMap;

use log::info;
use svg::{
    Document, Node,
    node::{
        Text as SvgText,
        element::{self as svg_element, Element},
    },
};

use figura_core::{
    color::Color,
    font::FontCatalog,
    geometry::Point,
    text::{FontSpec, FontWeight},
};

use super::{ARROW_HEAD_LENGTH, ArrowHead, RenderError, Renderer};
use crate::layout::{
    BADGE_FONT, BODY_FONT, Connector, ConnectorWeight, HEADER_FONT, Layout, LayoutBox, TITLE_FONT,
};

/// Families appended after the resolved one so viewers without it still pick
/// a CJK-capable face.
const FALLBACK_FAMILIES: &[&str] = &[
    "Microsoft YaHei",
    "PingFang SC",
    "Noto Sans CJK SC",
    "sans-serif",
];

const BOX_STROKE_WIDTH: f32 = 2.0;
const BADGE_STROKE_WIDTH: f32 = 1.0;
const BADGE_RADIUS: f32 = 14.0;

/// Builds an SVG document from a [`Layout`].
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    regular_families: String,
    bold_families: String,
}

impl SvgRenderer {
    /// Creates a renderer whose `font-family` lists lead with the families
    /// resolved in `catalog`.
    pub fn new(catalog: &FontCatalog) -> Self {
        Self {
            regular_families: font_family_list(catalog.family(FontWeight::Regular)),
            bold_families: font_family_list(catalog.family(FontWeight::Bold)),
        }
    }

    fn families(&self, weight: FontWeight) -> &str {
        match weight {
            FontWeight::Regular => &self.regular_families,
            FontWeight::Bold => &self.bold_families,
        }
    }

    /// Creates a single-line `<text>` element in `font` at `origin` (x, baseline).
    ///
    /// Built as a plain [`Element`] so the content is written inline with no
    /// whitespace around it.
    fn text(&self, content: &str, font: FontSpec, color: Color, origin: Point) -> Element {
        let mut text = Element::new("text");
        text.assign("x", origin.x());
        text.assign("y", origin.y());
        text.assign("font-family", self.families(font.weight()));
        text.assign("font-size", font.size());
        text.assign("fill", color.to_string());
        if font.is_bold() {
            text.assign("font-weight", 700);
        }
        text.append(SvgText::new(content));
        text
    }

    fn render_title(&self, layout: &Layout) -> Element {
        let mut title = self.text(
            layout.title(),
            TITLE_FONT,
            layout.theme().text(),
            layout.title_anchor(),
        );
        title.assign("text-anchor", "middle");
        title
    }

    fn render_box(&self, layout_box: &LayoutBox, layout: &Layout) -> svg_element::Group {
        let theme = layout.theme();
        let radius = layout_box.style().radius();

        let shadow = layout_box.shadow_bounds();
        let mut group = svg_element::Group::new()
            .set("id", layout_box.content().id())
            .add(
                rect(shadow.min_x(), shadow.min_y(), shadow.width(), shadow.height(), radius)
                    .set("fill", theme.shadow().to_string())
                    .set("fill-opacity", theme.shadow().alpha()),
            )
            .add(
                rect(
                    layout_box.x(),
                    layout_box.y(),
                    layout_box.width(),
                    layout_box.height(),
                    radius,
                )
                .set("class", "box")
                .set("fill", layout_box.fill_color().to_string())
                .set("stroke", layout_box.stroke_color().to_string())
                .set("stroke-width", BOX_STROKE_WIDTH),
            );

        if let Some(stripe) = layout_box.stripe_bounds() {
            group = group.add(
                rect(stripe.min_x(), stripe.min_y(), stripe.width(), stripe.height(), radius)
                    .set("fill", theme.accent().to_string())
                    .set("fill-opacity", theme.accent().alpha()),
            );
        }

        if let (Some(pill), Some(anchor), Some(number)) = (
            layout_box.badge_bounds(),
            layout_box.badge_anchor(),
            layout_box.badge(),
        ) {
            let mut label = self.text(&number.to_string(), BADGE_FONT, theme.muted(), anchor);
            label.assign("text-anchor", "middle");
            group = group
                .add(
                    rect(pill.min_x(), pill.min_y(), pill.width(), pill.height(), BADGE_RADIUS)
                        .set("fill", theme.badge().to_string())
                        .set("fill-opacity", theme.badge().alpha())
                        .set("stroke", theme.border().to_string())
                        .set("stroke-width", BADGE_STROKE_WIDTH),
                )
                .add(label);
        }

        group = group.add(self.text(
            layout_box.content().title(),
            HEADER_FONT,
            theme.text(),
            layout_box.header_origin(),
        ));

        for (origin, line) in layout_box.body_lines() {
            let mut body = self.text(line, BODY_FONT, theme.muted(), origin);
            // Continuation lines carry their hanging indent as leading spaces.
            if line.starts_with(' ') {
                body.assign("xml:space", "preserve");
            }
            group = group.add(body);
        }

        group
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&mut self, layout: &Layout) -> Result<String, RenderError> {
        let canvas = layout.canvas();
        let theme = layout.theme();

        let mut markers = MarkerSet::default();
        let mut connectors = svg_element::Group::new().set("id", "connectors");
        for connector in layout.connectors() {
            let marker = markers.register(connector, layout);
            connectors = connectors.add(render_connector(layout, connector, &marker));
        }

        let mut doc = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("width", canvas.width())
            .set("height", canvas.height())
            .set(
                "viewBox",
                format!("0 0 {} {}", canvas.width(), canvas.height()),
            )
            .add(markers.definitions())
            .add(
                svg_element::Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", canvas.width())
                    .set("height", canvas.height())
                    .set("fill", theme.background().to_string()),
            )
            .add(self.render_title(layout));

        for layout_box in layout.boxes() {
            doc = doc.add(self.render_box(layout_box, layout));
        }
        let doc = doc.add(connectors);

        let text = doc.to_string();
        info!(
            boxes = layout.boxes().len(),
            connectors = layout.connectors().len(),
            bytes = text.len();
            "Rendered vector document",
        );
        Ok(text)
    }
}

/// Arrowhead markers, one per distinct connector color.
#[derive(Debug, Default)]
struct MarkerSet {
    markers: BTreeMap<String, Color>,
}

impl MarkerSet {
    /// Records the marker used by `connector` and returns its `url(#..)` reference.
    fn register(&mut self, connector: &Connector, layout: &Layout) -> String {
        let id = match connector.weight() {
            ConnectorWeight::Primary => "arrow",
            ConnectorWeight::Secondary => "arrow-secondary",
        };
        self.markers
            .insert(id.to_string(), layout.connector_color(connector));
        format!("url(#{id})")
    }

    /// `<defs>` holding every registered marker.
    ///
    /// Each marker draws the [`ArrowHead`] triangle in user space with its tip
    /// on the line end, so the head matches the raster output at any stroke width.
    fn definitions(&self) -> svg_element::Definitions {
        let [tip, left, right] = ArrowHead::unit().points();
        let path_data = format!(
            "M {} {} L {} {} L {} {} z",
            tip.x(),
            tip.y(),
            left.x(),
            left.y(),
            right.x(),
            right.y()
        );
        let half = ARROW_HEAD_LENGTH / 2.0;

        let mut defs = svg_element::Definitions::new();
        for (id, color) in &self.markers {
            defs = defs.add(
                svg_element::Marker::new()
                    .set("id", id.as_str())
                    .set(
                        "viewBox",
                        format!(
                            "{} {} {} {}",
                            -ARROW_HEAD_LENGTH, -half, ARROW_HEAD_LENGTH, ARROW_HEAD_LENGTH
                        ),
                    )
                    .set("refX", 0)
                    .set("refY", 0)
                    .set("markerWidth", ARROW_HEAD_LENGTH)
                    .set("markerHeight", ARROW_HEAD_LENGTH)
                    .set("markerUnits", "userSpaceOnUse")
                    .set("orient", "auto")
                    .add(
                        svg_element::Path::new()
                            .set("d", path_data.as_str())
                            .set("fill", color.to_string())
                            .set("fill-opacity", color.alpha()),
                    ),
            );
        }
        defs
    }
}

fn render_connector(layout: &Layout, connector: &Connector, marker: &str) -> svg_element::Line {
    let (start, end) = layout.anchors(connector);
    let color = layout.connector_color(connector);
    svg_element::Line::new()
        .set("class", "connector")
        .set("x1", start.x())
        .set("y1", start.y())
        .set("x2", end.x())
        .set("y2", end.y())
        .set("stroke", color.to_string())
        .set("stroke-opacity", color.alpha())
        .set("stroke-width", connector.weight().stroke_width())
        .set("marker-end", marker)
}

fn rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> svg_element::Rectangle {
    svg_element::Rectangle::new()
        .set("x", x)
        .set("y", y)
        .set("width", width)
        .set("height", height)
        .set("rx", radius)
        .set("ry", radius)
}

/// `font-family` value led by `resolved`, without repeating it.
fn font_family_list(resolved: Option<&str>) -> String {
    let mut families: Vec<&str> = Vec::with_capacity(FALLBACK_FAMILIES.len() + 1);
    if let Some(resolved) = resolved {
        families.push(resolved);
    }
    families.extend(
        FALLBACK_FAMILIES
            .iter()
            .copied()
            .filter(|family| Some(*family) != resolved),
    );
    families.join(", ")
}
