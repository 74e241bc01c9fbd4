//! Backend-agnostic diagram geometry.
//!
//! A [`Layout`] is the single result of layout computation: positioned boxes
//! with their wrapped text, connectors between boxes, the canvas size and the
//! theme. Both renderers interpret the same `Layout`, so every position they
//! draw at is derived here.
//!
//! Connectors reference boxes by index. Their end points are resolved with
//! [`Layout::anchors`] at draw time.

pub mod hierarchical;
pub mod sequential;

use figura_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    text::{FontSpec, TextMeasure, wrap_bullet},
};

use crate::{
    spec::{ContentBox, DiagramKind},
    theme::{BoxColors, Theme},
};

/// Diagram title font.
pub const TITLE_FONT: FontSpec = FontSpec::bold(44.0);

/// Box header font.
pub const HEADER_FONT: FontSpec = FontSpec::bold(26.0);

/// Bullet line font.
pub const BODY_FONT: FontSpec = FontSpec::regular(22.0);

/// Stage number font inside the badge.
pub const BADGE_FONT: FontSpec = FontSpec::bold(20.0);

/// Horizontal margin on both sides of the canvas.
const MARGIN_X: f32 = 88.0;

/// Top edge of the title band.
const TOP: f32 = 80.0;

/// Height reserved for the title between [`TOP`] and the first box.
const TITLE_BAND: f32 = 70.0;

/// Baseline of the title, relative to [`TOP`].
const TITLE_BASELINE: f32 = 28.0;

/// Space below the last box.
const BOTTOM_MARGIN: f32 = 70.0;

/// Vertical gap between stacked boxes.
const GAP: f32 = 26.0;

const HEADER_BASELINE: f32 = 38.0;
const BODY_TOP_GAP: f32 = 10.0;
const BODY_BASELINE: f32 = 22.0;
const BODY_BOTTOM_GAP: f32 = 18.0;

const SHADOW_OFFSET: Point = Point::new(3.0, 5.0);
const STRIPE_WIDTH: f32 = 10.0;

const BADGE_INSET_X: f32 = -6.0;
const BADGE_INSET_Y: f32 = 14.0;
const BADGE_SIZE: Size = Size::new(46.0, 30.0);
const BADGE_BASELINE: f32 = 22.0;

/// Space the badge takes in front of the header text.
const BADGE_HEADER_OFFSET: f32 = 52.0;

/// Distance kept between a connector's end and the target box.
const CONNECTOR_END_GAP: f32 = 8.0;

/// Box sizing parameters of an archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    padding: f32,
    header_height: f32,
    line_height: f32,
    radius: f32,
}

impl BoxStyle {
    pub fn new(padding: f32, header_height: f32, line_height: f32, radius: f32) -> Self {
        Self {
            padding,
            header_height,
            line_height,
            radius,
        }
    }

    /// Inner horizontal padding.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    /// Vertical distance between body lines.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Corner radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Height of a box holding `line_count` wrapped body lines.
    ///
    /// # Examples
    ///
    /// ```
    /// # use figura::layout::BoxStyle;
    /// let style = BoxStyle::new(34.0, 56.0, 30.0, 22.0);
    /// assert_eq!(style.box_height(3), 56.0 + 3.0 * 30.0 + 10.0 + 18.0);
    /// ```
    pub fn box_height(&self, line_count: usize) -> f32 {
        let body = line_count as f32 * self.line_height + BODY_TOP_GAP;
        self.header_height + body + BODY_BOTTOM_GAP
    }
}

/// A positioned content box ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    content: ContentBox,
    bounds: Bounds,
    colors: BoxColors,
    accent: bool,
    badge: Option<usize>,
    lines: Vec<String>,
    style: BoxStyle,
}

impl LayoutBox {
    fn new(
        content: ContentBox,
        bounds: Bounds,
        colors: BoxColors,
        lines: Vec<String>,
        style: BoxStyle,
    ) -> Self {
        Self {
            content,
            bounds,
            colors,
            accent: false,
            badge: None,
            lines,
            style,
        }
    }

    fn set_accent(&mut self) {
        self.accent = true;
    }

    fn set_badge(&mut self, number: usize) {
        self.badge = Some(number);
    }

    pub fn content(&self) -> &ContentBox {
        &self.content
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn x(&self) -> f32 {
        self.bounds.min_x()
    }

    pub fn y(&self) -> f32 {
        self.bounds.min_y()
    }

    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    pub fn fill_color(&self) -> Color {
        self.colors.fill()
    }

    pub fn stroke_color(&self) -> Color {
        self.colors.stroke()
    }

    /// Returns `true` if the box carries a left accent stripe.
    pub fn accent(&self) -> bool {
        self.accent
    }

    /// Stage number shown in the badge, if any.
    pub fn badge(&self) -> Option<usize> {
        self.badge
    }

    /// Wrapped body lines, bullet markers included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn style(&self) -> BoxStyle {
        self.style
    }

    pub fn shadow_bounds(&self) -> Bounds {
        self.bounds.translate(SHADOW_OFFSET)
    }

    /// Left accent stripe, when the box has one.
    pub fn stripe_bounds(&self) -> Option<Bounds> {
        self.accent.then(|| self.bounds.with_width(STRIPE_WIDTH))
    }

    /// Badge pill, when the box has one.
    pub fn badge_bounds(&self) -> Option<Bounds> {
        self.badge.map(|_| {
            let top_left = Point::new(
                self.x() + self.style.padding + BADGE_INSET_X,
                self.y() + BADGE_INSET_Y,
            );
            Bounds::new_from_top_left(top_left, BADGE_SIZE)
        })
    }

    /// Center-x and baseline of the badge number.
    pub fn badge_anchor(&self) -> Option<Point> {
        self.badge_bounds().map(|pill| {
            Point::new(pill.top_center().x(), pill.min_y() + BADGE_BASELINE)
        })
    }

    /// Left edge and baseline of the header text.
    pub fn header_origin(&self) -> Point {
        let offset = if self.badge.is_some() {
            BADGE_HEADER_OFFSET
        } else {
            0.0
        };
        Point::new(
            self.x() + self.style.padding + offset,
            self.y() + HEADER_BASELINE,
        )
    }

    /// Body lines paired with their left edge and baseline.
    pub fn body_lines(&self) -> impl Iterator<Item = (Point, &str)> {
        let x = self.x() + self.style.padding;
        let top = self.y() + self.style.header_height + BODY_TOP_GAP + BODY_BASELINE;
        self.lines.iter().enumerate().map(move |(i, line)| {
            let y = top + i as f32 * self.style.line_height;
            (Point::new(x, y), line.as_str())
        })
    }
}

/// Visual weight of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorWeight {
    Primary,
    /// Thinner and slightly translucent, for dense fan-out/fan-in rows.
    Secondary,
}

impl ConnectorWeight {
    pub fn stroke_width(self) -> f32 {
        match self {
            Self::Primary => 4.0,
            Self::Secondary => 3.0,
        }
    }

    pub fn alpha8(self) -> u8 {
        match self {
            Self::Primary => 255,
            Self::Secondary => 220,
        }
    }
}

/// A directed link between two boxes of a [`Layout`], by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    from: usize,
    to: usize,
    weight: ConnectorWeight,
}

impl Connector {
    pub fn new(from: usize, to: usize, weight: ConnectorWeight) -> Self {
        Self { from, to, weight }
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn weight(&self) -> ConnectorWeight {
        self.weight
    }
}

/// Complete geometry of one diagram.
#[derive(Debug, Clone)]
pub struct Layout {
    kind: DiagramKind,
    title: String,
    canvas: Size,
    boxes: Vec<LayoutBox>,
    connectors: Vec<Connector>,
    start_gap: f32,
    theme: Theme,
}

impl Layout {
    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Canvas size shared by the raster and vector outputs.
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Boxes in drawing order.
    pub fn boxes(&self) -> &[LayoutBox] {
        &self.boxes
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Center-x and baseline of the diagram title.
    pub fn title_anchor(&self) -> Point {
        Point::new(self.canvas.width() / 2.0, TOP + TITLE_BASELINE)
    }

    /// Start and end points of `connector`: from just below the bottom center
    /// of its source to just above the top center of its target.
    pub fn anchors(&self, connector: &Connector) -> (Point, Point) {
        let from = self.boxes[connector.from].bounds().bottom_center();
        let to = self.boxes[connector.to].bounds().top_center();
        (
            from.add_point(Point::new(0.0, self.start_gap)),
            to.sub_point(Point::new(0.0, CONNECTOR_END_GAP)),
        )
    }

    /// Stroke color of `connector`, alpha included.
    pub fn connector_color(&self, connector: &Connector) -> Color {
        self.theme.arrow().with_alpha8(connector.weight.alpha8())
    }
}

/// Accumulates boxes and connectors while an engine walks down the canvas.
struct LayoutBuilder {
    canvas_width: f32,
    style: BoxStyle,
    boxes: Vec<LayoutBox>,
    connectors: Vec<Connector>,
}

impl LayoutBuilder {
    fn new(canvas_width: f32, style: BoxStyle) -> Self {
        Self {
            canvas_width,
            style,
            boxes: Vec::new(),
            connectors: Vec::new(),
        }
    }

    /// Width available between the side margins.
    fn inner_width(&self) -> f32 {
        self.canvas_width - 2.0 * MARGIN_X
    }

    /// Wraps the bullets of `content` for a box of `width`.
    ///
    /// Falls back to the wrapped `filler` line when no bullet yields a line.
    fn wrap_body(
        &self,
        measure: &mut dyn TextMeasure,
        content: &ContentBox,
        width: f32,
        filler: &str,
    ) -> Vec<String> {
        let budget = width - 2.0 * self.style.padding;
        let mut lines: Vec<String> = content
            .bullets()
            .iter()
            .flat_map(|bullet| wrap_bullet(measure, bullet, BODY_FONT, budget))
            .collect();
        if lines.is_empty() {
            lines = wrap_bullet(measure, filler, BODY_FONT, budget);
        }
        lines
    }

    /// Wraps and places a box at `origin`, sized to its content.
    fn place(
        &mut self,
        measure: &mut dyn TextMeasure,
        content: &ContentBox,
        origin: Point,
        width: f32,
        colors: BoxColors,
        filler: &str,
    ) -> &mut LayoutBox {
        let lines = self.wrap_body(measure, content, width, filler);
        let size = Size::new(width, self.style.box_height(lines.len()));
        let bounds = Bounds::new_from_top_left(origin, size);
        self.boxes.push(LayoutBox::new(
            content.clone(),
            bounds,
            colors,
            lines,
            self.style,
        ));
        let last = self.boxes.len() - 1;
        &mut self.boxes[last]
    }

    /// Stretches every box in `row` to the tallest one. Returns that height.
    fn equalize_row(&mut self, row: &[usize]) -> f32 {
        let height = row
            .iter()
            .map(|&i| self.boxes[i].height())
            .fold(0.0_f32, f32::max);
        for &i in row {
            let bounds = self.boxes[i].bounds.with_height(height);
            self.boxes[i].bounds = bounds;
        }
        height
    }

    fn connect(&mut self, from: usize, to: usize, weight: ConnectorWeight) {
        self.connectors.push(Connector::new(from, to, weight));
    }

    fn finish(
        self,
        kind: DiagramKind,
        title: &str,
        content_bottom: f32,
        min_height: f32,
        start_gap: f32,
        theme: Theme,
    ) -> Layout {
        let height = (content_bottom + BOTTOM_MARGIN).max(min_height).ceil();
        Layout {
            kind,
            title: title.to_string(),
            canvas: Size::new(self.canvas_width, height),
            boxes: self.boxes,
            connectors: self.connectors,
            start_gap,
            theme,
        }
    }
}
