//! Vertical-stack layout for sequential flows.
//!
//! Stages are stacked top to bottom at full content width, each numbered with
//! a badge and marked with an accent stripe, and every adjacent pair is joined
//! by a downward arrow.

use log::debug;

use figura_core::{geometry::Point, text::TextMeasure};

use super::{BoxStyle, ConnectorWeight, GAP, Layout, LayoutBuilder, MARGIN_X, TITLE_BAND, TOP};
use crate::{
    spec::{DiagramKind, SequentialSpec},
    theme::Theme,
};

/// Extra vertical space between stages that leaves room for the arrow.
const ARROW_CLEARANCE: f32 = 18.0;

/// Gap between a stage's bottom edge and the start of its outgoing arrow.
const CONNECTOR_START_GAP: f32 = 8.0;

/// Smallest canvas height produced for this archetype.
pub const MIN_HEIGHT: f32 = 900.0;

const FILLER: &str = "Key methods and technical route";

/// Box sizing of stage boxes.
pub fn style() -> BoxStyle {
    BoxStyle::new(34.0, 56.0, 30.0, 22.0)
}

/// Lays out a [`SequentialSpec`].
#[derive(Debug, Clone)]
pub struct Engine {
    canvas_width: f32,
}

impl Engine {
    pub fn new(canvas_width: f32) -> Self {
        Self { canvas_width }
    }

    pub fn calculate(
        &self,
        spec: &SequentialSpec,
        theme: Theme,
        measure: &mut dyn TextMeasure,
    ) -> Layout {
        let mut builder = LayoutBuilder::new(self.canvas_width, style());
        let width = builder.inner_width();

        let mut y = TOP + TITLE_BAND;
        for (i, stage) in spec.stages().iter().enumerate() {
            let stage_box = builder.place(
                measure,
                stage,
                Point::new(MARGIN_X, y),
                width,
                theme.palette(i),
                FILLER,
            );
            stage_box.set_accent();
            stage_box.set_badge(i + 1);
            y += stage_box.height() + GAP + ARROW_CLEARANCE;

            if i > 0 {
                builder.connect(i - 1, i, ConnectorWeight::Primary);
            }
        }

        debug!(
            stages = spec.stages().len(),
            content_bottom = y;
            "Stacked sequential stages",
        );

        builder.finish(
            DiagramKind::SequentialFlow,
            spec.title(),
            y,
            MIN_HEIGHT,
            CONNECTOR_START_GAP,
            theme,
        )
    }
}
