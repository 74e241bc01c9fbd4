//! Multi-row fan-out/fan-in layout for research frameworks.
//!
//! Rows, top to bottom:
//!
//! ```text
//!            [        goal        ]
//!        [ hypotheses ]  [ support ]
//!     [ wp-1 ]    [ wp-2 ]    [ wp-3 ]
//!            [      outcomes      ]
//! ```
//!
//! Boxes sharing a row are stretched to the row's tallest box. The goal fans
//! out to both row boxes, each of which feeds every work package, and every
//! work package feeds the outcomes: always eleven connectors.

use log::debug;

use figura_core::{geometry::Point, text::TextMeasure};

use super::{BoxStyle, ConnectorWeight, GAP, Layout, LayoutBuilder, MARGIN_X, TITLE_BAND, TOP};
use crate::{
    spec::{DiagramKind, HierarchicalSpec, WORK_PACKAGE_COUNT},
    theme::Theme,
};

/// Additional space between rows on top of [`GAP`].
const ROW_EXTRA_GAP: f32 = 10.0;

/// Gap between a box's bottom edge and the start of its outgoing arrows.
const CONNECTOR_START_GAP: f32 = 6.0;

/// Smallest canvas height produced for this archetype.
pub const MIN_HEIGHT: f32 = 980.0;

const FILLER: &str = "Derived from the stated requirements";

/// Number of connectors in every framework layout.
pub const CONNECTOR_COUNT: usize = 2 + 2 * WORK_PACKAGE_COUNT + WORK_PACKAGE_COUNT;

/// Box sizing of framework boxes.
pub fn style() -> BoxStyle {
    BoxStyle::new(28.0, 54.0, 30.0, 22.0)
}

/// Lays out a [`HierarchicalSpec`].
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
        spec: &HierarchicalSpec,
        theme: Theme,
        measure: &mut dyn TextMeasure,
    ) -> Layout {
        let mut builder = LayoutBuilder::new(self.canvas_width, style());
        let inner_width = builder.inner_width();
        let row_step = GAP + ROW_EXTRA_GAP;

        let mut y = TOP + TITLE_BAND;

        let goal_box = builder.place(
            measure,
            spec.goal(),
            Point::new(MARGIN_X, y),
            inner_width,
            theme.goal(),
            FILLER,
        );
        goal_box.set_accent();
        y += goal_box.height() + row_step;
        let goal = builder.boxes.len() - 1;

        let column_width = ((inner_width - GAP) / 2.0).trunc();
        let mut middle = [0; 2];
        for (column, content) in [spec.hypotheses(), spec.support()].into_iter().enumerate() {
            let x = MARGIN_X + column as f32 * (column_width + GAP);
            builder.place(
                measure,
                content,
                Point::new(x, y),
                column_width,
                theme.row(),
                FILLER,
            );
            middle[column] = builder.boxes.len() - 1;
        }
        y += builder.equalize_row(&middle) + row_step;

        let package_width = ((inner_width - 2.0 * GAP) / WORK_PACKAGE_COUNT as f32).trunc();
        let mut packages = [0; WORK_PACKAGE_COUNT];
        for (i, content) in spec.work_packages().iter().enumerate() {
            let x = MARGIN_X + i as f32 * (package_width + GAP);
            let package_box = builder.place(
                measure,
                content,
                Point::new(x, y),
                package_width,
                theme.palette(i),
                FILLER,
            );
            package_box.set_accent();
            packages[i] = builder.boxes.len() - 1;
        }
        y += builder.equalize_row(&packages) + row_step;

        let outcomes_box = builder.place(
            measure,
            spec.outcomes(),
            Point::new(MARGIN_X, y),
            inner_width,
            theme.outcomes(),
            FILLER,
        );
        outcomes_box.set_accent();
        y += outcomes_box.height();
        let outcomes = builder.boxes.len() - 1;

        for &target in &middle {
            builder.connect(goal, target, ConnectorWeight::Primary);
        }
        for &package in &packages {
            for &source in &middle {
                builder.connect(source, package, ConnectorWeight::Secondary);
            }
        }
        for &package in &packages {
            builder.connect(package, outcomes, ConnectorWeight::Primary);
        }

        debug!(
            column_width = column_width,
            package_width = package_width,
            content_bottom = y;
            "Arranged framework rows",
        );

        builder.finish(
            DiagramKind::HierarchicalFramework,
            spec.title(),
            y,
            MIN_HEIGHT,
            CONNECTOR_START_GAP,
            theme,
        )
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use figura_core::text::ApproxMetrics;

    use super::*;
    use crate::spec::normalize_hierarchical;

    fn layout_for(raw: Value) -> Layout {
        let spec = normalize_hierarchical(&raw, "Framework");
        Engine::new(1600.0).calculate(&spec, Theme::hierarchical(), &mut ApproxMetrics)
    }

    fn ids(layout: &Layout) -> Vec<&str> {
        layout.boxes().iter().map(|b| b.content().id()).collect()
    }

    #[test]
    fn test_default_framework() {
        let layout = layout_for(json!({}));
        assert_eq!(
            ids(&layout),
            ["goal", "hypotheses", "support", "wp-1", "wp-2", "wp-3", "outcomes"]
        );
        assert_eq!(layout.connectors().len(), CONNECTOR_COUNT);
        assert_eq!(CONNECTOR_COUNT, 11);
        assert!(layout.canvas().height() >= MIN_HEIGHT);
    }

    #[test]
    fn test_column_geometry() {
        let layout = layout_for(json!({}));
        let boxes = layout.boxes();
        let inner = 1600.0 - 2.0 * MARGIN_X;

        let column = ((inner - GAP) / 2.0).trunc();
        assert_approx_eq!(f32, boxes[1].width(), column);
        assert_approx_eq!(f32, boxes[2].x(), MARGIN_X + column + GAP);

        let package = ((inner - 2.0 * GAP) / 3.0).trunc();
        for (i, package_box) in boxes[3..6].iter().enumerate() {
            assert_approx_eq!(f32, package_box.width(), package);
            assert_approx_eq!(f32, package_box.x(), MARGIN_X + i as f32 * (package + GAP));
        }
        assert_approx_eq!(f32, boxes[0].width(), inner);
        assert_approx_eq!(f32, boxes[6].width(), inner);
    }

    #[test]
    fn test_rows_equalized_to_tallest() {
        let long = "a long supporting statement ".repeat(6);
        let layout = layout_for(json!({
            "support": { "bullets": [long.clone(), long] },
            "work_packages": [
                { "title": "Short", "bullets": ["x"] },
                { "title": "Tall", "bullets": ["one", "two", "three", "four"] },
            ],
        }));
        let boxes = layout.boxes();

        assert_approx_eq!(f32, boxes[1].height(), boxes[2].height());
        assert!(boxes[1].lines().len() < boxes[2].lines().len());
        assert_approx_eq!(f32, boxes[1].height(), style().box_height(boxes[2].lines().len()));

        let package_heights: Vec<f32> = boxes[3..6].iter().map(|b| b.height()).collect();
        assert!(package_heights.iter().all(|h| *h == package_heights[1]));
    }

    #[test]
    fn test_rows_do_not_overlap() {
        let layout = layout_for(json!({}));
        let boxes = layout.boxes();
        let rows = [&boxes[0..1], &boxes[1..3], &boxes[3..6], &boxes[6..7]];
        for pair in rows.windows(2) {
            let bottom = pair[0][0].y() + pair[0][0].height();
            assert_approx_eq!(f32, pair[1][0].y(), bottom + GAP + ROW_EXTRA_GAP);
        }
        let last = &boxes[6];
        let expected = (last.y() + last.height() + 70.0).max(MIN_HEIGHT);
        assert_approx_eq!(f32, layout.canvas().height(), expected.ceil());
    }

    #[test]
    fn test_connector_topology() {
        let layout = layout_for(json!({}));
        let pairs: Vec<(usize, usize, ConnectorWeight)> = layout
            .connectors()
            .iter()
            .map(|c| (c.from(), c.to(), c.weight()))
            .collect();

        use ConnectorWeight::{Primary, Secondary};
        assert_eq!(
            pairs,
            [
                (0, 1, Primary),
                (0, 2, Primary),
                (1, 3, Secondary),
                (2, 3, Secondary),
                (1, 4, Secondary),
                (2, 4, Secondary),
                (1, 5, Secondary),
                (2, 5, Secondary),
                (3, 6, Primary),
                (4, 6, Primary),
                (5, 6, Primary),
            ]
        );

        let (start, end) = layout.anchors(&layout.connectors()[0]);
        let goal = &layout.boxes()[0];
        assert_approx_eq!(f32, start.y(), goal.y() + goal.height() + 6.0);
        assert_approx_eq!(f32, end.y(), layout.boxes()[1].y() - 8.0);
    }

    #[test]
    fn test_accent_stripes_by_role() {
        let layout = layout_for(json!({}));
        let accents: Vec<bool> = layout.boxes().iter().map(|b| b.accent()).collect();
        assert_eq!(accents, [true, false, false, true, true, true, true]);
        assert!(layout.boxes().iter().all(|b| b.badge().is_none()));
    }

    proptest! {
        #[test]
        fn prop_connector_count_is_constant(
            packages in proptest::collection::vec("[a-z ]{0,60}", 0..6),
        ) {
            let packages: Vec<Value> = packages
                .into_iter()
                .map(|bullet| json!({ "bullets": [bullet] }))
                .collect();
            let layout = layout_for(json!({ "work_packages": packages }));
            prop_assert_eq!(layout.connectors().len(), 11);
            prop_assert_eq!(layout.boxes().len(), 7);
        }
    }
}
