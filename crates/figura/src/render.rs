//! Drawing backends.
//!
//! Both backends implement [`Renderer`] over the same [`Layout`]:
//!
//! - [`RasterRenderer`] paints into a bitmap and encodes it as PNG.
//! - [`SvgRenderer`] emits an editable SVG document.
//!
//! Shared geometry that is not part of the layout model itself, such as the
//! arrowhead triangle, lives here so both backends draw identical shapes.

pub mod raster;
pub mod svg;

use std::f32::consts::PI;

use thiserror::Error;

use figura_core::geometry::Point;

use crate::layout::Layout;

pub use self::raster::RasterRenderer;
pub use self::svg::SvgRenderer;

/// Distance from the arrow tip to the back corners of the head.
pub const ARROW_HEAD_LENGTH: f32 = 12.0;

/// Angle between the line direction and each side of the head.
pub const ARROW_HEAD_SPREAD: f32 = 0.85 * PI;

/// Errors raised while producing output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// A drawing backend.
pub trait Renderer {
    type Output;

    /// Draws `layout` completely or fails; no partial output is returned.
    fn render(&mut self, layout: &Layout) -> Result<Self::Output, RenderError>;
}

/// Filled triangle at the end of a connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    tip: Point,
    left: Point,
    right: Point,
}

impl ArrowHead {
    /// Head for a line running from `start` to `end`, with its tip at `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use figura_core::geometry::Point;
    /// # use figura::render::ArrowHead;
    /// let head = ArrowHead::new(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
    /// let [tip, left, right] = head.points();
    /// assert_eq!(tip, Point::new(0.0, 100.0));
    /// assert!(left.y() < 100.0 && right.y() < 100.0);
    /// ```
    pub fn new(start: Point, end: Point) -> Self {
        let angle = start.angle_to(end);
        Self {
            tip: end,
            left: end.offset_polar(ARROW_HEAD_LENGTH, angle + ARROW_HEAD_SPREAD),
            right: end.offset_polar(ARROW_HEAD_LENGTH, angle - ARROW_HEAD_SPREAD),
        }
    }

    /// Head pointing along +X with its tip at the origin.
    pub fn unit() -> Self {
        Self::new(Point::new(-1.0, 0.0), Point::default())
    }

    /// Tip followed by the two back corners.
    pub fn points(&self) -> [Point; 3] {
        [self.tip, self.left, self.right]
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_arrow_head_is_symmetric() {
        let head = ArrowHead::new(Point::new(50.0, 0.0), Point::new(50.0, 80.0));
        let [tip, left, right] = head.points();
        assert_approx_eq!(f32, left.y(), right.y(), epsilon = 1e-4);
        assert_approx_eq!(f32, tip.x() - left.x(), right.x() - tip.x(), epsilon = 1e-4);
        let rise = ARROW_HEAD_LENGTH * (0.15 * PI).cos();
        assert_approx_eq!(f32, tip.y() - left.y(), rise, epsilon = 1e-4);
    }

    #[test]
    fn test_unit_head_back_corners() {
        let [tip, left, right] = ArrowHead::unit().points();
        assert_eq!(tip, Point::default());
        assert_approx_eq!(f32, left.x(), -10.692, epsilon = 1e-3);
        assert_approx_eq!(f32, left.y(), 5.448, epsilon = 1e-3);
        assert_approx_eq!(f32, right.y(), -5.448, epsilon = 1e-3);
    }
}
