//! Text metrics and greedy line wrapping.
//!
//! Every sizing decision in the layout goes through the [`TextMeasure`]
//! trait, so the same wrapping code runs against real shaped fonts (see
//! [`Typesetter`](crate::font::Typesetter)) or against the deterministic
//! [`ApproxMetrics`] face.
//!
//! # Quick Start
//!
//! ```
//! use figura_core::text::{ApproxMetrics, FontSpec, wrap, wrap_bullet};
//!
//! let mut metrics = ApproxMetrics;
//! let font = FontSpec::regular(22.0);
//!
//! let lines = wrap(&mut metrics, "a fairly long sentence", font, 120.0);
//! assert!(lines.len() > 1);
//!
//! let bullet = wrap_bullet(&mut metrics, "collect data", font, 400.0);
//! assert_eq!(bullet, vec!["• collect data".to_string()]);
//! ```

use unicode_width::UnicodeWidthChar;

/// Marker placed in front of the first line of a bullet.
pub const BULLET_MARKER: &str = "• ";

/// Average advance of one display column, as a fraction of the font size.
const APPROX_COLUMN_ADVANCE: f32 = 0.55;

/// Extra advance applied to bold text by [`ApproxMetrics`].
const APPROX_BOLD_FACTOR: f32 = 1.05;

/// Font weight used by diagram text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font selection for a run of text: pixel size plus weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    size: f32,
    weight: FontWeight,
}

impl FontSpec {
    pub const fn new(size: f32, weight: FontWeight) -> Self {
        Self { size, weight }
    }

    /// Regular weight at `size` pixels.
    pub const fn regular(size: f32) -> Self {
        Self::new(size, FontWeight::Regular)
    }

    /// Bold weight at `size` pixels.
    pub const fn bold(size: f32) -> Self {
        Self::new(size, FontWeight::Bold)
    }

    /// Font size in pixels.
    pub fn size(self) -> f32 {
        self.size
    }

    pub fn weight(self) -> FontWeight {
        self.weight
    }

    pub fn is_bold(self) -> bool {
        self.weight == FontWeight::Bold
    }
}

/// Measures the rendered width of text.
///
/// Implementations may cache internally but must return the same width for
/// the same `(text, font)` pair for the lifetime of the value.
pub trait TextMeasure {
    /// Width in pixels of `text` rendered on a single line with `font`.
    fn measure(&mut self, text: &str, font: FontSpec) -> f32;
}

/// Built-in fallback face with fixed per-column advances.
///
/// Used when no font resource can be resolved. Wide (CJK) characters count as
/// two columns and control characters as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMetrics;

impl TextMeasure for ApproxMetrics {
    fn measure(&mut self, text: &str, font: FontSpec) -> f32 {
        let columns: usize = text.chars().map(|ch| ch.width().unwrap_or(0)).sum();
        let mut advance = font.size() * APPROX_COLUMN_ADVANCE;
        if font.is_bold() {
            advance *= APPROX_BOLD_FACTOR;
        }
        columns as f32 * advance
    }
}

/// Greedily wraps `text` into lines no wider than `max_width`.
///
/// Characters are appended to the current line while the line still fits;
/// otherwise the line is closed and a new one starts with that character. The
/// first character of a line is always accepted so a single oversized glyph
/// cannot stall wrapping. Embedded `'\n'` always breaks the line, and empty
/// lines are dropped. Whitespace-only input yields no lines.
pub fn wrap<M>(measure: &mut M, text: &str, font: FontSpec, max_width: f32) -> Vec<String>
where
    M: TextMeasure + ?Sized,
{
    let text = text.trim();
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    let mut current = String::new();
    for ch in text.chars() {
        if ch == '\n' {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            continue;
        }

        if current.is_empty() {
            current.push(ch);
            continue;
        }

        current.push(ch);
        if measure.measure(&current, font) > max_width {
            current.pop();
            lines.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps `text` as a bullet item.
///
/// The first line is prefixed with [`BULLET_MARKER`]; continuation lines get a
/// hanging indent of spaces matching the marker's rendered width. The wrap
/// budget is reduced by the marker width for every line.
pub fn wrap_bullet<M>(measure: &mut M, text: &str, font: FontSpec, max_width: f32) -> Vec<String>
where
    M: TextMeasure + ?Sized,
{
    let marker_width = measure.measure(BULLET_MARKER, font);
    let inner_width = (max_width - marker_width).max(1.0);

    let mut wrapped = wrap(measure, text, font, inner_width).into_iter();
    let Some(first) = wrapped.next() else {
        return Vec::new();
    };

    let indent = hanging_indent(measure, font, marker_width);
    let mut lines = vec![format!("{BULLET_MARKER}{first}")];
    lines.extend(wrapped.map(|line| format!("{indent}{line}")));
    lines
}

/// Run of spaces whose width best matches `width`, at least one space long.
fn hanging_indent<M>(measure: &mut M, font: FontSpec, width: f32) -> String
where
    M: TextMeasure + ?Sized,
{
    let space = measure.measure(" ", font);
    let count = if space > 0.0 {
        (width / space).round().max(1.0) as usize
    } else {
        BULLET_MARKER.chars().count()
    };
    " ".repeat(count)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    /// Every character is exactly 10px wide.
    struct FixedAdvance;

    impl TextMeasure for FixedAdvance {
        fn measure(&mut self, text: &str, _font: FontSpec) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    const BODY: FontSpec = FontSpec::regular(22.0);

    #[test]
    fn test_approx_metrics_wide_characters() {
        let mut metrics = ApproxMetrics;
        let latin = metrics.measure("ab", BODY);
        let cjk = metrics.measure("研究", BODY);
        assert_approx_eq!(f32, latin, 2.0 * 22.0 * 0.55);
        assert_approx_eq!(f32, cjk, 2.0 * latin);
    }

    #[test]
    fn test_approx_metrics_bold_is_wider() {
        let mut metrics = ApproxMetrics;
        let regular = metrics.measure("Stage", FontSpec::regular(26.0));
        let bold = metrics.measure("Stage", FontSpec::bold(26.0));
        assert!(bold > regular);
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert!(wrap(&mut FixedAdvance, "", BODY, 100.0).is_empty());
        assert!(wrap(&mut FixedAdvance, "   \n\t ", BODY, 100.0).is_empty());
    }

    #[test]
    fn test_wrap_breaks_at_budget() {
        let lines = wrap(&mut FixedAdvance, "abcdefghij", BODY, 40.0);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_exact_fit_stays_on_one_line() {
        let lines = wrap(&mut FixedAdvance, "abcd", BODY, 40.0);
        assert_eq!(lines, vec!["abcd"]);
    }

    #[test]
    fn test_wrap_newline_forces_break() {
        let lines = wrap(&mut FixedAdvance, "ab\ncd\n\nef", BODY, 1000.0);
        assert_eq!(lines, vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn test_wrap_oversized_glyph_makes_progress() {
        let lines = wrap(&mut FixedAdvance, "abc", BODY, 5.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_wrap_bullet_single_line() {
        let lines = wrap_bullet(&mut FixedAdvance, "  data  ", BODY, 200.0);
        assert_eq!(lines, vec!["• data"]);
    }

    #[test]
    fn test_wrap_bullet_hanging_indent() {
        // Marker is 20px wide, so 40px leaves 20px (two characters) per line.
        let lines = wrap_bullet(&mut FixedAdvance, "abcde", BODY, 40.0);
        assert_eq!(lines, vec!["• ab", "  cd", "  e"]);
    }

    #[test]
    fn test_wrap_bullet_empty() {
        assert!(wrap_bullet(&mut FixedAdvance, " ", BODY, 40.0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_wrapped_lines_fit_budget(text in "[a-zA-Z ]{0,80}", width in 30.0f32..400.0) {
            let mut metrics = ApproxMetrics;
            for line in wrap(&mut metrics, &text, BODY, width) {
                let fits = metrics.measure(&line, BODY) <= width;
                prop_assert!(fits || line.chars().count() == 1);
            }
        }

        #[test]
        fn prop_wrap_preserves_characters(text in "[a-z]{1,60}", width in 20.0f32..300.0) {
            let lines = wrap(&mut FixedAdvance, &text, BODY, width);
            prop_assert_eq!(lines.concat(), text);
        }
    }
}
