//! Color themes for the diagram archetypes.
//!
//! A [`Theme`] is an immutable set of colors chosen per archetype. Boxes pick
//! their fill and stroke either by role (goal, row, outcomes) or cyclically by
//! position from the palette.

use figura_core::color::Color;

/// Fill and stroke of one box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxColors {
    fill: Color,
    stroke: Color,
}

impl BoxColors {
    pub fn new(fill: Color, stroke: Color) -> Self {
        Self { fill, stroke }
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn stroke(&self) -> Color {
        self.stroke
    }
}

/// Colors shared by every element of a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    background: Color,
    text: Color,
    muted: Color,
    border: Color,
    arrow: Color,
    accent: Color,
    shadow: Color,
    badge: Color,
    palette: Vec<BoxColors>,
    goal: BoxColors,
    row: BoxColors,
    outcomes: BoxColors,
}

impl Theme {
    /// Warm-to-cool palette for numbered stages.
    pub fn sequential() -> Self {
        Self::base(
            &[
                ("#FFF7ED", "#FDBA74"),
                ("#ECFDF5", "#6EE7B7"),
                ("#EFF6FF", "#93C5FD"),
                ("#FDF2F8", "#F9A8D4"),
                ("#F5F3FF", "#C4B5FD"),
                ("#F0FDFA", "#5EEAD4"),
            ],
            22,
            190,
        )
    }

    /// Palette for the three work packages; roles use fixed colors.
    pub fn hierarchical() -> Self {
        Self::base(
            &[
                ("#ECFDF5", "#6EE7B7"),
                ("#EFF6FF", "#93C5FD"),
                ("#F5F3FF", "#C4B5FD"),
            ],
            20,
            185,
        )
    }

    fn base(palette: &[(&str, &str)], shadow_alpha: u8, accent_alpha: u8) -> Self {
        let border = hex("#CBD5E1");
        Self {
            background: hex("#F8FAFC"),
            text: hex("#0F172A"),
            muted: hex("#334155"),
            border,
            arrow: hex("#64748B"),
            accent: hex("#F97316").with_alpha8(accent_alpha),
            shadow: hex("#0F172A").with_alpha8(shadow_alpha),
            badge: hex("#FFFFFF").with_alpha8(235),
            palette: palette
                .iter()
                .map(|(fill, stroke)| BoxColors::new(hex(fill), hex(stroke)))
                .collect(),
            goal: BoxColors::new(hex("#FFF7ED"), hex("#FDBA74")),
            row: BoxColors::new(hex("#FFFFFF"), border),
            outcomes: BoxColors::new(hex("#F0FDFA"), hex("#5EEAD4")),
        }
    }

    /// Returns a copy with the background replaced.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Color of titles and headers.
    pub fn text(&self) -> Color {
        self.text
    }

    /// Color of body lines.
    pub fn muted(&self) -> Color {
        self.muted
    }

    pub fn border(&self) -> Color {
        self.border
    }

    pub fn arrow(&self) -> Color {
        self.arrow
    }

    /// Accent stripe color, alpha included.
    pub fn accent(&self) -> Color {
        self.accent
    }

    /// Drop shadow color, alpha included.
    pub fn shadow(&self) -> Color {
        self.shadow
    }

    /// Badge pill fill, alpha included.
    pub fn badge(&self) -> Color {
        self.badge
    }

    /// Palette entry for the box at `index`, cycling.
    pub fn palette(&self, index: usize) -> BoxColors {
        self.palette[index % self.palette.len()]
    }

    pub fn goal(&self) -> BoxColors {
        self.goal
    }

    /// Colors of the neutral two-column row.
    pub fn row(&self) -> BoxColors {
        self.row
    }

    pub fn outcomes(&self) -> BoxColors {
        self.outcomes
    }
}

/// Parses a theme literal. Every literal in this module is a valid hex color.
fn hex(value: &str) -> Color {
    Color::new(value).expect("theme colors are valid hex literals")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        let theme = Theme::sequential();
        assert_eq!(theme.palette(0), theme.palette(6));
        assert_eq!(theme.palette(1).fill().to_hex(), "#ECFDF5");

        let theme = Theme::hierarchical();
        assert_eq!(theme.palette(0), theme.palette(3));
    }

    #[test]
    fn test_translucent_colors_keep_alpha() {
        let theme = Theme::sequential();
        assert_eq!(theme.shadow().to_rgba8(), [0x0F, 0x17, 0x2A, 22]);
        assert_eq!(theme.accent().to_rgba8()[3], 190);
        assert_eq!(Theme::hierarchical().shadow().to_rgba8()[3], 20);
    }

    #[test]
    fn test_with_background() {
        let white = Color::new("white").unwrap();
        let theme = Theme::hierarchical().with_background(white);
        assert_eq!(theme.background().to_hex(), "#FFFFFF");
        assert_eq!(theme.row().stroke(), theme.border());
    }
}
