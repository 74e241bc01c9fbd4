//! Color handling for Figura diagrams
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Both drawing backends consume the same value: the
//! raster backend through [`Color::to_rgba8`] and the vector backend through
//! [`Color::to_hex`] plus [`Color::alpha`].

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use figura_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Creates a new color with the specified alpha value (0.0 to 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// use figura_core::color::Color;
    ///
    /// let red = Color::new("red").unwrap();
    /// let translucent = red.with_alpha(0.5);
    /// assert_eq!(translucent.alpha(), 0.5);
    /// ```
    pub fn with_alpha(self, alpha: f32) -> Self {
        Color {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Creates a new color with an 8-bit alpha value.
    pub fn with_alpha8(self, alpha: u8) -> Self {
        self.with_alpha(f32::from(alpha) / 255.0)
    }

    /// Returns the alpha component as a value between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }

    /// Returns the color as straight (non-premultiplied) sRGB bytes `[r, g, b, a]`.
    pub fn to_rgba8(self) -> [u8; 4] {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        [rgba.r, rgba.g, rgba.b, rgba.a]
    }

    /// Returns the opaque part of the color as `#RRGGBB`.
    ///
    /// # Examples
    ///
    /// ```
    /// use figura_core::color::Color;
    ///
    /// let c = Color::new("#F97316").unwrap().with_alpha(0.5);
    /// assert_eq!(c.to_hex(), "#F97316");
    /// ```
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
