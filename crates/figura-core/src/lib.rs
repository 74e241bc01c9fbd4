//! Figura Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Figura layout
//! engine and its drawing backends:
//!
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Colors**: CSS color parsing and conversion ([`color::Color`])
//! - **Text**: Text metrics and greedy wrapping ([`text`] module)
//! - **Fonts**: Font resolution and glyph shaping ([`font`] module)

pub mod color;
pub mod font;
pub mod geometry;
pub mod text;
