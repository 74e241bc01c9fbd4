//! Error types for Figura operations.
//!
//! This module provides the main error type [`FiguraError`]. Normalization of
//! raw content never fails, so every variant describes either a bad engine
//! configuration, a bad call, or a backend failure.

use std::io;

use thiserror::Error;

use crate::render::RenderError;

/// The main error type for Figura operations.
#[derive(Debug, Error)]
pub enum FiguraError {
    /// The engine cannot be constructed from the given configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested diagram type is not supported.
    #[error("Unsupported diagram type `{0}`")]
    InvalidDiagramType(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
