//! Error adapter for converting FiguraError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI. Figura errors
//! carry no source spans, so each diagnostic is a code plus help text.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use figura::FiguraError;

/// Adapter rendering a [`FiguraError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a FiguraError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            FiguraError::Config(_) => "figura::config",
            FiguraError::InvalidDiagramType(_) => "figura::diagram_type",
            FiguraError::Render(_) => "figura::render",
            FiguraError::Io(_) => "figura::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            FiguraError::Config(_) => {
                "check the [canvas], [fonts] and [style] sections of the configuration file"
            }
            FiguraError::InvalidDiagramType(_) => {
                "use --kind sequential_flow or --kind hierarchical_framework"
            }
            FiguraError::Render(_) | FiguraError::Io(_) => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Wraps `err` for rendering with a miette report handler.
pub fn to_reportable(err: &FiguraError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}
