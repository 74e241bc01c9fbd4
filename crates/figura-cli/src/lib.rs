//! CLI logic for the Figura diagram tool.
//!
//! Reads raw diagram content from a file, renders it with
//! [`figura::DiagramEngine`] and writes the PNG and SVG next to each other.
//! Where the files go is decided here; the library itself never touches disk.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

use figura::{DiagramEngine, DiagramKind, FiguraError, Rendered};

/// Errors in the content file handed to the CLI.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input {path} is not valid JSON: {message}")]
    Parse { path: PathBuf, message: String },
}

impl From<InputError> for FiguraError {
    fn from(err: InputError) -> Self {
        FiguraError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

/// Run the Figura CLI application
///
/// Loads the configuration, then validates the diagram type before the input
/// is read. Returns the paths written, PNG and SVG first.
///
/// # Errors
///
/// Returns `FiguraError` for:
/// - Configuration loading errors
/// - Unknown diagram types
/// - File I/O errors and unreadable input
/// - Rendering errors
pub fn run(args: &Args) -> Result<Vec<PathBuf>, FiguraError> {
    info!(
        input_path = args.input.display().to_string(),
        output_path = args.output.display().to_string(),
        kind = args.kind;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let kind: DiagramKind = args.kind.parse()?;

    let raw = read_input(&args.input)?;
    let engine = DiagramEngine::new(app_config)?;
    let rendered = engine.render_kind(kind, &raw, &args.title)?;
    info!(
        kind = kind.as_str(),
        title = rendered.spec().title();
        "Diagram rendered"
    );

    write_outputs(&rendered, &args.output, args.spec_output.as_deref())
}

fn read_input(path: &Path) -> Result<Value, FiguraError> {
    let content = fs::read_to_string(path)?;
    let body = strip_code_fence(&content);
    debug!(bytes = body.len(); "Parsing diagram content");

    json5::from_str(body).map_err(|err| {
        InputError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    })
}

/// Returns the body of the first Markdown code fence, or the whole trimmed
/// text when there is none.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after_fence = &trimmed[start + 3..];
    // Skip the info string (`json`, `json5`, ...) up to the end of the line.
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Output path for `extension`, appended to `base` so dotted names survive.
fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

fn write_outputs(
    rendered: &Rendered,
    base: &Path,
    spec_output: Option<&Path>,
) -> Result<Vec<PathBuf>, FiguraError> {
    let png_path = with_extension(base, "png");
    let svg_path = with_extension(base, "svg");

    fs::write(&png_path, rendered.png())?;
    fs::write(&svg_path, rendered.svg())?;
    info!(
        png = png_path.display().to_string(),
        svg = svg_path.display().to_string();
        "Diagram exported successfully"
    );
    let mut written = vec![png_path, svg_path];

    if let Some(path) = spec_output {
        let json = serde_json::to_string_pretty(rendered.spec())
            .map_err(|err| FiguraError::Io(err.into()))?;
        fs::write(path, json)?;
        info!(path = path.display().to_string(); "Normalized content written");
        written.push(path.to_path_buf());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(
            strip_code_fence("Here you go:\n```json\n{\"a\": 1}\n```\nThanks"),
            "{\"a\": 1}"
        );
        assert_eq!(strip_code_fence("```\n{}\n"), "{}");
    }

    #[test]
    fn test_lenient_json() {
        let body = strip_code_fence("```json5\n{ stages: [ { title: 'A', }, ], // done\n}\n```");
        let value: Value = json5::from_str(body).unwrap();
        assert_eq!(value["stages"][0]["title"], "A");
    }

    #[test]
    fn test_with_extension_keeps_dots() {
        assert_eq!(
            with_extension(Path::new("out/plan.v2"), "svg"),
            PathBuf::from("out/plan.v2.svg")
        );
    }
}
