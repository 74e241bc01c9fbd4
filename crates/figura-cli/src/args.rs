//! Command-line argument definitions for the Figura CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the diagram type and control input/output
//! paths, configuration file selection, and logging verbosity.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the Figura diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the raw diagram content (JSON or JSON5, optionally inside a Markdown code fence)
    #[arg(help = "Path to the input file")]
    pub input: PathBuf,

    /// Diagram type (sequential_flow, hierarchical_framework)
    #[arg(short, long, default_value = "sequential_flow")]
    pub kind: String,

    /// Diagram title; falls back to the title inside the input
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Output path without extension; `.png` and `.svg` are appended
    #[arg(short, long, default_value = "out")]
    pub output: PathBuf,

    /// Also write the normalized content as pretty-printed JSON
    #[arg(long)]
    pub spec_output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
