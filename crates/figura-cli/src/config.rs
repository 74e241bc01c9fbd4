//! Configuration file loading for the CLI
//!
//! A figura configuration is looked up in the working directory first
//! (`figura/config.toml`), then in the platform config directory. Settings
//! the engine would reject later are checked here so the error names the file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use figura::{
    FiguraError,
    config::{AppConfig, MIN_CANVAS_WIDTH},
};

const LOCAL_CONFIG: &str = "figura/config.toml";

/// Problems with a figura configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("{path}: canvas width {width} is below the minimum of {min}", min = MIN_CANVAS_WIDTH)]
    CanvasWidth { path: PathBuf, width: u32 },

    #[error("{path}: invalid style.background_color: {message}")]
    Background { path: PathBuf, message: String },
}

impl From<ConfigError> for FiguraError {
    fn from(err: ConfigError) -> Self {
        FiguraError::Config(err.to_string())
    }
}

/// Find and load the figura configuration
///
/// Search order:
/// 1. Explicit `--config` path
/// 2. `figura/config.toml` in the working directory
/// 3. Platform-specific config directory
/// 4. Built-in defaults (1600px canvas, platform font candidates)
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - The canvas is narrower than [`MIN_CANVAS_WIDTH`] or the background color is invalid
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, FiguraError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "figura", "figura") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(&system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, FiguraError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config = parse_config(&content).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    check_config(path, &config)?;

    let fonts = config.fonts();
    info!(
        canvas_width = config.canvas().width(),
        font_candidates = fonts.candidates().len(),
        system_fallback = fonts.system_fallback(),
        require_fonts = fonts.require();
        "Configuration loaded"
    );
    Ok(config)
}

fn parse_config(content: &str) -> Result<AppConfig, String> {
    toml::from_str(content).map_err(|err| err.to_string())
}

/// Rejects values the engine cannot draw with.
fn check_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let width = config.canvas().width();
    if width < MIN_CANVAS_WIDTH {
        return Err(ConfigError::CanvasWidth {
            path: path.to_path_buf(),
            width,
        });
    }

    config
        .style()
        .background_color()
        .map_err(|message| ConfigError::Background {
            path: path.to_path_buf(),
            message,
        })?;
    Ok(())
}
