//! Startup and error plumbing shared by the demo binaries

use gl_renderer::assets::AssetError;
use gl_renderer::core::config::{ApplicationConfig, Config, ConfigError};
use gl_renderer::foundation::logging;
use gl_renderer::render::{RenderError, WindowError};
use thiserror::Error;

/// Anything that stops a demo
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// Window or GL context creation failed
    #[error("window: {0}")]
    Window(#[from] WindowError),

    /// Shader, buffer, model or instance setup failed
    #[error("render: {0}")]
    Render(#[from] RenderError),

    /// Model or image loading failed
    #[error("asset: {0}")]
    Asset(#[from] AssetError),
}

/// Load the configuration, start logging at its level and validate it
///
/// Logging starts at `info` when the file itself cannot be read.
#[allow(dead_code)] // the flat demos run without a config file
pub fn load_config(path: &str) -> Result<ApplicationConfig, AppError> {
    let config = match ApplicationConfig::load_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            log::error!("Failed to load {}: {}", path, e);
            return Err(e.into());
        }
    };

    logging::init(&config.engine.log_level);
    config.validate().inspect_err(|e| log::error!("Invalid configuration in {}: {}", path, e))?;
    Ok(config)
}

/// Log a fatal error before `main` returns it
pub fn report<T>(result: Result<T, AppError>) -> Result<T, AppError> {
    result.inspect_err(|e| log::error!("Fatal: {}", e))
}
