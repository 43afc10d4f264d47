//! # Core Module
//!
//! Shared configuration types used by every subsystem and by the demo
//! binaries.
//!
//! ## Organization
//!
//! - **Config**: the application configuration tree and its validation

pub mod config;

pub use config::{
    ApplicationConfig, AssetConfig, AsteroidFieldConfig, CameraConfig, Config, ConfigError, EngineConfig,
    ShaderProgramConfig, ShaderStageConfig, WindowConfig,
};
