//! # GL Renderer
//!
//! A small OpenGL rendering layer for tutorial-style demos, built on `glow`
//! and `glfw`.
//!
//! ## Features
//!
//! - **Fly Camera**: yaw/pitch camera with WASD movement, mouse look and scroll zoom
//! - **Instanced Rendering**: one GPU buffer of per-instance matrices bound as a
//!   divisor-1 attribute stream, drawn with one call per submesh
//! - **Asteroid Fields**: seeded procedural ring placement
//! - **Model Loading**: OBJ import with tangent generation and cached textures
//! - **Configuration**: TOML/RON config files with validated defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gl_renderer::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::load_or_default("asteroid_field.toml")?;
//!     let mut window = GlWindow::new(&config.window)?;
//!     let mut frame = FrameContext::new(Camera::from_config(&config.camera), 1024, 576);
//!
//!     while !window.should_close() && !frame.shutdown_requested() {
//!         let dt = frame.begin_frame();
//!         frame.apply_movement(window.movement_keys(), dt);
//!         window.clear(config.window.clear_color);
//!         window.swap_buffers();
//!         window.poll_events();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod core;
pub mod config;
pub mod foundation;
pub mod input;
pub mod assets;
pub mod render;
pub mod scene;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, ImageData},
        core::config::{ApplicationConfig, AsteroidFieldConfig, CameraConfig, Config, ConfigError, WindowConfig},
        foundation::{
            math::{Mat4, Mat4Ext, Vec3},
            time::Timer,
        },
        input::{KeyLatch, MouseTracker, MovementKeys},
        render::{
            Camera, CameraMovement, FrameContext, GlWindow, GpuMesh, InstanceBuffer, InstanceStreamLayout, Model,
            PositionVertex, RenderError, ShaderProgram, ShaderSource, ShaderStage, WindowError,
        },
        scene::InstanceTransformSet,
    };
}
