//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the renderer:
//! - Math types and OpenGL-convention matrix builders
//! - Frame timing
//! - Logging setup

pub mod math;
pub mod time;
pub mod logging;
