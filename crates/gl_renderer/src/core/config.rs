//! # Unified Configuration System
//!
//! All configuration structures for the renderer and the demo applications.
//! Every default equals the literal constant the demos were tuned with, so a
//! missing config file reproduces the stock scene.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging
//! - **Window Config**: size, title, OpenGL context hints, vsync
//! - **Camera Config**: start pose and control tuning
//! - **Asteroid Field Config**: instance count and procedural placement
//! - **Asset Config**: model paths and search directories
//! - **Shader Programs**: named, ordered lists of shader stages

use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::render::instancing::InstanceStreamLayout;
use crate::render::shader::ShaderStage;

/// # Engine Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log level (`RUST_LOG` overrides it)
    pub log_level: String,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Window Configuration
///
/// Window size and the OpenGL context the window is created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Requested OpenGL context version (major, minor)
    pub gl_version: (u32, u32),
    /// Request a core profile context
    pub core_profile: bool,
    /// Synchronise buffer swaps with the display refresh
    pub vsync: bool,
    /// Hide and capture the cursor for mouse-look
    pub capture_cursor: bool,
    /// Framebuffer clear color (RGBA)
    pub clear_color: [f32; 4],
    /// Enable source-alpha blending at startup
    pub alpha_blending: bool,
}

impl WindowConfig {
    /// Create a window configuration with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the initial window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable cursor capture
    pub fn with_captured_cursor(mut self, capture: bool) -> Self {
        self.capture_cursor = capture;
        self
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        // Instanced drawing and attribute divisors are core from 3.3 onwards
        if self.gl_version < (3, 3) {
            return Err(ConfigError::Invalid(format!(
                "OpenGL {}.{} is too old, 3.3 or newer is required",
                self.gl_version.0, self.gl_version.1
            )));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "LearnOpenGL".to_string(),
            width: 1024,
            height: 576,
            gl_version: (3, 3),
            core_profile: true,
            vsync: true,
            capture_cursor: true,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            alpha_blending: true,
        }
    }
}

/// # Camera Configuration
///
/// Start pose of the fly camera and its control tuning. Angles in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial position in world space
    pub position: Vec3,
    /// Fixed world up reference
    pub world_up: Vec3,
    /// Initial yaw in degrees (-90 looks down -Z)
    pub yaw: f32,
    /// Initial pitch in degrees
    pub pitch: f32,
    /// World units per second
    pub movement_speed: f32,
    /// Degrees per cursor pixel
    pub mouse_sensitivity: f32,
    /// Initial zoom (vertical field of view in degrees)
    pub zoom: f32,
}

impl CameraConfig {
    /// Create a camera configuration at the given position
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_up.norm_squared() == 0.0 {
            return Err(ConfigError::Invalid("camera world_up must be non-zero".to_string()));
        }
        if !self.movement_speed.is_finite() || !self.mouse_sensitivity.is_finite() {
            return Err(ConfigError::Invalid("camera speeds must be finite".to_string()));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 55.0),
            world_up: Vec3::new(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
        }
    }
}

/// # Asteroid Field Configuration
///
/// Parameters of the procedural ring and of the instance attribute stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidFieldConfig {
    /// Number of rock instances
    pub count: u32,
    /// Radius of the ring the rocks are placed on
    pub ring_radius: f32,
    /// Maximum positional offset from the ring on each axis
    pub jitter: f32,
    /// Seed for the placement generator; derived from the clock when absent
    pub seed: Option<u64>,
    /// Axis every rock is rotated about
    pub rotation_axis: Vec3,
    /// First vertex attribute location of the per-instance matrix
    pub instance_attribute_location: u32,
}

impl AsteroidFieldConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ring_radius.is_finite() && self.jitter.is_finite()) {
            return Err(ConfigError::Invalid("ring radius and jitter must be finite".to_string()));
        }
        if self.jitter < 0.0 {
            return Err(ConfigError::Invalid(format!("jitter must be >= 0, got {}", self.jitter)));
        }
        if self.rotation_axis.norm_squared() == 0.0 {
            return Err(ConfigError::Invalid("rotation axis must be non-zero".to_string()));
        }
        if self
            .instance_attribute_location
            .checked_add(InstanceStreamLayout::COLUMNS)
            .is_none()
        {
            return Err(ConfigError::Invalid(format!(
                "instance attribute location {} leaves no room for a matrix",
                self.instance_attribute_location
            )));
        }
        Ok(())
    }
}

impl Default for AsteroidFieldConfig {
    fn default() -> Self {
        Self {
            count: 100_000,
            ring_radius: 150.0,
            jitter: 25.0,
            seed: None,
            rotation_axis: Vec3::new(0.4, 0.6, 0.8),
            instance_attribute_location: 5,
        }
    }
}

/// One shader stage and the file holding its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderStageConfig {
    /// Pipeline stage
    pub stage: ShaderStage,
    /// Path to the GLSL source, resolved through the asset search directories
    pub path: String,
}

/// # Shader Program Configuration
///
/// A named program built from an ordered list of stages. Only the stages
/// present are compiled and attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderProgramConfig {
    /// Program name used for lookup and diagnostics
    pub name: String,
    /// Stages in attachment order
    pub stages: Vec<ShaderStageConfig>,
}

impl ShaderProgramConfig {
    /// Start a program configuration with no stages
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage
    pub fn with_stage(mut self, stage: ShaderStage, path: impl Into<String>) -> Self {
        self.stages.push(ShaderStageConfig { stage, path: path.into() });
        self
    }

    /// Vertex + fragment program, the common case
    pub fn vertex_fragment(
        name: impl Into<String>,
        vertex_path: impl Into<String>,
        fragment_path: impl Into<String>,
    ) -> Self {
        Self::new(name)
            .with_stage(ShaderStage::Vertex, vertex_path)
            .with_stage(ShaderStage::Fragment, fragment_path)
    }

    /// Validate the configuration
    ///
    /// A program needs a vertex and a fragment stage and may not repeat a stage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for required in [ShaderStage::Vertex, ShaderStage::Fragment] {
            if !self.stages.iter().any(|s| s.stage == required) {
                return Err(ConfigError::Invalid(format!(
                    "shader program '{}' has no {} stage",
                    self.name,
                    required.name()
                )));
            }
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].iter().any(|s| s.stage == stage.stage) {
                return Err(ConfigError::Invalid(format!(
                    "shader program '{}' lists the {} stage twice",
                    self.name,
                    stage.stage.name()
                )));
            }
        }
        Ok(())
    }
}

/// # Asset Configuration
///
/// Model locations and the directories relative paths are resolved against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directories tried in order when resolving a relative asset path
    pub search_dirs: Vec<String>,
    /// Planet model (drawn once)
    pub planet_model: String,
    /// Rock model (drawn instanced)
    pub rock_model: String,
}

impl AssetConfig {
    /// Resolve a relative asset path against the search directories
    ///
    /// The path is tried as given first, then below each search directory.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let direct = Path::new(relative);
        if direct.exists() {
            return Some(direct.to_path_buf());
        }

        self.search_dirs
            .iter()
            .map(|dir| Path::new(dir).join(relative))
            .find(|candidate| candidate.exists())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            search_dirs: vec![
                "resources".to_string(),
                "planet_app".to_string(),
                "planet_app/resources".to_string(),
                "..".to_string(),
            ],
            planet_model: "models/planet/planet.obj".to_string(),
            rock_model: "models/rock/rock.obj".to_string(),
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration of the asteroid field demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Window and context configuration
    pub window: WindowConfig,
    /// Fly camera configuration
    pub camera: CameraConfig,
    /// Procedural asteroid field
    pub field: AsteroidFieldConfig,
    /// Asset locations
    pub assets: AssetConfig,
    /// Shader programs by name
    pub shaders: Vec<ShaderProgramConfig>,
}

impl ApplicationConfig {
    /// Name of the instanced rock program
    pub const ASTEROID_PROGRAM: &'static str = "asteroid";
    /// Name of the planet program
    pub const PLANET_PROGRAM: &'static str = "planet";

    /// Look up a shader program by name
    pub fn shader_program(&self, name: &str) -> Result<&ShaderProgramConfig, ConfigError> {
        self.shaders
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| ConfigError::Invalid(format!("no shader program named '{}'", name)))
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        self.camera.validate()?;
        self.field.validate()?;
        for program in &self.shaders {
            program.validate()?;
        }
        self.shader_program(Self::ASTEROID_PROGRAM)?;
        self.shader_program(Self::PLANET_PROGRAM)?;
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            field: AsteroidFieldConfig::default(),
            assets: AssetConfig::default(),
            shaders: vec![
                ShaderProgramConfig::vertex_fragment(
                    Self::ASTEROID_PROGRAM,
                    "shaders/asteroid.vert.glsl",
                    "shaders/asteroid.frag.glsl",
                ),
                ShaderProgramConfig::vertex_fragment(
                    Self::PLANET_PROGRAM,
                    "shaders/planet.vert.glsl",
                    "shaders/planet.frag.glsl",
                ),
            ],
        }
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.field.count, 100_000);
        assert_eq!(config.field.ring_radius, 150.0);
        assert_eq!(config.field.jitter, 25.0);
        assert_eq!(config.camera.position, Vec3::new(0.0, 0.0, 55.0));
    }

    #[test]
    fn test_toml_round_trip_keeps_stage_order() {
        let mut config = ApplicationConfig::default();
        config.field.seed = Some(42);
        config.shaders[0] = ShaderProgramConfig::new("asteroid")
            .with_stage(ShaderStage::Vertex, "a.vert")
            .with_stage(ShaderStage::Geometry, "a.geom")
            .with_stage(ShaderStage::Fragment, "a.frag");

        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed = ApplicationConfig::parse("app.toml", &text).expect("parse");

        assert_eq!(parsed.field.seed, Some(42));
        assert_eq!(parsed.shaders, config.shaders);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let text = "[field]\ncount = 10\nseed = 7\n";
        let parsed = ApplicationConfig::parse("app.toml", text).expect("parse");

        assert_eq!(parsed.field.count, 10);
        assert_eq!(parsed.field.seed, Some(7));
        assert_eq!(parsed.field.ring_radius, 150.0);
        assert_eq!(parsed.shaders.len(), 2);
    }

    #[test]
    fn test_alpha_blending_defaults_on() {
        assert!(WindowConfig::default().alpha_blending);

        let parsed = ApplicationConfig::parse("app.toml", "[window]\nalpha_blending = false\n").expect("parse");
        assert!(!parsed.window.alpha_blending);
        assert!(parsed.window.vsync);
    }

    #[test]
    fn test_ron_is_supported() {
        let config = ApplicationConfig::default();
        let text = ron::to_string(&config).expect("serialize");
        let parsed = ApplicationConfig::parse("app.ron", &text).expect("parse");
        assert_eq!(parsed.window.width, config.window.width);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = ApplicationConfig::parse("app.json", "{}");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_program_requires_vertex_and_fragment() {
        let program = ShaderProgramConfig::new("broken").with_stage(ShaderStage::Vertex, "v.glsl");
        assert!(program.validate().is_err());

        let duplicated = ShaderProgramConfig::vertex_fragment("dup", "v.glsl", "f.glsl")
            .with_stage(ShaderStage::Vertex, "v2.glsl");
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = ApplicationConfig::default();
        config.field.jitter = -1.0;
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::default();
        config.window.gl_version = (2, 1);
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::default();
        config.shaders.retain(|p| p.name != ApplicationConfig::PLANET_PROGRAM);
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::default();
        config.field.instance_attribute_location = u32::MAX - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_missing_asset() {
        let assets = AssetConfig {
            search_dirs: vec!["definitely/not/here".to_string()],
            ..AssetConfig::default()
        };
        assert!(assets.resolve("nope.obj").is_none());
        assert_eq!(assets.resolve("Cargo.toml"), Some(PathBuf::from("Cargo.toml")));
    }
}
