//! Shader program construction
//!
//! A program is described by an ordered list of [`ShaderSource`]s, one per
//! stage that is actually present. Sources usually come from a
//! [`ShaderProgramConfig`] whose paths are resolved through the asset search
//! directories.

use std::fmt;

use glow::HasContext;
use serde::{Deserialize, Serialize};

use crate::core::config::{AssetConfig, ShaderProgramConfig};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::{RenderError, RenderResult};

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
    /// Geometry shader
    Geometry,
}

impl ShaderStage {
    /// OpenGL shader type enum
    pub fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
            Self::Geometry => glow::GEOMETRY_SHADER,
        }
    }

    /// Lowercase stage name for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// GLSL source for one stage
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// Stage the source compiles for
    pub stage: ShaderStage,
    /// Where the source came from (file path or a short tag)
    pub label: String,
    /// GLSL text
    pub source: String,
}

impl ShaderSource {
    /// Source embedded in the binary
    pub fn inline(stage: ShaderStage, label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            stage,
            label: label.into(),
            source: source.into(),
        }
    }

    /// Read every stage of a configured program from disk
    pub fn load_program(config: &ShaderProgramConfig, assets: &AssetConfig) -> RenderResult<Vec<Self>> {
        config
            .validate()
            .map_err(|e| RenderError::InvalidProgram(e.to_string()))?;

        config
            .stages
            .iter()
            .map(|stage| {
                let path = assets
                    .resolve(&stage.path)
                    .ok_or_else(|| RenderError::ShaderSourceMissing(stage.path.clone()))?;
                let source = std::fs::read_to_string(&path)
                    .map_err(|e| RenderError::ShaderSourceIo(path.display().to_string(), e))?;
                log::debug!("Read {} shader for '{}' from {}", stage.stage, config.name, path.display());
                Ok(Self::inline(stage.stage, path.display().to_string(), source))
            })
            .collect()
    }
}

/// A linked shader program
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    program: glow::Program,
}

impl ShaderProgram {
    /// Compile and link a program from its stage sources
    ///
    /// Compile and link failures carry the driver's info log and are fatal for
    /// the program: nothing half-built is returned.
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn build(gl: &glow::Context, name: &str, sources: &[ShaderSource]) -> RenderResult<Self> {
        let program = unsafe { gl.create_program() }.map_err(RenderError::ResourceCreation)?;

        let mut shaders = Vec::with_capacity(sources.len());
        for source in sources {
            match unsafe { compile_shader(gl, name, source) } {
                Ok(shader) => shaders.push(shader),
                Err(e) => {
                    unsafe {
                        for shader in shaders {
                            gl.delete_shader(shader);
                        }
                        gl.delete_program(program);
                    }
                    return Err(e);
                }
            }
        }

        unsafe {
            for &shader in &shaders {
                gl.attach_shader(program, shader);
            }
            gl.link_program(program);

            let linked = gl.get_program_link_status(program);
            let log = if linked { String::new() } else { gl.get_program_info_log(program) };

            // Shaders can be detached and deleted once linking has been attempted.
            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            if !linked {
                gl.delete_program(program);
                return Err(RenderError::ProgramLink { program: name.to_string(), log });
            }
        }

        log::info!("Built shader program '{}' from {} stage(s)", name, sources.len());
        Ok(Self { name: name.to_string(), program })
    }

    /// Program name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make this the active program
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and this program bound.
    pub unsafe fn set_int(&self, gl: &glow::Context, name: &str, value: i32) {
        if let Some(location) = unsafe { self.location(gl, name) } {
            unsafe { gl.uniform_1_i32(Some(&location), value) };
        }
    }

    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and this program bound.
    pub unsafe fn set_bool(&self, gl: &glow::Context, name: &str, value: bool) {
        unsafe { self.set_int(gl, name, i32::from(value)) };
    }

    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and this program bound.
    pub unsafe fn set_float(&self, gl: &glow::Context, name: &str, value: f32) {
        if let Some(location) = unsafe { self.location(gl, name) } {
            unsafe { gl.uniform_1_f32(Some(&location), value) };
        }
    }

    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and this program bound.
    pub unsafe fn set_vec3(&self, gl: &glow::Context, name: &str, value: &Vec3) {
        if let Some(location) = unsafe { self.location(gl, name) } {
            unsafe { gl.uniform_3_f32(Some(&location), value.x, value.y, value.z) };
        }
    }

    /// Upload a matrix; nalgebra storage is already column-major.
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and this program bound.
    pub unsafe fn set_mat4(&self, gl: &glow::Context, name: &str, value: &Mat4) {
        if let Some(location) = unsafe { self.location(gl, name) } {
            unsafe { gl.uniform_matrix_4_f32_slice(Some(&location), false, value.as_slice()) };
        }
    }

    /// Release the GL program
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn delete(self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }

    unsafe fn location(&self, gl: &glow::Context, name: &str) -> Option<glow::UniformLocation> {
        let location = unsafe { gl.get_uniform_location(self.program, name) };
        if location.is_none() {
            // Unused uniforms are optimised out by the driver
            log::trace!("Uniform '{}' not active in program '{}'", name, self.name);
        }
        location
    }
}

/// Compile a single shader stage from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
unsafe fn compile_shader(gl: &glow::Context, program: &str, source: &ShaderSource) -> RenderResult<glow::Shader> {
    unsafe {
        let shader = gl
            .create_shader(source.stage.gl_type())
            .map_err(RenderError::ResourceCreation)?;
        gl.shader_source(shader, &source.source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile {
                program: program.to_string(),
                stage: source.stage,
                label: source.label.clone(),
                log,
            });
        }

        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ShaderProgramConfig;
    use tempfile::tempdir;

    #[test]
    fn test_stage_gl_types() {
        assert_eq!(ShaderStage::Vertex.gl_type(), glow::VERTEX_SHADER);
        assert_eq!(ShaderStage::Fragment.gl_type(), glow::FRAGMENT_SHADER);
        assert_eq!(ShaderStage::Geometry.gl_type(), glow::GEOMETRY_SHADER);
        assert_eq!(ShaderStage::Geometry.to_string(), "geometry");
    }

    #[test]
    fn test_missing_source_file_is_reported() {
        let assets = AssetConfig {
            search_dirs: Vec::new(),
            ..AssetConfig::default()
        };
        let config = ShaderProgramConfig::vertex_fragment("ghost", "no/such.vert", "no/such.frag");

        let result = ShaderSource::load_program(&config, &assets);
        assert!(matches!(result, Err(RenderError::ShaderSourceMissing(path)) if path == "no/such.vert"));
    }

    #[test]
    fn test_incomplete_program_is_rejected_before_io() {
        let assets = AssetConfig::default();
        let config = ShaderProgramConfig::new("half").with_stage(ShaderStage::Fragment, "f.glsl");

        let result = ShaderSource::load_program(&config, &assets);
        assert!(matches!(result, Err(RenderError::InvalidProgram(_))));
    }

    #[test]
    fn test_loads_stages_in_configured_order() {
        let dir = tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("t.vert"), "void main() {}").expect("write vert");
        std::fs::write(dir.path().join("t.frag"), "out vec4 c; void main() { c = vec4(1.0); }").expect("write frag");

        let assets = AssetConfig {
            search_dirs: vec![dir.path().display().to_string()],
            ..AssetConfig::default()
        };
        let config = ShaderProgramConfig::new("t")
            .with_stage(ShaderStage::Fragment, "t.frag")
            .with_stage(ShaderStage::Vertex, "t.vert");

        let sources = ShaderSource::load_program(&config, &assets).expect("load");
        let stages: Vec<_> = sources.iter().map(|s| s.stage).collect();
        assert_eq!(stages, vec![ShaderStage::Fragment, ShaderStage::Vertex]);
        assert_eq!(sources[1].source, "void main() {}");
    }
}
