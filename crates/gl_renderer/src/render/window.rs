//! Window management using GLFW
//!
//! Creates the window together with its OpenGL context, loads the GL
//! function pointers through [`glow`] and hands out window events.

use glfw::{Action, Context as _, Key, WindowEvent};
use glow::HasContext;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::config::WindowConfig;
use crate::input::MovementKeys;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW itself failed to start
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// The window or its context could not be created
    #[error("failed to create a {width}x{height} window with an OpenGL {major}.{minor} context")]
    CreationFailed {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Requested GL major version
        major: u32,
        /// Requested GL minor version
        minor: u32,
    },

    /// The window configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Source and destination factors used when alpha blending is enabled
pub const ALPHA_BLEND_FUNC: (u32, u32) = (glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

/// GLFW window owning the current OpenGL context
pub struct GlWindow {
    // Field order is drop order: the GL wrapper before the window that owns
    // the context, and the window before GLFW is terminated.
    gl: glow::Context,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
    glfw: glfw::Glfw,
}

impl GlWindow {
    /// Create the window, make its context current and load GL
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        config.validate()?;

        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(e.to_string()))?;

        let (major, minor) = config.gl_version;
        glfw.window_hint(glfw::WindowHint::ContextVersion(major, minor));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(if config.core_profile {
            glfw::OpenGlProfileHint::Core
        } else {
            glfw::OpenGlProfileHint::Any
        }));
        #[cfg(target_os = "macos")]
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed {
                width: config.width,
                height: config.height,
                major,
                minor,
            })?;

        window.make_current();
        window.set_key_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        if config.capture_cursor {
            window.set_cursor_mode(glfw::CursorMode::Disabled);
        }
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        let gl = unsafe { glow::Context::from_loader_function(|name| window.get_proc_address(name) as *const _) };

        let (fb_width, fb_height) = window.get_framebuffer_size();
        unsafe {
            gl.viewport(0, 0, fb_width, fb_height);
            gl.enable(glow::DEPTH_TEST);
            if config.alpha_blending {
                gl.enable(glow::BLEND);
                gl.blend_func(ALPHA_BLEND_FUNC.0, ALPHA_BLEND_FUNC.1);
            }

            log::info!(
                "Created '{}' {}x{} with OpenGL {} on {}",
                config.title,
                config.width,
                config.height,
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );
            log::info!("Max vertex attributes: {}", crate::render::buffer::max_vertex_attributes(&gl));
        }

        Ok(Self { gl, window, events, glfw })
    }

    /// The GL function table for this window's context
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Pump the OS event queue and return everything that arrived
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events).map(|(_, event)| event).collect()
    }

    /// Whether `key` is currently held
    pub fn key_pressed(&self, key: Key) -> bool {
        self.window.get_key(key) == Action::Press
    }

    /// Currently held WASD keys
    pub fn movement_keys(&self) -> MovementKeys {
        let mut keys = MovementKeys::empty();
        keys.set(MovementKeys::FORWARD, self.key_pressed(Key::W));
        keys.set(MovementKeys::BACKWARD, self.key_pressed(Key::S));
        keys.set(MovementKeys::LEFT, self.key_pressed(Key::A));
        keys.set(MovementKeys::RIGHT, self.key_pressed(Key::D));
        keys
    }

    /// Whether the window was asked to close
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel closing
    pub fn set_should_close(&mut self, value: bool) {
        self.window.set_should_close(value);
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Set the GL viewport to `width` x `height`
    pub fn set_viewport(&self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
    }

    /// Clear color and depth
    pub fn clear(&self, color: [f32; 4]) {
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    /// Seconds since GLFW was initialised
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }
}
