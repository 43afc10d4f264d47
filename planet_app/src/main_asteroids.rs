//! Planet and asteroid field demo
//!
//! A textured planet surrounded by a ring of rocks. All rocks share one
//! model; their transforms live in a single instance buffer and every rock
//! submesh is drawn with one instanced call per frame.
//!
//! Controls: WASD move, mouse look, scroll zoom, B toggles Blinn-Phong,
//! Escape quits. Settings are read from `asteroid_field.toml` when present.

mod common;

use std::path::PathBuf;

use common::AppError;
use gl_renderer::core::config::{ApplicationConfig, AssetConfig};
use gl_renderer::foundation::math::{Mat4, Mat4Ext, Vec3};
use gl_renderer::render::lighting::{Material, MaterialPreset, PointLight};
use gl_renderer::render::{
    Camera, FrameContext, GlWindow, InstanceBuffer, InstanceStreamLayout, Model, ShaderProgram, ShaderSource,
};
use gl_renderer::assets::AssetError;
use gl_renderer::scene;
use glfw::{Action, Key, WindowEvent};

const CONFIG_PATH: &str = "asteroid_field.toml";

/// GPU resources created at startup
struct SceneResources {
    planet_shader: ShaderProgram,
    asteroid_shader: ShaderProgram,
    planet: Model,
    rock: Model,
    instances: InstanceBuffer,
    planet_transform: Mat4,
    planet_material: Material,
    light: PointLight,
}

impl SceneResources {
    /// Build shaders, load models and upload the asteroid field
    ///
    /// # Safety
    ///
    /// Requires the window's GL context to be current.
    unsafe fn create(gl: &glow::Context, config: &ApplicationConfig) -> Result<Self, AppError> {
        let planet_shader = build_program(gl, config, ApplicationConfig::PLANET_PROGRAM)?;
        let asteroid_shader = build_program(gl, config, ApplicationConfig::ASTEROID_PROGRAM)?;

        let planet = unsafe { Model::load(gl, &resolve(&config.assets, &config.assets.planet_model)?) }?;
        let rock = unsafe { Model::load(gl, &resolve(&config.assets, &config.assets.rock_model)?) }?;

        let (field, _seed) = scene::generate_from_config(&config.field);
        let layout = InstanceStreamLayout::new(config.field.instance_attribute_location);

        let instances = unsafe { InstanceBuffer::upload(gl, field.as_slice()) }?;
        unsafe {
            instances.verify(gl, &layout, field.as_slice())?;
            rock.attach_instance_stream(gl, &instances, &layout)?;
        }

        Ok(Self {
            planet_shader,
            asteroid_shader,
            planet,
            rock,
            instances,
            planet_transform: Mat4::identity().translated(Vec3::new(0.0, -3.0, 0.0)).scaled(4.0),
            planet_material: MaterialPreset::Pearl.material(),
            light: PointLight::white(Vec3::new(0.0, 60.0, 120.0), 325.0),
        })
    }

    /// # Safety
    ///
    /// Requires the window's GL context to be current.
    unsafe fn delete(self, gl: &glow::Context) {
        unsafe {
            self.planet.delete(gl);
            self.rock.delete(gl);
            self.instances.delete(gl);
            self.planet_shader.delete(gl);
            self.asteroid_shader.delete(gl);
        }
    }
}

fn build_program(gl: &glow::Context, config: &ApplicationConfig, name: &str) -> Result<ShaderProgram, AppError> {
    let program = config.shader_program(name)?;
    let sources = ShaderSource::load_program(program, &config.assets)?;
    Ok(unsafe { ShaderProgram::build(gl, name, &sources) }?)
}

fn resolve(assets: &AssetConfig, relative: &str) -> Result<PathBuf, AppError> {
    assets
        .resolve(relative)
        .ok_or_else(|| AssetError::NotFound(relative.to_string()).into())
}

/// The running demo
pub struct AsteroidFieldApp {
    // Declared before the window so the resources are released while the
    // context still exists.
    resources: Option<SceneResources>,
    frame: FrameContext,
    clear_color: [f32; 4],
    window: GlWindow,
}

impl AsteroidFieldApp {
    /// Open the window and create every GPU resource
    pub fn new(config: &ApplicationConfig) -> Result<Self, AppError> {
        let window = GlWindow::new(&config.window)?;
        let resources = unsafe { SceneResources::create(window.gl(), config) }?;

        let mut frame = FrameContext::new(
            Camera::from_config(&config.camera),
            config.window.width,
            config.window.height,
        );
        let (width, height) = window.framebuffer_size();
        frame.on_resize(width, height);

        Ok(Self {
            resources: Some(resources),
            frame,
            clear_color: config.window.clear_color,
            window,
        })
    }

    /// Run until the window closes or Escape is pressed
    pub fn run(&mut self) -> Result<(), AppError> {
        log::info!("Entering frame loop");

        while !self.window.should_close() && !self.frame.shutdown_requested() {
            let dt = self.frame.begin_frame();

            for event in self.window.poll_events() {
                self.handle_event(event);
            }
            let keys = self.window.movement_keys();
            self.frame.apply_movement(keys, dt);
            self.frame.update_blinn(self.window.key_pressed(Key::B));

            self.render();
            self.window.swap_buffers();
        }

        log::info!(
            "Frame loop finished after {} frames ({:.1} fps average)",
            self.frame.frame_count(),
            self.frame.average_fps()
        );
        Ok(())
    }

    fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Key(Key::Escape, _, Action::Press, _) | WindowEvent::Close => {
                self.frame.request_shutdown();
                self.window.set_should_close(true);
            }
            WindowEvent::CursorPos(x, y) => self.frame.on_cursor(x, y),
            WindowEvent::Scroll(_, dy) => self.frame.on_scroll(dy),
            WindowEvent::FramebufferSize(width, height) if width > 0 && height > 0 => {
                self.frame.on_resize(width as u32, height as u32);
                self.window.set_viewport(width as u32, height as u32);
            }
            _ => {}
        }
    }

    fn render(&self) {
        self.window.clear(self.clear_color);

        let Some(resources) = &self.resources else {
            return;
        };
        let gl = self.window.gl();
        let projection = self.frame.projection();
        let view = self.frame.view();

        unsafe {
            let shader = &resources.planet_shader;
            shader.bind(gl);
            shader.set_mat4(gl, "projection", &projection);
            shader.set_mat4(gl, "view", &view);
            shader.set_mat4(gl, "model", &resources.planet_transform);
            shader.set_vec3(gl, "viewPos", &self.frame.camera.position());
            shader.set_bool(gl, "blinn", self.frame.blinn());
            resources.planet_material.upload(gl, shader, "material");
            resources.light.upload(gl, shader, "light");
            resources.planet.draw(gl, shader);

            let shader = &resources.asteroid_shader;
            shader.bind(gl);
            shader.set_mat4(gl, "projection", &projection);
            shader.set_mat4(gl, "view", &view);
            resources.rock.draw_instanced(gl, shader, resources.instances.count());
        }
    }
}

impl Drop for AsteroidFieldApp {
    fn drop(&mut self) {
        if let Some(resources) = self.resources.take() {
            log::debug!("Releasing GPU resources");
            unsafe { resources.delete(self.window.gl()) };
        }
    }
}

fn main() -> Result<(), AppError> {
    let config = common::load_config(CONFIG_PATH)?;
    log::info!("Starting asteroid field demo");

    common::report(AsteroidFieldApp::new(&config).and_then(|mut app| app.run()))
}
