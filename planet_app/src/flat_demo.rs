//! Single-mesh 2D demos: a fixed-color shape in normalized device coordinates

use gl_renderer::core::config::WindowConfig;
use gl_renderer::render::{GlWindow, GpuMesh, PositionVertex, ShaderProgram, ShaderSource, ShaderStage};
use glfw::{Action, Key, WindowEvent};

use crate::common::AppError;

const VERTEX_SHADER: &str = include_str!("../shaders/flat.vert.glsl");
const FRAGMENT_SHADER: &str = include_str!("../shaders/flat.frag.glsl");

/// Open a window and draw `vertices` (indexed when `indices` is given) until closed
pub fn run(title: &str, vertices: &[PositionVertex], indices: Option<&[u32]>) -> Result<(), AppError> {
    let config = WindowConfig::new(title).with_size(800, 600).with_captured_cursor(false);
    let mut window = GlWindow::new(&config)?;

    let (shader, mesh) = {
        let gl = window.gl();
        let sources = [
            ShaderSource::inline(ShaderStage::Vertex, "flat.vert.glsl", VERTEX_SHADER),
            ShaderSource::inline(ShaderStage::Fragment, "flat.frag.glsl", FRAGMENT_SHADER),
        ];
        let shader = unsafe { ShaderProgram::build(gl, "flat", &sources) }?;
        let mesh = unsafe { GpuMesh::upload(gl, vertices, indices) }?;
        (shader, mesh)
    };
    log::info!("{}: drawing {} elements per frame", title, mesh.element_count());

    while !window.should_close() {
        for event in window.poll_events() {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) => window.set_should_close(true),
                WindowEvent::FramebufferSize(width, height) if width > 0 && height > 0 => {
                    window.set_viewport(width as u32, height as u32);
                }
                _ => {}
            }
        }

        window.clear(config.clear_color);
        unsafe {
            shader.bind(window.gl());
            mesh.draw(window.gl());
        }
        window.swap_buffers();
    }

    unsafe {
        mesh.delete(window.gl());
        shader.delete(window.gl());
    }
    Ok(())
}
