//! GL buffer and vertex array helpers

use glow::HasContext;

use crate::render::mesh::{feature_offsets, VertexLayout};
use crate::render::{RenderError, RenderResult};

/// Create a buffer, bind it to `target` and fill it with `data`
///
/// The buffer stays bound to `target` on return.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
pub unsafe fn create_buffer(gl: &glow::Context, target: u32, data: &[u8], usage: u32) -> RenderResult<glow::Buffer> {
    unsafe {
        let buffer = gl.create_buffer().map_err(RenderError::ResourceCreation)?;
        gl.bind_buffer(target, Some(buffer));
        gl.buffer_data_u8_slice(target, data, usage);
        Ok(buffer)
    }
}

/// Create an unbound vertex array object
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
pub unsafe fn create_vertex_array(gl: &glow::Context) -> RenderResult<glow::VertexArray> {
    unsafe { gl.create_vertex_array() }.map_err(RenderError::ResourceCreation)
}

/// Point consecutive attribute locations at the fields of `V`
///
/// Location `i` reads feature `i` of [`VertexLayout::FEATURES`] at its running
/// offset with a stride of `size_of::<V>()`. The layout is checked against
/// the vertex size before any GL state changes.
///
/// # Safety
///
/// Requires a valid, current OpenGL context with the target vertex array
/// and the vertex buffer bound.
pub unsafe fn set_attributes<V: VertexLayout>(gl: &glow::Context) -> RenderResult<()> {
    let stride = std::mem::size_of::<V>();
    let offsets = feature_offsets(V::FEATURES, stride)?;

    for (location, (feature, offset)) in V::FEATURES.iter().zip(offsets).enumerate() {
        unsafe {
            gl.vertex_attrib_pointer_f32(
                location as u32,
                feature.components,
                feature.gl_type,
                feature.normalized,
                stride as i32,
                offset as i32,
            );
            gl.enable_vertex_attrib_array(location as u32);
        }
    }
    Ok(())
}

/// `GL_MAX_VERTEX_ATTRIBS` for the current context
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
pub unsafe fn max_vertex_attributes(gl: &glow::Context) -> u32 {
    let max = unsafe { gl.get_parameter_i32(glow::MAX_VERTEX_ATTRIBS) };
    u32::try_from(max).unwrap_or(0)
}
