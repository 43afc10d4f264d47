//! GPU meshes and loaded models
//!
//! [`GpuMesh`] owns the vertex array and buffers of one drawable unit.
//! [`Model`] is an imported file: its submeshes plus the textures their
//! materials reference, each texture file uploaded once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glow::HasContext;

use crate::assets::load_model;
use crate::render::buffer::{create_buffer, create_vertex_array, max_vertex_attributes, set_attributes};
use crate::render::instancing::{bind_instance_stream, InstanceBuffer, InstanceStreamLayout};
use crate::render::mesh::{sampler_names, VertexLayout};
use crate::render::shader::ShaderProgram;
use crate::render::texture::Texture;
use crate::render::RenderResult;

/// Vertex array with its vertex and optional index buffer
#[derive(Debug)]
pub struct GpuMesh {
    vertex_array: glow::VertexArray,
    vertex_buffer: glow::Buffer,
    index_buffer: Option<glow::Buffer>,
    element_count: i32,
    attribute_count: u32,
}

impl GpuMesh {
    /// Upload vertices (and indices) and describe their layout
    ///
    /// Without indices the mesh is drawn as a plain triangle list.
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn upload<V: VertexLayout>(gl: &glow::Context, vertices: &[V], indices: Option<&[u32]>) -> RenderResult<Self> {
        unsafe {
            let vertex_array = create_vertex_array(gl)?;
            gl.bind_vertex_array(Some(vertex_array));

            let vertex_buffer = create_buffer(gl, glow::ARRAY_BUFFER, bytemuck::cast_slice(vertices), glow::STATIC_DRAW)?;
            let index_buffer = match indices {
                Some(indices) => Some(create_buffer(
                    gl,
                    glow::ELEMENT_ARRAY_BUFFER,
                    bytemuck::cast_slice(indices),
                    glow::STATIC_DRAW,
                )?),
                None => None,
            };

            set_attributes::<V>(gl)?;

            // Unbind the vertex array first so it keeps its element buffer
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            let element_count = indices.map_or(vertices.len(), <[u32]>::len) as i32;
            Ok(Self {
                vertex_array,
                vertex_buffer,
                index_buffer,
                element_count,
                attribute_count: V::attribute_count(),
            })
        }
    }

    /// Vertex array handle
    pub fn vertex_array(&self) -> glow::VertexArray {
        self.vertex_array
    }

    /// Per-vertex attribute locations in use (`0..count`)
    pub fn attribute_count(&self) -> u32 {
        self.attribute_count
    }

    /// Indices (or vertices, when not indexed) drawn per call
    pub fn element_count(&self) -> i32 {
        self.element_count
    }

    /// Draw once
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and a bound program.
    pub unsafe fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vertex_array));
            if self.index_buffer.is_some() {
                gl.draw_elements(glow::TRIANGLES, self.element_count, glow::UNSIGNED_INT, 0);
            } else {
                gl.draw_arrays(glow::TRIANGLES, 0, self.element_count);
            }
            gl.bind_vertex_array(None);
        }
    }

    /// Draw `instances` copies in one call
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and a bound program.
    pub unsafe fn draw_instanced(&self, gl: &glow::Context, instances: usize) {
        let instances = instances as i32;
        unsafe {
            gl.bind_vertex_array(Some(self.vertex_array));
            if self.index_buffer.is_some() {
                gl.draw_elements_instanced(glow::TRIANGLES, self.element_count, glow::UNSIGNED_INT, 0, instances);
            } else {
                gl.draw_arrays_instanced(glow::TRIANGLES, 0, self.element_count, instances);
            }
            gl.bind_vertex_array(None);
        }
    }

    /// Release the GL objects
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vertex_array);
            gl.delete_buffer(self.vertex_buffer);
            if let Some(buffer) = self.index_buffer {
                gl.delete_buffer(buffer);
            }
        }
    }
}

#[derive(Debug)]
struct Submesh {
    mesh: GpuMesh,
    /// Indices into the model's texture list, in texture-unit order
    textures: Vec<usize>,
    /// Sampler uniform per texture unit
    samplers: Vec<String>,
}

/// An imported model on the GPU
#[derive(Debug)]
pub struct Model {
    submeshes: Vec<Submesh>,
    textures: Vec<Texture>,
    path: PathBuf,
}

impl Model {
    /// Import a model file and upload its meshes and textures
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn load(gl: &glow::Context, path: &Path) -> RenderResult<Self> {
        let loaded = load_model(path)?;

        let mut textures: Vec<Texture> = Vec::new();
        let mut cache: HashMap<PathBuf, usize> = HashMap::new();
        let mut submeshes = Vec::with_capacity(loaded.meshes.len());

        for mesh in &loaded.meshes {
            let mut indices = Vec::with_capacity(mesh.textures.len());
            for reference in &mesh.textures {
                let file = loaded.directory.join(&reference.path);
                let index = match cache.get(&file) {
                    Some(&index) => index,
                    None => {
                        textures.push(unsafe { Texture::from_file(gl, &file, reference.kind) }?);
                        cache.insert(file, textures.len() - 1);
                        textures.len() - 1
                    }
                };
                indices.push(index);
            }

            submeshes.push(Submesh {
                mesh: unsafe { GpuMesh::upload(gl, &mesh.vertices, Some(&mesh.indices)) }?,
                samplers: sampler_names(mesh.textures.iter().map(|t| t.kind)),
                textures: indices,
            });
        }

        log::info!(
            "Uploaded model {} ({} submesh(es), {} texture(s))",
            path.display(),
            submeshes.len(),
            textures.len()
        );
        Ok(Self { submeshes, textures, path: path.to_path_buf() })
    }

    /// Configure the instance stream on every submesh
    ///
    /// Fails before touching GL state if the stream would overlap a
    /// submesh's vertex attributes or exceed `GL_MAX_VERTEX_ATTRIBS`.
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn attach_instance_stream(
        &self,
        gl: &glow::Context,
        instances: &InstanceBuffer,
        layout: &InstanceStreamLayout,
    ) -> RenderResult<()> {
        let max_attributes = unsafe { max_vertex_attributes(gl) };
        for submesh in &self.submeshes {
            layout.check_locations(submesh.mesh.attribute_count(), max_attributes)?;
        }

        for submesh in &self.submeshes {
            unsafe { bind_instance_stream(gl, submesh.mesh.vertex_array(), instances, layout) };
        }
        log::debug!(
            "Attached {} instances to {} submesh(es) of {}",
            instances.count(),
            self.submeshes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Draw every submesh once with its textures bound
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context and `shader` bound.
    pub unsafe fn draw(&self, gl: &glow::Context, shader: &ShaderProgram) {
        for submesh in &self.submeshes {
            unsafe {
                self.bind_textures(gl, shader, submesh);
                submesh.mesh.draw(gl);
            }
        }
    }

    /// Draw every submesh `instances` times, one call per submesh
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context, `shader` bound and an
    /// instance stream attached.
    pub unsafe fn draw_instanced(&self, gl: &glow::Context, shader: &ShaderProgram, instances: usize) {
        for submesh in &self.submeshes {
            unsafe {
                self.bind_textures(gl, shader, submesh);
                submesh.mesh.draw_instanced(gl, instances);
            }
        }
    }

    /// GPU meshes in file order
    pub fn submeshes(&self) -> impl Iterator<Item = &GpuMesh> {
        self.submeshes.iter().map(|s| &s.mesh)
    }

    /// Distinct textures loaded for the model
    pub fn loaded_textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Release meshes and textures
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn delete(self, gl: &glow::Context) {
        unsafe {
            for submesh in self.submeshes {
                submesh.mesh.delete(gl);
            }
            for texture in self.textures {
                texture.delete(gl);
            }
        }
    }

    unsafe fn bind_textures(&self, gl: &glow::Context, shader: &ShaderProgram, submesh: &Submesh) {
        unsafe {
            for (unit, (&texture, sampler)) in submesh.textures.iter().zip(&submesh.samplers).enumerate() {
                shader.set_int(gl, sampler, unit as i32);
                self.textures[texture].bind(gl, unit as u32);
            }
            gl.active_texture(glow::TEXTURE0);
        }
    }
}
