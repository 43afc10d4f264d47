//! 2D textures

use std::path::{Path, PathBuf};

use glow::HasContext;

use crate::assets::ImageData;
use crate::render::mesh::TextureKind;
use crate::render::{RenderError, RenderResult};

/// A mipmapped 2D texture on the GPU
#[derive(Debug)]
pub struct Texture {
    texture: glow::Texture,
    kind: TextureKind,
    path: PathBuf,
}

impl Texture {
    /// Decode an image file and upload it
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn from_file(gl: &glow::Context, path: &Path, kind: TextureKind) -> RenderResult<Self> {
        let image = ImageData::from_file(path)?;
        unsafe { Self::upload(gl, &image, kind, path.to_path_buf()) }
    }

    /// Upload decoded pixels
    ///
    /// Wraps with `REPEAT`, filters with `LINEAR_MIPMAP_LINEAR` / `LINEAR` and
    /// generates the full mip chain.
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn upload(gl: &glow::Context, image: &ImageData, kind: TextureKind, path: PathBuf) -> RenderResult<Self> {
        let format = image.format.gl_format();

        unsafe {
            let texture = gl.create_texture().map_err(RenderError::ResourceCreation)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            // Rows of 1 and 3 channel images are not 4-byte aligned
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format as i32,
                image.width as i32,
                image.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&image.data)),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);

            gl.bind_texture(glow::TEXTURE_2D, None);

            log::debug!("Uploaded {:?} texture {}x{} from {}", kind, image.width, image.height, path.display());
            Ok(Self { texture, kind, path })
        }
    }

    /// Bind to texture unit `unit`
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
    }

    /// Role of the texture in its material
    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    /// Source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the GL texture
    ///
    /// # Safety
    ///
    /// Requires a valid, current OpenGL context.
    pub unsafe fn delete(self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.texture) };
    }
}
