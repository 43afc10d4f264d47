//! Asset loading
//!
//! CPU-side loading of models (`tobj`) and images (`image`). GPU upload of
//! the results lives in [`crate::render`].

pub mod image_loader;
pub mod model_loader;

pub use image_loader::{ImageData, PixelFormat};
pub use model_loader::{load_model, LoadedModel};

use crate::render::mesh::MeshError;
use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Model file could not be parsed
    #[error("failed to import model {path}: {source}")]
    ModelImport {
        /// Offending path
        path: String,
        /// Importer error
        #[source]
        source: tobj::LoadError,
    },

    /// Image file could not be decoded
    #[error("failed to decode image {path}: {source}")]
    Image {
        /// Offending path
        path: String,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// Decoded image has a channel count with no matching GL format
    #[error("unsupported image channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannelCount(u8),

    /// An asset path did not resolve against any search directory
    #[error("asset not found: {0}")]
    NotFound(String),

    /// A model file contained no geometry
    #[error("model {0} contains no meshes")]
    NoMeshes(String),

    /// Imported geometry is inconsistent
    #[error("invalid mesh '{name}' in {path}: {source}")]
    InvalidMesh {
        /// Model path
        path: String,
        /// Mesh name in the file
        name: String,
        /// What is wrong
        #[source]
        source: MeshError,
    },
}
