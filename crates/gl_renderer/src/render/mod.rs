//! # Rendering System
//!
//! OpenGL rendering layer built on [`glow`] with a GLFW-owned context.
//!
//! ## Architecture
//!
//! - **Camera** / **Frame**: API-free math and per-frame state (view,
//!   projection, input-driven camera updates)
//! - **Window**: GLFW window, OpenGL context creation and event intake
//! - **Shader** / **Buffer** / **Texture** / **Model**: thin GL resource
//!   wrappers created once at startup
//! - **Instancing**: the per-instance matrix stream layout and its binding
//!   onto submesh vertex arrays
//!
//! ## Safety
//!
//! Functions that issue GL calls are `unsafe` and require the context
//! created by [`window::GlWindow`] to be current on the calling thread.

pub mod camera;
pub mod frame;
pub mod window;
pub mod shader;
pub mod buffer;
pub mod mesh;
pub mod texture;
pub mod model;
pub mod instancing;
pub mod lighting;

pub use camera::{Camera, CameraMovement};
pub use frame::FrameContext;
pub use window::{GlWindow, WindowError};
pub use shader::{ShaderProgram, ShaderSource, ShaderStage};
pub use mesh::{Mesh, MeshError, Vertex, PositionVertex, VertexFeature, TextureKind, TextureRef};
pub use texture::Texture;
pub use model::{GpuMesh, Model};
pub use instancing::{InstanceBuffer, InstanceMatrix, InstanceStreamLayout};

use thiserror::Error;

use crate::assets::AssetError;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A shader stage failed to compile
    #[error("{stage} shader '{label}' of program '{program}' failed to compile:\n{log}")]
    ShaderCompile {
        /// Program being built
        program: String,
        /// Failing stage
        stage: ShaderStage,
        /// Source path or tag
        label: String,
        /// Driver info log
        log: String,
    },

    /// A program failed to link
    #[error("shader program '{program}' failed to link:\n{log}")]
    ProgramLink {
        /// Program being built
        program: String,
        /// Driver info log
        log: String,
    },

    /// A program description is incomplete
    #[error("invalid shader program: {0}")]
    InvalidProgram(String),

    /// A shader source path could not be resolved
    #[error("shader source not found: {0}")]
    ShaderSourceMissing(String),

    /// A shader source file could not be read
    #[error("failed to read shader source {0}: {1}")]
    ShaderSourceIo(String, #[source] std::io::Error),

    /// The driver refused to create an object
    #[error("GL resource creation failed: {0}")]
    ResourceCreation(String),

    /// Vertex features do not add up to the vertex size
    #[error("vertex layout covers {described} bytes but the vertex is {actual} bytes")]
    VertexLayoutMismatch {
        /// Sum of the described attribute sizes
        described: usize,
        /// Size of the vertex type
        actual: usize,
    },

    /// The instance stream would overwrite the mesh's own attributes
    #[error("instance stream at location {first_location} overlaps vertex attributes 0..{vertex_attributes}")]
    AttributeOverlap {
        /// First instance attribute location
        first_location: u32,
        /// Number of per-vertex attributes in use
        vertex_attributes: u32,
    },

    /// More attribute locations are needed than the driver offers
    #[error("vertex attribute location {required} exceeds the driver limit of {max}")]
    AttributeLimitExceeded {
        /// Highest location needed, exclusive
        required: u32,
        /// `GL_MAX_VERTEX_ATTRIBS`
        max: u32,
    },

    /// Instance index beyond the buffer contents
    #[error("instance {index} out of range for {count} instances")]
    InstanceOutOfRange {
        /// Requested instance
        index: usize,
        /// Instances in the buffer
        count: usize,
    },

    /// GPU readback of an instance differs from what was uploaded
    #[error("instance {index} read back from the GPU does not match the uploaded matrix")]
    InstanceReadbackMismatch {
        /// Instance that differed
        index: usize,
    },

    /// A model or texture failed to load from disk
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
