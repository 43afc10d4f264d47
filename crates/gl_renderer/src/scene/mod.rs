//! Scene content generation
//!
//! Procedural placement of instanced objects. The output is plain matrices;
//! uploading them is [`crate::render::instancing`]'s job.

pub mod asteroid_field;

pub use asteroid_field::{
    generate, generate_from_config, generate_seeded, placements, AsteroidPlacement, InstanceTransformSet,
    UniformSource,
};
