//! Quad demo
//!
//! A rectangle from four shared vertices and six indices.

mod common;
mod flat_demo;

use common::AppError;
use gl_renderer::foundation::logging;
use gl_renderer::render::PositionVertex;

const VERTICES: [PositionVertex; 4] = [
    PositionVertex { position: [0.5, 0.5, 0.0] },   // top right
    PositionVertex { position: [0.5, -0.5, 0.0] },  // bottom right
    PositionVertex { position: [-0.5, -0.5, 0.0] }, // bottom left
    PositionVertex { position: [-0.5, 0.5, 0.0] },  // top left
];

const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

fn main() -> Result<(), AppError> {
    logging::init("info");
    log::info!("Starting quad demo");
    common::report(flat_demo::run("Quad", &VERTICES, Some(&INDICES)))
}
