//! Triangle demo
//!
//! One triangle from three vertices, drawn without an index buffer.

mod common;
mod flat_demo;

use common::AppError;
use gl_renderer::foundation::logging;
use gl_renderer::render::PositionVertex;

const VERTICES: [PositionVertex; 3] = [
    PositionVertex { position: [-0.5, -0.5, 0.0] },
    PositionVertex { position: [0.5, -0.5, 0.0] },
    PositionVertex { position: [0.0, 0.5, 0.0] },
];

fn main() -> Result<(), AppError> {
    logging::init("info");
    log::info!("Starting triangle demo");
    common::report(flat_demo::run("Triangle", &VERTICES, None))
}
