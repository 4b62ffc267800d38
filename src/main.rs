mod app;

use std::env;

use tiny_rasterizer::logging::{init_logging, LoggingConfig};

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default());

    let params = app::Params::from_args(env::args().skip(1))?;
    app::run(params)?;

    return Ok(());
}
