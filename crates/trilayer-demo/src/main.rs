mod app;
mod config;
mod geometry;
mod params;
mod renderer;
mod toggles;

use trilayer_engine::logging::{LoggingConfig, init_logging};
use trilayer_engine::window::Runtime;

use crate::app::LayerDemo;
use crate::config::DemoConfig;

fn main() {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::default();
    let runtime_config = config.runtime_config();
    let gpu_init = config.gpu_init();

    if let Err(err) = Runtime::run(runtime_config, gpu_init, LayerDemo::new(config)) {
        eprintln!("trilayer: {err:#}");
        std::process::exit(1);
    }
}
