mod app;
mod controls;
mod scene;

use winit::dpi::LogicalSize;

use penumbra_engine::device::GpuInit;
use penumbra_engine::logging::{init_logging, LoggingConfig};
use penumbra_engine::window::{Runtime, RuntimeConfig};

use crate::app::{ViewerApp, TITLE};

fn main() {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: TITLE.to_string(),
        initial_size: LogicalSize::new(720.0, 486.0),
        resizable: false,
        target_fps: Some(60.0),
    };

    log::info!("keys: 1-4 modes, WASD orbit, arrows move light, =/- zoom, L lighting, X fps");

    let result = ViewerApp::new().and_then(|app| Runtime::run(config, GpuInit::default(), app));
    if let Err(err) = result {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
