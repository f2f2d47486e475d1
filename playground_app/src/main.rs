//! Graphics playground
//!
//! Opens the gallery window; every demo listed there runs in its own window.

mod canvases;
mod palette;

use canvases::Gallery;
use playground_core::config::ConfigError;
use playground_core::foundation::logging;
use playground_core::platform::PlatformError;
use playground_core::prelude::*;

const CONFIG_PATH: &str = "playground.toml";

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to open the gallery: {0}")]
    Open(#[from] OpenError),
}

fn run() -> Result<(), AppError> {
    let config = SessionConfig::load(CONFIG_PATH)?;
    log::debug!("Frame interval {:?}", config.frame_interval());

    let platform = GlfwPlatform::init(&config.platform)?;
    let mut session = Session::new(config, platform, ImguiBackend::new())?;
    if let Err(e) = session.open_window(Box::new(Gallery::new())) {
        session.shutdown();
        return Err(e.into());
    }

    session.exec();
    Ok(())
}

fn main() {
    logging::init();
    log::info!("Starting graphics playground");

    if let Err(e) = run() {
        log::error!("Fatal: {e}");
        std::process::exit(1);
    }
    log::info!("Graphics playground exited cleanly");
}
