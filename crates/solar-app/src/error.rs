use solar_render::{RenderContextError, SurfaceError};
use solar_scene::{AssetError, SceneError};

/// Startup and frame-loop failures that end the viewer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("asset loader error: {0}")]
    Asset(#[from] AssetError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
