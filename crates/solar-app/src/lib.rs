//! Solar system viewer application: window, event loop, and the GPU side of
//! the scene.

pub mod error;
pub mod panel;
pub mod platform;
pub mod renderer;
pub mod window;

pub use error::AppError;
pub use platform::{PlatformDirs, PlatformError};
pub use window::{AppState, run};
