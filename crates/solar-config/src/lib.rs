//! Runtime settings for the solar system viewer.
//!
//! Settings persist to `config.ron` in the platform config directory, and
//! command-line flags override whatever was loaded. Every section falls back
//! to its defaults when missing, so old files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimationConfig, AssetConfig, CameraConfig, Config, ControlsConfig, DebugConfig,
    RenderConfig, SpinModel, WindowConfig,
};
pub use error::ConfigError;
