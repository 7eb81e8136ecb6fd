//! Command-line arguments for the solar system viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "solar-system", about = "Animated 3D solar system")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Directory containing the body and background textures.
    #[arg(long)]
    pub textures: Option<PathBuf>,

    /// Port for the light debug panel.
    #[arg(long)]
    pub panel_port: Option<u16>,

    /// Disable the light debug panel.
    #[arg(long)]
    pub no_panel: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref dir) = args.textures {
            self.assets.texture_dir = dir.clone();
        }
        if let Some(port) = args.panel_port {
            self.debug.panel_port = port;
        }
        if args.no_panel {
            self.debug.panel_enabled = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
