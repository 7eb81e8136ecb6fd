//! Opens the solar system viewer.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p solar-app -- --textures path/to/textures`.

use clap::Parser;
use solar_app::PlatformDirs;
use solar_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(dir) => PlatformDirs::from_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                std::process::exit(1);
            }
        },
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create {}: {e}", dirs.config_dir.display());
    }

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    solar_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    tracing::info!(
        config = %dirs.config_dir.display(),
        textures = %config.assets.texture_dir.display(),
        "Starting solar system viewer"
    );

    if let Err(e) = solar_app::run(config) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
