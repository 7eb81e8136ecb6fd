//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Camera projection and placement.
    pub camera: CameraConfig,
    /// Orbit-drag controls.
    pub controls: ControlsConfig,
    /// Per-frame motion.
    pub animation: AnimationConfig,
    /// Texture locations.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound on the device pixel ratio used for the drawing buffer.
    pub max_pixel_ratio: f64,
    /// Width and height segment count of every body sphere.
    pub sphere_segments: u32,
    /// Constant light added to every surface (0.0 = lit only by point lights).
    pub ambient: f32,
    /// Clear color shown until the background image has loaded.
    pub clear_color: [f32; 3],
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Initial camera position.
    pub position: [f32; 3],
    /// Point the camera orbits around.
    pub target: [f32; 3],
}

/// Orbit controls configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Smooth out drag motion over several frames.
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per update (0..1).
    pub damping_factor: f32,
    /// Drag rotation multiplier.
    pub rotate_speed: f32,
    /// Scroll dolly multiplier.
    pub zoom_speed: f32,
    /// Closest allowed distance to the target.
    pub min_distance: f32,
    /// Farthest allowed distance to the target.
    pub max_distance: f32,
}

/// Which per-body spin update the animation loop runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpinModel {
    /// Sets Y rotation from elapsed time, then adds a fifth of itself.
    #[default]
    Compounding,
    /// Y rotation proportional to elapsed time.
    Steady,
}

/// Animation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Spin update applied to every orbiting body.
    pub spin_model: SpinModel,
}

/// Asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the body and background images.
    pub texture_dir: PathBuf,
    /// Background image file name inside `texture_dir`.
    pub background: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Serve the light panel over HTTP.
    pub panel_enabled: bool,
    /// Port for the light panel.
    pub panel_port: u16,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Solar System".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            sphere_segments: 64,
            ambient: 0.0,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 0.0, 2.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: 1000.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("textures"),
            background: "Environment_baseColor.jpeg".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            panel_enabled: true,
            panel_port: 9999,
        }
    }
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Full path of a texture file inside the configured texture directory.
    pub fn texture_path(&self, file_name: &str) -> PathBuf {
        self.assets.texture_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("fov_degrees: 75.0"));
        assert!(ron_str.contains("spin_model: Compounding"));
    }

    #[test]
    fn test_camera_defaults_match_viewer_layout() {
        let camera = CameraConfig::default();
        assert_eq!(camera.position, [0.0, 0.0, 2.0]);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 100.0);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), render: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.controls, ControlsConfig::default());
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_spin_model_parses() {
        let config: Config = ron::from_str("(animation: (spin_model: Steady))").unwrap();
        assert_eq!(config.animation.spin_model, SpinModel::Steady);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.render.max_pixel_ratio = 1.5;
        config.assets.texture_dir = PathBuf::from("/opt/solar/textures");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_texture_path_joins_directory() {
        let config = Config::default();
        assert_eq!(
            config.texture_path("SunT.jpeg"),
            PathBuf::from("textures").join("SunT.jpeg")
        );
    }
}
