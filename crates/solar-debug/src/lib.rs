//! Debug panel for the solar system viewer.
//!
//! An HTTP server on a background thread exposes frame metrics and the two
//! point lights. Reads come from a [`PanelState`] snapshot that the window
//! layer refreshes every frame; light edits are queued as [`LightPatch`]es on
//! a channel and applied on the update thread, so the server never touches
//! scene state directly.

pub mod server;

pub use server::{DebugServer, DebugServerError};


use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured panel port.
pub const PORT_ENV_VAR: &str = "SOLAR_DEBUG_PORT";

/// Editable values of one light, as shown by `GET /lights`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightValues {
    pub visible: bool,
    pub intensity: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// A partial light update from `POST /lights/<index>`. Absent fields are
/// left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LightPatch {
    #[serde(skip)]
    pub light: usize,
    pub visible: Option<bool>,
    pub intensity: Option<f32>,
    pub r: Option<f32>,
    pub g: Option<f32>,
    pub b: Option<f32>,
}

impl LightPatch {
    pub fn is_empty(&self) -> bool {
        self.visible.is_none()
            && self.intensity.is_none()
            && self.r.is_none()
            && self.g.is_none()
            && self.b.is_none()
    }
}

/// State shared between the frame loop and the panel server.
/// Written once per frame, read by the server on request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PanelState {
    pub frame_count: u64,
    pub frame_time_ms: f64,
    pub fps: f64,
    pub window_width: u32,
    pub window_height: u32,
    pub uptime_seconds: f64,
    /// Animation clock reading of the last frame.
    pub elapsed_seconds: f32,
    pub quit_requested: bool,
    #[serde(skip)]
    pub lights: Vec<LightValues>,
}

impl PanelState {
    /// Record one finished frame.
    pub fn record_frame(
        &mut self,
        frame_count: u64,
        frame_time: Duration,
        uptime: Duration,
        elapsed: f32,
    ) {
        self.frame_count = frame_count;
        self.frame_time_ms = frame_time.as_secs_f64() * 1000.0;
        self.fps = if frame_time.is_zero() {
            0.0
        } else {
            1.0 / frame_time.as_secs_f64()
        };
        self.uptime_seconds = uptime.as_secs_f64();
        self.elapsed_seconds = elapsed;
    }
}

/// Start the panel if enabled. Bind failures are logged and leave the viewer
/// running without a panel.
pub fn create_debug_server(
    enabled: bool,
    port: u16,
    state: std::sync::Arc<std::sync::Mutex<PanelState>>,
) -> Option<(DebugServer, crossbeam_channel::Receiver<LightPatch>)> {
    if !enabled {
        return None;
    }
    let (patch_tx, patch_rx) = crossbeam_channel::unbounded();
    let mut server = DebugServer::new(port, patch_tx);
    match server.start(state) {
        Ok(()) => {
            tracing::info!("Debug panel listening on 127.0.0.1:{}", server.actual_port());
            Some((server, patch_rx))
        }
        Err(e) => {
            tracing::warn!("Debug panel disabled: {e}");
            None
        }
    }
}

/// Port from `SOLAR_DEBUG_PORT`, else `configured`.
pub fn get_debug_port(configured: u16) -> u16 {
    parse_port(std::env::var(PORT_ENV_VAR).ok().as_deref(), configured)
}

fn parse_port(value: Option<&str>, fallback: u16) -> u16 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(fallback)
}
