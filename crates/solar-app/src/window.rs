//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. Each
//! `RedrawRequested` applies queued panel edits and finished image decodes,
//! advances the animation one frame, renders, and requests the next redraw.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crossbeam_channel::Receiver;
use solar_config::Config;
use solar_debug::{DebugServer, LightPatch, PanelState, create_debug_server, get_debug_port};
use solar_input::PointerState;
use solar_render::{RenderContext, init_render_context_blocking};
use solar_scene::{AnimationLoop, AssetLoader, MonotonicClock, SceneState};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::panel::{light_edits, light_values};
use crate::renderer::SceneRenderer;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
}

/// Logical size of a physical window size at `scale_factor`.
pub fn logical_size(size: PhysicalSize<u32>, scale_factor: f64) -> (u32, u32) {
    let logical = size.to_logical::<f64>(scale_factor);
    (
        logical.width.round() as u32,
        logical.height.round() as u32,
    )
}

/// Viewer state owned by the event loop.
pub struct AppState {
    pub config: Config,
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    pub scene: SceneState,
    animation: AnimationLoop<MonotonicClock>,
    pointer: PointerState,
    assets: AssetLoader,
    scale_factor: f64,
    debug_server: Option<DebugServer>,
    light_patches: Option<Receiver<LightPatch>>,
    pub panel_state: Arc<Mutex<PanelState>>,
    start_time: Instant,
    last_frame_time: Instant,
}

impl AppState {
    /// Build the scene and start decoding every surface image. The window and
    /// GPU come later, in [`ApplicationHandler::resumed`].
    pub fn new(config: Config) -> Result<Self, AppError> {
        let scene = SceneState::solar_system(&config)?;
        let assets = AssetLoader::new()?;
        assets.request_all(&scene.surfaces)?;

        let panel_state = Arc::new(Mutex::new(PanelState {
            lights: light_values(&scene.light_snapshot()),
            ..PanelState::default()
        }));
        let animation = AnimationLoop::new(MonotonicClock::start(), config.animation.spin_model);
        let now = Instant::now();

        Ok(Self {
            config,
            window: None,
            gpu: None,
            renderer: None,
            scene,
            animation,
            pointer: PointerState::new(),
            assets,
            scale_factor: 1.0,
            debug_server: None,
            light_patches: None,
            panel_state,
            start_time: now,
            last_frame_time: now,
        })
    }

    /// Apply a new window size: viewport and camera first, then the surface
    /// and depth buffer, all before the next redraw.
    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        let (width, height) = logical_size(size, self.scale_factor);
        let viewport = self.scene.resize(width, height, self.scale_factor);
        let (buffer_width, buffer_height) = viewport.drawing_buffer_size();

        if let Some(gpu) = &mut self.gpu
            && gpu.resize(buffer_width, buffer_height)
        {
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(gpu);
            }
            info!(
                "Window resized to {}x{} (buffer {}x{}, ratio {:.2})",
                width, height, buffer_width, buffer_height, viewport.pixel_ratio
            );
        }
    }

    fn apply_panel_edits(&mut self) {
        let Some(patches) = &self.light_patches else {
            return;
        };
        for patch in patches.try_iter() {
            for edit in light_edits(&patch) {
                if let Err(e) = self.scene.apply_light_edit(edit) {
                    warn!("Ignoring panel edit: {e}");
                }
            }
        }
    }

    fn apply_decoded_assets(&mut self) {
        for message in self.assets.drain() {
            if let Err(e) = self.scene.apply_asset(message) {
                warn!("Dropping decoded image: {e}");
            }
        }
    }

    /// Copy this frame's metrics and light values into the panel state.
    pub fn update_panel_state(&mut self, elapsed: f32) {
        let now = Instant::now();
        let (width, height) = self
            .gpu
            .as_ref()
            .map(RenderContext::size)
            .unwrap_or((self.scene.viewport.width, self.scene.viewport.height));

        if let Ok(mut state) = self.panel_state.lock() {
            state.record_frame(
                self.animation.frame_count(),
                now.duration_since(self.last_frame_time),
                now.duration_since(self.start_time),
                elapsed,
            );
            state.window_width = width;
            state.window_height = height;
            state.lights = light_values(&self.scene.light_snapshot());
        }
        self.last_frame_time = now;
    }

    /// Checks if quit was requested via the debug panel.
    pub fn should_quit_from_debug(&self) -> bool {
        self.panel_state
            .lock()
            .map(|state| state.quit_requested)
            .unwrap_or(false)
    }

    /// One animation frame plus its render. `Err` stops the loop.
    fn redraw(&mut self) -> Result<(), AppError> {
        self.apply_panel_edits();
        self.apply_decoded_assets();
        self.scene.feed_pointer(&mut self.pointer);

        let report = self.animation.frame(&mut self.scene)?;

        if let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer) {
            let uploaded = renderer.upload_surfaces(gpu, &mut self.scene);
            if uploaded > 0 {
                info!("Uploaded {uploaded} surface textures");
            }
            match renderer.render(gpu, &self.scene) {
                Err(AppError::Surface(e)) if !e.is_fatal() => {
                    warn!("Surface {e}, skipping frame");
                }
                other => other?,
            }
        }

        self.update_panel_state(report.elapsed);
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.scale_factor = window.scale_factor();
        let (width, height) = logical_size(window.inner_size(), self.scale_factor);
        let viewport = self.scene.resize(width, height, self.scale_factor);
        let (buffer_width, buffer_height) = viewport.drawing_buffer_size();
        info!(
            "Window {}x{} (scale: {:.2}, buffer {}x{})",
            width, height, self.scale_factor, buffer_width, buffer_height
        );

        match init_render_context_blocking(
            window.clone(),
            buffer_width,
            buffer_height,
            self.config.window.vsync,
        ) {
            Ok(gpu) => {
                self.renderer = Some(SceneRenderer::new(&gpu, &self.scene));
                self.gpu = Some(gpu);
            }
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        if let Some((server, patches)) = create_debug_server(
            self.config.debug.panel_enabled,
            get_debug_port(self.config.debug.panel_port),
            self.panel_state.clone(),
        ) {
            self.debug_server = Some(server);
            self.light_patches = Some(patches);
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical: LogicalPosition<f64> = position.to_logical(self.scale_factor);
                self.pointer.on_cursor_moved(logical.x, logical.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.pointer.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.pointer.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => {
                self.pointer.on_cursor_entered();
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.on_cursor_left();
            }
            WindowEvent::RedrawRequested => {
                if self.should_quit_from_debug() {
                    info!("Quit requested via debug panel");
                    event_loop.exit();
                    return;
                }

                if let Err(e) = self.redraw() {
                    error!("Frame failed, stopping: {e}");
                    event_loop.exit();
                    return;
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut server) = self.debug_server.take() {
            server.stop();
        }
        self.assets.shutdown();
        info!(frames = self.animation.frame_count(), "Viewer stopped");
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip_all)]
pub fn run(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.render.sphere_segments = 8;
        config.assets.texture_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_logical_size_calculation() {
        assert_eq!(logical_size(PhysicalSize::new(2560, 1440), 2.0), (1280, 720));
        assert_eq!(logical_size(PhysicalSize::new(1024, 768), 1.0), (1024, 768));
        assert_eq!(logical_size(PhysicalSize::new(1001, 501), 1.5), (667, 334));
    }

    #[test]
    fn test_app_state_starts_without_window() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::new(small_config(tmp.path())).unwrap();
        assert!(state.window.is_none());
        assert!(state.gpu.is_none());
        assert_eq!(state.panel_state.lock().unwrap().lights.len(), 2);
    }

    #[test]
    fn test_redraw_without_gpu_advances_scene() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = AppState::new(small_config(tmp.path())).unwrap();
        state.redraw().unwrap();
        state.redraw().unwrap();

        let panel = state.panel_state.lock().unwrap();
        assert_eq!(panel.frame_count, 2);
        let pivot = state.scene.pivots[0].node;
        let rotation = state.scene.graph.transform(pivot).unwrap().rotation.y;
        assert!((rotation - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_resize_without_gpu_updates_scene() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = AppState::new(small_config(tmp.path())).unwrap();
        state.scale_factor = 2.0;
        state.handle_resize(PhysicalSize::new(2048, 1536));
        assert_eq!(state.scene.viewport.width, 1024);
        assert_eq!(state.scene.viewport.height, 768);
        assert_eq!(state.scene.camera.aspect_ratio, 1024.0 / 768.0);
        assert_eq!(state.scene.viewport.drawing_buffer_size(), (2048, 1536));
    }

    #[test]
    fn test_panel_patches_reach_scene() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = AppState::new(small_config(tmp.path())).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        state.light_patches = Some(rx);
        tx.send(LightPatch {
            light: 0,
            intensity: Some(0.4),
            visible: Some(false),
            ..LightPatch::default()
        })
        .unwrap();

        state.redraw().unwrap();
        assert_eq!(state.scene.lights[0].intensity, 0.4);
        assert!(!state.scene.lights[0].visible);
        let panel = state.panel_state.lock().unwrap();
        assert_eq!(panel.lights[0].intensity, 0.4);
    }
}
