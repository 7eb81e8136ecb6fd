//! The single owner of everything that gets drawn.

use glam::Vec3;
use solar_config::Config;
use solar_input::PointerState;
use solar_render::{Camera, PointLight};

use crate::assets::{AssetMessage, SurfaceHandle, SurfaceRegistry};
use crate::body::{CelestialBody, SOLAR_BODIES, create_body};
use crate::controls::OrbitControls;
use crate::error::SceneError;
use crate::graph::SceneGraph;
use crate::lights::{LightEdit, LightSnapshot, LightSource, apply_light_edit, create_lights};
use crate::pivot::{OrbitAssignment, PIVOT_ANGULAR_STEPS, PivotNode, build_hierarchy, create_pivots};
use crate::viewport::Viewport;

/// Scene graph plus the handles the update and render code index into it.
///
/// `bodies[0]` is the sun. `assignments` ties each orbiting body to its pivot.
#[derive(Debug)]
pub struct SceneState {
    pub graph: SceneGraph,
    pub bodies: Vec<CelestialBody>,
    pub pivots: Vec<PivotNode>,
    pub assignments: Vec<OrbitAssignment>,
    pub lights: Vec<LightSource>,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub viewport: Viewport,
    pub surfaces: SurfaceRegistry,
    /// Stretched behind everything once loaded.
    pub background: SurfaceHandle,
    pub ambient: f32,
    pub clear_color: [f32; 3],
    max_pixel_ratio: f64,
}

impl SceneState {
    /// Build the sun, eight planets, their pivots, two lights, and the camera.
    /// Every surface starts as a placeholder.
    pub fn solar_system(config: &Config) -> Result<Self, SceneError> {
        let mut graph = SceneGraph::new();
        let mut surfaces = SurfaceRegistry::new();

        let bodies = SOLAR_BODIES
            .iter()
            .map(|spec| {
                let surface = surfaces.register(spec.name, config.texture_path(spec.texture));
                create_body(
                    &mut graph,
                    spec.name,
                    spec.radius,
                    surface,
                    spec.offset,
                    config.render.sphere_segments,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pivots = create_pivots(&mut graph, bodies.len() - 1);
        let assignments = build_hierarchy(&mut graph, &bodies, &pivots, &PIVOT_ANGULAR_STEPS)?;
        let lights = create_lights(&mut graph);
        let background =
            surfaces.register("background", config.texture_path(&config.assets.background));

        let viewport = Viewport::new(
            config.window.width,
            config.window.height,
            1.0,
            config.render.max_pixel_ratio,
        );
        let target = Vec3::from_array(config.camera.target);
        let mut camera = Camera::perspective(
            config.camera.fov_degrees,
            viewport.aspect_ratio().unwrap_or(1.0),
            config.camera.near,
            config.camera.far,
            Vec3::from_array(config.camera.position),
        );
        camera.look_at(target);
        let controls = OrbitControls::new(&config.controls, target);

        tracing::info!(
            bodies = bodies.len(),
            pivots = pivots.len(),
            lights = lights.len(),
            nodes = graph.len(),
            "Solar system built"
        );

        Ok(Self {
            graph,
            bodies,
            pivots,
            assignments,
            lights,
            camera,
            controls,
            viewport,
            surfaces,
            background,
            ambient: config.render.ambient,
            clear_color: config.render.clear_color,
            max_pixel_ratio: config.render.max_pixel_ratio,
        })
    }

    /// Update the viewport and camera aspect together. Returns the new
    /// viewport so the caller can resize the drawing surface to match.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f64) -> Viewport {
        let viewport = Viewport::new(width, height, device_pixel_ratio, self.max_pixel_ratio);
        if viewport != self.viewport {
            tracing::debug!(width, height, pixel_ratio = viewport.pixel_ratio, "Viewport resized");
        }
        self.viewport = viewport;
        self.camera
            .set_aspect_ratio(viewport.width as f32, viewport.height as f32);
        viewport
    }

    /// Hand this frame's drag and wheel input to the orbit controls.
    pub fn feed_pointer(&mut self, pointer: &mut PointerState) {
        self.controls
            .handle_pointer(pointer, self.viewport.height as f32);
    }

    /// Apply a finished decode from the asset worker.
    pub fn apply_asset(&mut self, message: AssetMessage) -> Result<(), SceneError> {
        self.surfaces.complete(message.surface, message.result)
    }

    pub fn apply_light_edit(&mut self, edit: LightEdit) -> Result<(), SceneError> {
        apply_light_edit(&mut self.lights, edit)
    }

    pub fn light_snapshot(&self) -> Vec<LightSnapshot> {
        self.lights.iter().map(LightSource::snapshot).collect()
    }

    /// Lights at their current world positions, hidden ones included.
    pub fn point_lights(&self) -> Result<Vec<PointLight>, SceneError> {
        self.lights
            .iter()
            .map(|light| light.to_point_light(&self.graph))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, DecodedImage, SurfaceState};
    use crate::lights::LightField;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.render.sphere_segments = 8;
        config
    }

    #[test]
    fn test_solar_system_layout() {
        let state = SceneState::solar_system(&small_config()).unwrap();
        assert_eq!(state.bodies.len(), 9);
        assert_eq!(state.pivots.len(), 8);
        assert_eq!(state.assignments.len(), 8);
        assert_eq!(state.lights.len(), 2);
        // Nine bodies, background.
        assert_eq!(state.surfaces.len(), 10);
        assert_eq!(state.bodies[0].name, "Sun");
        assert_eq!(
            state.surfaces.state(state.background),
            Some(&SurfaceState::Placeholder)
        );
        let path = state.surfaces.path(state.background).unwrap();
        assert!(path.ends_with("Environment_baseColor.jpeg"));
    }

    #[test]
    fn test_camera_starts_looking_at_target() {
        let state = SceneState::solar_system(&small_config()).unwrap();
        assert_eq!(state.camera.position, Vec3::new(0.0, 0.0, 2.0));
        assert!((state.camera.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!((state.camera.aspect_ratio - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_updates_camera_and_viewport() {
        let mut state = SceneState::solar_system(&small_config()).unwrap();
        let viewport = state.resize(1024, 768, 1.0);
        assert_eq!(state.camera.aspect_ratio, 1024.0 / 768.0);
        assert_eq!(viewport.drawing_buffer_size(), (1024, 768));

        let viewport = state.resize(1024, 768, 2.0);
        assert_eq!(state.camera.aspect_ratio, 1024.0 / 768.0);
        assert_eq!(viewport.drawing_buffer_size(), (2048, 1536));
        assert_eq!(state.viewport, viewport);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut state = SceneState::solar_system(&small_config()).unwrap();
        let first = state.resize(1024, 768, 2.0);
        let camera = state.camera.clone();
        let second = state.resize(1024, 768, 2.0);
        assert_eq!(first, second);
        assert_eq!(state.camera.aspect_ratio, camera.aspect_ratio);
        assert_eq!(state.camera.position, camera.position);
    }

    #[test]
    fn test_minimized_window_keeps_aspect() {
        let mut state = SceneState::solar_system(&small_config()).unwrap();
        state.resize(800, 400, 1.0);
        state.resize(0, 0, 1.0);
        assert_eq!(state.camera.aspect_ratio, 2.0);
    }

    #[test]
    fn test_asset_messages_update_surfaces() {
        let mut state = SceneState::solar_system(&small_config()).unwrap();
        let earth = state.bodies[3].surface;
        state
            .apply_asset(AssetMessage {
                surface: earth,
                result: Ok(DecodedImage {
                    width: 2,
                    height: 1,
                    rgba: vec![255; 8],
                }),
            })
            .unwrap();
        state
            .apply_asset(AssetMessage {
                surface: state.background,
                result: Err(AssetError::LoaderClosed),
            })
            .unwrap();

        assert_eq!(
            state.surfaces.state(earth),
            Some(&SurfaceState::Loaded { width: 2, height: 1 })
        );
        assert!(matches!(
            state.surfaces.state(state.background),
            Some(SurfaceState::Failed { .. })
        ));
        let dirty = state.surfaces.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, earth);
    }

    #[test]
    fn test_light_edits_and_snapshot() {
        let mut state = SceneState::solar_system(&small_config()).unwrap();
        state
            .apply_light_edit(LightEdit {
                light: 0,
                field: LightField::Intensity(0.25),
            })
            .unwrap();
        let snapshot = state.light_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].intensity, 0.25);

        let lights = state.point_lights().unwrap();
        assert_eq!(lights[1].position, Vec3::new(-90.0, 0.0, 0.0));
    }
}
