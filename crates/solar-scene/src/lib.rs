//! Scene graph and per-frame motion for the solar system viewer.
//!
//! [`SceneState::solar_system`] builds the sun, the planets, one invisible
//! pivot per planet, two point lights, and the camera. [`AnimationLoop`]
//! advances it once per display refresh. Images decode on a worker thread
//! ([`AssetLoader`]) and reach the scene as messages applied on the update
//! thread.

pub mod animation;
pub mod assets;
pub mod body;
pub mod clock;
pub mod controls;
pub mod error;
pub mod graph;
pub mod lights;
pub mod pivot;
pub mod state;
pub mod viewport;

pub use animation::{
    AnimationLoop, FrameReport, SPIN_RATE, SpinUpdate, compounding_spin_update,
    spin_update_for, steady_spin_update,
};
pub use assets::{
    AssetError, AssetLoader, AssetMessage, DecodedImage, SurfaceHandle, SurfaceRegistry,
    SurfaceState, decode_image,
};
pub use body::{BodySpec, CelestialBody, SOLAR_BODIES, SphereGeometry, create_body};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use controls::OrbitControls;
pub use error::SceneError;
pub use graph::{NodeId, SceneGraph, Transform};
pub use lights::{
    DEFAULT_LIGHT_POSITIONS, LightEdit, LightField, LightSnapshot, LightSource,
    apply_light_edit, create_lights,
};
pub use pivot::{OrbitAssignment, PIVOT_ANGULAR_STEPS, PivotNode, build_hierarchy, create_pivots};
pub use state::SceneState;
pub use viewport::Viewport;
