//! Body factory: textured spheres placed on the XZ diagonal.

use glam::Vec3;
use solar_render::{SphereMesh, generate_uv_sphere};

use crate::assets::SurfaceHandle;
use crate::error::SceneError;
use crate::graph::{NodeId, SceneGraph, Transform};

/// Static description of one body in the canonical layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub name: &'static str,
    pub radius: f32,
    pub offset: f32,
    /// Image file name, resolved against the configured texture directory.
    pub texture: &'static str,
}

/// Sun first, then the planets in orbit order.
pub const SOLAR_BODIES: [BodySpec; 9] = [
    BodySpec {
        name: "Sun",
        radius: 3.0,
        offset: -60.0,
        texture: "SunT.jpeg",
    },
    BodySpec {
        name: "Mercury",
        radius: 0.5,
        offset: 4.0,
        texture: "MercuryT.jpeg",
    },
    BodySpec {
        name: "Venus",
        radius: 0.7,
        offset: 8.0,
        texture: "VenusT.jpeg",
    },
    BodySpec {
        name: "Earth",
        radius: 0.9,
        offset: 16.0,
        texture: "EarthT.png",
    },
    BodySpec {
        name: "Mars",
        radius: 0.5,
        offset: 32.0,
        texture: "MarsT.jpeg",
    },
    BodySpec {
        name: "Jupiter",
        radius: 2.0,
        offset: 64.0,
        texture: "JupiterT.jpeg",
    },
    BodySpec {
        name: "Saturn",
        radius: 1.5,
        offset: 80.0,
        texture: "SaturnT.jpeg",
    },
    BodySpec {
        name: "Uranus",
        radius: 1.2,
        offset: 96.0,
        texture: "UranusT.jpeg",
    },
    BodySpec {
        name: "Neptune",
        radius: 1.0,
        offset: 110.0,
        texture: "NeptuneT.jpeg",
    },
];

/// Sphere geometry parameters. Vertices are generated by [`SphereGeometry::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl SphereGeometry {
    pub fn build(&self) -> SphereMesh {
        generate_uv_sphere(self.radius, self.width_segments, self.height_segments)
    }
}

/// One renderable sphere. The node lives in the scene graph; this is the
/// handle the rest of the scene keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub node: NodeId,
    pub name: String,
    pub geometry: SphereGeometry,
    pub surface: SurfaceHandle,
    /// Constructor offset; the node starts at `(offset, 0, offset)`.
    pub offset: f32,
}

impl CelestialBody {
    pub fn radius(&self) -> f32 {
        self.geometry.radius
    }
}

/// Insert a sphere of `radius` at the top level of `graph`, positioned at
/// `(offset, 0, offset)`.
pub fn create_body(
    graph: &mut SceneGraph,
    name: &str,
    radius: f32,
    surface: SurfaceHandle,
    offset: f32,
    segments: u32,
) -> Result<CelestialBody, SceneError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SceneError::InvalidRadius { radius });
    }
    if !offset.is_finite() {
        return Err(SceneError::InvalidOffset { offset });
    }

    let node = graph.add_node(name, Transform::from_translation(Vec3::new(offset, 0.0, offset)));
    tracing::debug!(body = name, radius, offset, "Created body");

    Ok(CelestialBody {
        node,
        name: name.to_string(),
        geometry: SphereGeometry {
            radius,
            width_segments: segments,
            height_segments: segments,
        },
        surface,
        offset,
    })
}
