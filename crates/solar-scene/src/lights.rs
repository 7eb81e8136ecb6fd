//! Point lights and live light edits.

use glam::Vec3;
use solar_render::PointLight;

use crate::error::SceneError;
use crate::graph::{NodeId, SceneGraph, Transform};

/// Where the two scene lights start.
pub const DEFAULT_LIGHT_POSITIONS: [Vec3; 2] =
    [Vec3::new(-30.0, 0.0, 0.0), Vec3::new(-90.0, 0.0, 0.0)];

/// A point light registered as a scene-graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSource {
    pub node: NodeId,
    pub visible: bool,
    /// 0..=1.
    pub intensity: f32,
    /// Linear RGB, each channel 0..=1.
    pub color: Vec3,
    /// `0.0` disables distance falloff.
    pub range: f32,
}

/// A single field change coming from the debug panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightField {
    Visible(bool),
    Intensity(f32),
    Red(f32),
    Green(f32),
    Blue(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEdit {
    pub light: usize,
    pub field: LightField,
}

/// Read-only view of a light's editable fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSnapshot {
    pub visible: bool,
    pub intensity: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LightSource {
    /// Apply one edit. Numeric values are clamped to `[0, 1]`; NaN becomes 0.
    pub fn apply(&mut self, field: LightField) {
        match field {
            LightField::Visible(visible) => self.visible = visible,
            LightField::Intensity(v) => self.intensity = unit(v),
            LightField::Red(v) => self.color.x = unit(v),
            LightField::Green(v) => self.color.y = unit(v),
            LightField::Blue(v) => self.color.z = unit(v),
        }
    }

    pub fn snapshot(&self) -> LightSnapshot {
        LightSnapshot {
            visible: self.visible,
            intensity: self.intensity,
            r: self.color.x,
            g: self.color.y,
            b: self.color.z,
        }
    }

    /// Renderer view of this light at its current world position.
    pub fn to_point_light(&self, graph: &SceneGraph) -> Result<PointLight, SceneError> {
        Ok(PointLight {
            position: graph.world_position(self.node)?,
            color: self.color,
            intensity: self.intensity,
            radius: self.range,
            visible: self.visible,
        })
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Create the two white, full-intensity lights at their default positions.
pub fn create_lights(graph: &mut SceneGraph) -> Vec<LightSource> {
    DEFAULT_LIGHT_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &position)| LightSource {
            node: graph.add_node(format!("light-{i}"), Transform::from_translation(position)),
            visible: true,
            intensity: 1.0,
            color: Vec3::ONE,
            range: 0.0,
        })
        .collect()
}

/// Apply `edit` to the matching light.
pub fn apply_light_edit(lights: &mut [LightSource], edit: LightEdit) -> Result<(), SceneError> {
    let light = lights
        .get_mut(edit.light)
        .ok_or(SceneError::UnknownLight(edit.light))?;
    light.apply(edit.field);
    tracing::debug!(light = edit.light, field = ?edit.field, "Light edited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lights() {
        let mut graph = SceneGraph::new();
        let lights = create_lights(&mut graph);
        assert_eq!(lights.len(), 2);
        assert_eq!(
            graph.world_position(lights[0].node).unwrap(),
            Vec3::new(-30.0, 0.0, 0.0)
        );
        assert_eq!(
            graph.world_position(lights[1].node).unwrap(),
            Vec3::new(-90.0, 0.0, 0.0)
        );
        for light in &lights {
            assert!(light.visible);
            assert_eq!(light.intensity, 1.0);
            assert_eq!(light.color, Vec3::ONE);
            assert_eq!(light.range, 0.0);
        }
    }

    #[test]
    fn test_edits_clamp_to_unit_range() {
        let mut graph = SceneGraph::new();
        let mut lights = create_lights(&mut graph);

        for field in [
            LightField::Intensity(1.7),
            LightField::Red(-0.2),
            LightField::Green(0.4),
            LightField::Blue(f32::NAN),
            LightField::Visible(false),
        ] {
            apply_light_edit(&mut lights, LightEdit { light: 1, field }).unwrap();
        }

        let snapshot = lights[1].snapshot();
        assert_eq!(
            snapshot,
            LightSnapshot {
                visible: false,
                intensity: 1.0,
                r: 0.0,
                g: 0.4,
                b: 0.0
            }
        );
        assert_eq!(lights[0].snapshot().intensity, 1.0);
    }

    #[test]
    fn test_unknown_light_rejected() {
        let mut graph = SceneGraph::new();
        let mut lights = create_lights(&mut graph);
        assert_eq!(
            apply_light_edit(&mut lights, LightEdit { light: 2, field: LightField::Visible(true) }),
            Err(SceneError::UnknownLight(2))
        );
    }

    #[test]
    fn test_point_light_conversion() {
        let mut graph = SceneGraph::new();
        let mut lights = create_lights(&mut graph);
        lights[0].apply(LightField::Intensity(0.5));
        let point = lights[0].to_point_light(&graph).unwrap();
        assert_eq!(point.position, Vec3::new(-30.0, 0.0, 0.0));
        assert_eq!(point.intensity, 0.5);
        assert_eq!(point.radius, 0.0);
        assert!(point.visible);
    }
}
