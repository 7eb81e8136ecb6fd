//! Translation between debug panel messages and scene light edits.

use solar_debug::{LightPatch, LightValues};
use solar_scene::{LightEdit, LightField, LightSnapshot};

/// One edit per field present in `patch`.
pub fn light_edits(patch: &LightPatch) -> Vec<LightEdit> {
    let light = patch.light;
    [
        patch.visible.map(LightField::Visible),
        patch.intensity.map(LightField::Intensity),
        patch.r.map(LightField::Red),
        patch.g.map(LightField::Green),
        patch.b.map(LightField::Blue),
    ]
    .into_iter()
    .flatten()
    .map(|field| LightEdit { light, field })
    .collect()
}

pub fn light_values(snapshots: &[LightSnapshot]) -> Vec<LightValues> {
    snapshots
        .iter()
        .map(|s| LightValues {
            visible: s.visible,
            intensity: s.intensity,
            r: s.r,
            g: s.g,
            b: s.b,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_expands_to_present_fields() {
        let patch = LightPatch {
            light: 1,
            visible: Some(false),
            b: Some(0.3),
            ..LightPatch::default()
        };
        assert_eq!(
            light_edits(&patch),
            vec![
                LightEdit {
                    light: 1,
                    field: LightField::Visible(false)
                },
                LightEdit {
                    light: 1,
                    field: LightField::Blue(0.3)
                },
            ]
        );
        assert!(light_edits(&LightPatch::default()).is_empty());
    }

    #[test]
    fn test_snapshot_values() {
        let snapshot = LightSnapshot {
            visible: true,
            intensity: 0.5,
            r: 1.0,
            g: 0.2,
            b: 0.0,
        };
        let values = light_values(&[snapshot]);
        assert_eq!(
            values,
            vec![LightValues {
                visible: true,
                intensity: 0.5,
                r: 1.0,
                g: 0.2,
                b: 0.0
            }]
        );
    }
}
