//! Orbit pivots and the body/pivot hierarchy.
//!
//! Every pivot hangs off the sun, and every orbiting body hangs off one
//! pivot. Correspondence is positional: `pivots[i]` carries `bodies[i + 1]`.
//! Spinning a pivot about its local Y axis sweeps its body around the sun at
//! the body's original offset.

use std::collections::HashSet;

use crate::body::CelestialBody;
use crate::error::SceneError;
use crate::graph::{NodeId, SceneGraph, Transform};

/// Per-frame Y rotation of each pivot, innermost orbit first (radians/frame).
pub const PIVOT_ANGULAR_STEPS: [f32; 8] = [0.05, 0.03, 0.009, 0.007, 0.005, 0.002, 0.0009, 0.0006];

/// An invisible transform node around which one body orbits.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotNode {
    pub node: NodeId,
}

/// Which body orbits via which pivot, and how fast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitAssignment {
    pub body_index: usize,
    pub pivot_index: usize,
    pub angular_step: f32,
}

/// Create `count` invisible top-level pivots named `pivot-<i>`.
pub fn create_pivots(graph: &mut SceneGraph, count: usize) -> Vec<PivotNode> {
    (0..count)
        .map(|i| {
            let node = graph.add_node(format!("pivot-{i}"), Transform::IDENTITY);
            // Pivots carry no geometry.
            graph.set_visible(node, false).ok();
            PivotNode { node }
        })
        .collect()
}

/// Parent every pivot under `bodies[0]`, then `bodies[i]` under `pivots[i - 1]`.
///
/// Returns one [`OrbitAssignment`] per orbiting body. `bodies[0]` never
/// orbits. Lengths must line up: one more body than pivots, one angular step
/// per pivot. Every body and pivot node must be distinct; nothing is
/// reparented when a check fails.
pub fn build_hierarchy(
    graph: &mut SceneGraph,
    bodies: &[CelestialBody],
    pivots: &[PivotNode],
    angular_steps: &[f32],
) -> Result<Vec<OrbitAssignment>, SceneError> {
    if bodies.len() != pivots.len() + 1 || angular_steps.len() != pivots.len() {
        return Err(SceneError::HierarchyMismatch {
            bodies: bodies.len(),
            pivots: pivots.len(),
            steps: angular_steps.len(),
        });
    }

    let mut seen = HashSet::with_capacity(bodies.len() + pivots.len());
    let nodes = bodies.iter().map(|b| b.node).chain(pivots.iter().map(|p| p.node));
    for node in nodes {
        if !seen.insert(node) {
            return Err(SceneError::DuplicateNode(node));
        }
    }

    let sun = &bodies[0];
    for pivot in pivots {
        graph.attach(pivot.node, sun.node)?;
    }

    let mut assignments = Vec::with_capacity(pivots.len());
    for (i, body) in bodies.iter().enumerate().skip(1) {
        graph.attach(body.node, pivots[i - 1].node)?;
        assignments.push(OrbitAssignment {
            body_index: i,
            pivot_index: i - 1,
            angular_step: angular_steps[i - 1],
        });
    }

    tracing::info!(
        orbits = assignments.len(),
        sun = %sun.name,
        "Built orbit hierarchy"
    );
    Ok(assignments)
}
