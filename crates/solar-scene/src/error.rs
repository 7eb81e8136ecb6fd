//! Scene construction and update errors.

use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("body radius must be finite and positive, got {radius}")]
    InvalidRadius { radius: f32 },

    #[error("body offset must be finite, got {offset}")]
    InvalidOffset { offset: f32 },

    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),

    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected { child: NodeId, parent: NodeId },

    #[error(
        "orbit hierarchy needs one more body than pivots and one angular step per pivot, \
         got {bodies} bodies, {pivots} pivots, {steps} steps"
    )]
    HierarchyMismatch {
        bodies: usize,
        pivots: usize,
        steps: usize,
    },

    #[error("node {0:?} appears more than once in the orbit hierarchy")]
    DuplicateNode(NodeId),

    #[error("no body at index {0}")]
    UnknownBody(usize),

    #[error("no pivot at index {0}")]
    UnknownPivot(usize),

    #[error("no light at index {0}")]
    UnknownLight(usize),

    #[error("no surface with handle {0}")]
    UnknownSurface(usize),
}
