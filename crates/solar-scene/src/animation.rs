//! Per-frame motion: body spin, pivot orbit, and camera damping.
//!
//! [`AnimationLoop::frame`] is called once per display refresh by the window
//! layer, which then renders and requests the next redraw.

use solar_config::SpinModel;

use crate::clock::Clock;
use crate::error::SceneError;
use crate::graph::Transform;
use crate::state::SceneState;

/// Per-second spin coefficient shared by both spin models.
pub const SPIN_RATE: f32 = 0.2;

/// Signature of a per-body spin update: `(local transform, elapsed seconds)`.
pub type SpinUpdate = fn(&mut Transform, f32);

/// Resets Y rotation from elapsed time, then feeds the freshly written values
/// back into themselves. Net effect: `rotation.y == 0.24 * t`; the X terms
/// stay at zero unless something else perturbs `rotation.x`.
pub fn compounding_spin_update(transform: &mut Transform, elapsed: f32) {
    transform.rotation.y = SPIN_RATE * elapsed;
    transform.rotation.y += SPIN_RATE * transform.rotation.y;
    transform.rotation.x += SPIN_RATE * transform.rotation.x;
    transform.translation.z += SPIN_RATE * transform.rotation.x;
}

/// `rotation.y == 0.2 * t`.
pub fn steady_spin_update(transform: &mut Transform, elapsed: f32) {
    transform.rotation.y = SPIN_RATE * elapsed;
}

pub fn spin_update_for(model: SpinModel) -> SpinUpdate {
    match model {
        SpinModel::Compounding => compounding_spin_update,
        SpinModel::Steady => steady_spin_update,
    }
}

/// What one call to [`AnimationLoop::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// 1-based index of the frame just produced.
    pub frame: u64,
    /// Clock reading used for the spin update.
    pub elapsed: f32,
    /// Whether the orbit controls moved the camera.
    pub camera_moved: bool,
}

pub struct AnimationLoop<C: Clock> {
    clock: C,
    spin: SpinUpdate,
    frame_count: u64,
}

impl<C: Clock> AnimationLoop<C> {
    pub fn new(clock: C, model: SpinModel) -> Self {
        tracing::debug!(?model, "Animation loop created");
        Self {
            clock,
            spin: spin_update_for(model),
            frame_count: 0,
        }
    }

    /// Advance the scene by one frame.
    ///
    /// Any error leaves the frame half-applied; the caller is expected to stop
    /// scheduling frames.
    pub fn frame(&mut self, state: &mut SceneState) -> Result<FrameReport, SceneError> {
        let elapsed = self.clock.elapsed();

        for assignment in &state.assignments {
            let body = state
                .bodies
                .get(assignment.body_index)
                .ok_or(SceneError::UnknownBody(assignment.body_index))?;
            (self.spin)(state.graph.transform_mut(body.node)?, elapsed);

            let pivot = state
                .pivots
                .get(assignment.pivot_index)
                .ok_or(SceneError::UnknownPivot(assignment.pivot_index))?;
            state.graph.transform_mut(pivot.node)?.rotation.y += assignment.angular_step;
        }

        let camera_moved = state.controls.update(&mut state.camera);

        self.frame_count += 1;
        Ok(FrameReport {
            frame: self.frame_count,
            elapsed,
            camera_moved,
        })
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
