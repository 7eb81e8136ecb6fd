//! Pointer input for the solar system viewer.
//!
//! Only the pointer is tracked: dragging orbits the camera and the wheel
//! dollies it. There is no keyboard interface.

pub mod pointer;

pub use pointer::{PointerButton, PointerState};
