//! Latitude/longitude sphere mesh generation for body rendering.

use std::f32::consts::{PI, TAU};

use crate::buffer::VertexPositionNormalUv;

/// CPU-side sphere mesh, ready for [`crate::BufferAllocator::create_mesh`].
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    /// Counter-clockwise when viewed from outside.
    pub indices: Vec<u32>,
}

/// Generate a UV sphere centered on the origin.
///
/// `width_segments` slices around the Y axis (at least 3) and
/// `height_segments` stacks from pole to pole (at least 2). Each row carries a
/// duplicated seam vertex so the equirectangular texture wraps cleanly, and
/// V runs from 0 at the north pole (+Y) to 1 at the south pole, matching the
/// top-down row order of decoded images.
pub fn generate_uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> SphereMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row_len = width_segments + 1;

    let mut vertices = Vec::with_capacity((row_len * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;

        // Pole vertices sit mid-segment so each pole triangle samples its own column.
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;
            let normal = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            vertices.push(VertexPositionNormalUv {
                position: normal.map(|c| c * radius),
                normal,
                uv: [u + u_offset, v],
            });
        }
    }

    let mut indices = Vec::with_capacity((width_segments * (height_segments - 1) * 6) as usize);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row_len + ix + 1;
            let b = iy * row_len + ix;
            let c = (iy + 1) * row_len + ix;
            let d = (iy + 1) * row_len + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    SphereMesh { vertices, indices }
}
