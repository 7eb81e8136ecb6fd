//! Render pass configuration and per-frame command encoding.
//!
//! [`RenderPassBuilder`] describes the color clear and depth attachment;
//! [`FrameEncoder`] owns one acquired surface texture and submits it exactly
//! once in [`FrameEncoder::present`].

use crate::depth::DepthBuffer;

/// Convert a linear RGB triple from config into a wgpu clear color.
pub fn clear_color_from_rgb(rgb: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(rgb[0]),
        g: f64::from(rgb[1]),
        b: f64::from(rgb[2]),
        a: 1.0,
    }
}

#[derive(Debug)]
struct DepthAttachment {
    view: wgpu::TextureView,
    clear_value: f32,
}

/// Fluent description of a single color + optional depth render pass.
#[derive(Debug)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    depth: Option<DepthAttachment>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// Black clear, no depth.
    pub fn new() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            depth: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Attach a reverse-Z depth buffer, cleared to the far plane.
    pub fn depth(mut self, depth: &DepthBuffer) -> Self {
        self.depth = Some(DepthAttachment {
            view: depth.view.clone(),
            clear_value: DepthBuffer::CLEAR_VALUE,
        });
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &'encoder wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            self.depth
                .as_ref()
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(depth.clear_value),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Command encoder bound to one acquired surface texture.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, surface_texture: wgpu::SurfaceTexture) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("solar-frame"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder,
            surface_texture,
            surface_view,
        }
    }

    /// Begin a pass targeting the surface texture.
    pub fn begin_render_pass<'a>(
        &'a mut self,
        builder: &'a RenderPassBuilder,
    ) -> wgpu::RenderPass<'a> {
        builder.begin(&mut self.encoder, &self.surface_view)
    }

    /// Submit the recorded commands and present the frame.
    pub fn present(self, queue: &wgpu::Queue) {
        queue.submit(std::iter::once(self.encoder.finish()));
        self.surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clear_is_black() {
        let builder = RenderPassBuilder::new();
        assert_eq!(builder.clear_color, wgpu::Color::BLACK);
        assert!(!builder.has_depth());
    }

    #[test]
    fn test_clear_color_from_config_triple() {
        let color = clear_color_from_rgb([0.25, 0.5, 1.0]);
        assert_eq!(color.r, 0.25);
        assert_eq!(color.g, 0.5);
        assert_eq!(color.b, 1.0);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_builder_sets_label_and_color() {
        let builder = RenderPassBuilder::new()
            .clear_color(clear_color_from_rgb([0.1, 0.1, 0.1]))
            .label("scene");
        assert_eq!(builder.label, Some("scene"));
        assert!((builder.clear_color.r - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_depth_attachment_clears_to_far_plane() {
        let Some((device, _queue)) = crate::depth::create_test_device_queue() else {
            return;
        };
        let depth = DepthBuffer::new(&device, 64, 64);
        let builder = RenderPassBuilder::new().depth(&depth);
        assert!(builder.has_depth());
        assert_eq!(
            builder.depth.as_ref().map(|d| d.clear_value),
            Some(DepthBuffer::CLEAR_VALUE)
        );
    }
}
