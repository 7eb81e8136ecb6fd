//! GPU resources for a [`SceneState`] and the per-frame draw.
//!
//! One mesh and model uniform per body, one texture per surface handle.
//! Surfaces start as white placeholders and are replaced as decoded images
//! arrive from the scene's registry.

use std::sync::Arc;

use glam::Mat4;
use solar_render::{
    BackgroundPass, BodyPipeline, BufferAllocator, DepthBuffer, FrameEncoder, FrameUniforms,
    IndexData, LightsUniform, ManagedTexture, MeshBuffer, ModelUniform, RenderContext,
    RenderPassBuilder, TextureManager, clear_color_from_rgb, draw_body,
};
use solar_scene::{SceneError, SceneState, SurfaceHandle, SurfaceState};

use crate::error::AppError;

/// Texture-manager key of a surface handle.
pub fn surface_key(handle: SurfaceHandle) -> String {
    format!("surface-{}", handle.index())
}

/// One body to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub body: usize,
    pub world: Mat4,
    pub surface: SurfaceHandle,
}

/// Bodies in scene order with their current world matrices. Only a body's
/// own visibility flag is consulted; pivots carry no geometry of their own.
pub fn draw_list(scene: &SceneState) -> Result<Vec<DrawItem>, SceneError> {
    scene
        .bodies
        .iter()
        .enumerate()
        .filter(|(_, body)| scene.graph.is_visible(body.node))
        .map(|(i, body)| {
            Ok(DrawItem {
                body: i,
                world: scene.graph.world_matrix(body.node)?,
                surface: body.surface,
            })
        })
        .collect()
}

struct BodyGpu {
    mesh: MeshBuffer,
    model: ModelUniform,
}

pub struct SceneRenderer {
    pipeline: BodyPipeline,
    background: BackgroundPass,
    textures: TextureManager,
    frame: FrameUniforms,
    depth: DepthBuffer,
    bodies: Vec<BodyGpu>,
}

impl SceneRenderer {
    pub fn new(gpu: &RenderContext, scene: &SceneState) -> Self {
        let device = &gpu.device;
        let mut textures = TextureManager::new(device);
        let pipeline = BodyPipeline::new(device, gpu.surface_format, textures.bind_group_layout());
        let background =
            BackgroundPass::new(device, gpu.surface_format, textures.bind_group_layout());
        let frame = FrameUniforms::new(device, &pipeline);
        let (width, height) = gpu.size();
        let depth = DepthBuffer::new(device, width, height);

        for handle in scene.surfaces.handles() {
            textures.placeholder(device, &gpu.queue, &surface_key(handle));
        }

        let allocator = BufferAllocator::new(device);
        let bodies = scene
            .bodies
            .iter()
            .map(|body| {
                let sphere = body.geometry.build();
                BodyGpu {
                    mesh: allocator.create_mesh(
                        &body.name,
                        bytemuck::cast_slice(&sphere.vertices),
                        IndexData::U32(&sphere.indices),
                    ),
                    model: ModelUniform::new(device, &pipeline, &body.name),
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            bodies = bodies.len(),
            textures = textures.len(),
            "Scene renderer initialized"
        );

        Self {
            pipeline,
            background,
            textures,
            frame,
            depth,
            bodies,
        }
    }

    /// Match the depth buffer to a new drawing buffer size.
    pub fn resize(&mut self, gpu: &RenderContext) {
        let (width, height) = gpu.size();
        self.depth.resize(&gpu.device, width, height);
    }

    /// Upload images decoded since the last frame. A rejected image keeps
    /// its placeholder.
    pub fn upload_surfaces(&mut self, gpu: &RenderContext, scene: &mut SceneState) -> usize {
        let mut uploaded = 0;
        for (handle, image) in scene.surfaces.take_dirty() {
            let key = surface_key(handle);
            match self.textures.upload_rgba(
                &gpu.device,
                &gpu.queue,
                &key,
                &image.rgba,
                image.width,
                image.height,
            ) {
                Ok(_) => uploaded += 1,
                Err(e) => tracing::warn!(surface = %key, "Texture upload rejected: {e}"),
            }
        }
        uploaded
    }

    fn surface_texture(
        &mut self,
        gpu: &RenderContext,
        handle: SurfaceHandle,
    ) -> Arc<ManagedTexture> {
        let key = surface_key(handle);
        match self.textures.get(&key) {
            Some(texture) => texture,
            None => self.textures.placeholder(&gpu.device, &gpu.queue, &key),
        }
    }

    /// Draw one frame: background (once loaded), then every visible body.
    pub fn render(&mut self, gpu: &RenderContext, scene: &SceneState) -> Result<(), AppError> {
        let items = draw_list(scene)?;
        let lights = LightsUniform::pack(scene.ambient, &scene.point_lights()?);
        self.frame
            .write(&gpu.queue, &scene.camera.to_uniform(), &lights);

        let mut surfaces = Vec::with_capacity(items.len());
        for item in &items {
            let body = self
                .bodies
                .get(item.body)
                .ok_or(SceneError::UnknownBody(item.body))?;
            body.model.write(&gpu.queue, item.world);
            surfaces.push(self.surface_texture(gpu, item.surface));
        }
        let background = match scene.surfaces.state(scene.background) {
            Some(SurfaceState::Loaded { .. }) => self.textures.get(&surface_key(scene.background)),
            _ => None,
        };

        let surface_texture = gpu.get_current_texture()?;
        let mut frame = FrameEncoder::new(&gpu.device, surface_texture);
        let builder = RenderPassBuilder::new()
            .clear_color(clear_color_from_rgb(scene.clear_color))
            .depth(&self.depth)
            .label("solar-scene");
        {
            let mut pass = frame.begin_render_pass(&builder);
            if let Some(background) = &background {
                self.background.draw(&mut pass, &background.bind_group);
            }
            for (item, texture) in items.iter().zip(&surfaces) {
                let body = &self.bodies[item.body];
                draw_body(
                    &mut pass,
                    &self.pipeline,
                    &self.frame,
                    &texture.bind_group,
                    &body.model,
                    &body.mesh,
                );
            }
        }
        frame.present(&gpu.queue);
        Ok(())
    }
}
