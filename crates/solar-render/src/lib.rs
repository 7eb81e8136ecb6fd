//! wgpu rendering for the solar system viewer: device and surface setup,
//! sphere meshes, the lit body pipeline, and the background pass.

pub mod background;
pub mod body_pipeline;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod sphere;
pub mod texture;

pub use background::BackgroundPass;
pub use body_pipeline::{
    BODY_SHADER_SOURCE, BodyPipeline, FrameUniforms, LightsUniform, MAX_POINT_LIGHTS,
    ModelMatrix, ModelUniform, PointLight, PointLightGpu, attenuation, draw_body,
};
pub use buffer::{BufferAllocator, IndexData, MeshBuffer, VertexPositionNormalUv};
pub use camera::{Camera, CameraUniform};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder, clear_color_from_rgb};
pub use sphere::{SphereMesh, generate_uv_sphere};
pub use texture::{ManagedTexture, SURFACE_FORMAT, TextureError, TextureManager};
