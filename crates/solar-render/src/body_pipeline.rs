//! Textured, point-lit pipeline for celestial bodies.
//!
//! Bind groups:
//! - group 0: camera (binding 0) and point lights (binding 1), written once per frame
//! - group 1: surface texture + sampler from [`crate::TextureManager`]
//! - group 2: per-body model matrix
//!
//! Shading is diffuse only: `albedo * (ambient + sum(max(N.L, 0) * color * intensity * atten))`.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::buffer::{BufferAllocator, MeshBuffer, VertexPositionNormalUv};
use crate::camera::CameraUniform;
use crate::depth::DepthBuffer;

/// Lights beyond this count are not uploaded.
pub const MAX_POINT_LIGHTS: usize = 4;

/// CPU-side point light as the renderer sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    /// Linear RGB color, each channel in `[0, 1]`.
    pub color: Vec3,
    pub intensity: f32,
    /// Cutoff distance. `0.0` means the light reaches everything undiminished.
    pub radius: f32,
    /// Hidden lights contribute nothing.
    pub visible: bool,
}

/// Distance falloff for a point light. `radius <= 0` disables falloff.
pub fn attenuation(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 1.0;
    }
    if distance >= radius {
        return 0.0;
    }
    let inv_sq = 1.0 / (distance * distance + 1.0);
    let ratio = distance / radius;
    let t = (1.0 - ratio * ratio).max(0.0);
    inv_sq * t * t
}

/// Per-light GPU data, 48 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightGpu {
    /// xyz = world position, w = radius.
    pub position_radius: [f32; 4],
    /// xyz = color, w = intensity.
    pub color_intensity: [f32; 4],
    pub _padding: [f32; 4],
}

/// Light block bound at group 0, binding 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightsUniform {
    pub count: u32,
    pub ambient: f32,
    pub _pad: [u32; 2],
    pub lights: [PointLightGpu; MAX_POINT_LIGHTS],
}

impl LightsUniform {
    /// Pack the visible lights. Extra lights past [`MAX_POINT_LIGHTS`] are dropped.
    pub fn pack(ambient: f32, lights: &[PointLight]) -> Self {
        let mut packed = [PointLightGpu::default(); MAX_POINT_LIGHTS];
        let mut count = 0;
        for light in lights.iter().filter(|l| l.visible) {
            if count == MAX_POINT_LIGHTS {
                log::warn!("More than {MAX_POINT_LIGHTS} visible point lights, ignoring the rest");
                break;
            }
            packed[count] = PointLightGpu {
                position_radius: light.position.extend(light.radius).to_array(),
                color_intensity: light.color.extend(light.intensity).to_array(),
                _padding: [0.0; 4],
            };
            count += 1;
        }

        Self {
            count: count as u32,
            ambient,
            _pad: [0; 2],
            lights: packed,
        }
    }
}

/// Model matrix bound at group 2.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelMatrix {
    pub model: [[f32; 4]; 4],
}

pub struct BodyPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub model_bind_group_layout: wgpu::BindGroupLayout,
}

impl BodyPipeline {
    /// `texture_bind_group_layout` is [`crate::TextureManager::bind_group_layout`].
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("body-shader"),
            source: wgpu::ShaderSource::Wgsl(BODY_SHADER_SOURCE.into()),
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("body-frame-bgl"),
                entries: &[
                    uniform_entry(
                        0,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                        std::mem::size_of::<CameraUniform>(),
                    ),
                    uniform_entry(
                        1,
                        wgpu::ShaderStages::FRAGMENT,
                        std::mem::size_of::<LightsUniform>(),
                    ),
                ],
            });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("body-model-bgl"),
                entries: &[uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX,
                    std::mem::size_of::<ModelMatrix>(),
                )],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                texture_bind_group_layout,
                &model_bind_group_layout,
            ],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("body-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexPositionNormalUv::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            frame_bind_group_layout,
            model_bind_group_layout,
        }
    }
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

/// Camera and light buffers shared by every body in a frame.
pub struct FrameUniforms {
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl FrameUniforms {
    pub fn new(device: &wgpu::Device, pipeline: &BodyPipeline) -> Self {
        let allocator = BufferAllocator::new(device);
        let camera_buffer = allocator.create_uniform(
            "body-camera-uniform",
            bytemuck::bytes_of(&CameraUniform::zeroed()),
        );
        let lights_buffer = allocator.create_uniform(
            "body-lights-uniform",
            bytemuck::bytes_of(&LightsUniform::zeroed()),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("body-frame-bind-group"),
            layout: &pipeline.frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            camera_buffer,
            lights_buffer,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, camera: &CameraUniform, lights: &LightsUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(lights));
    }
}

/// One body's model matrix buffer and bind group.
pub struct ModelUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ModelUniform {
    pub fn new(device: &wgpu::Device, pipeline: &BodyPipeline, label: &str) -> Self {
        let buffer = BufferAllocator::new(device).create_uniform(
            &format!("{label}-model"),
            bytemuck::bytes_of(&ModelMatrix {
                model: Mat4::IDENTITY.to_cols_array_2d(),
            }),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-model-bind-group")),
            layout: &pipeline.model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, world: Mat4) {
        let uniform = ModelMatrix {
            model: world.to_cols_array_2d(),
        };
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
    }
}

/// Draw one body. The frame bind group must already hold this frame's camera and lights.
pub fn draw_body<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &'a BodyPipeline,
    frame: &'a FrameUniforms,
    surface: &'a wgpu::BindGroup,
    model: &'a ModelUniform,
    mesh: &'a MeshBuffer,
) {
    render_pass.set_pipeline(&pipeline.pipeline);
    render_pass.set_bind_group(0, &frame.bind_group, &[]);
    render_pass.set_bind_group(1, surface, &[]);
    render_pass.set_bind_group(2, &model.bind_group, &[]);
    mesh.bind(render_pass);
    mesh.draw(render_pass);
}

pub const BODY_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct PointLight {
    position_radius: vec4<f32>,
    color_intensity: vec4<f32>,
    _padding: vec4<f32>,
};

struct Lights {
    count: u32,
    ambient: f32,
    _pad0: u32,
    _pad1: u32,
    lights: array<PointLight, 4>,
};

struct Model {
    model: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(0) @binding(1) var<uniform> lights: Lights;
@group(1) @binding(0) var t_surface: texture_2d<f32>;
@group(1) @binding(1) var s_surface: sampler;
@group(2) @binding(0) var<uniform> body: Model;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

fn attenuation(dist: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 1.0;
    }
    if dist >= radius {
        return 0.0;
    }
    let inv_sq = 1.0 / (dist * dist + 1.0);
    let ratio = dist / radius;
    let t = max(1.0 - ratio * ratio, 0.0);
    return inv_sq * t * t;
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = body.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = (body.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(t_surface, s_surface, in.uv).rgb;
    let n = normalize(in.world_normal);

    var irradiance = vec3<f32>(lights.ambient);
    for (var i = 0u; i < lights.count; i = i + 1u) {
        let light = lights.lights[i];
        let to_light = light.position_radius.xyz - in.world_position;
        let dist = length(to_light);
        let n_dot_l = max(dot(n, to_light / max(dist, 1e-4)), 0.0);
        let falloff = attenuation(dist, light.position_radius.w);
        irradiance += light.color_intensity.rgb * light.color_intensity.w * n_dot_l * falloff;
    }

    return vec4<f32>(albedo * irradiance, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn white_light(x: f32, visible: bool) -> PointLight {
        PointLight {
            position: Vec3::new(x, 0.0, 0.0),
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 0.0,
            visible,
        }
    }

    #[test]
    fn test_gpu_struct_sizes() {
        assert_eq!(std::mem::size_of::<PointLightGpu>(), 48);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 16 + 48 * MAX_POINT_LIGHTS);
        assert_eq!(std::mem::size_of::<ModelMatrix>(), 64);
    }

    #[test]
    fn test_zero_radius_never_attenuates() {
        assert_eq!(attenuation(0.0, 0.0), 1.0);
        assert_eq!(attenuation(1000.0, 0.0), 1.0);
    }

    #[test]
    fn test_attenuation_reaches_zero_at_radius() {
        assert_eq!(attenuation(10.0, 10.0), 0.0);
        assert_eq!(attenuation(12.0, 10.0), 0.0);
        let near = attenuation(1.0, 10.0);
        let far = attenuation(5.0, 10.0);
        assert!(near > far && far > 0.0);
    }

    #[test]
    fn test_pack_skips_hidden_lights() {
        let lights = [white_light(-30.0, true), white_light(-90.0, false)];
        let packed = LightsUniform::pack(0.1, &lights);
        assert_eq!(packed.count, 1);
        assert_eq!(packed.ambient, 0.1);
        assert_eq!(packed.lights[0].position_radius, [-30.0, 0.0, 0.0, 0.0]);
        assert_eq!(packed.lights[0].color_intensity, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_pack_caps_light_count() {
        let lights: Vec<_> = (0..6).map(|i| white_light(i as f32, true)).collect();
        let packed = LightsUniform::pack(0.0, &lights);
        assert_eq!(packed.count as usize, MAX_POINT_LIGHTS);
        assert_eq!(packed.lights[3].position_radius[0], 3.0);
    }

    #[test]
    fn test_shader_declares_bindings() {
        assert!(BODY_SHADER_SOURCE.contains("@group(0) @binding(1) var<uniform> lights"));
        assert!(BODY_SHADER_SOURCE.contains("@group(2) @binding(0) var<uniform> body"));
        assert!(BODY_SHADER_SOURCE.contains("array<PointLight, 4>"));
    }

    #[test]
    fn test_pipeline_creation() {
        let Some((device, _queue)) = crate::depth::create_test_device_queue() else {
            return;
        };
        let textures = crate::TextureManager::new(&device);
        let pipeline = BodyPipeline::new(
            &device,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            textures.bind_group_layout(),
        );
        let _frame = FrameUniforms::new(&device, &pipeline);
        let _model = ModelUniform::new(&device, &pipeline, "Earth");
    }
}
