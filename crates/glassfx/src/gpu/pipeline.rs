use std::borrow::Cow;

use crate::backend::BackendError;

use super::shaders;

/// Colour format of every target the backend allocates.
pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Compiled blit, blur and glass programs plus their shared layout.
pub(crate) struct Programs {
    pub layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    pub blit: wgpu::RenderPipeline,
    pub blur: wgpu::RenderPipeline,
    pub glass: wgpu::RenderPipeline,
}

impl Programs {
    pub fn new(device: &wgpu::Device) -> Result<Self, BackendError> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glass bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glass sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glass pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let vertex = compile(device, "fullscreen vertex", shaders::VERTEX)?;

        let blit = build(device, &pipeline_layout, &vertex, "blit", shaders::BLIT, None)?;
        let blur = build(device, &pipeline_layout, &vertex, "blur", shaders::BLUR, None)?;
        let glass = build(
            device,
            &pipeline_layout,
            &vertex,
            "glass",
            shaders::GLASS,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        )?;

        Ok(Self {
            layout,
            sampler,
            blit,
            blur,
            glass,
        })
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        uniforms: &wgpu::Buffer,
        source: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glass bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

/// Runs `create` inside a validation error scope and turns a captured
/// error into [`BackendError::ProgramCompile`].
fn scoped<T>(
    device: &wgpu::Device,
    program: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T, BackendError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(value),
        Some(err) => Err(BackendError::ProgramCompile {
            program,
            reason: err.to_string(),
        }),
    }
}

fn compile(
    device: &wgpu::Device,
    program: &'static str,
    source: &'static str,
) -> Result<wgpu::ShaderModule, BackendError> {
    scoped(device, program, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        })
    })
}

fn build(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    vertex: &wgpu::ShaderModule,
    program: &'static str,
    source: &'static str,
    blend: Option<wgpu::BlendState>,
) -> Result<wgpu::RenderPipeline, BackendError> {
    let fragment = compile(device, program, source)?;
    scoped(device, program, || {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: vertex,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        })
    })
}
