//! wgpu backend for the glass effect.
//!
//! - `context` opens a headless adapter/device pair.
//! - `pipeline` compiles the WGSL programs behind one bind group layout.
//! - `uniforms` holds the `bytemuck` blocks each program reads.
//!
//! Every primitive records and submits its own command encoder, so the
//! device sees the same sequence of draws the orchestrator issues.

mod context;
mod pipeline;
mod shaders;
mod uniforms;

use image::RgbaImage;
use wgpu::util::{BufferInitDescriptor, DeviceExt, TextureDataOrder};

use crate::backend::{
    clip_blit, BackendError, Binding, BlurDirection, GlassBackend, RenderTarget, TargetId,
};
use crate::geometry::{Extent, PixelBox};
use crate::kernel::BlurKernel;
use crate::params::CompositeParams;

pub use context::GpuContext;
use pipeline::{Programs, TARGET_FORMAT};
use uniforms::{BlitUniforms, BlurUniforms, GlassUniforms};

pub struct GpuTarget {
    id: TargetId,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: Extent,
}

impl RenderTarget for GpuTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    fn extent(&self) -> Extent {
        self.extent
    }
}

pub struct WgpuBackend {
    context: GpuContext,
    programs: Option<Programs>,
    next_id: u64,
    scissor: Option<PixelBox>,
    binding: Option<Binding>,
}

impl WgpuBackend {
    pub fn new(context: GpuContext) -> Self {
        Self {
            context,
            programs: None,
            next_id: 0,
            scissor: None,
            binding: None,
        }
    }

    pub fn headless() -> anyhow::Result<Self> {
        Ok(Self::new(GpuContext::new()?))
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    fn texture_descriptor(extent: Extent) -> wgpu::TextureDescriptor<'static> {
        wgpu::TextureDescriptor {
            label: Some("glass render target"),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        }
    }

    fn wrap(&mut self, texture: wgpu::Texture, extent: Extent) -> GpuTarget {
        self.next_id += 1;
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        GpuTarget {
            id: TargetId(self.next_id),
            texture,
            view,
            extent,
        }
    }

    fn check_extent(&self, extent: Extent) -> Result<(), BackendError> {
        let max = self.context.max_dimension();
        if extent.is_empty() || extent.width > max || extent.height > max {
            return Err(BackendError::Allocation {
                width: extent.width,
                height: extent.height,
            });
        }
        Ok(())
    }

    /// Uploads an image as a new render target.
    pub fn upload(&mut self, image: &RgbaImage) -> Result<GpuTarget, BackendError> {
        let extent = Extent::new(image.width(), image.height());
        self.check_extent(extent)?;
        let texture = self.context.device.create_texture_with_data(
            &self.context.queue,
            &Self::texture_descriptor(extent),
            TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        Ok(self.wrap(texture, extent))
    }

    /// Reads a target back into memory. Blocks until the GPU is idle.
    pub fn download(&self, target: &GpuTarget) -> Result<RgbaImage, BackendError> {
        let Extent { width, height } = target.extent;
        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;
        let device = &self.context.device;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glass readback"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("glass readback"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| BackendError::Device(err.to_string()))?;
        receiver
            .recv()
            .map_err(|err| BackendError::Device(err.to_string()))?
            .map_err(|err| BackendError::Device(err.to_string()))?;

        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks(padded as usize) {
                pixels.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        buffer.unmap();

        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| BackendError::Device("readback size mismatch".into()))
    }

    fn programs(&self) -> Result<&Programs, BackendError> {
        self.programs.as_ref().ok_or(BackendError::ProgramsUnavailable)
    }

    fn uniform_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.context
            .device
            .create_buffer_init(&BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    /// Scissor for a draw into `dest` limited to `area`, or `None` when the
    /// draw would touch nothing.
    fn clip(&self, dest: Extent, area: PixelBox) -> Option<PixelBox> {
        let region = area.intersect(&PixelBox::from_extent(dest))?;
        match self.scissor {
            Some(scissor) => region.intersect(&scissor),
            None => Some(region),
        }
    }

    /// One full-screen-triangle draw into `dest`.
    fn draw(
        &self,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        dest: &GpuTarget,
        viewport: PixelBox,
        scissor: PixelBox,
        label: &str,
    ) {
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dest.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            pass.set_scissor_rect(
                scissor.x as u32,
                scissor.y as u32,
                scissor.width as u32,
                scissor.height as u32,
            );
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.context.queue.submit(Some(encoder.finish()));
    }

    fn bind_whole(&mut self, target: &GpuTarget) {
        self.binding = Some(Binding {
            target: target.id,
            viewport: PixelBox::from_extent(target.extent),
        });
    }
}

impl GlassBackend for WgpuBackend {
    type Target = GpuTarget;

    fn allocate(&mut self, extent: Extent) -> Result<GpuTarget, BackendError> {
        self.check_extent(extent)?;
        let texture = self
            .context
            .device
            .create_texture(&Self::texture_descriptor(extent));
        Ok(self.wrap(texture, extent))
    }

    fn set_scissor(&mut self, scissor: Option<PixelBox>) {
        self.scissor = scissor;
    }

    fn blit(
        &mut self,
        source: &GpuTarget,
        from: PixelBox,
        dest: &mut GpuTarget,
        to: PixelBox,
    ) -> Result<(), BackendError> {
        // blits do not depend on the glass programs; compile lazily if needed
        if self.programs.is_none() {
            self.prepare_programs()?;
        }
        self.bind_whole(dest);
        let Some((from, to)) = clip_blit(from, to, dest.extent) else {
            return Ok(());
        };
        let Some(scissor) = self.clip(dest.extent, to) else {
            return Ok(());
        };
        let uniforms = BlitUniforms::new(from, source.extent);
        let buffer = self.uniform_buffer("blit uniforms", bytemuck::bytes_of(&uniforms));
        let programs = self.programs()?;
        let bind_group = programs.bind_group(&self.context.device, &buffer, &source.view);
        self.draw(&programs.blit, &bind_group, dest, to, scissor, "glass blit");
        Ok(())
    }

    fn blur_pass(
        &mut self,
        source: &GpuTarget,
        dest: &mut GpuTarget,
        kernel: &BlurKernel,
        direction: BlurDirection,
    ) -> Result<(), BackendError> {
        self.programs()?;
        self.bind_whole(dest);
        let whole = PixelBox::from_extent(dest.extent);
        let Some(scissor) = self.clip(dest.extent, whole) else {
            return Ok(());
        };
        let step = match direction {
            BlurDirection::Horizontal => [1.0, 0.0],
            BlurDirection::Vertical => [0.0, 1.0],
        };
        let uniforms = BlurUniforms::new(kernel, step, source.extent);
        let buffer = self.uniform_buffer("blur uniforms", bytemuck::bytes_of(&uniforms));
        let programs = self.programs()?;
        let bind_group = programs.bind_group(&self.context.device, &buffer, &source.view);
        self.draw(&programs.blur, &bind_group, dest, whole, scissor, "glass blur");
        Ok(())
    }

    fn composite(
        &mut self,
        blurred: &GpuTarget,
        dest: &mut GpuTarget,
        params: &CompositeParams,
    ) -> Result<(), BackendError> {
        let programs = self.programs()?;
        if self.binding.map(|binding| binding.target) != Some(dest.id) {
            return Err(BackendError::NotBound(dest.id));
        }
        let Some(scissor) = self.clip(dest.extent, params.target_box) else {
            return Ok(());
        };
        let uniforms = GlassUniforms::from(params);
        let buffer = self.uniform_buffer("glass uniforms", bytemuck::bytes_of(&uniforms));
        let bind_group = programs.bind_group(&self.context.device, &buffer, &blurred.view);
        let whole = PixelBox::from_extent(dest.extent);
        self.draw(&programs.glass, &bind_group, dest, whole, scissor, "glass composite");
        Ok(())
    }

    fn bind(&mut self, binding: Binding) {
        self.binding = Some(binding);
    }

    fn prepare_programs(&mut self) -> Result<(), BackendError> {
        if self.programs.is_none() {
            let programs = Programs::new(&self.context.device)?;
            tracing::debug!(adapter = %self.context.adapter_name(), "compiled glass programs");
            self.programs = Some(programs);
        }
        Ok(())
    }
}
