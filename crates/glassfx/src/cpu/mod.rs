//! Software backend over `image` buffers.
//!
//! Mirrors the GPU pipeline pixel for pixel closely enough to test capture,
//! blur and composite behaviour without a device, and to render previews on
//! machines without a usable adapter.

mod shade;

use image::{Rgba, RgbaImage};

use crate::backend::{BackendError, Binding, BlurDirection, GlassBackend, RenderTarget, TargetId};
use crate::geometry::{Extent, PixelBox};
use crate::kernel::BlurKernel;
use crate::params::CompositeParams;

#[derive(Debug, Clone)]
pub struct CpuTarget {
    id: TargetId,
    image: RgbaImage,
}

impl CpuTarget {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl RenderTarget for CpuTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    fn extent(&self) -> Extent {
        Extent::new(self.image.width(), self.image.height())
    }
}

/// Operation counts, for tests and `--verbose` summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCounters {
    pub allocations: usize,
    pub blits: usize,
    pub blur_passes: usize,
    pub composites: usize,
    pub program_compiles: usize,
}

#[derive(Debug, Default)]
pub struct CpuBackend {
    next_id: u64,
    scissor: Option<PixelBox>,
    binding: Option<Binding>,
    programs_ready: bool,
    fail_programs: bool,
    counters: CpuCounters,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose program compilation always fails.
    pub fn with_failing_programs() -> Self {
        Self {
            fail_programs: true,
            ..Self::default()
        }
    }

    /// Wraps an existing image as a render target.
    pub fn target_from_image(&mut self, image: RgbaImage) -> CpuTarget {
        CpuTarget {
            id: self.next_target_id(),
            image,
        }
    }

    pub fn counters(&self) -> CpuCounters {
        self.counters
    }

    pub fn binding(&self) -> Option<Binding> {
        self.binding
    }

    pub fn scissor(&self) -> Option<PixelBox> {
        self.scissor
    }

    fn next_target_id(&mut self) -> TargetId {
        self.next_id += 1;
        TargetId(self.next_id)
    }

    fn bind_whole(&mut self, target: &CpuTarget) {
        self.binding = Some(Binding {
            target: target.id,
            viewport: PixelBox::from_extent(target.extent()),
        });
    }

    /// Pixels of `rect` that a draw into `target` may touch.
    fn draw_region(&self, target: &CpuTarget, rect: PixelBox) -> Option<PixelBox> {
        let region = rect.intersect(&PixelBox::from_extent(target.extent()))?;
        match self.scissor {
            Some(scissor) => region.intersect(&scissor),
            None => Some(region),
        }
    }
}

fn texel(image: &RgbaImage, x: i64, y: i64) -> [f32; 4] {
    let x = x.clamp(0, image.width() as i64 - 1) as u32;
    let y = y.clamp(0, image.height() as i64 - 1) as u32;
    image.get_pixel(x, y).0.map(|c| c as f32 / 255.0)
}

/// Bilinear fetch at texel-space coordinates, clamped to the edges.
fn sample_bilinear(image: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let a = texel(image, x0, y0);
    let b = texel(image, x0 + 1, y0);
    let c = texel(image, x0, y0 + 1);
    let d = texel(image, x0 + 1, y0 + 1);
    let mut out = [0.0; 4];
    for i in 0..4 {
        let top = a[i] + (b[i] - a[i]) * tx;
        let bottom = c[i] + (d[i] - c[i]) * tx;
        out[i] = top + (bottom - top) * ty;
    }
    out
}

fn sample_uv(image: &RgbaImage, uv: [f32; 2]) -> [f32; 4] {
    sample_bilinear(
        image,
        uv[0] * image.width() as f32,
        uv[1] * image.height() as f32,
    )
}

fn to_pixel(color: [f32; 4]) -> Rgba<u8> {
    Rgba(color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}

fn blend_over(src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let a = src[3];
    [
        src[0] * a + dst[0] * (1.0 - a),
        src[1] * a + dst[1] * (1.0 - a),
        src[2] * a + dst[2] * (1.0 - a),
        a + dst[3] * (1.0 - a),
    ]
}

fn pixels(region: PixelBox) -> impl Iterator<Item = (i32, i32)> {
    (region.y..region.bottom()).flat_map(move |y| (region.x..region.right()).map(move |x| (x, y)))
}

impl GlassBackend for CpuBackend {
    type Target = CpuTarget;

    fn allocate(&mut self, extent: Extent) -> Result<CpuTarget, BackendError> {
        if extent.is_empty() {
            return Err(BackendError::Allocation {
                width: extent.width,
                height: extent.height,
            });
        }
        self.counters.allocations += 1;
        Ok(CpuTarget {
            id: self.next_target_id(),
            image: RgbaImage::new(extent.width, extent.height),
        })
    }

    fn set_scissor(&mut self, scissor: Option<PixelBox>) {
        self.scissor = scissor;
    }

    fn blit(
        &mut self,
        source: &CpuTarget,
        from: PixelBox,
        dest: &mut CpuTarget,
        to: PixelBox,
    ) -> Result<(), BackendError> {
        if from.is_empty() || to.is_empty() {
            return Err(BackendError::InvalidGeometry(format!(
                "blit from {from:?} to {to:?}"
            )));
        }
        self.counters.blits += 1;
        self.bind_whole(dest);
        let Some(region) = self.draw_region(dest, to) else {
            return Ok(());
        };

        let sx = from.width as f32 / to.width as f32;
        let sy = from.height as f32 / to.height as f32;
        // keep the filter footprint inside the source rectangle
        let clamp_x = |x: f32| x.clamp(from.x as f32 + 0.5, from.right() as f32 - 0.5);
        let clamp_y = |y: f32| y.clamp(from.y as f32 + 0.5, from.bottom() as f32 - 0.5);
        for (x, y) in pixels(region) {
            let u = clamp_x(from.x as f32 + (x - to.x) as f32 * sx + 0.5 * sx);
            let v = clamp_y(from.y as f32 + (y - to.y) as f32 * sy + 0.5 * sy);
            let color = sample_bilinear(&source.image, u, v);
            dest.image.put_pixel(x as u32, y as u32, to_pixel(color));
        }
        Ok(())
    }

    fn blur_pass(
        &mut self,
        source: &CpuTarget,
        dest: &mut CpuTarget,
        kernel: &BlurKernel,
        direction: BlurDirection,
    ) -> Result<(), BackendError> {
        if !self.programs_ready {
            return Err(BackendError::ProgramsUnavailable);
        }
        self.counters.blur_passes += 1;
        self.bind_whole(dest);
        let Some(region) = self.draw_region(dest, PixelBox::from_extent(dest.extent())) else {
            return Ok(());
        };

        let (dx, dy) = match direction {
            BlurDirection::Horizontal => (1.0, 0.0),
            BlurDirection::Vertical => (0.0, 1.0),
        };
        let src = &source.image;
        let (dw, dh) = (dest.image.width() as f32, dest.image.height() as f32);
        let (sw, sh) = (src.width() as f32, src.height() as f32);
        for (x, y) in pixels(region) {
            let cx = (x as f32 + 0.5) / dw * sw;
            let cy = (y as f32 + 0.5) / dh * sh;
            let center = sample_bilinear(src, cx, cy);
            let mut color = center.map(|c| c * kernel.center_weight());
            for tap in kernel.pairs() {
                let ahead = sample_bilinear(src, cx + dx * tap.offset, cy + dy * tap.offset);
                let behind = sample_bilinear(src, cx - dx * tap.offset, cy - dy * tap.offset);
                for i in 0..4 {
                    color[i] += (ahead[i] + behind[i]) * tap.weight;
                }
            }
            dest.image.put_pixel(x as u32, y as u32, to_pixel(color));
        }
        Ok(())
    }

    fn composite(
        &mut self,
        blurred: &CpuTarget,
        dest: &mut CpuTarget,
        params: &CompositeParams,
    ) -> Result<(), BackendError> {
        if !self.programs_ready {
            return Err(BackendError::ProgramsUnavailable);
        }
        if self.binding.map(|b| b.target) != Some(dest.id) {
            return Err(BackendError::NotBound(dest.id));
        }
        self.counters.composites += 1;
        let area = params.target_box;
        let Some(region) = self.draw_region(dest, area) else {
            return Ok(());
        };

        let src = &blurred.image;
        for (x, y) in pixels(region) {
            let uv = [
                (x - area.x) as f32 / area.width as f32 + 0.5 / area.width as f32,
                (y - area.y) as f32 / area.height as f32 + 0.5 / area.height as f32,
            ];
            let Some(color) = shade::shade(params, uv, |tex| sample_uv(src, tex)) else {
                continue;
            };
            let under = dest.image.get_pixel(x as u32, y as u32).0.map(|c| c as f32 / 255.0);
            dest.image
                .put_pixel(x as u32, y as u32, to_pixel(blend_over(color, under)));
        }
        Ok(())
    }

    fn bind(&mut self, binding: Binding) {
        self.binding = Some(binding);
    }

    fn prepare_programs(&mut self) -> Result<(), BackendError> {
        self.counters.program_compiles += 1;
        if self.fail_programs {
            return Err(BackendError::ProgramCompile {
                program: "glass",
                reason: "software backend configured to fail".into(),
            });
        }
        self.programs_ready = true;
        Ok(())
    }
}
