//! Ping-pong driver for the separable blur.

use glassconfig::BlurQuality;

use crate::backend::{ensure_target, BackendError, Binding, BlurDirection, GlassBackend, RenderTarget};
use crate::geometry::PixelBox;
use crate::kernel::BlurKernel;

/// Blur radius in pixels per unit of `blur_strength`.
pub const BLUR_RADIUS_SCALE: f32 = 12.0;
pub const MIN_BLUR_ITERATIONS: i64 = 1;
pub const MAX_BLUR_ITERATIONS: i64 = 5;

/// Scratch buffers shared by every surface. Surfaces draw one after another,
/// so one set is enough; each draw borrows it for the length of its blur.
#[derive(Debug)]
pub struct ScratchArena<T> {
    full: Option<T>,
    half: Option<T>,
}

impl<T> Default for ScratchArena<T> {
    fn default() -> Self {
        Self {
            full: None,
            half: None,
        }
    }
}

impl<T> ScratchArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_allocated(&self) -> bool {
        self.full.is_some() || self.half.is_some()
    }

    pub fn release(&mut self) {
        self.full = None;
        self.half = None;
    }
}

/// Which buffer holds the image the composite should sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurOutput {
    /// Nothing ran; the capture is used as is.
    Unblurred,
    /// Full-resolution result, written back into the capture.
    Capture,
    /// Half-resolution result in the surface's half buffer.
    Half,
}

/// Radius and pass count for one blur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurRequest {
    pub radius: f32,
    pub iterations: i64,
    pub quality: BlurQuality,
}

impl BlurRequest {
    /// Converts resolved settings into pixels and clamps the pass count.
    pub fn from_settings(blur_strength: f32, blur_iterations: i64, quality: BlurQuality) -> Self {
        Self {
            radius: blur_strength * BLUR_RADIUS_SCALE,
            iterations: blur_iterations.clamp(MIN_BLUR_ITERATIONS, MAX_BLUR_ITERATIONS),
            quality,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.radius.is_nan() || self.radius <= 0.0 || self.iterations <= 0
    }
}

/// Blurs `capture` in place (full quality) or into `half` (half quality).
///
/// Each iteration is a horizontal pass into scratch and a vertical pass
/// back. Afterwards `restore` is bound again; it is the caller's remembered
/// binding, not something read back from the device.
pub fn blur_capture<B: GlassBackend>(
    backend: &mut B,
    capture: &mut B::Target,
    half: &mut Option<B::Target>,
    scratch: &mut ScratchArena<B::Target>,
    request: BlurRequest,
    restore: Binding,
) -> Result<BlurOutput, BackendError> {
    if request.is_noop() {
        return Ok(BlurOutput::Unblurred);
    }

    let output = match request.quality {
        BlurQuality::Full => {
            let kernel = BlurKernel::new(request.radius);
            let temp = ensure_target(backend, &mut scratch.full, capture.extent())?;
            ping_pong(backend, capture, temp, &kernel, request.iterations)?;
            BlurOutput::Capture
        }
        BlurQuality::Half => {
            let full = capture.extent();
            let half_extent = full.half();
            let downsampled = ensure_target(backend, half, half_extent)?;
            backend.blit(
                capture,
                PixelBox::from_extent(full),
                downsampled,
                PixelBox::from_extent(half_extent),
            )?;
            let kernel = BlurKernel::new(request.radius * 0.5);
            let temp = ensure_target(backend, &mut scratch.half, half_extent)?;
            ping_pong(backend, downsampled, temp, &kernel, request.iterations)?;
            BlurOutput::Half
        }
    };

    backend.bind(restore);
    Ok(output)
}

fn ping_pong<B: GlassBackend>(
    backend: &mut B,
    image: &mut B::Target,
    temp: &mut B::Target,
    kernel: &BlurKernel,
    iterations: i64,
) -> Result<(), BackendError> {
    for _ in 0..iterations {
        backend.blur_pass(image, temp, kernel, BlurDirection::Horizontal)?;
        backend.blur_pass(temp, image, kernel, BlurDirection::Vertical)?;
    }
    Ok(())
}
