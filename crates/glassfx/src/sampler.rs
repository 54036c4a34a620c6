//! Background capture: copies the padded region behind a surface into the
//! surface's private buffer.

use crate::backend::{ensure_target, BackendError, GlassBackend, RenderTarget};
use crate::geometry::{Extent, PixelBox};

/// Extra pixels captured on every side so blur and refraction can reach
/// past the surface edge.
pub const SAMPLE_PADDING_PX: i32 = 60;

/// Where a capture reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturePlan {
    /// Size of the capture buffer: the rectangle plus padding.
    pub padded: Extent,
    /// Source region after clamping to the source buffer.
    pub source: PixelBox,
    /// Destination region, shifted by whatever the clamp removed.
    pub dest: PixelBox,
    /// Padding as a fraction of the padded size, per axis.
    pub padding_ratio: [f32; 2],
}

impl CapturePlan {
    /// Plans a capture of `rect` (plus padding) out of a `source` sized
    /// buffer. Fails for empty rectangles.
    pub fn new(rect: PixelBox, source: Extent) -> Result<Self, BackendError> {
        if rect.is_empty() {
            return Err(BackendError::InvalidGeometry(format!(
                "cannot capture an empty {}x{} rectangle",
                rect.width, rect.height
            )));
        }
        let pad = SAMPLE_PADDING_PX;
        let padded_width = rect.width + 2 * pad;
        let padded_height = rect.height + 2 * pad;

        let mut src_x0 = rect.x - pad;
        let mut src_y0 = rect.y - pad;
        let mut src_x1 = rect.right() + pad;
        let mut src_y1 = rect.bottom() + pad;
        let (mut dst_x0, mut dst_y0, mut dst_x1, mut dst_y1) = (0, 0, padded_width, padded_height);

        let source_width = source.width as i32;
        let source_height = source.height as i32;
        if src_x0 < 0 {
            dst_x0 -= src_x0;
            src_x0 = 0;
        }
        if src_y0 < 0 {
            dst_y0 -= src_y0;
            src_y0 = 0;
        }
        if src_x1 > source_width {
            dst_x1 -= src_x1 - source_width;
            src_x1 = source_width;
        }
        if src_y1 > source_height {
            dst_y1 -= src_y1 - source_height;
            src_y1 = source_height;
        }

        Ok(Self {
            padded: Extent::new(padded_width as u32, padded_height as u32),
            source: PixelBox::new(src_x0, src_y0, src_x1 - src_x0, src_y1 - src_y0),
            dest: PixelBox::new(dst_x0, dst_y0, dst_x1 - dst_x0, dst_y1 - dst_y0),
            padding_ratio: [
                pad as f32 / padded_width as f32,
                pad as f32 / padded_height as f32,
            ],
        })
    }

    /// False when the rectangle lies entirely outside the source.
    pub fn has_overlap(&self) -> bool {
        !self.source.is_empty() && !self.dest.is_empty()
    }
}

/// Captures `rect` from `source` into `capture`, reallocating it on size
/// change, and returns the plan used.
///
/// Scissoring is disabled first; a scissor left over from the caller's pass
/// would clip the copy and leave stale pixels behind. Padding the clamp cut
/// off keeps whatever the buffer held before.
pub fn sample_background<B: GlassBackend>(
    backend: &mut B,
    source: &B::Target,
    rect: PixelBox,
    capture: &mut Option<B::Target>,
) -> Result<CapturePlan, BackendError> {
    let plan = CapturePlan::new(rect, source.extent())?;
    let target = ensure_target(backend, capture, plan.padded)?;

    backend.set_scissor(None);
    if plan.has_overlap() {
        backend.blit(source, plan.source, target, plan.dest)?;
    } else {
        tracing::debug!(?rect, "capture rectangle is outside the source");
    }
    Ok(plan)
}
