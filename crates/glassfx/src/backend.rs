//! The drawing primitives the effect needs from its host.

use crate::geometry::{Extent, PixelBox};
use crate::kernel::BlurKernel;
use crate::params::CompositeParams;

/// Identity of a render target, stable for the target's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// A render target plus the viewport drawing into it uses.
///
/// Callers remember their own binding and hand it back through
/// [`GlassBackend::bind`]; the effect never queries it from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub target: TargetId,
    pub viewport: PixelBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("cannot allocate a {width}x{height} render target")]
    Allocation { width: u32, height: u32 },
    #[error("failed to compile {program} program: {reason}")]
    ProgramCompile {
        program: &'static str,
        reason: String,
    },
    #[error("glass programs are not available")]
    ProgramsUnavailable,
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("render target {0:?} is not bound")]
    NotBound(TargetId),
    #[error("device error: {0}")]
    Device(String),
}

/// Framebuffer plus the texture backing it.
pub trait RenderTarget {
    fn id(&self) -> TargetId;
    fn extent(&self) -> Extent;
}

/// Host GPU primitives used by capture, blur and composite.
///
/// Draw operations honour the current scissor. `blit` and `blur_pass` leave
/// their destination bound (the blur pass also resets the viewport to the
/// destination); `composite` draws into whatever [`bind`](Self::bind) last
/// selected and fails if that is not `dest`.
pub trait GlassBackend {
    type Target: RenderTarget;

    fn allocate(&mut self, extent: Extent) -> Result<Self::Target, BackendError>;

    /// `None` disables scissoring.
    fn set_scissor(&mut self, scissor: Option<PixelBox>);

    /// Bilinear copy of `from` in `source` onto `to` in `dest`.
    fn blit(
        &mut self,
        source: &Self::Target,
        from: PixelBox,
        dest: &mut Self::Target,
        to: PixelBox,
    ) -> Result<(), BackendError>;

    /// One directional pass of the separable blur over the whole target.
    fn blur_pass(
        &mut self,
        source: &Self::Target,
        dest: &mut Self::Target,
        kernel: &BlurKernel,
        direction: BlurDirection,
    ) -> Result<(), BackendError>;

    /// One draw of the glass program sampling `blurred`.
    fn composite(
        &mut self,
        blurred: &Self::Target,
        dest: &mut Self::Target,
        params: &CompositeParams,
    ) -> Result<(), BackendError>;

    fn bind(&mut self, binding: Binding);

    /// Compiles the blur and glass programs. Called once before the first
    /// draw; an error disables the effect.
    fn prepare_programs(&mut self) -> Result<(), BackendError>;
}

/// Returns `slot`'s target, reallocating it when the size differs.
pub(crate) fn ensure_target<'t, B: GlassBackend>(
    backend: &mut B,
    slot: &'t mut Option<B::Target>,
    extent: Extent,
) -> Result<&'t mut B::Target, BackendError> {
    let reusable = slot
        .as_ref()
        .is_some_and(|target| target.extent() == extent);
    if !reusable {
        tracing::debug!(
            width = extent.width,
            height = extent.height,
            "allocating render target"
        );
        return Ok(slot.insert(backend.allocate(extent)?));
    }
    slot.as_mut().ok_or(BackendError::Allocation {
        width: extent.width,
        height: extent.height,
    })
}

/// Clips a blit so the destination lies inside `dest_extent`, shrinking the
/// source proportionally. Returns `None` when nothing remains.
pub fn clip_blit(from: PixelBox, to: PixelBox, dest_extent: Extent) -> Option<(PixelBox, PixelBox)> {
    if from.is_empty() || to.is_empty() {
        return None;
    }
    let clipped = to.intersect(&PixelBox::from_extent(dest_extent))?;
    if clipped == to {
        return Some((from, to));
    }
    let sx = from.width as f64 / to.width as f64;
    let sy = from.height as f64 / to.height as f64;
    let x0 = from.x as f64 + (clipped.x - to.x) as f64 * sx;
    let y0 = from.y as f64 + (clipped.y - to.y) as f64 * sy;
    let x1 = from.x as f64 + (clipped.right() - to.x) as f64 * sx;
    let y1 = from.y as f64 + (clipped.bottom() - to.y) as f64 * sy;
    let source = PixelBox::new(
        x0.floor() as i32,
        y0.floor() as i32,
        ((x1.ceil() - x0.floor()) as i32).max(1),
        ((y1.ceil() - y0.floor()) as i32).max(1),
    );
    Some((source, clipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_blit_keeps_in_bounds_copies() {
        let from = PixelBox::new(10, 10, 20, 20);
        let to = PixelBox::new(0, 0, 20, 20);
        assert_eq!(clip_blit(from, to, Extent::new(64, 64)), Some((from, to)));
    }

    #[test]
    fn clip_blit_trims_source_with_destination() {
        let from = PixelBox::new(0, 0, 40, 40);
        let to = PixelBox::new(-10, 0, 20, 20);
        let (source, dest) = clip_blit(from, to, Extent::new(64, 64)).expect("overlap");
        assert_eq!(dest, PixelBox::new(0, 0, 10, 20));
        assert_eq!(source, PixelBox::new(20, 0, 20, 40));
    }

    #[test]
    fn clip_blit_drops_disjoint_copies() {
        let from = PixelBox::new(0, 0, 4, 4);
        assert_eq!(
            clip_blit(from, PixelBox::new(100, 100, 4, 4), Extent::new(64, 64)),
            None
        );
    }
}
