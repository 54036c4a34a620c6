//! Frosted-glass rendering for compositor surfaces.
//!
//! The pipeline per surface and frame is: capture the background under the
//! surface (plus a fixed padding) into an offscreen buffer, blur it with a
//! separable Gaussian, then draw the glass program over the surface's box.
//! [`EffectOrchestrator`] decides when the capture can be reused and what
//! the host must redraw. Drawing itself goes through [`GlassBackend`], with
//! a software implementation in [`cpu`] and a wgpu one in [`gpu`].

pub mod backend;
pub mod blur;
pub mod cpu;
pub mod damage;
pub mod geometry;
pub mod gpu;
pub mod kernel;
pub mod notify;
pub mod orchestrator;
pub mod params;
pub mod sampler;

pub use backend::{BackendError, Binding, BlurDirection, GlassBackend, RenderTarget, TargetId};
pub use blur::{blur_capture, BlurOutput, BlurRequest, ScratchArena};
pub use cpu::{CpuBackend, CpuCounters, CpuTarget};
pub use damage::DamageSink;
pub use geometry::{Extent, LogicalBox, Monitor, PixelBox, SurfaceGeometry, Transform, Vec2};
pub use gpu::{GpuContext, GpuTarget, WgpuBackend};
pub use kernel::BlurKernel;
pub use notify::{LogNotifier, Notifier, Severity};
pub use orchestrator::{
    CacheState, EffectOrchestrator, Frame, PassHints, RenderOutcome, SkipReason, SurfaceId,
};
pub use params::CompositeParams;
pub use sampler::{sample_background, CapturePlan, SAMPLE_PADDING_PX};
