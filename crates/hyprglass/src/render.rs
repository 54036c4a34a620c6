use anyhow::{bail, Context, Result};
use glassconfig::ConfigSnapshot;
use glassfx::{
    CpuBackend, EffectOrchestrator, Extent, Frame, GlassBackend, LogicalBox, Monitor,
    RenderOutcome, SurfaceGeometry, SurfaceId, WgpuBackend,
};
use image::RgbaImage;

use crate::cli::RenderArgs;

const PREVIEW_SURFACE: SurfaceId = SurfaceId(1);

/// Composites one glass surface over `--input` and writes `--output`.
pub fn render(snapshot: &ConfigSnapshot, args: &RenderArgs) -> Result<()> {
    let background = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?
        .to_rgba8();
    if background.width() == 0 || background.height() == 0 {
        bail!("{} has zero extent", args.input.display());
    }

    let output = if args.gpu {
        let mut backend = WgpuBackend::headless().context("failed to initialise wgpu")?;
        tracing::info!(adapter = %backend.context().adapter_name(), "rendering with wgpu");
        let mut target = backend.upload(&background)?;
        composite_preview(snapshot, &mut backend, &mut target, background_extent(&background), args)?;
        backend.download(&target)?
    } else {
        let mut backend = CpuBackend::new();
        let mut target = backend.target_from_image(background.clone());
        composite_preview(snapshot, &mut backend, &mut target, background_extent(&background), args)?;
        tracing::debug!(counters = ?backend.counters(), "software render finished");
        target.into_image()
    };

    output
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), "wrote glass preview");
    Ok(())
}

fn background_extent(image: &RgbaImage) -> Extent {
    Extent::new(image.width(), image.height())
}

fn preview_geometry(args: &RenderArgs) -> SurfaceGeometry {
    let mut geometry = SurfaceGeometry::new(LogicalBox::new(
        args.rect.x,
        args.rect.y,
        args.rect.width,
        args.rect.height,
    ));
    geometry.rounding = args.rounding;
    geometry.rounding_power = args.rounding_power;
    geometry.tags = args.tags.clone();
    geometry
}

fn composite_preview<B: GlassBackend>(
    snapshot: &ConfigSnapshot,
    backend: &mut B,
    target: &mut B::Target,
    extent: Extent,
    args: &RenderArgs,
) -> Result<()> {
    let mut monitor = Monitor::new(extent);
    monitor.scale = args.scale;
    let geometry = preview_geometry(args);

    let mut orchestrator = EffectOrchestrator::<B::Target>::with_log_notifier(snapshot.clone());
    orchestrator.surface_opened(PREVIEW_SURFACE);
    let mut damage: Vec<LogicalBox> = Vec::new();
    orchestrator.observe(PREVIEW_SURFACE, &geometry, args.scale, &mut damage);
    tracing::debug!(?damage, "preview damage");

    let mut frame = Frame::new(target, monitor);
    match orchestrator.render_surface(backend, &mut frame, PREVIEW_SURFACE, &geometry, args.alpha) {
        RenderOutcome::Composited { .. } => Ok(()),
        RenderOutcome::Skipped(reason) => bail!("glass draw skipped: {reason:?}"),
    }
}
