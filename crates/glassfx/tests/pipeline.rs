use glassconfig::{BlurQuality, ConfigSnapshot};
use glassfx::{
    blur_capture, sample_background, Binding, BlurKernel, BlurOutput, BlurRequest, CpuBackend,
    CpuTarget, EffectOrchestrator, Extent, Frame, GlassBackend, LogicalBox, Monitor, PixelBox,
    RenderOutcome, RenderTarget, ScratchArena, SurfaceGeometry, SurfaceId, TargetId,
};
use image::{Rgba, RgbaImage};

fn checkerboard(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgba([230, 230, 230, 255])
        } else {
            Rgba([20, 40, 60, 255])
        }
    })
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn capture_of(backend: &mut CpuBackend, source: &CpuTarget, rect: PixelBox) -> CpuTarget {
    let mut slot = None;
    sample_background(backend, source, rect, &mut slot).expect("capture");
    slot.expect("capture buffer")
}

#[test]
fn capture_clamped_at_the_edge_copies_source_pixels_exactly() {
    let mut backend = CpuBackend::new();
    let source = backend.target_from_image(gradient(100, 80));
    let rect = PixelBox::new(-20, 10, 40, 30);

    let mut slot = None;
    let plan = sample_background(&mut backend, &source, rect, &mut slot).expect("capture");
    let capture = slot.expect("capture buffer");

    assert_eq!(capture.extent(), Extent::new(160, 150));
    assert_eq!(plan.dest.x, 80);
    for y in 0..plan.dest.height {
        for x in 0..plan.dest.width {
            let got = capture
                .image()
                .get_pixel((plan.dest.x + x) as u32, (plan.dest.y + y) as u32);
            let want = source
                .image()
                .get_pixel((plan.source.x + x) as u32, (plan.source.y + y) as u32);
            assert_eq!(got, want, "at {x},{y}");
        }
    }
    // the clamped-off strip is never written
    assert_eq!(capture.image().get_pixel(0, 75).0, [0; 4]);
}

#[test]
fn capture_ignores_the_callers_scissor() {
    let mut backend = CpuBackend::new();
    let source = backend.target_from_image(gradient(200, 200));
    backend.set_scissor(Some(PixelBox::new(0, 0, 2, 2)));

    let capture = capture_of(&mut backend, &source, PixelBox::new(70, 70, 20, 20));

    assert_eq!(backend.scissor(), None);
    assert_eq!(capture.image().get_pixel(130, 130), source.image().get_pixel(140, 140));
}

#[test]
fn kernels_are_normalised_across_radii() {
    for radius in [0.5, 1.0, 2.5, 6.0, 12.0, 24.0, 60.0] {
        let kernel = BlurKernel::new(radius);
        assert!(
            (kernel.total_weight() - 1.0).abs() < 1e-5,
            "radius {radius}: {}",
            kernel.total_weight()
        );
    }
}

#[test]
fn zero_radius_leaves_the_capture_untouched() {
    let mut backend = CpuBackend::new();
    backend.prepare_programs().expect("programs");
    let source = backend.target_from_image(checkerboard(64, 64));
    let mut capture = capture_of(&mut backend, &source, PixelBox::new(10, 10, 20, 20));
    let before = capture.image().clone();

    let restore = Binding {
        target: source.id(),
        viewport: PixelBox::new(0, 0, 64, 64),
    };
    let request = BlurRequest::from_settings(0.0, 3, BlurQuality::Full);
    let output = blur_capture(
        &mut backend,
        &mut capture,
        &mut None,
        &mut ScratchArena::new(),
        request,
        restore,
    )
    .expect("blur");

    assert_eq!(output, BlurOutput::Unblurred);
    assert_eq!(capture.image(), &before);
    assert_eq!(backend.counters().blur_passes, 0);
}

#[test]
fn full_blur_ping_pongs_and_restores_the_binding() {
    let mut backend = CpuBackend::new();
    backend.prepare_programs().expect("programs");
    let source = backend.target_from_image(checkerboard(64, 64));
    let mut capture = capture_of(&mut backend, &source, PixelBox::new(0, 0, 64, 64));
    let before = capture.image().clone();

    let restore = Binding {
        target: TargetId(999),
        viewport: PixelBox::new(5, 5, 10, 10),
    };
    let mut scratch = ScratchArena::new();
    let request = BlurRequest::from_settings(1.0, 2, BlurQuality::Full);
    let output = blur_capture(&mut backend, &mut capture, &mut None, &mut scratch, request, restore)
        .expect("blur");

    assert_eq!(output, BlurOutput::Capture);
    assert_eq!(backend.counters().blur_passes, 4);
    assert_eq!(backend.binding(), Some(restore));
    assert!(scratch.is_allocated());
    assert_ne!(capture.image(), &before);
}

#[test]
fn half_quality_blurs_a_downsampled_copy() {
    let mut backend = CpuBackend::new();
    backend.prepare_programs().expect("programs");
    let source = backend.target_from_image(checkerboard(64, 64));
    let mut capture = capture_of(&mut backend, &source, PixelBox::new(0, 0, 31, 20));
    let mut half = None;

    let request = BlurRequest::from_settings(1.0, 1, BlurQuality::Half);
    let restore = Binding {
        target: source.id(),
        viewport: PixelBox::new(0, 0, 64, 64),
    };
    let output = blur_capture(
        &mut backend,
        &mut capture,
        &mut half,
        &mut ScratchArena::new(),
        request,
        restore,
    )
    .expect("blur");

    assert_eq!(output, BlurOutput::Half);
    let half = half.expect("half buffer");
    assert_eq!(half.extent(), capture.extent().half());
    assert_eq!(half.extent(), Extent::new(75, 70));
}

#[test]
fn orchestrated_draw_only_touches_the_surface_box() {
    let mut backend = CpuBackend::new();
    let background = checkerboard(240, 180);
    let mut target = backend.target_from_image(background.clone());
    let monitor = Monitor::new(Extent::new(240, 180));
    let mut orchestrator = EffectOrchestrator::<CpuTarget>::with_log_notifier(ConfigSnapshot::builtin());

    let id = SurfaceId(1);
    orchestrator.surface_opened(id);
    let mut geometry = SurfaceGeometry::new(LogicalBox::new(60.0, 40.0, 100.0, 80.0));
    geometry.rounding = 12.0;
    let mut damage: Vec<LogicalBox> = Vec::new();
    assert!(orchestrator.observe(id, &geometry, 1.0, &mut damage));

    let host_scissor = Some(PixelBox::new(0, 0, 240, 180));
    let mut frame = Frame::new(&mut target, monitor).with_scissor(host_scissor);
    let binding = frame.binding;
    let outcome = orchestrator.render_surface(&mut backend, &mut frame, id, &geometry, 1.0);

    assert_eq!(outcome, RenderOutcome::Composited { resampled: true });
    assert_eq!(backend.scissor(), host_scissor);
    assert_eq!(backend.binding(), Some(binding));

    let area = PixelBox::new(60, 40, 100, 80);
    let mut changed = 0;
    for (x, y, pixel) in target.image().enumerate_pixels() {
        let original = background.get_pixel(x, y);
        if area.contains(x as i32, y as i32) {
            changed += usize::from(pixel != original);
        } else {
            assert_eq!(pixel, original, "outside pixel {x},{y} changed");
        }
    }
    assert!(changed > 0);
    // rounded corner stays clear
    assert_eq!(target.image().get_pixel(60, 40), background.get_pixel(60, 40));
}
