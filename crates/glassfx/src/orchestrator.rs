//! Per-surface cache state and the per-frame draw entry point.
//!
//! A surface is `Dirty` on its first frame, after it moves or resizes, and
//! while a workspace transition is moving it. Dirty surfaces are captured
//! and blurred again; clean ones only pay for the composite, reusing the
//! blurred buffer from an earlier frame.

use std::collections::HashMap;

use glassconfig::{
    select_preset, select_theme, ConfigSnapshot, FloatField, IntField, ReloadReport,
    ResolveContext,
};

use crate::backend::{BackendError, Binding, GlassBackend, RenderTarget};
use crate::blur::{blur_capture, BlurOutput, BlurRequest, ScratchArena};
use crate::damage::{self, DamageSink};
use crate::geometry::{LogicalBox, Monitor, PixelBox, SurfaceGeometry, Vec2};
use crate::notify::{LogNotifier, Notifier, Severity};
use crate::params::{CompositeParams, SurfaceInputs};
use crate::sampler::sample_background;

/// Host-assigned surface identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Clean,
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    ProgramsUnavailable,
    UnknownSurface,
    EmptyGeometry,
    BackendFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Composited { resampled: bool },
    Skipped(SkipReason),
}

/// Render-pass hints the host asks for each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassHints {
    pub needs_live_blur: bool,
    pub disable_simplification: bool,
}

/// The frame being drawn: its target and the state the caller expects back.
pub struct Frame<'a, T> {
    pub target: &'a mut T,
    /// The caller's own binding, restored after offscreen work.
    pub binding: Binding,
    /// Scissor active in the caller's pass, restored after the draw.
    pub scissor: Option<PixelBox>,
    pub monitor: Monitor,
}

impl<'a, T: RenderTarget> Frame<'a, T> {
    pub fn new(target: &'a mut T, monitor: Monitor) -> Self {
        let binding = Binding {
            target: target.id(),
            viewport: monitor.viewport(),
        };
        Self {
            target,
            binding,
            scissor: None,
            monitor,
        }
    }

    pub fn with_scissor(mut self, scissor: Option<PixelBox>) -> Self {
        self.scissor = scissor;
        self
    }
}

#[derive(Debug)]
struct SurfaceState<T> {
    cache: CacheState,
    capture: Option<T>,
    half: Option<T>,
    output: BlurOutput,
    padding_ratio: [f32; 2],
    last_position: Option<Vec2>,
    last_size: Option<Vec2>,
}

impl<T> SurfaceState<T> {
    fn new() -> Self {
        Self {
            cache: CacheState::Dirty,
            capture: None,
            half: None,
            output: BlurOutput::Unblurred,
            padding_ratio: [0.0; 2],
            last_position: None,
            last_size: None,
        }
    }

    fn sampled(&self) -> Option<&T> {
        match self.output {
            BlurOutput::Half => self.half.as_ref(),
            BlurOutput::Capture | BlurOutput::Unblurred => self.capture.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Programs {
    Pending,
    Ready,
    Failed,
}

pub struct EffectOrchestrator<T> {
    config: ConfigSnapshot,
    surfaces: HashMap<SurfaceId, SurfaceState<T>>,
    scratch: ScratchArena<T>,
    programs: Programs,
    notifier: Box<dyn Notifier>,
}

impl<T: RenderTarget> EffectOrchestrator<T> {
    pub fn new(config: ConfigSnapshot, notifier: Box<dyn Notifier>) -> Self {
        Self {
            config,
            surfaces: HashMap::new(),
            scratch: ScratchArena::new(),
            programs: Programs::Pending,
            notifier,
        }
    }

    pub fn with_log_notifier(config: ConfigSnapshot) -> Self {
        Self::new(config, Box::new(LogNotifier))
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn surface_opened(&mut self, id: SurfaceId) {
        self.surfaces.entry(id).or_insert_with(|| {
            tracing::debug!(surface = id.0, "tracking glass surface");
            SurfaceState::new()
        });
    }

    pub fn surface_closed(&mut self, id: SurfaceId) {
        if self.surfaces.remove(&id).is_some() {
            tracing::debug!(surface = id.0, "dropped glass surface");
        }
        if self.surfaces.is_empty() {
            self.scratch.release();
        }
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn cache_state(&self, id: SurfaceId) -> Option<CacheState> {
        self.surfaces.get(&id).map(|state| state.cache)
    }

    /// Per-frame bookkeeping before the draw is queued.
    ///
    /// Marks the surface dirty on its first frame, on a position or size
    /// change, or during a workspace transition, and damages its padded
    /// box. Returns whether the next draw will recapture.
    pub fn observe(
        &mut self,
        id: SurfaceId,
        geometry: &SurfaceGeometry,
        monitor_scale: f64,
        damage: &mut dyn DamageSink,
    ) -> bool {
        if !self.config.settings.enabled {
            return false;
        }
        let Some(state) = self.surfaces.get_mut(&id) else {
            return false;
        };

        let position = geometry.bounds.position();
        let size = geometry.bounds.size();
        let moved = state.last_position != Some(position) || state.last_size != Some(size);
        if moved {
            state.last_position = Some(position);
            state.last_size = Some(size);
        }
        if moved || geometry.in_transition() {
            state.cache = CacheState::Dirty;
            damage.damage(damage::damage_box(geometry, monitor_scale));
        }
        state.cache == CacheState::Dirty
    }

    /// Forces a recapture, e.g. after the host reports a surface update.
    pub fn invalidate(
        &mut self,
        id: SurfaceId,
        geometry: &SurfaceGeometry,
        monitor_scale: f64,
        damage: &mut dyn DamageSink,
    ) {
        if let Some(state) = self.surfaces.get_mut(&id) {
            if state.cache == CacheState::Clean {
                state.cache = CacheState::Dirty;
                damage.damage(damage::damage_box(geometry, monitor_scale));
            }
        }
    }

    pub fn needs_recapture(&self, id: SurfaceId) -> bool {
        self.cache_state(id) == Some(CacheState::Dirty)
    }

    pub fn pass_hints(&self, id: SurfaceId) -> PassHints {
        let live = self.needs_recapture(id);
        PassHints {
            needs_live_blur: live,
            disable_simplification: live,
        }
    }

    pub fn damage_box(&self, geometry: &SurfaceGeometry, monitor_scale: f64) -> LogicalBox {
        damage::damage_box(geometry, monitor_scale)
    }

    pub fn pass_bounding_box(&self, geometry: &SurfaceGeometry, monitor: &Monitor) -> LogicalBox {
        damage::pass_bounding_box(geometry, monitor)
    }

    /// Applies a committed configuration. Call between frames.
    pub fn reload(&mut self, report: &ReloadReport) {
        self.config = report.snapshot.clone();
        for (descriptor, err) in &report.rejected {
            self.notifier.notify(
                Severity::Warning,
                &format!("hyprglass: ignored preset '{descriptor}': {err}"),
            );
        }
        for warning in &report.warnings {
            self.notifier
                .notify(Severity::Warning, &format!("hyprglass: {warning}"));
        }
        for state in self.surfaces.values_mut() {
            state.cache = CacheState::Dirty;
        }
        if self.programs == Programs::Failed {
            self.programs = Programs::Pending;
        }
    }

    /// Draws the glass effect for one surface into `frame`.
    ///
    /// Never fails: problems are logged and the surface is skipped for this
    /// frame.
    pub fn render_surface<B>(
        &mut self,
        backend: &mut B,
        frame: &mut Frame<'_, T>,
        id: SurfaceId,
        geometry: &SurfaceGeometry,
        alpha: f32,
    ) -> RenderOutcome
    where
        B: GlassBackend<Target = T>,
    {
        if !self.config.settings.enabled {
            return RenderOutcome::Skipped(SkipReason::Disabled);
        }
        if !self.ensure_programs(backend) {
            return RenderOutcome::Skipped(SkipReason::ProgramsUnavailable);
        }
        let Some(state) = self.surfaces.get_mut(&id) else {
            return RenderOutcome::Skipped(SkipReason::UnknownSurface);
        };
        let target_box = geometry.target_box(&frame.monitor);
        if target_box.is_empty() {
            return RenderOutcome::Skipped(SkipReason::EmptyGeometry);
        }

        let settings = &self.config.settings;
        let theme = select_theme(geometry.tags.as_slice(), settings.theme());
        let preset = select_preset(geometry.tags.as_slice(), settings.preset());
        let ctx = ResolveContext::new(preset, theme, &settings.tiers, &self.config.presets);

        let resampled = state.cache == CacheState::Dirty || state.capture.is_none();
        if resampled {
            let request = BlurRequest::from_settings(
                ctx.float(FloatField::BlurStrength),
                ctx.int(IntField::BlurIterations),
                settings.blur_quality,
            );
            if let Err(err) = resample(backend, frame, state, &mut self.scratch, target_box, request)
            {
                tracing::warn!(surface = id.0, error = %err, "glass capture failed");
                backend.bind(frame.binding);
                backend.set_scissor(frame.scissor);
                return RenderOutcome::Skipped(SkipReason::BackendFailure);
            }
            tracing::trace!(surface = id.0, ?target_box, "resampled glass background");
        }
        state.cache = CacheState::Clean;

        let Some(sampled) = state.sampled() else {
            return RenderOutcome::Skipped(SkipReason::BackendFailure);
        };
        let params = CompositeParams::resolve(
            &ctx,
            &SurfaceInputs {
                target_box,
                uv_padding: state.padding_ratio,
                alpha,
                rounding: geometry.rounding,
                rounding_power: geometry.rounding_power,
                monitor_scale: frame.monitor.scale as f32,
            },
        );

        backend.bind(frame.binding);
        backend.set_scissor(Some(target_box));
        let drawn = backend.composite(sampled, &mut *frame.target, &params);
        backend.set_scissor(frame.scissor);

        match drawn {
            Ok(()) => RenderOutcome::Composited { resampled },
            Err(err) => {
                tracing::warn!(surface = id.0, error = %err, "glass composite failed");
                RenderOutcome::Skipped(SkipReason::BackendFailure)
            }
        }
    }

    fn ensure_programs<B: GlassBackend>(&mut self, backend: &mut B) -> bool {
        match self.programs {
            Programs::Ready => true,
            Programs::Failed => false,
            Programs::Pending => match backend.prepare_programs() {
                Ok(()) => {
                    tracing::debug!("glass programs ready");
                    self.programs = Programs::Ready;
                    true
                }
                Err(err) => {
                    tracing::error!(error = %err, "disabling glass effect");
                    self.notifier.notify(
                        Severity::Error,
                        &format!("hyprglass: effect disabled: {err}"),
                    );
                    self.programs = Programs::Failed;
                    false
                }
            },
        }
    }
}

fn resample<B: GlassBackend>(
    backend: &mut B,
    frame: &Frame<'_, B::Target>,
    state: &mut SurfaceState<B::Target>,
    scratch: &mut ScratchArena<B::Target>,
    target_box: PixelBox,
    request: BlurRequest,
) -> Result<(), BackendError> {
    let plan = sample_background(backend, &*frame.target, target_box, &mut state.capture)?;
    state.padding_ratio = plan.padding_ratio;
    let capture = state
        .capture
        .as_mut()
        .ok_or_else(|| BackendError::InvalidGeometry("capture buffer missing".into()))?;
    state.output = blur_capture(
        backend,
        capture,
        &mut state.half,
        scratch,
        request,
        frame.binding,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glassconfig::{reload, GlassSettings, PresetRegistry};

    use super::*;
    use crate::cpu::{CpuBackend, CpuTarget};
    use crate::geometry::Extent;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Notifier for Recorder {
        fn notify(&mut self, _severity: Severity, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    fn geometry() -> SurfaceGeometry {
        SurfaceGeometry::new(LogicalBox::new(40.0, 30.0, 64.0, 48.0))
    }

    fn setup() -> (EffectOrchestrator<CpuTarget>, CpuBackend, CpuTarget, Recorder) {
        let recorder = Recorder::default();
        let orchestrator =
            EffectOrchestrator::new(ConfigSnapshot::builtin(), Box::new(recorder.clone()));
        let mut backend = CpuBackend::new();
        let frame = backend
            .allocate(Extent::new(200, 160))
            .expect("allocate frame");
        (orchestrator, backend, frame, recorder)
    }

    #[test]
    fn first_frame_is_dirty_and_damaged() {
        let (mut orchestrator, _, _, _) = setup();
        let id = SurfaceId(1);
        orchestrator.surface_opened(id);
        let mut damage = Vec::new();
        assert!(orchestrator.observe(id, &geometry(), 1.0, &mut damage));
        assert_eq!(damage, vec![LogicalBox::new(-20.0, -30.0, 184.0, 168.0)]);
        assert_eq!(
            orchestrator.pass_hints(id),
            PassHints {
                needs_live_blur: true,
                disable_simplification: true
            }
        );
    }

    #[test]
    fn unchanged_surface_stays_clean() {
        let (mut orchestrator, mut backend, mut target, _) = setup();
        let id = SurfaceId(7);
        orchestrator.surface_opened(id);
        let monitor = Monitor::new(Extent::new(200, 160));
        let mut damage = Vec::new();

        orchestrator.observe(id, &geometry(), 1.0, &mut damage);
        let mut frame = Frame::new(&mut target, monitor);
        let first = orchestrator.render_surface(&mut backend, &mut frame, id, &geometry(), 1.0);
        assert_eq!(first, RenderOutcome::Composited { resampled: true });
        let blits = backend.counters().blits;

        damage.clear();
        assert!(!orchestrator.observe(id, &geometry(), 1.0, &mut damage));
        assert!(damage.is_empty());
        let mut frame = Frame::new(&mut target, monitor);
        let second = orchestrator.render_surface(&mut backend, &mut frame, id, &geometry(), 1.0);
        assert_eq!(second, RenderOutcome::Composited { resampled: false });
        assert_eq!(backend.counters().blits, blits);
    }

    #[test]
    fn workspace_transition_keeps_surface_dirty() {
        let (mut orchestrator, _, _, _) = setup();
        let id = SurfaceId(2);
        orchestrator.surface_opened(id);
        let mut damage = Vec::new();
        let mut moving = geometry();
        moving.workspace_animating = true;
        orchestrator.observe(id, &moving, 1.0, &mut damage);
        assert!(orchestrator.observe(id, &moving, 1.0, &mut damage));
        assert_eq!(damage.len(), 2);

        moving.pinned = true;
        damage.clear();
        orchestrator.observe(id, &moving, 1.0, &mut damage);
        assert!(damage.is_empty());
    }

    #[test]
    fn program_failure_disables_and_notifies_once() {
        let (mut orchestrator, _, _, recorder) = setup();
        let mut backend = CpuBackend::with_failing_programs();
        let mut target = backend.allocate(Extent::new(64, 64)).expect("allocate");
        let id = SurfaceId(3);
        orchestrator.surface_opened(id);
        let monitor = Monitor::new(Extent::new(64, 64));

        for _ in 0..3 {
            let mut frame = Frame::new(&mut target, monitor);
            let outcome = orchestrator.render_surface(&mut backend, &mut frame, id, &geometry(), 1.0);
            assert_eq!(
                outcome,
                RenderOutcome::Skipped(SkipReason::ProgramsUnavailable)
            );
        }
        assert_eq!(recorder.0.borrow().len(), 1);
        assert_eq!(backend.counters().program_compiles, 1);
    }

    #[test]
    fn reload_marks_everything_dirty_and_forwards_warnings() {
        let (mut orchestrator, mut backend, mut target, recorder) = setup();
        let id = SurfaceId(4);
        orchestrator.surface_opened(id);
        let monitor = Monitor::new(Extent::new(200, 160));
        let mut frame = Frame::new(&mut target, monitor);
        orchestrator.render_surface(&mut backend, &mut frame, id, &geometry(), 1.0);
        assert_eq!(orchestrator.cache_state(id), Some(CacheState::Clean));

        let settings = GlassSettings {
            default_preset: "missing".into(),
            presets: vec!["name:bad, sparkle:1".into()],
            ..GlassSettings::default()
        };
        let report = reload(settings, &mut PresetRegistry::new());
        orchestrator.reload(&report);

        assert!(orchestrator.needs_recapture(id));
        assert_eq!(recorder.0.borrow().len(), 2);
    }

    #[test]
    fn disabled_effect_skips_everything() {
        let (_, mut backend, mut target, _) = setup();
        let config = ConfigSnapshot {
            settings: std::sync::Arc::new(GlassSettings {
                enabled: false,
                ..GlassSettings::default()
            }),
            ..ConfigSnapshot::builtin()
        };
        let mut orchestrator = EffectOrchestrator::with_log_notifier(config);
        let id = SurfaceId(5);
        orchestrator.surface_opened(id);
        let mut damage = Vec::new();
        assert!(!orchestrator.observe(id, &geometry(), 1.0, &mut damage));
        let mut frame = Frame::new(&mut target, Monitor::new(Extent::new(200, 160)));
        assert_eq!(
            orchestrator.render_surface(&mut backend, &mut frame, id, &geometry(), 1.0),
            RenderOutcome::Skipped(SkipReason::Disabled)
        );
        assert_eq!(backend.counters().blits, 0);
    }

    #[test]
    fn closing_the_last_surface_releases_scratch() {
        let (mut orchestrator, mut backend, mut target, _) = setup();
        let id = SurfaceId(6);
        orchestrator.surface_opened(id);
        let mut frame = Frame::new(&mut target, Monitor::new(Extent::new(200, 160)));
        orchestrator.render_surface(&mut backend, &mut frame, id, &geometry(), 1.0);
        assert!(orchestrator.scratch.is_allocated());

        orchestrator.surface_closed(id);
        assert_eq!(orchestrator.surface_count(), 0);
        assert!(!orchestrator.scratch.is_allocated());
        let mut frame = Frame::new(&mut target, Monitor::new(Extent::new(200, 160)));
        assert_eq!(
            orchestrator.render_surface(&mut backend, &mut frame, id, &geometry(), 1.0),
            RenderOutcome::Skipped(SkipReason::UnknownSurface)
        );
    }
}
