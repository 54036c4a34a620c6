//! Screen regions the host must redraw for a glass surface.

use crate::geometry::{LogicalBox, Monitor, SurfaceGeometry};
use crate::sampler::SAMPLE_PADDING_PX;

/// Receives regions to redraw, in logical layout coordinates.
pub trait DamageSink {
    fn damage(&mut self, region: LogicalBox);
}

impl DamageSink for Vec<LogicalBox> {
    fn damage(&mut self, region: LogicalBox) {
        self.push(region);
    }
}

fn padding_for(scale: f64) -> f64 {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    SAMPLE_PADDING_PX as f64 / scale
}

/// Whole-surface damage including the capture padding. The workspace
/// offset only counts while a transition is moving the surface.
pub fn damage_box(geometry: &SurfaceGeometry, monitor_scale: f64) -> LogicalBox {
    let mut region = geometry.bounds;
    if geometry.in_transition() {
        region = region.translate(geometry.workspace_offset);
    }
    region
        .translate(geometry.floating_offset)
        .expand(padding_for(monitor_scale))
}

/// Bounding box of the glass draw as the host's render pass sees it: the
/// surface's monitor box grown by the capture padding.
pub fn pass_bounding_box(geometry: &SurfaceGeometry, monitor: &Monitor) -> LogicalBox {
    let pixels = geometry.pixel_box(monitor);
    LogicalBox::new(
        pixels.x as f64,
        pixels.y as f64,
        pixels.width as f64,
        pixels.height as f64,
    )
    .expand(padding_for(monitor.scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Extent, Vec2};

    fn geometry() -> SurfaceGeometry {
        let mut geometry = SurfaceGeometry::new(LogicalBox::new(100.0, 100.0, 200.0, 150.0));
        geometry.workspace_offset = Vec2::new(50.0, 0.0);
        geometry.floating_offset = Vec2::new(0.0, 10.0);
        geometry
    }

    #[test]
    fn static_surface_damage_is_padded_in_logical_units() {
        let region = damage_box(&geometry(), 2.0);
        assert_eq!(region, LogicalBox::new(70.0, 80.0, 260.0, 210.0));
    }

    #[test]
    fn animating_workspace_offset_is_included_unless_pinned() {
        let mut moving = geometry();
        moving.workspace_animating = true;
        assert_eq!(damage_box(&moving, 1.0).x, 100.0 + 50.0 - 60.0);

        moving.pinned = true;
        assert_eq!(damage_box(&moving, 1.0).x, 100.0 - 60.0);
    }

    #[test]
    fn bad_scale_falls_back_to_one() {
        assert_eq!(damage_box(&geometry(), 0.0), damage_box(&geometry(), 1.0));
    }

    #[test]
    fn pass_box_uses_monitor_pixels() {
        let monitor = Monitor::new(Extent::new(1920, 1080));
        let region = pass_bounding_box(&geometry(), &monitor);
        assert_eq!(region, LogicalBox::new(90.0, 50.0, 320.0, 270.0));
    }
}
