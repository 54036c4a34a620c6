//! Boxes, offsets and monitor transforms shared by capture, damage and
//! composite.

use std::ops::{Add, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Size of a render target in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Half size, never below one pixel.
    pub fn half(self) -> Self {
        Self::new((self.width / 2).max(1), (self.height / 2).max(1))
    }
}

/// Rectangle in logical (compositor layout) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn translate(self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Grows the box by `amount` on every side.
    pub fn expand(self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    pub fn round(self) -> PixelBox {
        PixelBox::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.width.round() as i32,
            self.height.round() as i32,
        )
    }
}

/// Rectangle in render-target pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_extent(extent: Extent) -> Self {
        Self::new(0, 0, extent.width as i32, extent.height as i32)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersect(&self, other: &PixelBox) -> Option<PixelBox> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        (x1 > x0 && y1 > y0).then(|| PixelBox::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn expand(self, amount: i32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2 * amount,
            self.height + 2 * amount,
        )
    }

    /// Applies an output transform inside a `width` x `height` space.
    pub fn transform(self, transform: Transform, width: i32, height: i32) -> Self {
        let PixelBox {
            x,
            y,
            width: w,
            height: h,
        } = self;
        let (w_out, h_out) = if transform.swaps_axes() { (h, w) } else { (w, h) };
        let (x_out, y_out) = match transform {
            Transform::Normal => (x, y),
            Transform::Rotated90 => (height - y - h, x),
            Transform::Rotated180 => (width - x - w, height - y - h),
            Transform::Rotated270 => (y, width - x - w),
            Transform::Flipped => (width - x - w, y),
            Transform::Flipped90 => (y, x),
            Transform::Flipped180 => (x, height - y - h),
            Transform::Flipped270 => (height - y - h, width - x - w),
        };
        PixelBox::new(x_out, y_out, w_out, h_out)
    }
}

/// Output transform, numbered like `wl_output.transform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    #[default]
    Normal,
    Rotated90,
    Rotated180,
    Rotated270,
    Flipped,
    Flipped90,
    Flipped180,
    Flipped270,
}

impl Transform {
    pub const ALL: [Transform; 8] = [
        Transform::Normal,
        Transform::Rotated90,
        Transform::Rotated180,
        Transform::Rotated270,
        Transform::Flipped,
        Transform::Flipped90,
        Transform::Flipped180,
        Transform::Flipped270,
    ];

    pub fn from_wl(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn to_wl(self) -> u32 {
        self as u32
    }

    pub fn swaps_axes(self) -> bool {
        self.to_wl() & 1 == 1
    }

    /// Inverse transform. Only the non-flipped quarter turns differ from
    /// themselves.
    pub fn invert(self) -> Self {
        match self {
            Transform::Rotated90 => Transform::Rotated270,
            Transform::Rotated270 => Transform::Rotated90,
            other => other,
        }
    }
}

/// The output a surface is rendered on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    /// Layout position in logical coordinates.
    pub position: Vec2,
    pub scale: f64,
    pub transform: Transform,
    /// Render target size after the transform is applied.
    pub transformed_size: Extent,
}

impl Monitor {
    pub fn new(transformed_size: Extent) -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            transform: Transform::Normal,
            transformed_size,
        }
    }

    pub fn viewport(&self) -> PixelBox {
        PixelBox::from_extent(self.transformed_size)
    }
}

/// What the host reports about a surface each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGeometry {
    /// Main surface box in logical layout coordinates.
    pub bounds: LogicalBox,
    pub workspace_offset: Vec2,
    pub workspace_animating: bool,
    /// Pinned surfaces ignore workspace offsets.
    pub pinned: bool,
    pub floating_offset: Vec2,
    /// Corner radius in logical pixels.
    pub rounding: f32,
    pub rounding_power: f32,
    pub tags: Vec<String>,
}

impl SurfaceGeometry {
    pub fn new(bounds: LogicalBox) -> Self {
        Self {
            bounds,
            workspace_offset: Vec2::ZERO,
            workspace_animating: false,
            pinned: false,
            floating_offset: Vec2::ZERO,
            rounding: 0.0,
            rounding_power: 2.0,
            tags: Vec::new(),
        }
    }

    /// Whether a workspace transition is currently moving this surface.
    pub fn in_transition(&self) -> bool {
        self.workspace_animating && !self.pinned
    }

    /// Surface box in monitor pixels, before the output transform.
    pub fn pixel_box(&self, monitor: &Monitor) -> PixelBox {
        let workspace = if self.pinned {
            Vec2::ZERO
        } else {
            self.workspace_offset
        };
        self.bounds
            .translate(workspace)
            .translate(-monitor.position + self.floating_offset)
            .scale(monitor.scale)
            .round()
    }

    /// Surface box in render-target pixels, after the output transform.
    pub fn target_box(&self, monitor: &Monitor) -> PixelBox {
        self.pixel_box(monitor).transform(
            monitor.transform.invert(),
            monitor.transformed_size.width as i32,
            monitor.transformed_size.height as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_clips_to_overlap() {
        let a = PixelBox::new(0, 0, 100, 100);
        let b = PixelBox::new(80, -10, 50, 50);
        assert_eq!(a.intersect(&b), Some(PixelBox::new(80, 0, 20, 40)));
        assert_eq!(a.intersect(&PixelBox::new(100, 0, 5, 5)), None);
    }

    #[test]
    fn invert_round_trips_every_transform() {
        for transform in Transform::ALL {
            let boxed = PixelBox::new(10, 20, 30, 40);
            let (w, h) = (200, 100);
            let (tw, th) = if transform.swaps_axes() { (h, w) } else { (w, h) };
            let there = boxed.transform(transform, w, h);
            let back = there.transform(transform.invert(), tw, th);
            assert_eq!(back, boxed, "{transform:?}");
        }
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let boxed = PixelBox::new(10, 20, 30, 40).transform(Transform::Rotated90, 200, 100);
        assert_eq!(boxed, PixelBox::new(40, 10, 40, 30));
    }

    #[test]
    fn pixel_box_applies_offsets_and_scale() {
        let mut geometry = SurfaceGeometry::new(LogicalBox::new(1930.0, 10.0, 100.0, 50.0));
        geometry.workspace_offset = Vec2::new(5.0, 0.0);
        geometry.floating_offset = Vec2::new(0.0, 2.5);
        let monitor = Monitor {
            position: Vec2::new(1920.0, 0.0),
            scale: 2.0,
            ..Monitor::new(Extent::new(2560, 1440))
        };
        assert_eq!(geometry.pixel_box(&monitor), PixelBox::new(30, 25, 200, 100));

        geometry.pinned = true;
        assert_eq!(geometry.pixel_box(&monitor), PixelBox::new(20, 25, 200, 100));
    }
}
