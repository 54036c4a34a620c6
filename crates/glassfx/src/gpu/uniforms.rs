use bytemuck::{Pod, Zeroable};

use crate::geometry::{Extent, PixelBox};
use crate::kernel::{BlurKernel, MAX_KERNEL_PAIRS};
use crate::params::CompositeParams;

/// Source rectangle of a blit, normalised to the source texture.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct BlitUniforms {
    /// xy origin, zw size.
    pub src_rect: [f32; 4],
    /// Sample coordinates are clamped into this min/max box so the filter
    /// never reads outside the source rectangle.
    pub clamp_rect: [f32; 4],
}

impl BlitUniforms {
    pub fn new(from: PixelBox, source: Extent) -> Self {
        let w = source.width as f32;
        let h = source.height as f32;
        Self {
            src_rect: [
                from.x as f32 / w,
                from.y as f32 / h,
                from.width as f32 / w,
                from.height as f32 / h,
            ],
            clamp_rect: [
                (from.x as f32 + 0.5) / w,
                (from.y as f32 + 0.5) / h,
                (from.right() as f32 - 0.5) / w,
                (from.bottom() as f32 - 0.5) / h,
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct BlurUniforms {
    /// xy: one texel along the pass direction in UV, z: centre weight,
    /// w: number of sample pairs.
    pub step: [f32; 4],
    pub offsets: [f32; MAX_KERNEL_PAIRS],
    pub weights: [f32; MAX_KERNEL_PAIRS],
}

impl BlurUniforms {
    pub fn new(kernel: &BlurKernel, direction: [f32; 2], source: Extent) -> Self {
        let mut offsets = [0.0; MAX_KERNEL_PAIRS];
        let mut weights = [0.0; MAX_KERNEL_PAIRS];
        for (slot, tap) in kernel.pairs().iter().enumerate() {
            offsets[slot] = tap.offset;
            weights[slot] = tap.weight;
        }
        Self {
            step: [
                direction[0] / source.width as f32,
                direction[1] / source.height as f32,
                kernel.center_weight(),
                kernel.pairs().len() as f32,
            ],
            offsets,
            weights,
        }
    }
}

/// Layout shared with the `Glass` block in the glass program.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct GlassUniforms {
    pub area: [f32; 4],
    pub shape: [f32; 4],
    pub optics: [f32; 4],
    pub body: [f32; 4],
    pub tone: [f32; 4],
    pub adapt: [f32; 4],
    pub tint: [f32; 4],
}

impl From<&CompositeParams> for GlassUniforms {
    fn from(p: &CompositeParams) -> Self {
        let area = p.target_box;
        Self {
            area: [
                area.x as f32,
                area.y as f32,
                area.width as f32,
                area.height as f32,
            ],
            shape: [
                p.uv_padding[0],
                p.uv_padding[1],
                p.corner_radius,
                p.rounding_power,
            ],
            optics: [
                p.refraction_strength,
                p.chromatic_aberration,
                p.fresnel_strength,
                p.specular_strength,
            ],
            body: [
                p.glass_opacity,
                p.edge_thickness,
                p.lens_distortion,
                p.brightness,
            ],
            tone: [p.contrast, p.saturation, p.vibrancy, p.vibrancy_darkness],
            adapt: [p.adaptive_dim, p.adaptive_boost, 0.0, 0.0],
            tint: [p.tint_color[0], p.tint_color[1], p.tint_color[2], p.tint_alpha],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_blocks_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<BlitUniforms>(), 32);
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 48);
        assert_eq!(std::mem::size_of::<GlassUniforms>(), 7 * 16);
    }

    #[test]
    fn blit_rect_is_normalised() {
        let uniforms = BlitUniforms::new(PixelBox::new(10, 20, 40, 20), Extent::new(100, 80));
        assert_eq!(uniforms.src_rect, [0.1, 0.25, 0.4, 0.25]);
        assert_eq!(uniforms.clamp_rect[0], 10.5 / 100.0);
        assert_eq!(uniforms.clamp_rect[3], 39.5 / 80.0);
    }

    #[test]
    fn blur_step_follows_direction() {
        let kernel = BlurKernel::new(6.0);
        let uniforms = BlurUniforms::new(&kernel, [0.0, 1.0], Extent::new(64, 32));
        assert_eq!(uniforms.step[0], 0.0);
        assert_eq!(uniforms.step[1], 1.0 / 32.0);
        assert_eq!(uniforms.step[3] as usize, kernel.pairs().len());
        let total = uniforms.step[2] + 2.0 * uniforms.weights.iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5);
    }
}
