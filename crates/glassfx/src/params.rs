use glassconfig::{FloatField, IntField, ResolveContext};

use crate::geometry::PixelBox;

/// Everything one glass draw needs, resolved through the config tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeParams {
    /// Where the surface lands in the render target.
    pub target_box: PixelBox,
    /// Padding fraction of the sampled image, per axis.
    pub uv_padding: [f32; 2],
    /// Corner radius in target pixels.
    pub corner_radius: f32,
    pub rounding_power: f32,
    pub refraction_strength: f32,
    pub chromatic_aberration: f32,
    pub fresnel_strength: f32,
    pub specular_strength: f32,
    /// Already multiplied by the surface alpha.
    pub glass_opacity: f32,
    pub edge_thickness: f32,
    pub lens_distortion: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub vibrancy: f32,
    pub vibrancy_darkness: f32,
    pub adaptive_dim: f32,
    pub adaptive_boost: f32,
    pub tint_color: [f32; 3],
    pub tint_alpha: f32,
}

/// Surface properties that feed the draw but do not come from config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInputs {
    pub target_box: PixelBox,
    pub uv_padding: [f32; 2],
    pub alpha: f32,
    /// Logical corner radius.
    pub rounding: f32,
    pub rounding_power: f32,
    pub monitor_scale: f32,
}

impl CompositeParams {
    pub fn resolve(ctx: &ResolveContext<'_>, surface: &SurfaceInputs) -> Self {
        let (tint_color, tint_alpha) = unpack_tint(ctx.int(IntField::TintColor));
        Self {
            target_box: surface.target_box,
            uv_padding: surface.uv_padding,
            corner_radius: surface.rounding * surface.monitor_scale,
            rounding_power: surface.rounding_power,
            refraction_strength: ctx.float(FloatField::RefractionStrength),
            chromatic_aberration: ctx.float(FloatField::ChromaticAberration),
            fresnel_strength: ctx.float(FloatField::FresnelStrength),
            specular_strength: ctx.float(FloatField::SpecularStrength),
            glass_opacity: ctx.float(FloatField::GlassOpacity) * surface.alpha,
            edge_thickness: ctx.float(FloatField::EdgeThickness),
            lens_distortion: ctx.float(FloatField::LensDistortion),
            brightness: ctx.float(FloatField::Brightness),
            contrast: ctx.float(FloatField::Contrast),
            saturation: ctx.float(FloatField::Saturation),
            vibrancy: ctx.float(FloatField::Vibrancy),
            vibrancy_darkness: ctx.float(FloatField::VibrancyDarkness),
            adaptive_dim: ctx.float(FloatField::AdaptiveDim),
            adaptive_boost: ctx.float(FloatField::AdaptiveBoost),
            tint_color,
            tint_alpha,
        }
    }

    pub fn full_size(&self) -> [f32; 2] {
        [self.target_box.width as f32, self.target_box.height as f32]
    }
}

/// Splits `0xRRGGBBAA` into normalised rgb and alpha.
pub fn unpack_tint(value: i64) -> ([f32; 3], f32) {
    let channel = |shift: u32| ((value >> shift) & 0xff) as f32 / 255.0;
    ([channel(24), channel(16), channel(8)], channel(0))
}

#[cfg(test)]
mod tests {
    use glassconfig::{builtin_presets, ConfigTiers, Theme};

    use super::*;

    #[test]
    fn unpacks_rgba_tint() {
        let (rgb, alpha) = unpack_tint(0xff80_0033);
        assert_eq!(rgb, [1.0, 128.0 / 255.0, 0.0]);
        assert_eq!(alpha, 0x33 as f32 / 255.0);
    }

    #[test]
    fn resolves_with_surface_alpha_and_scale() {
        let presets = builtin_presets();
        let tiers = ConfigTiers::default();
        let ctx = ResolveContext::new("glass", Theme::Dark, &tiers, &presets);
        let surface = SurfaceInputs {
            target_box: PixelBox::new(0, 0, 400, 300),
            uv_padding: [0.1, 0.2],
            alpha: 0.5,
            rounding: 10.0,
            rounding_power: 2.0,
            monitor_scale: 1.5,
        };
        let params = CompositeParams::resolve(&ctx, &surface);
        assert_eq!(params.glass_opacity, 0.5);
        assert_eq!(params.corner_radius, 15.0);
        assert_eq!(params.refraction_strength, 8.0);
        assert_eq!(params.tint_color, [1.0, 1.0, 1.0]);
        assert_eq!(params.tint_alpha, 0.0);
        assert_eq!(params.adaptive_dim, 0.3);
        assert_eq!(params.full_size(), [400.0, 300.0]);
    }
}
