//! Presets that ship with the effect. User presets of the same name replace
//! these wholesale at commit time.

use std::collections::BTreeMap;

use crate::field::{FloatField as F, IntField as I};
use crate::preset::Preset;

fn high_contrast() -> Preset {
    let mut preset = Preset::new("high_contrast");

    let shared = &mut preset.shared;
    shared.set_float(F::BlurStrength, 1.2);
    shared.set_int(I::BlurIterations, 2);
    shared.set_float(F::LensDistortion, 0.5);
    shared.set_float(F::RefractionStrength, 1.2);
    shared.set_float(F::ChromaticAberration, 0.25);
    shared.set_float(F::FresnelStrength, 0.3);
    shared.set_float(F::SpecularStrength, 0.8);
    shared.set_float(F::GlassOpacity, 1.0);
    shared.set_float(F::EdgeThickness, 0.06);

    let dark = &mut preset.dark;
    dark.set_float(F::Brightness, 0.82);
    dark.set_float(F::Contrast, 1.14);
    dark.set_float(F::Saturation, 0.92);
    dark.set_float(F::Vibrancy, 0.5);
    dark.set_float(F::VibrancyDarkness, 0.2);
    dark.set_float(F::AdaptiveDim, 0.25);
    dark.set_int(I::TintColor, 0x0214_2aa9);

    let light = &mut preset.light;
    light.set_float(F::Brightness, 1.0);
    light.set_float(F::Contrast, 0.92);
    light.set_float(F::Saturation, 0.8);
    light.set_float(F::Vibrancy, 0.12);
    light.set_float(F::VibrancyDarkness, 5.0);
    light.set_float(F::AdaptiveBoost, 0.15);
    light.set_int(I::TintColor, 0xc2cd_db33);

    preset
}

fn subtle() -> Preset {
    let mut preset = Preset::new("subtle");
    let shared = &mut preset.shared;
    shared.set_float(F::BlurStrength, 1.0);
    shared.set_float(F::RefractionStrength, 0.3);
    shared.set_float(F::ChromaticAberration, 0.2);
    shared.set_float(F::FresnelStrength, 0.3);
    shared.set_float(F::SpecularStrength, 0.4);
    preset
}

fn clear() -> Preset {
    let mut preset = Preset::new("clear");
    let shared = &mut preset.shared;
    // zero is a real value here: no blur at all
    shared.set_float(F::BlurStrength, 0.0);
    shared.set_float(F::RefractionStrength, 0.3);
    shared.set_float(F::ChromaticAberration, 0.2);
    shared.set_float(F::FresnelStrength, 0.3);
    shared.set_float(F::SpecularStrength, 0.4);
    preset
}

fn glass() -> Preset {
    let mut preset = Preset::new("glass");

    let shared = &mut preset.shared;
    shared.set_float(F::BlurStrength, 1.0);
    shared.set_int(I::BlurIterations, 2);
    shared.set_float(F::LensDistortion, 0.3);
    shared.set_float(F::RefractionStrength, 8.0);
    shared.set_float(F::ChromaticAberration, 0.5);
    shared.set_float(F::FresnelStrength, 0.4);
    shared.set_float(F::SpecularStrength, 0.8);
    shared.set_float(F::GlassOpacity, 1.0);
    shared.set_float(F::EdgeThickness, 0.06);
    shared.set_int(I::TintColor, 0xffff_ff00);

    preset.dark.set_float(F::AdaptiveDim, 0.3);
    preset.light.set_float(F::AdaptiveBoost, 0.3);

    preset
}

/// All built-in presets keyed by name.
pub fn builtin_presets() -> BTreeMap<String, Preset> {
    [high_contrast(), subtle(), clear(), glass()]
        .into_iter()
        .map(|preset| (preset.name.clone(), preset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ships_four_presets() {
        let presets = builtin_presets();
        let names: Vec<&str> = presets.keys().map(String::as_str).collect();
        assert_eq!(names, ["clear", "glass", "high_contrast", "subtle"]);
    }

    #[test]
    fn clear_disables_blur_with_a_real_zero() {
        let presets = builtin_presets();
        let clear = &presets["clear"];
        assert_eq!(clear.shared.float(F::BlurStrength), Some(0.0));
        assert!(clear.inherits.is_none());
    }
}
