use std::ops::{Index, IndexMut};

use crate::field::{FloatField, IntField};

/// Marks a float field as "not set at this tier".
pub const SENTINEL_FLOAT: f32 = -1.0;
/// Marks an integer field as "not set at this tier".
pub const SENTINEL_INT: i64 = -1;

/// Which theme variant a surface renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// One value per overridable field; unset entries hold the sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierValues {
    floats: [f32; FloatField::COUNT],
    ints: [i64; IntField::COUNT],
}

impl Default for TierValues {
    fn default() -> Self {
        Self::unset()
    }
}

impl TierValues {
    /// A tier with every field set to the sentinel.
    pub const fn unset() -> Self {
        Self {
            floats: [SENTINEL_FLOAT; FloatField::COUNT],
            ints: [SENTINEL_INT; IntField::COUNT],
        }
    }

    /// The global tier as registered before any user configuration.
    ///
    /// Theme-sensitive fields stay unset so they fall through to the
    /// per-theme fallbacks.
    pub fn global_defaults() -> Self {
        let mut values = Self::unset();
        for field in FloatField::ALL {
            if !field.is_theme_sensitive() {
                values[field] = hardcoded_float(field, Theme::Dark);
            }
        }
        for field in IntField::ALL {
            values[field] = hardcoded_int(field);
        }
        values
    }

    /// Returns the stored value when it lies inside the field's domain.
    pub fn float(&self, field: FloatField) -> Option<f32> {
        let value = self.floats[field.index()];
        field.in_domain(value).then_some(value)
    }

    /// Returns the stored value when it lies inside the field's domain.
    pub fn int(&self, field: IntField) -> Option<i64> {
        let value = self.ints[field.index()];
        field.in_domain(value).then_some(value)
    }

    pub fn set_float(&mut self, field: FloatField, value: f32) {
        self.floats[field.index()] = value;
    }

    pub fn set_int(&mut self, field: IntField, value: i64) {
        self.ints[field.index()] = value;
    }

    /// True when no field carries a usable value.
    pub fn is_empty(&self) -> bool {
        FloatField::ALL.iter().all(|field| self.float(*field).is_none())
            && IntField::ALL.iter().all(|field| self.int(*field).is_none())
    }
}

impl Index<FloatField> for TierValues {
    type Output = f32;

    fn index(&self, field: FloatField) -> &f32 {
        &self.floats[field.index()]
    }
}

impl IndexMut<FloatField> for TierValues {
    fn index_mut(&mut self, field: FloatField) -> &mut f32 {
        &mut self.floats[field.index()]
    }
}

impl Index<IntField> for TierValues {
    type Output = i64;

    fn index(&self, field: IntField) -> &i64 {
        &self.ints[field.index()]
    }
}

impl IndexMut<IntField> for TierValues {
    fn index_mut(&mut self, field: IntField) -> &mut i64 {
        &mut self.ints[field.index()]
    }
}

/// The global tier plus the dark and light theme overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTiers {
    pub global: TierValues,
    pub dark: TierValues,
    pub light: TierValues,
}

impl Default for ConfigTiers {
    fn default() -> Self {
        Self {
            global: TierValues::global_defaults(),
            dark: TierValues::unset(),
            light: TierValues::unset(),
        }
    }
}

impl ConfigTiers {
    pub fn theme(&self, theme: Theme) -> &TierValues {
        match theme {
            Theme::Dark => &self.dark,
            Theme::Light => &self.light,
        }
    }

    pub fn theme_mut(&mut self, theme: Theme) -> &mut TierValues {
        match theme {
            Theme::Dark => &mut self.dark,
            Theme::Light => &mut self.light,
        }
    }
}

/// Per-theme fallbacks for the settings that differ between themes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeDefaults {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub vibrancy: f32,
    pub vibrancy_darkness: f32,
    pub adaptive_dim: f32,
    pub adaptive_boost: f32,
}

pub const DARK_THEME_DEFAULTS: ThemeDefaults = ThemeDefaults {
    brightness: 0.82,
    contrast: 0.90,
    saturation: 0.80,
    vibrancy: 0.15,
    vibrancy_darkness: 0.0,
    adaptive_dim: 0.4,
    adaptive_boost: 0.0,
};

pub const LIGHT_THEME_DEFAULTS: ThemeDefaults = ThemeDefaults {
    brightness: 1.12,
    contrast: 0.92,
    saturation: 0.85,
    vibrancy: 0.12,
    vibrancy_darkness: 0.0,
    adaptive_dim: 0.0,
    adaptive_boost: 0.4,
};

impl ThemeDefaults {
    pub fn for_theme(theme: Theme) -> &'static ThemeDefaults {
        match theme {
            Theme::Dark => &DARK_THEME_DEFAULTS,
            Theme::Light => &LIGHT_THEME_DEFAULTS,
        }
    }
}

/// Last-resort value of a float field when no tier sets it.
pub fn hardcoded_float(field: FloatField, theme: Theme) -> f32 {
    let theme_defaults = ThemeDefaults::for_theme(theme);
    match field {
        FloatField::BlurStrength => 2.0,
        FloatField::RefractionStrength => 0.6,
        FloatField::ChromaticAberration => 0.5,
        FloatField::FresnelStrength => 0.6,
        FloatField::SpecularStrength => 0.8,
        FloatField::GlassOpacity => 1.0,
        FloatField::EdgeThickness => 0.06,
        FloatField::LensDistortion => 0.5,
        FloatField::Brightness => theme_defaults.brightness,
        FloatField::Contrast => theme_defaults.contrast,
        FloatField::Saturation => theme_defaults.saturation,
        FloatField::Vibrancy => theme_defaults.vibrancy,
        FloatField::VibrancyDarkness => theme_defaults.vibrancy_darkness,
        FloatField::AdaptiveDim => theme_defaults.adaptive_dim,
        FloatField::AdaptiveBoost => theme_defaults.adaptive_boost,
    }
}

/// Last-resort value of an integer field when no tier sets it.
pub fn hardcoded_int(field: IntField) -> i64 {
    match field {
        IntField::BlurIterations => 3,
        IntField::TintColor => 0x8899_aa22,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_defaults_leave_theme_fields_unset() {
        let global = TierValues::global_defaults();
        assert_eq!(global.float(FloatField::BlurStrength), Some(2.0));
        assert_eq!(global.int(IntField::TintColor), Some(0x8899_aa22));
        assert_eq!(global.float(FloatField::Brightness), None);
        assert_eq!(global[FloatField::Brightness], SENTINEL_FLOAT);
    }

    #[test]
    fn unset_tier_is_empty() {
        let mut tier = TierValues::unset();
        assert!(tier.is_empty());
        tier.set_float(FloatField::BlurStrength, 0.0);
        assert!(!tier.is_empty());
        assert_eq!(tier.float(FloatField::BlurStrength), Some(0.0));
    }

    #[test]
    fn theme_fallbacks_differ() {
        assert_eq!(hardcoded_float(FloatField::Brightness, Theme::Dark), 0.82);
        assert_eq!(hardcoded_float(FloatField::Brightness, Theme::Light), 1.12);
        assert_eq!(
            hardcoded_float(FloatField::GlassOpacity, Theme::Dark),
            hardcoded_float(FloatField::GlassOpacity, Theme::Light)
        );
    }
}
