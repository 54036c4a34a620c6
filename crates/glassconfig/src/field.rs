//! Field identifiers for the overridable glass parameters.
//!
//! Every tier (global, dark, light, preset variants) carries the same set of
//! fields. Instead of one accessor per field, tiers are arrays indexed by these
//! enums, and the key table below maps configuration names onto them.

use std::fmt;

/// Floating point parameters that can be overridden at every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatField {
    BlurStrength,
    RefractionStrength,
    ChromaticAberration,
    FresnelStrength,
    SpecularStrength,
    GlassOpacity,
    EdgeThickness,
    LensDistortion,
    Brightness,
    Contrast,
    Saturation,
    Vibrancy,
    VibrancyDarkness,
    AdaptiveDim,
    AdaptiveBoost,
}

/// Integer parameters that can be overridden at every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntField {
    BlurIterations,
    /// Packed `0xRRGGBBAA`.
    TintColor,
}

/// Either kind of field, as produced by key lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Float(FloatField),
    Int(IntField),
}

impl FloatField {
    pub const COUNT: usize = 15;

    pub const ALL: [FloatField; Self::COUNT] = [
        FloatField::BlurStrength,
        FloatField::RefractionStrength,
        FloatField::ChromaticAberration,
        FloatField::FresnelStrength,
        FloatField::SpecularStrength,
        FloatField::GlassOpacity,
        FloatField::EdgeThickness,
        FloatField::LensDistortion,
        FloatField::Brightness,
        FloatField::Contrast,
        FloatField::Saturation,
        FloatField::Vibrancy,
        FloatField::VibrancyDarkness,
        FloatField::AdaptiveDim,
        FloatField::AdaptiveBoost,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            FloatField::BlurStrength => "blur_strength",
            FloatField::RefractionStrength => "refraction_strength",
            FloatField::ChromaticAberration => "chromatic_aberration",
            FloatField::FresnelStrength => "fresnel_strength",
            FloatField::SpecularStrength => "specular_strength",
            FloatField::GlassOpacity => "glass_opacity",
            FloatField::EdgeThickness => "edge_thickness",
            FloatField::LensDistortion => "lens_distortion",
            FloatField::Brightness => "brightness",
            FloatField::Contrast => "contrast",
            FloatField::Saturation => "saturation",
            FloatField::Vibrancy => "vibrancy",
            FloatField::VibrancyDarkness => "vibrancy_darkness",
            FloatField::AdaptiveDim => "adaptive_dim",
            FloatField::AdaptiveBoost => "adaptive_boost",
        }
    }

    /// Fields whose fallback differs between the dark and light theme.
    pub fn is_theme_sensitive(self) -> bool {
        matches!(
            self,
            FloatField::Brightness
                | FloatField::Contrast
                | FloatField::Saturation
                | FloatField::Vibrancy
                | FloatField::VibrancyDarkness
                | FloatField::AdaptiveDim
                | FloatField::AdaptiveBoost
        )
    }

    /// Whether `value` is a real setting rather than "unset".
    pub fn in_domain(self, value: f32) -> bool {
        value.is_finite() && value >= 0.0
    }
}

impl IntField {
    pub const COUNT: usize = 2;

    pub const ALL: [IntField; Self::COUNT] = [IntField::BlurIterations, IntField::TintColor];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            IntField::BlurIterations => "blur_iterations",
            IntField::TintColor => "tint_color",
        }
    }

    /// Whether `value` is a real setting rather than "unset".
    ///
    /// Zero blur iterations is outside the usable range and falls through to
    /// the next tier like the sentinel does.
    pub fn in_domain(self, value: i64) -> bool {
        match self {
            IntField::BlurIterations => value >= 1,
            IntField::TintColor => value >= 0,
        }
    }
}

impl Field {
    /// Looks up a field by its configuration key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        FloatField::ALL
            .iter()
            .find(|field| field.key() == key)
            .map(|field| Field::Float(*field))
            .or_else(|| {
                IntField::ALL
                    .iter()
                    .find(|field| field.key() == key)
                    .map(|field| Field::Int(*field))
            })
    }

    pub fn key(self) -> &'static str {
        match self {
            Field::Float(field) => field.key(),
            Field::Int(field) => field.key(),
        }
    }

    /// Iterates every field in declaration order, floats first.
    pub fn all() -> impl Iterator<Item = Field> {
        FloatField::ALL
            .into_iter()
            .map(Field::Float)
            .chain(IntField::ALL.into_iter().map(Field::Int))
    }
}

impl fmt::Display for FloatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl fmt::Display for IntField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_table_order() {
        for (position, field) in FloatField::ALL.iter().enumerate() {
            assert_eq!(field.index(), position);
        }
        for (position, field) in IntField::ALL.iter().enumerate() {
            assert_eq!(field.index(), position);
        }
    }

    #[test]
    fn keys_round_trip_through_lookup() {
        for field in Field::all() {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::all().count(), 17);
        assert_eq!(Field::from_key("wobble"), None);
    }

    #[test]
    fn zero_is_a_real_float_but_not_a_real_iteration_count() {
        assert!(FloatField::BlurStrength.in_domain(0.0));
        assert!(!FloatField::BlurStrength.in_domain(-1.0));
        assert!(!IntField::BlurIterations.in_domain(0));
        assert!(IntField::TintColor.in_domain(0));
    }
}
