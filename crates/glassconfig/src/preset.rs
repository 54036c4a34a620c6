//! Preset records and the preset descriptor mini-language.
//!
//! A descriptor is a comma separated list of `key:value` tokens:
//!
//! ```text
//! name:frosted:dark, inherits:glass, brightness:0.9, tint_color:0x10203040
//! ```
//!
//! `name` picks the preset and optionally a theme variant (`:dark`/`:light`);
//! without a variant the values land in the shared set. `inherits` names a
//! parent preset. Every other key is a field of [`TierValues`].

use crate::field::Field;
use crate::tier::{Theme, TierValues};

/// Which value set of a preset a descriptor writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Shared,
    Dark,
    Light,
}

impl Variant {
    fn parse(raw: &str) -> Result<Self, PresetParseError> {
        match raw.trim() {
            "dark" => Ok(Variant::Dark),
            "light" => Ok(Variant::Light),
            other => Err(PresetParseError::InvalidVariant(other.to_string())),
        }
    }
}

/// A named bundle of overrides with shared and per-theme value sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub inherits: Option<String>,
    pub shared: TierValues,
    pub dark: TierValues,
    pub light: TierValues,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inherits: None,
            shared: TierValues::unset(),
            dark: TierValues::unset(),
            light: TierValues::unset(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.inherits = Some(parent.into());
        self
    }

    pub fn variant(&self, theme: Theme) -> &TierValues {
        match theme {
            Theme::Dark => &self.dark,
            Theme::Light => &self.light,
        }
    }

    pub fn values_mut(&mut self, variant: Variant) -> &mut TierValues {
        match variant {
            Variant::Shared => &mut self.shared,
            Variant::Dark => &mut self.dark,
            Variant::Light => &mut self.light,
        }
    }

    /// Merges a parsed descriptor into this preset. Only fields the
    /// descriptor actually set overwrite existing values.
    pub fn apply(&mut self, descriptor: &PresetDescriptor) {
        if let Some(parent) = &descriptor.inherits {
            self.inherits = Some(parent.clone());
        }
        let target = self.values_mut(descriptor.variant);
        for (field, value) in &descriptor.assignments {
            match (field, value) {
                (Field::Float(field), Assigned::Float(value)) => target.set_float(*field, *value),
                (Field::Int(field), Assigned::Int(value)) => target.set_int(*field, *value),
                // parse_descriptor never pairs a field with the other kind
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assigned {
    Float(f32),
    Int(i64),
}

/// One successfully parsed descriptor line.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDescriptor {
    pub name: String,
    pub variant: Variant,
    pub inherits: Option<String>,
    pub assignments: Vec<(Field, Assigned)>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PresetParseError {
    #[error("preset descriptor is empty")]
    Empty,
    #[error("malformed token '{0}'; expected key:value")]
    MalformedToken(String),
    #[error("preset descriptor has no 'name' key")]
    MissingName,
    #[error("preset descriptor declares 'name' more than once")]
    DuplicateName,
    #[error("preset name must not be empty")]
    EmptyName,
    #[error("invalid preset variant '{0}'; expected dark or light")]
    InvalidVariant(String),
    #[error("unknown preset key '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

/// Parses one preset descriptor. Any error aborts the whole descriptor.
pub fn parse_descriptor(input: &str) -> Result<PresetDescriptor, PresetParseError> {
    if input.trim().is_empty() {
        return Err(PresetParseError::Empty);
    }

    let mut name: Option<(String, Variant)> = None;
    let mut inherits = None;
    let mut assignments = Vec::new();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let (key, value) = token
            .split_once(':')
            .ok_or_else(|| PresetParseError::MalformedToken(token.to_string()))?;
        let key = key.trim();
        let value = value.trim();

        match key {
            "name" => {
                if name.is_some() {
                    return Err(PresetParseError::DuplicateName);
                }
                name = Some(parse_name(value)?);
            }
            "inherits" => {
                if value.is_empty() {
                    return Err(PresetParseError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        reason: "parent preset name must not be empty",
                    });
                }
                inherits = Some(value.to_string());
            }
            _ => {
                let field = Field::from_key(key)
                    .ok_or_else(|| PresetParseError::UnknownKey(key.to_string()))?;
                assignments.push((field, parse_field_value(field, value)?));
            }
        }
    }

    let (name, variant) = name.ok_or(PresetParseError::MissingName)?;
    Ok(PresetDescriptor {
        name,
        variant,
        inherits,
        assignments,
    })
}

fn parse_name(value: &str) -> Result<(String, Variant), PresetParseError> {
    let (name, variant) = match value.split_once(':') {
        Some((name, variant)) => (name.trim(), Variant::parse(variant)?),
        None => (value.trim(), Variant::Shared),
    };
    if name.is_empty() {
        return Err(PresetParseError::EmptyName);
    }
    Ok((name.to_string(), variant))
}

/// Parses a raw value for `field`, rejecting anything outside the
/// non-negative range every field lives in.
pub fn parse_field_value(field: Field, raw: &str) -> Result<Assigned, PresetParseError> {
    let invalid = |reason| PresetParseError::InvalidValue {
        key: field.key().to_string(),
        value: raw.to_string(),
        reason,
    };
    match field {
        Field::Float(_) => {
            let value: f32 = raw.trim().parse().map_err(|_| invalid("not a number"))?;
            if !value.is_finite() {
                return Err(invalid("must be finite"));
            }
            if value < 0.0 {
                return Err(invalid("must be non-negative"));
            }
            Ok(Assigned::Float(value))
        }
        Field::Int(_) => {
            let value = parse_int(raw).ok_or_else(|| invalid("not an integer"))?;
            if value < 0 {
                return Err(invalid("must be non-negative"));
            }
            Ok(Assigned::Int(value))
        }
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()
    } else {
        trimmed.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FloatField, IntField};

    #[test]
    fn parses_shared_descriptor() {
        let descriptor =
            parse_descriptor("name:frosted, inherits:glass, blur_strength:1.5, tint_color:0xff00ff80")
                .expect("parse");
        assert_eq!(descriptor.name, "frosted");
        assert_eq!(descriptor.variant, Variant::Shared);
        assert_eq!(descriptor.inherits.as_deref(), Some("glass"));
        assert_eq!(
            descriptor.assignments,
            vec![
                (
                    Field::Float(FloatField::BlurStrength),
                    Assigned::Float(1.5)
                ),
                (Field::Int(IntField::TintColor), Assigned::Int(0xff00ff80)),
            ]
        );
    }

    #[test]
    fn name_suffix_selects_variant() {
        let descriptor = parse_descriptor("brightness:0.7, name:frosted:light").expect("parse");
        assert_eq!(descriptor.variant, Variant::Light);
        assert_eq!(descriptor.name, "frosted");
    }

    #[test]
    fn decimal_integers_are_accepted() {
        let descriptor = parse_descriptor("name:a, blur_iterations:4").expect("parse");
        assert_eq!(
            descriptor.assignments,
            vec![(Field::Int(IntField::BlurIterations), Assigned::Int(4))]
        );
    }

    #[test]
    fn rejects_bad_descriptors() {
        assert_eq!(parse_descriptor("  "), Err(PresetParseError::Empty));
        assert_eq!(
            parse_descriptor("blur_strength:1.0"),
            Err(PresetParseError::MissingName)
        );
        assert_eq!(
            parse_descriptor("name:a:dusk"),
            Err(PresetParseError::InvalidVariant("dusk".into()))
        );
        assert_eq!(
            parse_descriptor("name:a, sparkle:1"),
            Err(PresetParseError::UnknownKey("sparkle".into()))
        );
        assert!(matches!(
            parse_descriptor("name:a, blur_strength:lots"),
            Err(PresetParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_descriptor("name:a, tint_color:0xzz"),
            Err(PresetParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_descriptor("name:a, glass_opacity:-0.5"),
            Err(PresetParseError::InvalidValue { .. })
        ));
        assert_eq!(
            parse_descriptor("name:a, nonsense"),
            Err(PresetParseError::MalformedToken("nonsense".into()))
        );
        assert_eq!(
            parse_descriptor("name:a, name:b"),
            Err(PresetParseError::DuplicateName)
        );
    }

    #[test]
    fn apply_only_touches_assigned_fields() {
        let mut preset = Preset::new("frosted");
        preset.shared.set_float(FloatField::GlassOpacity, 0.4);
        let descriptor = parse_descriptor("name:frosted, blur_strength:1.0").expect("parse");
        preset.apply(&descriptor);
        assert_eq!(preset.shared.float(FloatField::GlassOpacity), Some(0.4));
        assert_eq!(preset.shared.float(FloatField::BlurStrength), Some(1.0));
        assert!(preset.dark.is_empty());
    }
}
