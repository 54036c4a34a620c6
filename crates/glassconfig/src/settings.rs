use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::{Field, FloatField, IntField};
use crate::preset::{parse_field_value, parse_int, Assigned};
use crate::tier::{ConfigTiers, Theme, TierValues, SENTINEL_FLOAT, SENTINEL_INT};
use crate::ConfigError;

/// Prefix of the host's flat configuration namespace.
pub const CONFIG_PREFIX: &str = "plugin:hyprglass:";

/// Preset name meaning "no preset tier".
pub const DEFAULT_PRESET_NAME: &str = "default";

/// Resolution the blur runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurQuality {
    #[default]
    Full,
    /// Blur a half-size copy of the capture; much cheaper, softer detail.
    Half,
}

impl BlurQuality {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full" => Some(BlurQuality::Full),
            "half" => Some(BlurQuality::Half),
            _ => None,
        }
    }
}

/// Everything the effect reads from user configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GlassSettings {
    pub enabled: bool,
    pub default_theme: String,
    pub default_preset: String,
    pub blur_quality: BlurQuality,
    pub tiers: ConfigTiers,
    /// Raw preset descriptors, parsed into the registry on reload.
    pub presets: Vec<String>,
}

impl Default for GlassSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_theme: Theme::Dark.name().to_string(),
            default_preset: String::new(),
            blur_quality: BlurQuality::Full,
            tiers: ConfigTiers::default(),
            presets: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    default_theme: Option<String>,
    #[serde(default)]
    default_preset: Option<String>,
    #[serde(default)]
    blur_quality: BlurQuality,
    #[serde(default)]
    dark: BTreeMap<String, RawValue>,
    #[serde(default)]
    light: BTreeMap<String, RawValue>,
    #[serde(default)]
    presets: Vec<String>,
    #[serde(flatten)]
    global: BTreeMap<String, RawValue>,
}

fn default_enabled() -> bool {
    true
}

impl GlassSettings {
    /// Parses settings from TOML.
    ///
    /// Top-level field keys fill the global tier, `[dark]` and `[light]`
    /// tables the theme tiers; `presets` is a list of preset descriptors.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(input)?;
        let mut settings = GlassSettings {
            enabled: raw.enabled,
            default_theme: raw
                .default_theme
                .unwrap_or_else(|| Theme::Dark.name().to_string()),
            default_preset: raw.default_preset.unwrap_or_default(),
            blur_quality: raw.blur_quality,
            tiers: ConfigTiers::default(),
            presets: raw.presets,
        };

        assign_table(&mut settings.tiers.global, None, &raw.global)?;
        assign_table(&mut settings.tiers.dark, Some(Theme::Dark), &raw.dark)?;
        assign_table(&mut settings.tiers.light, Some(Theme::Light), &raw.light)?;
        Ok(settings)
    }

    /// Sets one value from the host's flat namespace, e.g.
    /// `plugin:hyprglass:dark:blur_strength` or `light:tint_color`.
    ///
    /// The `preset` keyword appends a descriptor. A value of `-1` resets a
    /// tier field to "inherit".
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let key = key.trim();
        let key = key.strip_prefix(CONFIG_PREFIX).unwrap_or(key);
        let raw = raw.trim();

        match key {
            "enabled" => {
                self.enabled = parse_bool(raw)
                    .ok_or_else(|| ConfigError::Invalid(format!("invalid boolean '{raw}'")))?;
                return Ok(());
            }
            "default_theme" => {
                self.default_theme = raw.to_string();
                return Ok(());
            }
            "default_preset" => {
                self.default_preset = raw.to_string();
                return Ok(());
            }
            "blur_quality" => {
                self.blur_quality = BlurQuality::parse(raw).ok_or_else(|| {
                    ConfigError::Invalid(format!("invalid blur quality '{raw}'; expected full or half"))
                })?;
                return Ok(());
            }
            "preset" => {
                self.presets.push(raw.to_string());
                return Ok(());
            }
            _ => {}
        }

        let (tier, field_key) = match key.split_once(':') {
            Some(("dark", rest)) => (self.tiers.theme_mut(Theme::Dark), rest),
            Some(("light", rest)) => (self.tiers.theme_mut(Theme::Light), rest),
            Some((scope, _)) => {
                return Err(ConfigError::Invalid(format!(
                    "unknown configuration scope '{scope}'"
                )))
            }
            None => (&mut self.tiers.global, key),
        };
        let field = Field::from_key(field_key)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown configuration key '{key}'")))?;
        assign_text(tier, field, raw)
    }

    /// Default theme, falling back to dark for anything that is not `light`.
    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.default_theme).unwrap_or(Theme::Dark)
    }

    /// Default preset name, `default` when unset.
    pub fn preset(&self) -> &str {
        let trimmed = self.default_preset.trim();
        if trimmed.is_empty() {
            DEFAULT_PRESET_NAME
        } else {
            trimmed
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn assign_table(
    tier: &mut TierValues,
    theme: Option<Theme>,
    table: &BTreeMap<String, RawValue>,
) -> Result<(), ConfigError> {
    for (key, value) in table {
        let field = Field::from_key(key).ok_or_else(|| match theme {
            Some(theme) => {
                ConfigError::Invalid(format!("unknown key '{key}' in [{}]", theme.name()))
            }
            None => ConfigError::Invalid(format!("unknown configuration key '{key}'")),
        })?;
        assign_raw(tier, field, value)?;
    }
    Ok(())
}

fn assign_raw(tier: &mut TierValues, field: Field, value: &RawValue) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Invalid(format!("invalid value for '{field}'"));
    match (field, value) {
        (_, RawValue::Text(text)) => assign_text(tier, field, text),
        (_, RawValue::Bool(flag)) => Err(ConfigError::Invalid(format!(
            "'{field}' expects a number, got boolean {flag}"
        ))),
        (Field::Float(field), RawValue::Int(value)) => {
            store_float(tier, field, *value as f32);
            Ok(())
        }
        (Field::Float(field), RawValue::Float(value)) => {
            store_float(tier, field, *value as f32);
            Ok(())
        }
        (Field::Int(field), RawValue::Int(value)) => {
            store_int(tier, field, *value);
            Ok(())
        }
        (Field::Int(field), RawValue::Float(value)) if value.fract() == 0.0 => {
            store_int(tier, field, *value as i64);
            Ok(())
        }
        (Field::Int(_), RawValue::Float(_)) => Err(invalid()),
    }
}

fn assign_text(tier: &mut TierValues, field: Field, raw: &str) -> Result<(), ConfigError> {
    let raw = raw.trim();
    // negative values are the inherit marker in the flat namespace
    if raw.starts_with('-') {
        let negative = match field {
            Field::Float(_) => raw.parse::<f32>().is_ok(),
            Field::Int(_) => parse_int(raw).is_some(),
        };
        if negative {
            match field {
                Field::Float(field) => tier.set_float(field, SENTINEL_FLOAT),
                Field::Int(field) => tier.set_int(field, SENTINEL_INT),
            }
            return Ok(());
        }
    }
    match parse_field_value(field, raw) {
        Ok(Assigned::Float(value)) => {
            if let Field::Float(field) = field {
                tier.set_float(field, value);
            }
            Ok(())
        }
        Ok(Assigned::Int(value)) => {
            if let Field::Int(field) = field {
                tier.set_int(field, value);
            }
            Ok(())
        }
        Err(err) => Err(ConfigError::Invalid(err.to_string())),
    }
}

fn store_float(tier: &mut TierValues, field: FloatField, value: f32) {
    let value = if value < 0.0 { SENTINEL_FLOAT } else { value };
    tier.set_float(field, value);
}

fn store_int(tier: &mut TierValues, field: IntField, value: i64) {
    let value = if value < 0 { SENTINEL_INT } else { value };
    tier.set_int(field, value);
}
