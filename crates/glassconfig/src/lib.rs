//! Configuration model for the glass effect: tiered parameters, presets and
//! their resolution.

use std::sync::Arc;

mod builtin;
mod field;
mod preset;
mod registry;
mod resolve;
mod selection;
mod settings;
mod tier;
mod validate;

pub use builtin::builtin_presets;
pub use field::{Field, FloatField, IntField};
pub use preset::{
    parse_descriptor, parse_field_value, parse_int, Assigned, Preset, PresetDescriptor,
    PresetParseError, Variant,
};
pub use registry::{PresetMap, PresetRegistry};
pub use resolve::{ResolveContext, ValueSource, MAX_PRESET_INHERITANCE_DEPTH};
pub use selection::{select_preset, select_theme, TAG_PRESET_PREFIX, TAG_THEME_PREFIX};
pub use settings::{BlurQuality, GlassSettings, CONFIG_PREFIX, DEFAULT_PRESET_NAME};
pub use tier::{
    hardcoded_float, hardcoded_int, ConfigTiers, Theme, ThemeDefaults, TierValues,
    DARK_THEME_DEFAULTS, LIGHT_THEME_DEFAULTS, SENTINEL_FLOAT, SENTINEL_INT,
};
pub use validate::{validate, ConfigWarning};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Immutable view of one committed configuration generation.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub settings: Arc<GlassSettings>,
    pub presets: Arc<PresetMap>,
}

impl ConfigSnapshot {
    /// Built-in presets and default settings.
    pub fn builtin() -> Self {
        Self {
            settings: Arc::new(GlassSettings::default()),
            presets: Arc::new(builtin_presets()),
        }
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Outcome of [`reload`].
#[derive(Debug, Clone)]
pub struct ReloadReport {
    pub snapshot: ConfigSnapshot,
    /// Descriptors that were rejected, with the reason. Each one only drops
    /// its own preset.
    pub rejected: Vec<(String, PresetParseError)>,
    pub warnings: Vec<ConfigWarning>,
}

/// Rebuilds the preset registry from `settings`, commits it and validates
/// the result.
pub fn reload(settings: GlassSettings, registry: &mut PresetRegistry) -> ReloadReport {
    registry.clear_pending();
    let mut rejected = Vec::new();
    for descriptor in &settings.presets {
        if let Err(err) = registry.parse_one(descriptor) {
            tracing::warn!(descriptor = %descriptor, error = %err, "rejected preset");
            rejected.push((descriptor.clone(), err));
        }
    }
    let presets = registry.commit();
    let warnings = validate(&settings, &presets);
    for warning in &warnings {
        tracing::warn!(%warning, "configuration warning");
    }
    tracing::info!(
        presets = presets.len(),
        rejected = rejected.len(),
        warnings = warnings.len(),
        "configuration reloaded"
    );
    ReloadReport {
        snapshot: ConfigSnapshot {
            settings: Arc::new(settings),
            presets,
        },
        rejected,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_keeps_good_presets_and_reports_bad_ones() {
        let settings = GlassSettings::from_toml_str(
            r#"
default_preset = "frosted"
presets = [
    "name:frosted, inherits:glass, glass_opacity:0.5",
    "name:broken, sparkle:1",
    "name:frosted:dusk, brightness:1",
]
"#,
        )
        .expect("parse settings");

        let mut registry = PresetRegistry::new();
        let report = reload(settings, &mut registry);

        assert!(report.snapshot.presets.contains_key("frosted"));
        assert!(!report.snapshot.presets.contains_key("broken"));
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(
            report.rejected[0].1,
            PresetParseError::UnknownKey("sparkle".into())
        );
        assert!(report.warnings.is_empty());

        let settings = &report.snapshot.settings;
        let ctx = ResolveContext::new(
            settings.preset(),
            settings.theme(),
            &settings.tiers,
            &report.snapshot.presets,
        );
        assert_eq!(ctx.float(FloatField::GlassOpacity), 0.5);
        // inherited from the built-in glass preset
        assert_eq!(ctx.float(FloatField::RefractionStrength), 8.0);
    }

    #[test]
    fn reload_warns_about_missing_default_preset() {
        let settings = GlassSettings {
            default_preset: "nowhere".into(),
            ..GlassSettings::default()
        };
        let report = reload(settings, &mut PresetRegistry::new());
        assert_eq!(
            report.warnings,
            vec![ConfigWarning::UnknownDefaultPreset("nowhere".into())]
        );
    }
}
