use std::fmt;

use crate::registry::PresetMap;
use crate::resolve::MAX_PRESET_INHERITANCE_DEPTH;
use crate::settings::{GlassSettings, DEFAULT_PRESET_NAME};
use crate::tier::Theme;

/// Non-fatal configuration problem. Rendering continues with a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    UnknownDefaultTheme(String),
    UnknownDefaultPreset(String),
    MissingParent { preset: String, parent: String },
    InheritanceCycle { preset: String },
    InheritanceTooDeep { preset: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownDefaultTheme(theme) => write!(
                f,
                "default_theme '{theme}' is not dark or light; using dark"
            ),
            ConfigWarning::UnknownDefaultPreset(preset) => write!(
                f,
                "default_preset '{preset}' is not defined; using global settings"
            ),
            ConfigWarning::MissingParent { preset, parent } => write!(
                f,
                "preset '{preset}' inherits unknown preset '{parent}'"
            ),
            ConfigWarning::InheritanceCycle { preset } => {
                write!(f, "preset '{preset}' has a cyclic inherits chain")
            }
            ConfigWarning::InheritanceTooDeep { preset } => write!(
                f,
                "preset '{preset}' inherits more than {MAX_PRESET_INHERITANCE_DEPTH} levels deep"
            ),
        }
    }
}

/// Checks a committed configuration for settings that will silently fall
/// back at render time.
pub fn validate(settings: &GlassSettings, presets: &PresetMap) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if Theme::from_name(&settings.default_theme).is_none() {
        warnings.push(ConfigWarning::UnknownDefaultTheme(
            settings.default_theme.clone(),
        ));
    }

    let default_preset = settings.preset();
    if default_preset != DEFAULT_PRESET_NAME && !presets.contains_key(default_preset) {
        warnings.push(ConfigWarning::UnknownDefaultPreset(
            default_preset.to_string(),
        ));
    }

    for (name, preset) in presets {
        let Some(parent) = preset.inherits.as_deref() else {
            continue;
        };
        if !presets.contains_key(parent) {
            warnings.push(ConfigWarning::MissingParent {
                preset: name.clone(),
                parent: parent.to_string(),
            });
            continue;
        }
        if let Some(warning) = check_chain(name, presets) {
            warnings.push(warning);
        }
    }

    warnings
}

fn check_chain(start: &str, presets: &PresetMap) -> Option<ConfigWarning> {
    let mut visited: Vec<&str> = vec![start];
    let mut current = start;
    loop {
        let next = presets.get(current)?.inherits.as_deref()?;
        if visited.contains(&next) {
            return Some(ConfigWarning::InheritanceCycle {
                preset: start.to_string(),
            });
        }
        if visited.len() >= MAX_PRESET_INHERITANCE_DEPTH {
            return Some(ConfigWarning::InheritanceTooDeep {
                preset: start.to_string(),
            });
        }
        visited.push(next);
        current = next;
    }
}
