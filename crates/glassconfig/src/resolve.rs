//! Tiered parameter resolution.
//!
//! A value is looked up in order: the surface's preset (theme variant, then
//! shared values, then its `inherits` parent, recursively), the theme tier,
//! the global tier, and finally a hardcoded default. The first tier holding
//! an in-domain value wins.

use crate::field::{FloatField, IntField};
use crate::registry::PresetMap;
use crate::tier::{hardcoded_float, hardcoded_int, ConfigTiers, Theme, TierValues};

/// Maximum number of presets visited along one `inherits` chain.
pub const MAX_PRESET_INHERITANCE_DEPTH: usize = 8;

/// Tier that supplied a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Preset { name: String, depth: usize },
    Theme(Theme),
    Global,
    Hardcoded,
}

/// Read-only inputs for resolving parameters of one composite.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub preset: &'a str,
    pub theme: Theme,
    pub tiers: &'a ConfigTiers,
    pub presets: &'a PresetMap,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        preset: &'a str,
        theme: Theme,
        tiers: &'a ConfigTiers,
        presets: &'a PresetMap,
    ) -> Self {
        Self {
            preset,
            theme,
            tiers,
            presets,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.theme.is_dark()
    }

    /// Resolves a float with an explicit last-resort default.
    pub fn resolve_float(&self, field: FloatField, hardcoded_default: f32) -> f32 {
        self.lookup(|tier| tier.float(field))
            .map(|(value, _)| value)
            .unwrap_or(hardcoded_default)
    }

    /// Resolves an integer with an explicit last-resort default.
    pub fn resolve_int(&self, field: IntField, hardcoded_default: i64) -> i64 {
        self.lookup(|tier| tier.int(field))
            .map(|(value, _)| value)
            .unwrap_or(hardcoded_default)
    }

    /// Resolves a float falling back to the built-in default for the theme.
    pub fn float(&self, field: FloatField) -> f32 {
        self.resolve_float(field, hardcoded_float(field, self.theme))
    }

    /// Resolves an integer falling back to the built-in default.
    pub fn int(&self, field: IntField) -> i64 {
        self.resolve_int(field, hardcoded_int(field))
    }

    /// Like [`float`](Self::float) but also reports which tier answered.
    pub fn float_traced(&self, field: FloatField) -> (f32, ValueSource) {
        self.lookup(|tier| tier.float(field))
            .unwrap_or((hardcoded_float(field, self.theme), ValueSource::Hardcoded))
    }

    /// Like [`int`](Self::int) but also reports which tier answered.
    pub fn int_traced(&self, field: IntField) -> (i64, ValueSource) {
        self.lookup(|tier| tier.int(field))
            .unwrap_or((hardcoded_int(field), ValueSource::Hardcoded))
    }

    /// Resolves every field into one fully populated tier.
    pub fn resolve_all(&self) -> TierValues {
        let mut values = TierValues::unset();
        for field in FloatField::ALL {
            values.set_float(field, self.float(field));
        }
        for field in IntField::ALL {
            values.set_int(field, self.int(field));
        }
        values
    }

    fn lookup<T, F>(&self, pick: F) -> Option<(T, ValueSource)>
    where
        F: Fn(&TierValues) -> Option<T>,
    {
        if let Some(found) = self.preset_lookup(self.preset, 0, &pick) {
            return Some(found);
        }
        if let Some(value) = pick(self.tiers.theme(self.theme)) {
            return Some((value, ValueSource::Theme(self.theme)));
        }
        pick(&self.tiers.global).map(|value| (value, ValueSource::Global))
    }

    fn preset_lookup<T, F>(&self, name: &str, depth: usize, pick: &F) -> Option<(T, ValueSource)>
    where
        F: Fn(&TierValues) -> Option<T>,
    {
        // runaway or cyclic chains end here and count as a preset miss
        if depth >= MAX_PRESET_INHERITANCE_DEPTH {
            return None;
        }
        let preset = self.presets.get(name)?;
        let source = || ValueSource::Preset {
            name: preset.name.clone(),
            depth,
        };
        if let Some(value) = pick(preset.variant(self.theme)) {
            return Some((value, source()));
        }
        if let Some(value) = pick(&preset.shared) {
            return Some((value, source()));
        }
        let parent = preset.inherits.as_deref()?;
        self.preset_lookup(parent, depth + 1, pick)
    }
}
