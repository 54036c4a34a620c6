use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builtin::builtin_presets;
use crate::preset::{parse_descriptor, Preset, PresetParseError};

/// Immutable preset table used by rendering.
pub type PresetMap = BTreeMap<String, Preset>;

/// Two-generation preset store.
///
/// Reloads rebuild `pending` from scratch through [`clear_pending`] and
/// [`parse_one`]; [`commit`] then publishes built-ins overlaid by the pending
/// presets as a new snapshot. Frames hold an `Arc` to the snapshot they
/// started with, so a commit never shows up half-applied.
///
/// [`clear_pending`]: PresetRegistry::clear_pending
/// [`parse_one`]: PresetRegistry::parse_one
/// [`commit`]: PresetRegistry::commit
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    active: Arc<PresetMap>,
    pending: PresetMap,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetRegistry {
    /// Starts with only the built-in presets active.
    pub fn new() -> Self {
        Self {
            active: Arc::new(builtin_presets()),
            pending: PresetMap::new(),
        }
    }

    /// Drops everything parsed since the last reload began.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Parses one descriptor into the pending generation.
    ///
    /// Descriptors naming the same preset accumulate (typically one for the
    /// shared values and one per theme variant). A failed descriptor leaves
    /// the pending generation untouched.
    pub fn parse_one(&mut self, descriptor: &str) -> Result<(), PresetParseError> {
        let parsed = parse_descriptor(descriptor)?;
        self.pending
            .entry(parsed.name.clone())
            .or_insert_with(|| Preset::new(parsed.name.clone()))
            .apply(&parsed);
        Ok(())
    }

    /// Publishes built-ins overlaid by the pending presets.
    ///
    /// User presets replace built-ins of the same name as a whole. The
    /// pending generation is kept, so committing again yields the same
    /// snapshot.
    pub fn commit(&mut self) -> Arc<PresetMap> {
        let mut next = builtin_presets();
        for (name, preset) in &self.pending {
            next.insert(name.clone(), preset.clone());
        }
        tracing::debug!(
            user = self.pending.len(),
            total = next.len(),
            "committed preset registry"
        );
        self.active = Arc::new(next);
        Arc::clone(&self.active)
    }

    /// The snapshot in-flight rendering should use.
    pub fn active(&self) -> Arc<PresetMap> {
        Arc::clone(&self.active)
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.active.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    pub fn pending(&self) -> &PresetMap {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FloatField;

    #[test]
    fn starts_with_builtins() {
        let registry = PresetRegistry::new();
        assert!(registry.contains("glass"));
        assert!(registry.pending().is_empty());
    }

    #[test]
    fn user_preset_replaces_builtin_entirely() {
        let mut registry = PresetRegistry::new();
        registry.clear_pending();
        registry.parse_one("name:glass, glass_opacity:0.3").unwrap();
        registry.commit();

        let glass = registry.get("glass").unwrap();
        assert_eq!(glass.shared.float(FloatField::GlassOpacity), Some(0.3));
        // the built-in refraction value does not survive the replacement
        assert_eq!(glass.shared.float(FloatField::RefractionStrength), None);
        assert!(registry.contains("subtle"));
    }

    #[test]
    fn pending_is_invisible_until_commit() {
        let mut registry = PresetRegistry::new();
        let before = registry.active();
        registry.parse_one("name:frosted, blur_strength:1.0").unwrap();
        assert!(!registry.contains("frosted"));

        let after = registry.commit();
        assert!(after.contains_key("frosted"));
        assert!(!before.contains_key("frosted"));
    }

    #[test]
    fn commit_is_idempotent() {
        let mut registry = PresetRegistry::new();
        registry.clear_pending();
        registry.parse_one("name:frosted, blur_strength:1.0").unwrap();
        registry
            .parse_one("name:frosted:dark, brightness:0.7")
            .unwrap();
        let first = registry.commit();
        let second = registry.commit();
        assert_eq!(*first, *second);

        let mut expected = builtin_presets();
        expected.insert("frosted".into(), registry.pending()["frosted"].clone());
        assert_eq!(*second, expected);
    }

    #[test]
    fn failed_descriptor_does_not_touch_pending() {
        let mut registry = PresetRegistry::new();
        registry.parse_one("name:frosted, blur_strength:1.0").unwrap();
        let err = registry
            .parse_one("name:frosted, blur_strength:2.0, sparkle:1")
            .unwrap_err();
        assert_eq!(err, PresetParseError::UnknownKey("sparkle".into()));
        assert_eq!(
            registry.pending()["frosted"]
                .shared
                .float(FloatField::BlurStrength),
            Some(1.0)
        );
    }

    #[test]
    fn clear_pending_then_commit_restores_builtins() {
        let mut registry = PresetRegistry::new();
        registry.parse_one("name:frosted, blur_strength:1.0").unwrap();
        registry.commit();
        registry.clear_pending();
        let snapshot = registry.commit();
        assert_eq!(*snapshot, builtin_presets());
    }
}
