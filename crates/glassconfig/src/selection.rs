//! Per-surface theme and preset selection from host tags.

use crate::tier::Theme;

pub const TAG_THEME_PREFIX: &str = "hyprglass_theme_";
pub const TAG_PRESET_PREFIX: &str = "hyprglass_preset_";

/// Picks the theme for a surface. A light tag beats a dark one.
pub fn select_theme<S: AsRef<str>>(tags: &[S], default: Theme) -> Theme {
    let tagged = |theme: Theme| {
        tags.iter().any(|tag| {
            tag.as_ref()
                .strip_prefix(TAG_THEME_PREFIX)
                .is_some_and(|name| name == theme.name())
        })
    };
    if tagged(Theme::Light) {
        Theme::Light
    } else if tagged(Theme::Dark) {
        Theme::Dark
    } else {
        default
    }
}

/// Picks the preset name for a surface. The first non-empty preset tag wins.
pub fn select_preset<'a, S: AsRef<str>>(tags: &'a [S], default: &'a str) -> &'a str {
    tags.iter()
        .filter_map(|tag| tag.as_ref().strip_prefix(TAG_PRESET_PREFIX))
        .find(|name| !name.is_empty())
        .unwrap_or(default)
}
