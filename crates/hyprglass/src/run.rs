use std::path::Path;

use anyhow::{bail, Context, Result};
use glassconfig::{
    reload, select_preset, select_theme, ConfigSnapshot, Field, GlassSettings, IntField,
    PresetRegistry, ReloadReport, ResolveContext, TierValues, ValueSource,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ResolveArgs};
use crate::paths::AppPaths;
use crate::render;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => AppPaths::discover()?.config_file(),
    };
    tracing::debug!(config = %config_path.display(), "resolved hyprglass config path");
    if let Command::Where = cli.command {
        println!("{}", config_path.display());
        return Ok(());
    }

    let settings = load_settings(&config_path, cli.config.is_some(), &cli.overrides)?;
    let report = reload(settings, &mut PresetRegistry::new());

    match &cli.command {
        Command::Validate => {
            print!("{}", validation_summary(&report));
            if !report.rejected.is_empty() || !report.warnings.is_empty() {
                bail!(
                    "configuration has {} rejected preset(s) and {} warning(s)",
                    report.rejected.len(),
                    report.warnings.len()
                );
            }
            Ok(())
        }
        Command::Presets => {
            print!("{}", preset_listing(&report.snapshot));
            Ok(())
        }
        Command::Resolve(args) if args.json => {
            println!("{}", resolved_json(&report.snapshot, args)?);
            Ok(())
        }
        Command::Resolve(args) => {
            print!("{}", resolved_listing(&report.snapshot, args));
            Ok(())
        }
        Command::Render(args) => render::render(&report.snapshot, args),
        Command::Where => Ok(()),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads settings from `path` and applies `--set` overrides.
///
/// A missing file falls back to defaults unless the path was given
/// explicitly.
pub(crate) fn load_settings(
    path: &Path,
    explicit: bool,
    overrides: &[(String, String)],
) -> Result<GlassSettings> {
    let mut settings = if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        GlassSettings::from_toml_str(&text)
            .with_context(|| format!("failed to parse config at {}", path.display()))?
    } else if explicit {
        bail!("config file {} does not exist", path.display());
    } else {
        tracing::info!(path = %path.display(), "no config file; using defaults");
        GlassSettings::default()
    };

    for (key, value) in overrides {
        settings
            .set_value(key, value)
            .with_context(|| format!("invalid override {key}={value}"))?;
    }
    Ok(settings)
}

fn validation_summary(report: &ReloadReport) -> String {
    let mut out = String::new();
    for (descriptor, err) in &report.rejected {
        out.push_str(&format!("rejected preset \"{descriptor}\": {err}\n"));
    }
    for warning in &report.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    if out.is_empty() {
        out.push_str(&format!(
            "ok: {} preset(s) active\n",
            report.snapshot.presets.len()
        ));
    }
    out
}

fn assigned_values(values: &TierValues) -> Vec<String> {
    Field::all()
        .filter_map(|field| match field {
            Field::Float(f) => values.float(f).map(|v| format!("{}={v}", f.key())),
            Field::Int(f) => values.int(f).map(|v| format!("{}={}", f.key(), format_int(f, v))),
        })
        .collect()
}

fn format_int(field: IntField, value: i64) -> String {
    match field {
        IntField::TintColor => format!("0x{value:08x}"),
        IntField::BlurIterations => value.to_string(),
    }
}

fn preset_listing(snapshot: &ConfigSnapshot) -> String {
    let mut out = String::new();
    for (name, preset) in snapshot.presets.iter() {
        out.push_str(name);
        if let Some(parent) = &preset.inherits {
            out.push_str(&format!(" (inherits {parent})"));
        }
        out.push('\n');
        for (label, values) in [
            ("shared", &preset.shared),
            ("dark", &preset.dark),
            ("light", &preset.light),
        ] {
            let assigned = assigned_values(values);
            if !assigned.is_empty() {
                out.push_str(&format!("  {label}: {}\n", assigned.join(", ")));
            }
        }
    }
    out
}

fn describe_source(source: &ValueSource) -> String {
    match source {
        ValueSource::Preset { name, depth: 0 } => format!("preset {name}"),
        ValueSource::Preset { name, depth } => format!("preset {name} (inherited, depth {depth})"),
        ValueSource::Theme(theme) => format!("{} tier", theme.name()),
        ValueSource::Global => "global tier".to_string(),
        ValueSource::Hardcoded => "default".to_string(),
    }
}

/// One resolved parameter as printed by `resolve`.
#[derive(Debug, Serialize)]
struct ResolvedField {
    key: &'static str,
    value: serde_json::Value,
    source: String,
    #[serde(skip)]
    display: String,
}

#[derive(Debug, Serialize)]
struct Resolved {
    preset: String,
    theme: &'static str,
    fields: Vec<ResolvedField>,
}

fn resolve_fields(snapshot: &ConfigSnapshot, args: &ResolveArgs) -> Resolved {
    let settings = &snapshot.settings;
    let theme = select_theme(args.tags.as_slice(), args.theme.unwrap_or(settings.theme()));
    let fallback = args.preset.as_deref().unwrap_or(settings.preset());
    let preset = select_preset(args.tags.as_slice(), fallback);
    let ctx = ResolveContext::new(preset, theme, &settings.tiers, &snapshot.presets);

    let fields = Field::all()
        .map(|field| {
            let (value, display, source) = match field {
                Field::Float(f) => {
                    let (value, source) = ctx.float_traced(f);
                    // f32 -> f64 widening would print 0.82 as 0.8199999928474426
                    let value = (f64::from(value) * 1e6).round() / 1e6;
                    (serde_json::json!(value), value.to_string(), source)
                }
                Field::Int(f) => {
                    let (value, source) = ctx.int_traced(f);
                    (serde_json::json!(value), format_int(f, value), source)
                }
            };
            ResolvedField {
                key: field.key(),
                value,
                source: describe_source(&source),
                display,
            }
        })
        .collect();

    Resolved {
        preset: preset.to_string(),
        theme: theme.name(),
        fields,
    }
}

fn resolved_listing(snapshot: &ConfigSnapshot, args: &ResolveArgs) -> String {
    let resolved = resolve_fields(snapshot, args);
    let mut out = format!("preset: {}\ntheme: {}\n", resolved.preset, resolved.theme);
    for field in &resolved.fields {
        out.push_str(&format!(
            "{:<20} {:<12} {}\n",
            field.key, field.display, field.source
        ));
    }
    out
}

fn resolved_json(snapshot: &ConfigSnapshot, args: &ResolveArgs) -> Result<String> {
    serde_json::to_string_pretty(&resolve_fields(snapshot, args))
        .context("failed to serialise resolved parameters")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_file_and_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hyprglass.toml");
        fs::write(
            &path,
            "blur_strength = 1.0\ndefault_theme = \"light\"\n[dark]\nbrightness = 0.7\n",
        )
        .unwrap();

        let overrides = vec![("dark:brightness".to_string(), "0.5".to_string())];
        let settings = load_settings(&path, true, &overrides).unwrap();
        assert_eq!(settings.default_theme, "light");

        let snapshot = reload(settings, &mut PresetRegistry::new()).snapshot;
        let listing = resolved_listing(
            &snapshot,
            &ResolveArgs {
                theme: Some(glassconfig::Theme::Dark),
                ..ResolveArgs::default()
            },
        );
        assert!(listing.contains("theme: dark"));
        assert!(listing.lines().any(|line| line.starts_with("brightness")
            && line.contains("0.5")
            && line.ends_with("dark tier")));
        assert!(listing
            .lines()
            .any(|line| line.starts_with("blur_strength") && line.ends_with("global tier")));
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = load_settings(&path, false, &[]).unwrap();
        assert!(settings.enabled);
        assert!(load_settings(&path, true, &[]).is_err());
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hyprglass.toml");
        fs::write(&path, "blur_strength = [").unwrap();
        let err = load_settings(&path, true, &[]).unwrap_err();
        assert!(format!("{err:#}").contains("hyprglass.toml"));
    }

    #[test]
    fn tags_pick_preset_and_theme() {
        let snapshot = ConfigSnapshot::builtin();
        let listing = resolved_listing(
            &snapshot,
            &ResolveArgs {
                preset: Some("glass".into()),
                theme: None,
                tags: vec![
                    "hyprglass_theme_light".into(),
                    "hyprglass_preset_clear".into(),
                ],
                ..ResolveArgs::default()
            },
        );
        assert!(listing.starts_with("preset: clear\ntheme: light\n"));
        assert!(listing
            .lines()
            .any(|line| line.starts_with("blur_strength") && line.contains("preset clear")));
    }

    #[test]
    fn json_output_carries_values_and_sources() {
        let text = resolved_json(
            &ConfigSnapshot::builtin(),
            &ResolveArgs {
                preset: Some("glass".into()),
                json: true,
                ..ResolveArgs::default()
            },
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["preset"], "glass");
        assert_eq!(parsed["theme"], "dark");
        let fields = parsed["fields"].as_array().unwrap();
        let iterations = fields
            .iter()
            .find(|f| f["key"] == "blur_iterations")
            .unwrap();
        assert_eq!(iterations["value"], 2);
        assert_eq!(iterations["source"], "preset glass");
    }

    #[test]
    fn tint_is_printed_as_hex() {
        assert_eq!(format_int(IntField::TintColor, 0x8899_aa22), "0x8899aa22");
        assert_eq!(format_int(IntField::BlurIterations, 3), "3");

        let listing = resolved_listing(&ConfigSnapshot::builtin(), &ResolveArgs::default());
        assert!(listing
            .lines()
            .any(|line| line.starts_with("tint_color") && line.contains("0x")));
        assert!(listing
            .lines()
            .any(|line| line.starts_with("blur_iterations") && !line.contains("0x")));
    }

    #[test]
    fn listing_shows_builtin_presets() {
        let listing = preset_listing(&ConfigSnapshot::builtin());
        for name in ["clear", "glass", "high_contrast", "subtle"] {
            assert!(listing.lines().any(|line| line == name), "{name} missing");
        }
    }

    #[test]
    fn summary_reports_rejections() {
        let settings = GlassSettings {
            presets: vec!["inherits:glass".into()],
            ..GlassSettings::default()
        };
        let report = reload(settings, &mut PresetRegistry::new());
        let summary = validation_summary(&report);
        assert!(summary.starts_with("rejected preset \"inherits:glass\""));

        let clean = reload(GlassSettings::default(), &mut PresetRegistry::new());
        assert!(validation_summary(&clean).starts_with("ok: 4 preset(s)"));
    }
}
