use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use glassconfig::Theme;
use glassfx::LogicalBox;

#[derive(Parser, Debug)]
#[command(
    name = "hyprglass",
    author,
    version,
    about = "Inspect hyprglass configuration and preview the glass effect"
)]
pub struct Cli {
    /// Configuration file; defaults to `hyprglass.toml` in the config directory.
    #[arg(long, global = true, value_name = "PATH", env = "HYPRGLASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override one setting after the file is loaded (e.g. `dark:blur_strength=1.5`).
    #[arg(
        long = "set",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_assignment
    )]
    pub overrides: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the configuration, commit presets and report problems.
    Validate,
    /// List the active presets and the values they set.
    Presets,
    /// Print every resolved parameter and the tier it came from.
    Resolve(ResolveArgs),
    /// Run one capture, blur and composite over an image.
    Render(RenderArgs),
    /// Print the configuration file location.
    Where,
}

#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
    /// Preset to resolve through; defaults to the configured default preset.
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// `dark` or `light`; defaults to the configured default theme.
    #[arg(long, value_name = "THEME", value_parser = parse_theme)]
    pub theme: Option<Theme>,

    /// Surface tag (e.g. `hyprglass_theme_light`). Repeatable; tags win over
    /// `--preset` and `--theme`.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Background image standing in for the monitor contents.
    #[arg(long, value_name = "IMAGE")]
    pub input: PathBuf,

    /// Where to write the composited image.
    #[arg(long, value_name = "IMAGE")]
    pub output: PathBuf,

    /// Surface box in logical pixels: `x,y,width,height`.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub rect: LogicalBox,

    /// Monitor scale applied to the surface box.
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub scale: f64,

    /// Logical corner radius.
    #[arg(long, value_name = "PIXELS", default_value_t = 0.0)]
    pub rounding: f32,

    /// Exponent of the corner curve (2 is circular).
    #[arg(long, value_name = "POWER", default_value_t = 2.0)]
    pub rounding_power: f32,

    /// Surface opacity multiplied into the glass opacity.
    #[arg(long, value_name = "ALPHA", default_value_t = 1.0)]
    pub alpha: f32,

    /// Surface tag. Repeatable.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Render with wgpu instead of the software backend.
    #[arg(long)]
    pub gpu: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::from_name(value.trim())
        .ok_or_else(|| format!("unknown theme '{value}'; expected dark or light"))
}

pub fn parse_rect(value: &str) -> Result<LogicalBox, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid rectangle '{value}': {err}"))?;
    let [x, y, width, height] = parts[..] else {
        return Err(format!(
            "invalid rectangle '{value}'; expected x,y,width,height"
        ));
    };
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("rectangle '{value}' has no area"));
    }
    Ok(LogicalBox::new(x, y, width, height))
}

pub fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (key, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("setting name must not be empty".to_string());
    }
    Ok((key.to_string(), raw.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rectangles() {
        assert_eq!(
            parse_rect("10, 20.5,300,200"),
            Ok(LogicalBox::new(10.0, 20.5, 300.0, 200.0))
        );
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("1,2,0,4").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
    }

    #[test]
    fn parses_assignments() {
        assert_eq!(
            parse_assignment("dark:blur_strength = 1.5"),
            Ok(("dark:blur_strength".to_string(), "1.5".to_string()))
        );
        assert!(parse_assignment("blur_strength").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn render_command_collects_tags() {
        let cli = Cli::try_parse_from([
            "hyprglass",
            "render",
            "--input",
            "in.png",
            "--output",
            "out.png",
            "--rect",
            "0,0,10,10",
            "--tag",
            "hyprglass_theme_light",
            "--tag",
            "hyprglass_preset_clear",
            "--set",
            "blur_iterations=2",
        ])
        .expect("parse");
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.tags.len(), 2);
        assert!(!args.gpu);
        assert_eq!(args.scale, 1.0);
        assert_eq!(cli.overrides, vec![("blur_iterations".into(), "2".into())]);
    }

    #[test]
    fn rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["hyprglass", "resolve", "--theme", "sepia"]).is_err());
    }
}
