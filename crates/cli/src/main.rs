#![deny(unsafe_code)]
//! CLI binary for the halftone pipeline.
//!
//! Subcommands:
//! - `preview <image>`: render a bounded preview PNG
//! - `export <image>`: render at a resolution multiplier, write PNG/JPEG/SVG
//! - `list`: print shapes, directions, mappings, color modes, blend modes, formats
//! - `settings`: print the default settings as JSON

mod error;

use chrono::Utc;
use clap::{Parser, Subcommand};
use error::CliError;
use halftone_core::{
    BlendMode, ColorMode, Compositor, Direction, GlobalShape, Mapping, MarkShape, RenderTarget,
    Settings, SourceImage,
};
use halftone_export::pixel::rgba_or_single;
use halftone_export::png::encode_png;
use halftone_export::{export, export_filename, write_export, ExportFormat, ExportKind, ExportOptions};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "halftone", about = "Halftone rendering and export")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug). Overrides RUST_LOG.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct SettingsArgs {
    /// Settings JSON file; missing keys take their defaults.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Inline settings JSON, merged over the file.
    #[arg(long)]
    set: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Render a preview (longest side at most 1280 px) as PNG.
    Preview {
        /// Source image path.
        image: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output file path.
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },
    /// Render at a resolution multiplier and write PNG, JPEG or SVG.
    Export {
        /// Source image path.
        image: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output format (png, jpg, jpeg, svg).
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Resolution multiplier (1 to 3).
        #[arg(short, long, default_value_t = 1)]
        resolution: u32,

        /// JPEG quality in [0, 1].
        #[arg(short, long, allow_negative_numbers = true)]
        quality: Option<f64>,

        /// Leave uncovered pixels transparent.
        #[arg(long)]
        transparent: bool,

        /// Output file path; defaults to halftone-<timestamp>.<ext>.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List recognized settings values and export formats.
    List,
    /// Print the default settings as JSON.
    Settings,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Shallow-merges the keys of `overlay` into `base`.
fn merge(base: &mut Map<String, Value>, overlay: Value) -> Result<(), CliError> {
    match overlay {
        Value::Object(map) => {
            base.extend(map);
            Ok(())
        }
        other => Err(CliError::Input(format!(
            "settings must be a JSON object, got {other}"
        ))),
    }
}

fn load_settings(args: &SettingsArgs) -> Result<Settings, CliError> {
    let mut merged = Map::new();
    if let Some(path) = &args.settings {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| CliError::Input(format!("invalid settings file: {e}")))?;
        merge(&mut merged, value)?;
    }
    if let Some(inline) = &args.set {
        let value: Value = serde_json::from_str(inline)
            .map_err(|e| CliError::Input(format!("invalid --set JSON: {e}")))?;
        merge(&mut merged, value)?;
    }
    Ok(Settings::from_json(&Value::Object(merged))?)
}

fn load_image(path: &Path) -> Result<SourceImage, CliError> {
    let decoded = image::open(path)
        .map_err(|e| CliError::Input(format!("cannot decode {}: {e}", path.display())))?;
    Ok(SourceImage::new(decoded.to_rgba8()))
}

fn names<T: serde::Serialize>(values: &[T]) -> Result<Vec<String>, CliError> {
    values
        .iter()
        .map(|v| match serde_json::to_value(v)? {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        })
        .collect()
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let info = json!({
                "mark_shapes": names(&MarkShape::ALL)?,
                "global_shapes": names(&GlobalShape::ALL)?,
                "directions": names(&Direction::ALL)?,
                "mappings": names(&Mapping::ALL)?,
                "color_modes": names(&ColorMode::ALL)?,
                "blend_modes": names(&BlendMode::ALL)?,
                "formats": ExportKind::list_formats(),
            });
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if let Value::Object(groups) = info {
                for (group, values) in groups {
                    let list: Vec<&str> = values
                        .as_array()
                        .map(|a| a.iter().filter_map(Value::as_str).collect())
                        .unwrap_or_default();
                    println!("{group}: {}", list.join(", "));
                }
            }
        }
        Command::Settings => {
            println!("{}", serde_json::to_string_pretty(&Settings::default())?);
        }
        Command::Preview {
            image,
            settings,
            output,
        } => {
            let settings = load_settings(&settings)?;
            let source = load_image(&image)?;
            let mut compositor = Compositor::new();
            let summary = compositor.render(&source, &settings, RenderTarget::Preview)?;
            let (width, height, rgba) = rgba_or_single(compositor.surface(), [0, 0, 0, 0]);
            write_export(&output, &encode_png(&rgba, width, height)?)?;
            info!(marks = summary.marks, "preview written");

            if cli.json {
                let info = json!({
                    "image": image.display().to_string(),
                    "width": width,
                    "height": height,
                    "marks": summary.marks,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "preview {} ({width}x{height}, {} marks) -> {}",
                    image.display(),
                    summary.marks,
                    output.display()
                );
            }
        }
        Command::Export {
            image,
            settings,
            format,
            resolution,
            quality,
            transparent,
            output,
        } => {
            let format: ExportFormat = format.parse()?;
            let settings = load_settings(&settings)?;
            let source = load_image(&image)?;
            let options = ExportOptions {
                format,
                resolution,
                transparent,
                quality,
            };
            let bytes = export(&source, &settings, &options)?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(export_filename(format, Utc::now())));
            write_export(&output, &bytes)?;
            info!(bytes = bytes.len(), %format, "export written");

            if cli.json {
                let info = json!({
                    "image": image.display().to_string(),
                    "format": format,
                    "resolution": options.effective_resolution(),
                    "bytes": bytes.len(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "exported {} as {format} at {}x ({} bytes) -> {}",
                    image.display(),
                    options.effective_resolution(),
                    bytes.len(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
