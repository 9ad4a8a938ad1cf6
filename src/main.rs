use clap::{Parser, Subcommand};
use stencil_crop::config::{self, CONFIG_FILENAME};
use stencil_crop::imaging::RustBackend;
use stencil_crop::{
    CropObservation, CropRegion, Cropper, FileInput, IngestOutcome, PresetName, SelectedFile,
    output,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "stencil-crop")]
#[command(about = "Crop images against layout presets and export WebP or JPEG")]
#[command(long_about = "\
Crop images against layout presets and export WebP or JPEG

The source file must be 5 MB or smaller. The crop region is given in source
pixels as LEFT,TOP,WIDTH,HEIGHT and must satisfy the preset's minimum size
(and aspect ratio, for avatar). The result is scaled down to the preset's
canvas bounds if it is larger.

Output is WebP when this machine's decoder handles WebP, JPEG otherwise.
Run 'stencil-crop capabilities' to see what was detected.

Presets:
  default   160x160 minimum, rendered up to 320x320
  avatar    160x160 minimum, square, rendered up to 640x640
  cover     1300x400 minimum, rendered up to 2600x800

Run 'stencil-crop gen-config' to generate a documented stencil-crop.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log probe results and format decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop an image and export it
    Crop {
        /// Image file to crop
        file: PathBuf,

        /// Crop region as LEFT,TOP,WIDTH,HEIGHT in source pixels
        #[arg(long, value_parser = parse_region)]
        region: CropRegion,

        /// Preset to crop against (default, avatar, cover)
        #[arg(long, value_parser = parse_preset)]
        preset: Option<PresetName>,

        /// Output file (defaults to <output_dir>/<stem>-<preset>.<ext>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List the available presets
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe WebP decode support and show the chosen output format
    Capabilities {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn parse_preset(s: &str) -> Result<PresetName, stencil_crop::UnknownPresetError> {
    s.parse()
}

fn parse_region(s: &str) -> Result<CropRegion, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid region '{s}': {e}"))?;
    match values[..] {
        [left, top, width, height] => Ok(CropRegion::new(left, top, width, height)),
        _ => Err(format!(
            "invalid region '{s}': expected LEFT,TOP,WIDTH,HEIGHT"
        )),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Crop {
            file,
            region,
            preset,
            output,
        } => {
            let config = config::load_config(&cli.config)?;
            let preset = preset.unwrap_or(config.preset);
            let mut cropper = Cropper::new(RustBackend::new(), preset)
                .prefer_modern(config.encoding.prefer_modern);

            let mut input = FileInput::new();
            input.select(SelectedFile::from_path(&file).await?);
            let image = match cropper.handle_file_change(&mut input).await {
                IngestOutcome::Loaded(image) => image,
                IngestOutcome::Failed(message) => return Err(message.into()),
                IngestOutcome::NoSelection => return Ok(()),
            };

            cropper.on_change(CropObservation {
                coordinates: Some(region),
                image: Some(Arc::clone(&image)),
            });
            let canvas = cropper.render_canvas().await?;
            let Some(artifact) = cropper.crop(Some(&canvas)).await? else {
                return Ok(());
            };

            let output_path = output.unwrap_or_else(|| {
                default_output_path(&config.output_dir, &file, preset, artifact.extension())
            });
            if let Some(parent) = output_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&output_path, &artifact.data).await?;

            // Confirm the export decodes before reporting it.
            let dimensions = artifact.with_preview(
                |path| -> Result<(u32, u32), Box<dyn std::error::Error>> {
                    Ok(image::image_dimensions(path)?)
                },
            )?;
            output::print_export(&image, preset, &region, artifact, &output_path, dimensions);
        }
        Command::Presets { json } => {
            if json {
                let presets: Vec<_> = PresetName::ALL.iter().map(|n| n.preset()).collect();
                println!("{}", serde_json::to_string_pretty(&presets)?);
            } else {
                output::print_presets();
            }
        }
        Command::Capabilities { json } => {
            let config = config::load_config(&cli.config)?;
            let cropper = Cropper::new(RustBackend::new(), config.preset)
                .prefer_modern(config.encoding.prefer_modern);
            let set = cropper.capabilities().await;
            let format = cropper.output_format().await;
            if json {
                let report = serde_json::json!({
                    "capabilities": set,
                    "output_format": format.mime_type(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_capabilities(&set, format);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `<output_dir>/<file stem>-<preset>.<ext>`
fn default_output_path(output_dir: &str, source: &Path, preset: PresetName, ext: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "crop".to_string());
    Path::new(output_dir).join(format!("{stem}-{preset}.{ext}"))
}
