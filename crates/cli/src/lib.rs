use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use measure_core::{
    fit_to_canvas, Availability, Command, DisplaySize, ImageSize, PointerEvent, ShapeHint,
    Snapshot, Unit, Workspace,
};
use measure_storage::{Settings, Storage};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "measure-cli")]
#[command(about = "Calibrated length, area and volume measurement on photos")]
pub struct Cli {
    /// Directory holding settings.json (defaults to the user data directory).
    #[arg(long, global = true, env = "MEASURE_SETTINGS_DIR", value_name = "DIR")]
    settings_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON script of commands and pointer events and print the result.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Image whose fitted display size defines the pointer space.
        #[arg(long, conflicts_with_all = ["width", "height"])]
        image: Option<PathBuf>,
        /// Display width in pixels.
        #[arg(long, requires = "height")]
        width: Option<f64>,
        /// Display height in pixels.
        #[arg(long, requires = "width")]
        height: Option<f64>,
    },
    /// Show or change saved defaults.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Print the effective settings as JSON.
    Show,
    /// Update and save one or more settings.
    Set {
        /// Unit symbol: mm, cm, m, in, ft or yd.
        #[arg(long)]
        unit: Option<Unit>,
        /// Real length of the reference object.
        #[arg(long)]
        known_length: Option<f64>,
        /// Depth used for volume measurements.
        #[arg(long, allow_negative_numbers = true)]
        depth: Option<f64>,
        #[arg(long, value_enum)]
        shape: Option<ShapeArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShapeArg {
    Circular,
    Rectangular,
    Elliptical,
}

impl From<ShapeArg> for ShapeHint {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Circular => ShapeHint::Circular,
            ShapeArg::Rectangular => ShapeHint::Rectangular,
            ShapeArg::Elliptical => ShapeHint::Elliptical,
        }
    }
}

/// One entry of a replay script
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Command(Command),
    Pointer(PointerEvent),
}

#[derive(Debug, Serialize)]
struct StepError {
    step: usize,
    error: String,
}

#[derive(Debug, Serialize)]
struct ReplayReport<'a> {
    display: Option<DisplaySize>,
    steps: usize,
    instructions: String,
    availability: Availability,
    state: Snapshot<'a>,
    errors: Vec<StepError>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let settings_dir = cli.settings_dir;

    match cli.command {
        Commands::Replay { script, image, width, height } => {
            let settings =
                open_storage(settings_dir)?.load_settings().context("failed to load settings")?;
            let display = match (image, width, height) {
                (Some(image), _, _) => display_for_image(&image, &settings)?,
                (None, Some(width), Some(height)) => DisplaySize::new(width, height),
                _ => DisplaySize::new(settings.canvas_max_width, settings.canvas_max_height),
            };
            if !display.is_valid() {
                anyhow::bail!(
                    "display size must be positive (got {}x{})",
                    display.width,
                    display.height
                );
            }
            run_replay(&script, display, &settings)
        }
        Commands::Settings { action: SettingsAction::Show } => {
            let settings =
                open_storage(settings_dir)?.load_settings().context("failed to load settings")?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Commands::Settings { action: SettingsAction::Set { unit, known_length, depth, shape } } => {
            let storage = open_storage(settings_dir)?;
            let mut settings = storage.load_settings().context("failed to load settings")?;
            if let Some(unit) = unit {
                settings.unit = unit;
            }
            if let Some(known_length) = known_length {
                settings.known_reference_length = known_length;
            }
            if let Some(depth) = depth {
                settings.volume_depth = depth;
            }
            if let Some(shape) = shape {
                settings.shape_hint = shape.into();
            }
            storage.save_settings(&settings).context("failed to save settings")?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_storage(settings_dir: Option<PathBuf>) -> Result<Storage> {
    match settings_dir {
        Some(dir) => Ok(Storage::with_root(dir)),
        None => Storage::from_default_project().context("failed to locate settings directory"),
    }
}

fn display_for_image(path: &Path, settings: &Settings) -> Result<DisplaySize> {
    if !path.is_file() {
        anyhow::bail!("image does not exist: {}", path.display());
    }

    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;

    let image = ImageSize { width, height };
    fit_to_canvas(image, settings.canvas_max_width, settings.canvas_max_height)
        .with_context(|| format!("image has no pixels: {}", path.display()))
}

fn run_replay(script: &Path, display: DisplaySize, settings: &Settings) -> Result<()> {
    let text = fs::read_to_string(script)
        .with_context(|| format!("failed to read script {}", script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse script {}", script.display()))?;

    let mut workspace = Workspace::new();
    for command in [
        Command::SetUnit(settings.unit),
        Command::SetKnownReferenceLength(settings.known_reference_length),
        Command::SetVolumeDepth(settings.volume_depth),
        Command::SetShapeHint(settings.shape_hint),
        Command::LoadImage(display),
    ] {
        workspace.apply(command).context("failed to apply settings")?;
    }

    let mut errors = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        let outcome = match *step {
            Step::Command(command) => workspace.apply(command),
            Step::Pointer(event) => workspace.handle_pointer(event),
        };

        match outcome {
            Ok(outcome) => log::debug!("step {index}: {outcome:?}"),
            Err(error) => errors.push(StepError { step: index, error: error.to_string() }),
        }
    }

    let report = ReplayReport {
        display: workspace.display(),
        steps: steps.len(),
        instructions: workspace.instructions(),
        availability: workspace.availability(),
        state: workspace.snapshot(),
        errors,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
