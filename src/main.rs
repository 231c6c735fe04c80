use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arabesque::evaluator::{self, Builtin, CONSTANTS};
use arabesque::functions::color::{ColorMode, Rgba};
use arabesque::functions::plot::{
  serialize, ExportFormat, PlotRenderer, RenderSink,
};
use arabesque::functions::presets::{
  Preset, PresetFunction, PresetOperation, GALLERY,
};
use arabesque::settings::{Sampling, Settings, Style};
use arabesque::{generate, SEED_RANGE};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate an image and write it to disk
  Render {
    #[command(flatten)]
    options: SettingsArgs,
    /// Output file
    #[arg(short, long, default_value = "arabesque.png")]
    output: PathBuf,
    /// png or svg; guessed from the output extension when omitted
    #[arg(long)]
    format: Option<ExportFormat>,
    /// Export resolution
    #[arg(long, default_value_t = 100)]
    dpi: u32,
    /// Also write the resolved settings, including the seed, to this file
    #[arg(long)]
    settings_out: Option<PathBuf>,
  },
  /// Print the resolved settings without rendering
  Settings {
    #[command(flatten)]
    options: SettingsArgs,
    /// Print JSON instead of the text summary
    #[arg(long)]
    json: bool,
  },
  /// Evaluate an expression at one point
  Eval {
    /// The expression to evaluate
    expression: String,
    /// Comma separated variable names
    #[arg(long, default_value = "x", value_delimiter = ',')]
    vars: Vec<String>,
    /// Comma separated values, one per variable
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    at: Vec<f64>,
    /// Seed for random()
    #[arg(long, default_value_t = 0)]
    seed: u64,
  },
  /// List built-in functions, constants and preset formulas
  Presets,
}

/// Generation options. Flags override values read from `--config`.
#[derive(Args)]
struct SettingsArgs {
  /// JSON settings file
  #[arg(long)]
  config: Option<PathBuf>,
  /// points, lines, connected_line or polar
  #[arg(long)]
  style: Option<Style>,
  /// First function (r(t) in polar style)
  #[arg(long, visible_alias = "r", allow_hyphen_values = true)]
  f1: Option<String>,
  /// Second function (theta(t) in polar style)
  #[arg(long, visible_alias = "theta", allow_hyphen_values = true)]
  f2: Option<String>,
  /// Preset for the first function, e.g. sin:+ (selects grid sampling)
  #[arg(long, conflicts_with = "f1")]
  preset1: Option<Preset>,
  /// Preset for the second function, e.g. cos:* (selects grid sampling)
  #[arg(long, conflicts_with = "f2")]
  preset2: Option<Preset>,
  /// sweep or grid
  #[arg(long)]
  sampling: Option<Sampling>,
  /// Lower and upper bound of the sweep
  #[arg(
    long,
    num_args = 2,
    value_names = ["LO", "HI"],
    allow_hyphen_values = true
  )]
  domain: Option<Vec<f64>>,
  /// Number of samples
  #[arg(short = 'n', long)]
  samples: Option<usize>,
  /// solid, linear_gradient, radial_gradient or random
  #[arg(long)]
  color_mode: Option<ColorMode>,
  #[arg(long)]
  color: Option<Rgba>,
  /// Gradient start color
  #[arg(long)]
  color1: Option<Rgba>,
  /// Gradient end color
  #[arg(long)]
  color2: Option<Rgba>,
  #[arg(long)]
  alpha: Option<f64>,
  #[arg(long)]
  point_size: Option<f64>,
  #[arg(long)]
  line_width: Option<f64>,
  #[arg(long)]
  jitter: Option<f64>,
  /// Append the reflection of every point across the horizontal axis
  #[arg(long, overrides_with = "no_mirror")]
  mirror: bool,
  /// Turn mirroring off, e.g. when the config file turns it on
  #[arg(long, overrides_with = "mirror")]
  no_mirror: bool,
  /// Rotation in degrees, 0 to 360
  #[arg(long)]
  rotation: Option<f64>,
  #[arg(long)]
  background: Option<Rgba>,
  #[arg(long)]
  seed: Option<u64>,
  /// Width and height in inches
  #[arg(long, num_args = 2, value_names = ["W", "H"])]
  figure_size: Option<Vec<f64>>,
}

fn pair(values: &[f64]) -> (f64, f64) {
  (values[0], values[1])
}

impl SettingsArgs {
  fn resolve(self) -> Result<Settings> {
    let mut settings = match &self.config {
      Some(path) => Settings::load(path)
        .with_context(|| format!("loading {}", path.display()))?,
      None => Settings::default(),
    };

    if let Some(style) = self.style {
      settings.style = style;
    }
    if self.preset1.is_some() || self.preset2.is_some() {
      settings.sampling = Sampling::Grid;
    }
    if let Some(expr) = self.preset1.map(Preset::expression).or(self.f1) {
      settings.f1_expr = expr;
    }
    if let Some(expr) = self.preset2.map(Preset::expression).or(self.f2) {
      settings.f2_expr = expr;
    }
    if let Some(sampling) = self.sampling {
      settings.sampling = sampling;
    }
    if let Some(domain) = self.domain {
      settings.domain = pair(&domain);
    }
    if let Some(n) = self.samples {
      settings.sample_count = n;
    }
    if let Some(mode) = self.color_mode {
      settings.color_mode = mode;
    }
    if let Some(color) = self.color {
      settings.color = color;
    }
    if let Some(color) = self.color1 {
      settings.color1 = color;
    }
    if let Some(color) = self.color2 {
      settings.color2 = color;
    }
    if let Some(alpha) = self.alpha {
      settings.alpha = alpha;
    }
    if let Some(size) = self.point_size {
      settings.point_size = size;
    }
    if let Some(width) = self.line_width {
      settings.line_width = width;
    }
    if let Some(jitter) = self.jitter {
      settings.jitter = jitter;
    }
    if self.mirror || self.no_mirror {
      settings.mirror = self.mirror;
    }
    if let Some(degrees) = self.rotation {
      settings.rotation_degrees = degrees;
    }
    if let Some(color) = self.background {
      settings.background_color = color;
    }
    if self.seed.is_some() {
      settings.seed = self.seed;
    }
    if let Some(size) = self.figure_size {
      settings.figure_size = pair(&size);
    }
    Ok(settings)
  }
}

fn output_format(path: &Path, format: Option<ExportFormat>) -> ExportFormat {
  format
    .or_else(|| ExportFormat::from_path(path))
    .unwrap_or(ExportFormat::Png)
}

fn render(
  settings: Settings,
  output: &Path,
  format: Option<ExportFormat>,
  dpi: u32,
  settings_out: Option<&Path>,
) -> Result<()> {
  let generation = generate(&settings)?;
  if generation.failed_samples > 0 {
    warn!(
      "{} of {} samples failed",
      generation.failed_samples, generation.total_samples
    );
  }
  let seed = generation.seed;

  let mut renderer = PlotRenderer {
    figure_size: settings.figure_size,
  };
  let figure = renderer.render(generation.request)?;
  let format = output_format(output, format);
  let bytes = serialize(&figure, format, dpi)?;
  fs::write(output, &bytes)
    .with_context(|| format!("writing {}", output.display()))?;
  info!("wrote {} ({format}, {} bytes)", output.display(), bytes.len());

  if let Some(path) = settings_out {
    let used = Settings {
      seed: Some(seed),
      ..settings
    };
    fs::write(path, used.to_text())
      .with_context(|| format!("writing {}", path.display()))?;
  }
  println!("Seed value to regenerate this image: {seed}");
  Ok(())
}

fn eval(
  expression: &str,
  vars: &[String],
  at: &[f64],
  seed: u64,
) -> Result<()> {
  let names: Vec<&str> = vars.iter().map(String::as_str).collect();
  if names.len() != at.len() {
    bail!("{} variable(s) but {} value(s)", names.len(), at.len());
  }
  let mut function = evaluator::compile(expression, &names, seed)?;
  match function.call(at) {
    Ok(value) => println!("{value}"),
    // A sampler would drop this point or default it to zero.
    Err(err) => println!("failed: {err}"),
  }
  Ok(())
}

fn print_presets() {
  let functions: Vec<_> = Builtin::ALL.iter().map(|b| b.name()).collect();
  let constants: Vec<_> = CONSTANTS.iter().map(|(name, _)| *name).collect();
  println!("functions: {}", functions.join(", "));
  println!("constants: {}", constants.join(", "));
  println!();
  println!("presets (grid sampling over x and y):");
  for function in PresetFunction::ALL {
    for operation in PresetOperation::ALL {
      let preset = Preset {
        function,
        operation,
      };
      println!("  {:<8} {}", preset.to_string(), preset.expression());
    }
  }
  println!();
  println!("gallery:");
  for formula in GALLERY {
    println!("  {formula}");
  }
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("info"),
  )
  .format_timestamp_micros()
  .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Render {
      options,
      output,
      format,
      dpi,
      settings_out,
    } => {
      let settings = options.resolve()?;
      if settings.seed.is_none() {
        info!(
          "no seed given, drawing one from {}..={}",
          SEED_RANGE.start(),
          SEED_RANGE.end()
        );
      }
      render(settings, &output, format, dpi, settings_out.as_deref())
    }
    Commands::Settings { options, json } => {
      let settings = options.resolve()?;
      settings.validate()?;
      if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
      } else {
        print!("{}", settings.to_text());
      }
      Ok(())
    }
    Commands::Eval {
      expression,
      vars,
      at,
      seed,
    } => eval(&expression, &vars, &at, seed),
    Commands::Presets => {
      print_presets();
      Ok(())
    }
  }
}
