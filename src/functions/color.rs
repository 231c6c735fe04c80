use std::fmt;
use std::str::FromStr;

use plotters::style::RGBAColor;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Keeps the radial parametrization finite when every point sits at the
/// same distance from the origin.
pub const RADIAL_EPSILON: f64 = 1e-10;

// ── Color ────────────────────────────────────────────────────────────────

/// RGBA color with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
  pub r: f64,
  pub g: f64,
  pub b: f64,
  pub a: f64,
}

impl Rgba {
  pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
  pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

  pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
    Self { r, g, b, a }
  }

  pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
    Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0)
  }

  /// Opaque color with every channel drawn uniformly from `rng`.
  pub fn random<R: Rng>(rng: &mut R) -> Self {
    Self::new(rng.gen(), rng.gen(), rng.gen(), 1.0)
  }

  pub fn with_alpha(mut self, a: f64) -> Self {
    self.a = a;
    self
  }

  /// Per-channel `self * (1 - t) + other * t`.
  pub fn lerp(self, other: Rgba, t: f64) -> Self {
    let mix = |from: f64, to: f64| from * (1.0 - t) + to * t;
    Self::new(
      mix(self.r, other.r),
      mix(self.g, other.g),
      mix(self.b, other.b),
      mix(self.a, other.a),
    )
  }

  fn channel_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
  }

  pub fn to_rgba8(self) -> [u8; 4] {
    [
      Self::channel_u8(self.r),
      Self::channel_u8(self.g),
      Self::channel_u8(self.b),
      Self::channel_u8(self.a),
    ]
  }

  pub(crate) fn to_plotters(self) -> RGBAColor {
    let [r, g, b, _] = self.to_rgba8();
    RGBAColor(r, g, b, self.a.clamp(0.0, 1.0))
  }
}

impl fmt::Display for Rgba {
  /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let [r, g, b, a] = self.to_rgba8();
    if a == 255 {
      write!(f, "#{r:02x}{g:02x}{b:02x}")
    } else {
      write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
  }
}

fn named_color(name: &str) -> Option<Rgba> {
  Some(match name {
    "red" => Rgba::new(1.0, 0.0, 0.0, 1.0),
    "green" => Rgba::new(0.0, 1.0, 0.0, 1.0),
    "blue" => Rgba::new(0.0, 0.0, 1.0, 1.0),
    "black" => Rgba::BLACK,
    "white" => Rgba::WHITE,
    "gray" | "grey" => Rgba::new(0.5, 0.5, 0.5, 1.0),
    "cyan" => Rgba::new(0.0, 1.0, 1.0, 1.0),
    "magenta" => Rgba::new(1.0, 0.0, 1.0, 1.0),
    "yellow" => Rgba::new(1.0, 1.0, 0.0, 1.0),
    "orange" => Rgba::new(1.0, 0.5, 0.0, 1.0),
    "purple" => Rgba::new(0.5, 0.0, 0.5, 1.0),
    "transparent" => Rgba::new(0.0, 0.0, 0.0, 0.0),
    _ => return None,
  })
}

/// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
fn parse_hex_color(s: &str) -> Option<Rgba> {
  let s = s.strip_prefix('#')?;
  if !s.is_ascii() {
    return None;
  }
  let digits: Vec<u8> = match s.len() {
    3 | 4 => s
      .chars()
      .map(|c| c.to_digit(16).map(|d| d as u8 * 17))
      .collect::<Option<_>>()?,
    6 | 8 => (0..s.len())
      .step_by(2)
      .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
      .collect::<Option<_>>()?,
    _ => return None,
  };
  let channel = |i: usize| digits.get(i).map_or(1.0, |&d| d as f64 / 255.0);
  Some(Rgba::new(channel(0), channel(1), channel(2), channel(3)))
}

impl FromStr for Rgba {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    parse_hex_color(trimmed)
      .or_else(|| named_color(&trimmed.to_ascii_lowercase()))
      .ok_or_else(|| format!("invalid color '{s}'"))
  }
}

impl TryFrom<String> for Rgba {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Rgba> for String {
  fn from(color: Rgba) -> Self {
    color.to_string()
  }
}

// ── Color mapping ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
  Solid,
  LinearGradient,
  RadialGradient,
  /// Solid color drawn from the run seed.
  Random,
}

impl fmt::Display for ColorMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ColorMode::Solid => "solid",
      ColorMode::LinearGradient => "linear_gradient",
      ColorMode::RadialGradient => "radial_gradient",
      ColorMode::Random => "random",
    })
  }
}

impl FromStr for ColorMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
      "solid" => Ok(ColorMode::Solid),
      "linear_gradient" | "linear" => Ok(ColorMode::LinearGradient),
      "radial_gradient" | "radial" => Ok(ColorMode::RadialGradient),
      "random" => Ok(ColorMode::Random),
      other => Err(format!(
        "unknown color mode '{other}' (expected solid, linear_gradient, \
         radial_gradient or random)"
      )),
    }
  }
}

/// Colors resolved from the settings for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorScheme {
  Solid(Rgba),
  Linear { start: Rgba, end: Rgba },
  Radial { start: Rgba, end: Rgba },
}

impl ColorScheme {
  /// `rng` is only drawn from in [`ColorMode::Random`].
  pub fn new<R: Rng>(
    mode: ColorMode,
    color: Rgba,
    start: Rgba,
    end: Rgba,
    rng: &mut R,
  ) -> Self {
    match mode {
      ColorMode::Solid => ColorScheme::Solid(color),
      ColorMode::LinearGradient => ColorScheme::Linear { start, end },
      ColorMode::RadialGradient => ColorScheme::Radial { start, end },
      ColorMode::Random => ColorScheme::Solid(Rgba::random(rng)),
    }
  }
}

/// One color per point. The gradient never varies opacity: `alpha`
/// replaces whatever alpha the input colors carried.
pub fn map_colors(
  points: &[(f64, f64)],
  scheme: ColorScheme,
  alpha: f64,
) -> Vec<Rgba> {
  match scheme {
    ColorScheme::Solid(color) => vec![color.with_alpha(alpha); points.len()],
    ColorScheme::Linear { start, end } => linear_positions(points.len())
      .map(|t| start.lerp(end, t).with_alpha(alpha))
      .collect(),
    ColorScheme::Radial { start, end } => radial_positions(points)
      .into_iter()
      .map(|t| start.lerp(end, t).with_alpha(alpha))
      .collect(),
  }
}

fn linear_positions(n: usize) -> impl Iterator<Item = f64> {
  let last = n.saturating_sub(1).max(1) as f64;
  (0..n).map(move |i| i as f64 / last)
}

fn radial_positions(points: &[(f64, f64)]) -> Vec<f64> {
  let distances: Vec<f64> = points.iter().map(|&(x, y)| x.hypot(y)).collect();
  let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
  let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
  distances
    .iter()
    .map(|d| (d - min) / (max - min + RADIAL_EPSILON))
    .collect()
}
