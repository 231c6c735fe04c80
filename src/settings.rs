use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::functions::color::{ColorMode, Rgba};
use crate::functions::render_request::RenderStyle;
use crate::functions::sampler::FailurePolicy;
use crate::GenerationError;

pub const MAX_SAMPLE_COUNT: usize = 1_000_000;

#[derive(Error, Debug)]
pub enum SettingsError {
  #[error("cannot read settings file: {0}")]
  Io(#[from] std::io::Error),
  #[error("invalid settings: {0}")]
  Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
  Points,
  Lines,
  ConnectedLine,
  Polar,
}

impl Style {
  /// Scatter-like styles tolerate holes and drop failed samples; the
  /// continuous styles need a value at every step and default to zero.
  pub fn failure_policy(self) -> FailurePolicy {
    match self {
      Style::Points | Style::Lines => FailurePolicy::Drop,
      Style::ConnectedLine | Style::Polar => FailurePolicy::ZeroDefault,
    }
  }

  pub fn render_style(self) -> RenderStyle {
    match self {
      Style::Points => RenderStyle::Points,
      Style::Lines | Style::Polar => RenderStyle::Lines,
      Style::ConnectedLine => RenderStyle::ConnectedLine,
    }
  }

  fn as_str(self) -> &'static str {
    match self {
      Style::Points => "points",
      Style::Lines => "lines",
      Style::ConnectedLine => "connected_line",
      Style::Polar => "polar",
    }
  }
}

impl fmt::Display for Style {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Style {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
      "points" => Ok(Style::Points),
      "lines" => Ok(Style::Lines),
      "connected_line" => Ok(Style::ConnectedLine),
      "polar" => Ok(Style::Polar),
      other => Err(format!(
        "unknown style '{other}' \
         (expected points, lines, connected_line or polar)"
      )),
    }
  }
}

/// How the Cartesian styles walk the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
  /// One variable `x` swept over the domain.
  Sweep,
  /// Two variables `x`, `y` each swept over the domain, row-major.
  Grid,
}

impl Sampling {
  pub fn variables(self) -> &'static [&'static str] {
    match self {
      Sampling::Sweep => &["x"],
      Sampling::Grid => &["x", "y"],
    }
  }
}

impl fmt::Display for Sampling {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Sampling::Sweep => f.write_str("sweep"),
      Sampling::Grid => f.write_str("grid"),
    }
  }
}

impl FromStr for Sampling {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "sweep" => Ok(Sampling::Sweep),
      "grid" => Ok(Sampling::Grid),
      other => {
        Err(format!("unknown sampling '{other}' (expected sweep or grid)"))
      }
    }
  }
}

/// Everything one generation run needs. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
  pub style: Style,
  /// First function, or the radius `r(t)` in polar style.
  #[serde(alias = "r_expr")]
  pub f1_expr: String,
  /// Second function, or the angle `theta(t)` in polar style.
  #[serde(alias = "theta_expr")]
  pub f2_expr: String,
  pub sampling: Sampling,
  pub domain: (f64, f64),
  pub sample_count: usize,
  pub color_mode: ColorMode,
  pub color: Rgba,
  pub color1: Rgba,
  pub color2: Rgba,
  pub alpha: f64,
  pub point_size: f64,
  pub line_width: f64,
  pub jitter: f64,
  pub mirror: bool,
  pub rotation_degrees: f64,
  pub background_color: Rgba,
  pub seed: Option<u64>,
  /// Width and height in inches.
  pub figure_size: (f64, f64),
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      style: Style::Points,
      f1_expr: "sin(x)".to_string(),
      f2_expr: "cos(x)".to_string(),
      sampling: Sampling::Sweep,
      domain: (-std::f64::consts::PI, std::f64::consts::PI),
      sample_count: 1000,
      color_mode: ColorMode::Solid,
      color: Rgba::from_rgb8(0x1f, 0x77, 0xb4),
      color1: Rgba::from_rgb8(0x1e, 0x88, 0xe5),
      color2: Rgba::from_rgb8(0xff, 0x7f, 0x0e),
      alpha: 0.5,
      point_size: 2.0,
      line_width: 1.0,
      jitter: 0.0,
      mirror: false,
      rotation_degrees: 0.0,
      background_color: Rgba::WHITE,
      seed: None,
      figure_size: (12.0, 10.0),
    }
  }
}

impl Settings {
  pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
    let text = std::fs::read_to_string(path)?;
    Self::from_json_str(&text)
  }

  /// Variables the two expressions are compiled over.
  pub fn variables(&self) -> &'static [&'static str] {
    match self.style {
      Style::Polar => &["t"],
      _ => self.sampling.variables(),
    }
  }

  /// Labels used in error messages for the two expressions.
  pub fn expression_labels(&self) -> (&'static str, &'static str) {
    match self.style {
      Style::Polar => ("r", "theta"),
      _ => ("f1", "f2"),
    }
  }

  /// Check every option range. Runs before any expression is compiled or
  /// sampled.
  pub fn validate(&self) -> Result<(), GenerationError> {
    if self.sample_count < 2 || self.sample_count > MAX_SAMPLE_COUNT {
      return Err(GenerationError::InvalidSampleCount(self.sample_count));
    }
    let (lo, hi) = self.domain;
    if self.style != Style::Polar
      && (!lo.is_finite() || !hi.is_finite() || lo >= hi)
    {
      return Err(GenerationError::InvalidDomain { lo, hi });
    }
    if !(0.0..=1.0).contains(&self.alpha) {
      return Err(GenerationError::InvalidAlpha(self.alpha));
    }
    if !self.jitter.is_finite() || self.jitter < 0.0 {
      return Err(GenerationError::InvalidJitter(self.jitter));
    }
    if !(0.0..=360.0).contains(&self.rotation_degrees) {
      return Err(GenerationError::InvalidRotation(self.rotation_degrees));
    }
    let sizes = [
      ("point_size", self.point_size),
      ("line_width", self.line_width),
      ("figure width", self.figure_size.0),
      ("figure height", self.figure_size.1),
    ];
    for (name, value) in sizes {
      if !value.is_finite() || value <= 0.0 {
        return Err(GenerationError::InvalidSize { name, value });
      }
    }
    Ok(())
  }

  /// Human readable `key: value` dump, one setting per line.
  pub fn to_text(&self) -> String {
    let (f1_label, f2_label) = match self.style {
      Style::Polar => ("r_expr", "theta_expr"),
      _ => ("f1_expr", "f2_expr"),
    };
    let seed = self
      .seed
      .map(|s| s.to_string())
      .unwrap_or_else(|| "random".to_string());
    let mut lines = vec![
      format!("style: {}", self.style),
      format!("{f1_label}: {}", self.f1_expr),
      format!("{f2_label}: {}", self.f2_expr),
    ];
    if self.style != Style::Polar {
      lines.push(format!("sampling: {}", self.sampling));
      lines.push(format!("domain: [{}, {}]", self.domain.0, self.domain.1));
    }
    lines.push(format!("sample_count: {}", self.sample_count));
    lines.push(format!("color_mode: {}", self.color_mode));
    match self.color_mode {
      ColorMode::Solid => lines.push(format!("color: {}", self.color)),
      ColorMode::LinearGradient | ColorMode::RadialGradient => {
        lines.push(format!("color1: {}", self.color1));
        lines.push(format!("color2: {}", self.color2));
      }
      ColorMode::Random => {}
    }
    lines.push(format!("alpha: {}", self.alpha));
    match self.style.render_style() {
      RenderStyle::Points => {
        lines.push(format!("point_size: {}", self.point_size))
      }
      RenderStyle::Lines | RenderStyle::ConnectedLine => {
        lines.push(format!("line_width: {}", self.line_width))
      }
    }
    lines.push(format!("jitter: {}", self.jitter));
    lines.push(format!("mirror: {}", self.mirror));
    lines.push(format!("rotation_degrees: {}", self.rotation_degrees));
    lines.push(format!("background_color: {}", self.background_color));
    lines.push(format!("seed: {seed}"));
    lines.push(format!(
      "figure_size: {} x {} in",
      self.figure_size.0, self.figure_size.1
    ));
    let mut text = lines.join("\n");
    text.push('\n');
    text
  }
}
