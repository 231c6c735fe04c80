use crate::functions::color::Rgba;
use crate::settings::Settings;

/// How the render sink draws the point sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
  /// One dot per point, one color per point.
  Points,
  /// One segment per consecutive pair, one color per segment.
  Lines,
  /// A single path through every point in a single color.
  ConnectedLine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
  PointSize(f64),
  LineWidth(f64),
}

/// Everything a render sink needs for one image. Built fresh per run and
/// handed over by value.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
  pub points: Vec<(f64, f64)>,
  pub colors: Vec<Rgba>,
  pub style: RenderStyle,
  pub geometry: Geometry,
  pub background: Rgba,
  /// `Lines` segments left undrawn, by segment index, because samples
  /// between their endpoints were dropped. Sorted; empty for other styles.
  pub breaks: Vec<usize>,
}

/// Package points with per-point `colors`, adapting the colors to the
/// render style: per-segment styles take the color of each segment's start
/// point, the connected line takes the first color only. `breaks` only
/// applies to per-segment styles.
pub fn assemble(
  points: Vec<(f64, f64)>,
  mut colors: Vec<Rgba>,
  mut breaks: Vec<usize>,
  settings: &Settings,
) -> RenderRequest {
  let style = settings.style.render_style();
  match style {
    RenderStyle::Points => breaks.clear(),
    RenderStyle::Lines => {
      colors.truncate(points.len().saturating_sub(1));
      breaks.retain(|&i| i + 1 < points.len());
    }
    RenderStyle::ConnectedLine => {
      colors.truncate(1);
      breaks.clear();
    }
  }
  let geometry = match style {
    RenderStyle::Points => Geometry::PointSize(settings.point_size),
    RenderStyle::Lines | RenderStyle::ConnectedLine => {
      Geometry::LineWidth(settings.line_width)
    }
  };
  RenderRequest {
    points,
    colors,
    style,
    geometry,
    background: settings.background_color,
    breaks,
  }
}
