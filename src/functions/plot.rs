use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

use crate::functions::color::Rgba;
use crate::functions::render_request::{Geometry, RenderRequest, RenderStyle};

/// Point sizes and line widths are given in pixels at this resolution and
/// scale linearly with the export DPI.
pub const BASE_DPI: f64 = 100.0;
pub const MIN_DPI: u32 = 10;
pub const MAX_DPI: u32 = 1200;
/// Largest width or height, in pixels, an export may have.
pub const MAX_PIXELS_PER_SIDE: u32 = 16_384;
/// Fraction of the data range added on each side of the view.
const VIEW_PADDING: f64 = 0.04;

#[derive(Error, Debug)]
pub enum RenderError {
  #[error("render backend failed: {0}")]
  Backend(String),
  #[error("dpi {0} is outside 10..=1200")]
  InvalidDpi(u32),
  #[error("image size {width}x{height} px cannot be drawn")]
  InvalidSize { width: u32, height: u32 },
  #[error("PNG encoding failed: {0}")]
  Encode(#[from] image::ImageError),
  #[error("unknown export format '{0}' (expected png or svg)")]
  UnknownFormat(String),
}

fn backend_error<E>(err: DrawingAreaErrorKind<E>) -> RenderError
where
  E: std::error::Error + Send + Sync,
{
  RenderError::Backend(err.to_string())
}

/// Consumer of finished render requests.
pub trait RenderSink {
  type Image;

  fn render(&mut self, request: RenderRequest)
    -> Result<Self::Image, RenderError>;
}

/// Render sink producing [`Figure`]s of a fixed physical size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRenderer {
  /// Width and height in inches.
  pub figure_size: (f64, f64),
}

impl RenderSink for PlotRenderer {
  type Image = Figure;

  fn render(&mut self, request: RenderRequest) -> Result<Figure, RenderError> {
    Ok(Figure::new(request, self.figure_size))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
  Png,
  Svg,
}

impl ExportFormat {
  /// Guess the format from a file extension.
  pub fn from_path(path: &Path) -> Option<Self> {
    path.extension()?.to_str()?.parse().ok()
  }
}

impl fmt::Display for ExportFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExportFormat::Png => f.write_str("png"),
      ExportFormat::Svg => f.write_str("svg"),
    }
  }
}

impl FromStr for ExportFormat {
  type Err = RenderError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "png" => Ok(ExportFormat::Png),
      "svg" => Ok(ExportFormat::Svg),
      _ => Err(RenderError::UnknownFormat(s.to_string())),
    }
  }
}

/// A rendered scene, independent of output resolution: the request plus the
/// data-space rectangle that is visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
  pub request: RenderRequest,
  pub x_range: (f64, f64),
  pub y_range: (f64, f64),
  pub size_inches: (f64, f64),
}

impl Figure {
  pub fn new(request: RenderRequest, size_inches: (f64, f64)) -> Self {
    let (x_range, y_range) = compute_view(&request.points);
    Self {
      request,
      x_range,
      y_range,
      size_inches,
    }
  }

  pub fn pixel_size(&self, dpi: u32) -> Result<(u32, u32), RenderError> {
    if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
      return Err(RenderError::InvalidDpi(dpi));
    }
    let width = (self.size_inches.0 * dpi as f64).round();
    let height = (self.size_inches.1 * dpi as f64).round();
    let max = MAX_PIXELS_PER_SIDE as f64;
    if !(1.0..=max).contains(&width) || !(1.0..=max).contains(&height) {
      return Err(RenderError::InvalidSize {
        width: width.clamp(0.0, u32::MAX as f64) as u32,
        height: height.clamp(0.0, u32::MAX as f64) as u32,
      });
    }
    Ok((width as u32, height as u32))
  }

  pub fn serialize(
    &self,
    format: ExportFormat,
    dpi: u32,
  ) -> Result<Vec<u8>, RenderError> {
    match format {
      ExportFormat::Svg => self.to_svg(dpi).map(String::into_bytes),
      ExportFormat::Png => self.to_png(dpi),
    }
  }

  pub fn to_svg(&self, dpi: u32) -> Result<String, RenderError> {
    let (width, height) = self.pixel_size(dpi)?;
    let mut buf = String::new();
    {
      let root = SVGBackend::with_string(&mut buf, (width, height))
        .into_drawing_area();
      self.draw(&root, dpi as f64 / BASE_DPI)?;
      root.present().map_err(backend_error)?;
    }
    debug!("svg {width}x{height} px, {} bytes", buf.len());
    Ok(buf)
  }

  pub fn to_png(&self, dpi: u32) -> Result<Vec<u8>, RenderError> {
    let (width, height) = self.pixel_size(dpi)?;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
      let root = BitMapBackend::with_buffer(&mut pixels, (width, height))
        .into_drawing_area();
      self.draw(&root, dpi as f64 / BASE_DPI)?;
      root.present().map_err(backend_error)?;
    }
    let image = image::RgbImage::from_raw(width, height, pixels)
      .ok_or(RenderError::InvalidSize { width, height })?;
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    debug!("png {width}x{height} px, {} bytes", bytes.len());
    Ok(bytes)
  }

  fn draw<DB: DrawingBackend>(
    &self,
    root: &DrawingArea<DB, Shift>,
    scale: f64,
  ) -> Result<(), RenderError> {
    let request = &self.request;
    root
      .fill(&request.background.to_plotters())
      .map_err(backend_error)?;

    let (x_min, x_max) = self.x_range;
    let (y_min, y_max) = self.y_range;
    let mut chart = ChartBuilder::on(root)
      .build_cartesian_2d(x_min..x_max, y_min..y_max)
      .map_err(backend_error)?;

    let size = match request.geometry {
      Geometry::PointSize(s) | Geometry::LineWidth(s) => s,
    };
    let pixels = (size * scale).round().max(1.0);
    let color_at = |i: usize| {
      request
        .colors
        .get(i)
        .copied()
        .unwrap_or(Rgba::BLACK)
        .to_plotters()
    };

    match request.style {
      RenderStyle::Points => {
        let radius = pixels as i32;
        chart
          .draw_series(request.points.iter().enumerate().map(|(i, &p)| {
            Circle::new(p, radius, color_at(i).filled())
          }))
          .map_err(backend_error)?;
      }
      RenderStyle::Lines => {
        let width = pixels as u32;
        chart
          .draw_series(
            request
              .points
              .windows(2)
              .enumerate()
              .filter(|(i, _)| request.breaks.binary_search(i).is_err())
              .map(|(i, pair)| {
                PathElement::new(
                  vec![pair[0], pair[1]],
                  color_at(i).stroke_width(width),
                )
              }),
          )
          .map_err(backend_error)?;
      }
      RenderStyle::ConnectedLine => {
        let width = pixels as u32;
        chart
          .draw_series(std::iter::once(PathElement::new(
            request.points.clone(),
            color_at(0).stroke_width(width),
          )))
          .map_err(backend_error)?;
      }
    }
    Ok(())
  }
}

/// Export sink: serialize a rendered figure.
pub fn serialize(
  figure: &Figure,
  format: ExportFormat,
  dpi: u32,
) -> Result<Vec<u8>, RenderError> {
  figure.serialize(format, dpi)
}

/// Finite bounds of the points padded by 4% per side. A flat axis gets a
/// unit half-width around its value; no finite data gives `[-1, 1]`.
fn compute_view(points: &[(f64, f64)]) -> ((f64, f64), (f64, f64)) {
  let mut x_min = f64::INFINITY;
  let mut x_max = f64::NEG_INFINITY;
  let mut y_min = f64::INFINITY;
  let mut y_max = f64::NEG_INFINITY;

  for &(x, y) in points {
    if x.is_finite() && y.is_finite() {
      x_min = x_min.min(x);
      x_max = x_max.max(x);
      y_min = y_min.min(y);
      y_max = y_max.max(y);
    }
  }

  (pad_axis(x_min, x_max), pad_axis(y_min, y_max))
}

fn pad_axis(min: f64, max: f64) -> (f64, f64) {
  if !min.is_finite() || !max.is_finite() {
    return (-1.0, 1.0);
  }
  if max - min <= f64::EPSILON * max.abs().max(1.0) {
    return (min - 1.0, max + 1.0);
  }
  let pad = (max - min) * VIEW_PADDING;
  (min - pad, max + pad)
}
