use std::ops::RangeInclusive;

use log::{debug, info};
use pest::error::LineColLocation;
use pest::Parser;
use pest_derive::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub mod evaluator;
pub mod functions;
pub mod settings;
pub mod syntax;

use functions::color::{map_colors, ColorScheme};
use functions::plot::RenderError;
use functions::render_request::{assemble, RenderRequest};
use functions::sampler::{
  sample_cartesian, sample_grid, sample_polar, segment_breaks,
  settle_non_finite,
};
use functions::transform::Transform;
use settings::{Sampling, Settings, Style};

#[derive(Parser)]
#[grammar = "expression.pest"]
pub struct ExpressionParser;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
  #[error("empty expression")]
  Empty,
  #[error("cannot parse '{expression}': {message}")]
  Syntax { expression: String, message: String },
  #[error("'{0}' cannot be used as a variable name")]
  InvalidVariable(String),
  #[error("expression is too complex (more than {limit} syntax nodes)")]
  TooComplex { limit: usize },
  #[error("expression nests deeper than {limit} levels")]
  TooDeep { limit: usize },
}

#[derive(Error, Debug)]
pub enum GenerationError {
  #[error("{slot} expression: {source}")]
  Compile {
    slot: &'static str,
    #[source]
    source: CompileError,
  },
  #[error("sample count must be between 2 and 1000000, got {0}")]
  InvalidSampleCount(usize),
  #[error("domain [{lo}, {hi}] must be finite with lo < hi")]
  InvalidDomain { lo: f64, hi: f64 },
  #[error("alpha must be in [0, 1], got {0}")]
  InvalidAlpha(f64),
  #[error("jitter must be a finite value >= 0, got {0}")]
  InvalidJitter(f64),
  #[error("rotation must be in [0, 360] degrees, got {0}")]
  InvalidRotation(f64),
  #[error("{name} must be a finite value > 0, got {value}")]
  InvalidSize { name: &'static str, value: f64 },
  #[error(
    "every sample failed for '{first}' and '{second}'; \
     try different expressions"
  )]
  AllSamplesFailed { first: String, second: String },
  #[error(transparent)]
  Render(#[from] RenderError),
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  ExpressionParser::parse(Rule::Program, input).map_err(Box::new)
}

/// Largest parse tree, counted in grammar nodes, an expression may have.
/// Compilation and evaluation walk the tree recursively, so its size is
/// capped before any tree is built.
pub const MAX_SYNTAX_NODES: usize = 500;
/// Deepest parenthesis or call nesting accepted by the parser.
pub const MAX_NESTING: usize = 64;

fn nesting_depth(input: &str) -> usize {
  let mut depth = 0usize;
  let mut deepest = 0;
  for c in input.chars() {
    match c {
      '(' => {
        depth += 1;
        deepest = deepest.max(depth);
      }
      ')' => depth = depth.saturating_sub(1),
      _ => {}
    }
  }
  deepest
}

/// Parse expression text into a syntax tree.
pub fn parse_expression(input: &str) -> Result<syntax::Expr, CompileError> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(CompileError::Empty);
  }
  if nesting_depth(trimmed) > MAX_NESTING {
    return Err(CompileError::TooDeep { limit: MAX_NESTING });
  }
  let syntax_error = |message: String| CompileError::Syntax {
    expression: trimmed.to_string(),
    message,
  };
  let mut pairs = parse(input).map_err(|e| {
    let (_, col) = match e.line_col {
      LineColLocation::Pos(pos) => pos,
      LineColLocation::Span(start, _) => start,
    };
    syntax_error(format!("column {col}: {}", e.variant.message()))
  })?;
  if pairs.clone().flatten().count() > MAX_SYNTAX_NODES {
    return Err(CompileError::TooComplex {
      limit: MAX_SYNTAX_NODES,
    });
  }
  let program = pairs.next().ok_or(CompileError::Empty)?;
  syntax::pair_to_expr(program).map_err(syntax_error)
}

/// Seeds drawn for runs that do not specify one.
pub const SEED_RANGE: RangeInclusive<u64> = 1..=100_000;

// Independent random streams derived from one run seed.
const F1_STREAM: u64 = 1;
const F2_STREAM: u64 = 2;
const JITTER_STREAM: u64 = 3;
const COLOR_STREAM: u64 = 4;

/// RNG for one consumer (`stream`) of a run seeded with `seed`.
pub fn run_rng(seed: u64, stream: u64) -> ChaCha8Rng {
  let mut rng = ChaCha8Rng::seed_from_u64(seed);
  rng.set_stream(stream);
  rng
}

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
  pub request: RenderRequest,
  /// Seed actually used; feeding it back reproduces the run.
  pub seed: u64,
  pub total_samples: usize,
  pub failed_samples: usize,
}

/// Run the whole pipeline for `settings`: validate, compile, sample,
/// transform, colorize and assemble the render request.
///
/// Every run builds its own compiled functions and random streams; nothing
/// outlives the call.
pub fn generate(settings: &Settings) -> Result<Generation, GenerationError> {
  settings.validate()?;
  let seed = settings
    .seed
    .unwrap_or_else(|| rand::thread_rng().gen_range(SEED_RANGE));
  info!("generating {} image with seed {seed}", settings.style);

  let variables = settings.variables();
  let (first_slot, second_slot) = settings.expression_labels();
  let mut f1 = evaluator::compile_with_rng(
    &settings.f1_expr,
    variables,
    run_rng(seed, F1_STREAM),
  )
  .map_err(|source| GenerationError::Compile {
    slot: first_slot,
    source,
  })?;
  let mut f2 = evaluator::compile_with_rng(
    &settings.f2_expr,
    variables,
    run_rng(seed, F2_STREAM),
  )
  .map_err(|source| GenerationError::Compile {
    slot: second_slot,
    source,
  })?;

  let policy = settings.style.failure_policy();
  let n = settings.sample_count;
  let curve = match (settings.style, settings.sampling) {
    (Style::Polar, _) => sample_polar(&mut f1, &mut f2, n, policy)?,
    (_, Sampling::Sweep) => {
      sample_cartesian(&mut f1, &mut f2, settings.domain, n, policy)?
    }
    (_, Sampling::Grid) => {
      sample_grid(&mut f1, &mut f2, settings.domain, n, policy)?
    }
  };

  let transform = Transform {
    jitter: settings.jitter,
    mirror: settings.mirror,
    rotation_degrees: settings.rotation_degrees,
  };
  // The reflected half continues the sweep numbering after the original.
  let mut indices = curve.indices.clone();
  if settings.mirror {
    indices.extend(curve.indices.iter().map(|i| i + curve.total));
  }
  let mut points =
    transform.apply(curve.points, &mut run_rng(seed, JITTER_STREAM));
  settle_non_finite(&mut points, &mut indices, policy);
  if points.is_empty() {
    return Err(GenerationError::AllSamplesFailed {
      first: f1.source().to_string(),
      second: f2.source().to_string(),
    });
  }

  let scheme = ColorScheme::new(
    settings.color_mode,
    settings.color,
    settings.color1,
    settings.color2,
    &mut run_rng(seed, COLOR_STREAM),
  );
  let colors = map_colors(&points, scheme, settings.alpha);
  let request = assemble(points, colors, segment_breaks(&indices), settings);
  debug!(
    "assembled {} points, {} colors",
    request.points.len(),
    request.colors.len()
  );

  Ok(Generation {
    request,
    seed,
    total_samples: curve.total,
    failed_samples: curve.failed,
  })
}
