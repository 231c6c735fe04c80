use std::f64::consts::TAU;

use log::{debug, warn};

use crate::evaluator::sample::{evaluate, Sample};
use crate::evaluator::CompiledFunction;
use crate::GenerationError;

/// What happens to a sample whose evaluation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
  /// Remove the whole point; both coordinates go together.
  Drop,
  /// Substitute `0` for the failed coordinate.
  ZeroDefault,
}

/// Points produced by one sampling pass, in sweep order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
  pub points: Vec<(f64, f64)>,
  /// Sweep index of every surviving point.
  pub indices: Vec<usize>,
  /// Number of sweep steps evaluated.
  pub total: usize,
  /// Steps where at least one of the two functions failed.
  pub failed: usize,
}

/// `n` evenly spaced values over `[lo, hi]`, both ends included.
///
/// Each value is computed from its own fraction of the range, so the
/// midpoint of a symmetric domain with odd `n` is exactly `0`.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
  match n {
    0 => Vec::new(),
    1 => vec![lo],
    _ => {
      let last = (n - 1) as f64;
      (0..n)
        .map(|i| lo + (hi - lo) * (i as f64 / last))
        .collect()
    }
  }
}

fn check_count(n: usize) -> Result<(), GenerationError> {
  if n < 2 {
    return Err(GenerationError::InvalidSampleCount(n));
  }
  Ok(())
}

fn check_domain(lo: f64, hi: f64) -> Result<(), GenerationError> {
  if !lo.is_finite() || !hi.is_finite() || lo >= hi {
    return Err(GenerationError::InvalidDomain { lo, hi });
  }
  Ok(())
}

/// Shared evaluation loop: evaluates both functions at every input tuple
/// and applies `policy` to the pair as a unit.
fn sample_pairs<I, F>(
  f1: &mut CompiledFunction,
  f2: &mut CompiledFunction,
  inputs: I,
  policy: FailurePolicy,
  mut to_point: F,
) -> Result<SampledCurve, GenerationError>
where
  I: IntoIterator<Item = Vec<f64>>,
  F: FnMut(f64, f64) -> (f64, f64),
{
  let mut curve = SampledCurve {
    points: Vec::new(),
    indices: Vec::new(),
    total: 0,
    failed: 0,
  };
  for (index, input) in inputs.into_iter().enumerate() {
    curve.total += 1;
    let a = evaluate(f1, &input);
    let b = evaluate(f2, &input);
    let failed = a.is_failed() || b.is_failed();
    if failed {
      curve.failed += 1;
    }
    match (policy, a, b) {
      (FailurePolicy::Drop, Sample::Value(a), Sample::Value(b)) => {
        curve.points.push(to_point(a, b));
        curve.indices.push(index);
      }
      (FailurePolicy::Drop, _, _) => {}
      (FailurePolicy::ZeroDefault, a, b) => {
        curve.points.push(to_point(a.or_zero(), b.or_zero()));
        curve.indices.push(index);
      }
    }
  }

  debug!(
    "sampled {} / {} ({} failed) for {} ; {}",
    curve.points.len(),
    curve.total,
    curve.failed,
    f1.source(),
    f2.source()
  );
  if curve.points.is_empty() {
    return Err(GenerationError::AllSamplesFailed {
      first: f1.source().to_string(),
      second: f2.source().to_string(),
    });
  }
  if curve.failed == curve.total {
    warn!("every sample failed; all points defaulted to zero");
  }
  Ok(curve)
}

/// Positions `i` where `indices[i]` and `indices[i + 1]` are not consecutive
/// sweep steps, i.e. segments that would bridge dropped samples.
pub fn segment_breaks(indices: &[usize]) -> Vec<usize> {
  indices
    .windows(2)
    .enumerate()
    .filter(|(_, pair)| pair[1] != pair[0] + 1)
    .map(|(i, _)| i)
    .collect()
}

/// Apply `policy` again to points that stopped being finite after sampling,
/// e.g. values near `f64::MAX` pushed past it by a rotation. `indices`
/// follows `points` under [`FailurePolicy::Drop`]. Returns the number of
/// points affected.
pub fn settle_non_finite(
  points: &mut Vec<(f64, f64)>,
  indices: &mut Vec<usize>,
  policy: FailurePolicy,
) -> usize {
  let finite = |&(a, b): &(f64, f64)| a.is_finite() && b.is_finite();
  let affected = points.iter().filter(|p| !finite(p)).count();
  if affected == 0 {
    return 0;
  }
  match policy {
    FailurePolicy::Drop => {
      let mut kept = 0;
      for i in 0..points.len() {
        if finite(&points[i]) {
          points[kept] = points[i];
          indices[kept] = indices[i];
          kept += 1;
        }
      }
      points.truncate(kept);
      indices.truncate(kept);
    }
    FailurePolicy::ZeroDefault => {
      let zeroed = |v: f64| if v.is_finite() { v } else { 0.0 };
      for (a, b) in points.iter_mut() {
        *a = zeroed(*a);
        *b = zeroed(*b);
      }
    }
  }
  warn!("{affected} transformed point(s) left the finite range");
  affected
}

/// Sweep `x` over `domain`; point `i` is `(f1(x_i), f2(x_i))`.
pub fn sample_cartesian(
  f1: &mut CompiledFunction,
  f2: &mut CompiledFunction,
  domain: (f64, f64),
  n: usize,
  policy: FailurePolicy,
) -> Result<SampledCurve, GenerationError> {
  check_count(n)?;
  check_domain(domain.0, domain.1)?;
  let xs = linspace(domain.0, domain.1, n);
  let inputs = xs.into_iter().map(|x| vec![x]);
  sample_pairs(f1, f2, inputs, policy, |a, b| (a, b))
}

/// Sweep `t` over `[0, 2π)` in `n` steps; `r(t)` and `θ(t)` become
/// `(r·cos θ, r·sin θ)`.
pub fn sample_polar(
  r: &mut CompiledFunction,
  theta: &mut CompiledFunction,
  n: usize,
  policy: FailurePolicy,
) -> Result<SampledCurve, GenerationError> {
  check_count(n)?;
  let ts = (0..n).map(move |i| vec![TAU * i as f64 / n as f64]);
  sample_pairs(r, theta, ts, policy, |r, theta| {
    (r * theta.cos(), r * theta.sin())
  })
}

/// Sweep `x` and `y` over `domain` on a square grid, row-major, keeping
/// the first `n` grid points.
pub fn sample_grid(
  f1: &mut CompiledFunction,
  f2: &mut CompiledFunction,
  domain: (f64, f64),
  n: usize,
  policy: FailurePolicy,
) -> Result<SampledCurve, GenerationError> {
  check_count(n)?;
  check_domain(domain.0, domain.1)?;
  let side = (n as f64).sqrt().ceil() as usize;
  let axis = linspace(domain.0, domain.1, side);
  let inputs = axis
    .iter()
    .flat_map(|&x| axis.iter().map(move |&y| vec![x, y]))
    .take(n)
    .collect::<Vec<_>>();
  sample_pairs(f1, f2, inputs, policy, |a, b| (a, b))
}
