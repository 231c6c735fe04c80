use log::trace;

use super::CompiledFunction;

/// Outcome of evaluating a compiled function at one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
  Value(f64),
  Failed,
}

impl Sample {
  pub fn value(self) -> Option<f64> {
    match self {
      Sample::Value(v) => Some(v),
      Sample::Failed => None,
    }
  }

  pub fn is_failed(self) -> bool {
    matches!(self, Sample::Failed)
  }

  pub fn or_zero(self) -> f64 {
    self.value().unwrap_or(0.0)
  }
}

/// Evaluate `function` once at `inputs`. Every error and every non-finite
/// result becomes [`Sample::Failed`]; nothing escapes this boundary.
pub fn evaluate(function: &mut CompiledFunction, inputs: &[f64]) -> Sample {
  match function.call(inputs) {
    Ok(value) if value.is_finite() => Sample::Value(value),
    Ok(value) => {
      trace!("{} = {value} at {inputs:?}", function.source());
      Sample::Failed
    }
    Err(err) => {
      trace!("{} failed at {inputs:?}: {err}", function.source());
      Sample::Failed
    }
  }
}
