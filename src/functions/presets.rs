//! Ready-made two-variable formulas, meant for grid sampling.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetFunction {
  Sin,
  Cos,
  Tan,
  Exp,
  Sqrt,
}

impl PresetFunction {
  pub const ALL: [PresetFunction; 5] = [
    PresetFunction::Sin,
    PresetFunction::Cos,
    PresetFunction::Tan,
    PresetFunction::Exp,
    PresetFunction::Sqrt,
  ];

  pub fn name(self) -> &'static str {
    match self {
      PresetFunction::Sin => "sin",
      PresetFunction::Cos => "cos",
      PresetFunction::Tan => "tan",
      PresetFunction::Exp => "exp",
      PresetFunction::Sqrt => "sqrt",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetOperation {
  Add,
  Subtract,
  Multiply,
  Divide,
}

impl PresetOperation {
  pub const ALL: [PresetOperation; 4] = [
    PresetOperation::Add,
    PresetOperation::Subtract,
    PresetOperation::Multiply,
    PresetOperation::Divide,
  ];

  pub fn symbol(self) -> &'static str {
    match self {
      PresetOperation::Add => "+",
      PresetOperation::Subtract => "-",
      PresetOperation::Multiply => "*",
      PresetOperation::Divide => "/",
    }
  }
}

/// `f(x) op f(y)`.
pub fn preset_expression(
  function: PresetFunction,
  operation: PresetOperation,
) -> String {
  let f = function.name();
  format!("{f}(x) {} {f}(y)", operation.symbol())
}

/// A preset written as `function:operation`, e.g. `sin:*` or `exp:/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
  pub function: PresetFunction,
  pub operation: PresetOperation,
}

impl Preset {
  pub fn expression(self) -> String {
    preset_expression(self.function, self.operation)
  }
}

impl fmt::Display for Preset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.function.name(), self.operation.symbol())
  }
}

impl FromStr for Preset {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (name, symbol) = s
      .split_once(':')
      .ok_or_else(|| format!("preset '{s}' must look like 'sin:+'"))?;
    let function = PresetFunction::ALL
      .into_iter()
      .find(|f| f.name() == name.trim())
      .ok_or_else(|| format!("unknown preset function '{name}'"))?;
    let operation = PresetOperation::ALL
      .into_iter()
      .find(|o| o.symbol() == symbol.trim())
      .ok_or_else(|| format!("unknown preset operation '{symbol}'"))?;
    Ok(Preset {
      function,
      operation,
    })
  }
}

/// Named formulas offered as starting points.
pub const GALLERY: [&str; 6] = [
  "sin(x*y)",
  "cos(x+y)",
  "x*sin(y)",
  "y*cos(x)",
  "tan(x*y)",
  "x^2 - y^2",
];
