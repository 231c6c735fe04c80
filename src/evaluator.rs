use std::f64::consts;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::syntax::{BinaryOperator, Expr, UnaryOperator};
use crate::CompileError;

pub mod sample;

/// Prefix accepted in front of built-in names, e.g. `math.sin(x)`.
const QUALIFIER: &str = "math.";

pub const CONSTANTS: [(&str, f64); 2] = [("pi", consts::PI), ("e", consts::E)];

/// Functions callable from an expression. This is the whole callable
/// vocabulary; there is no way to reach anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
  Sin,
  Cos,
  Tan,
  Exp,
  Log,
  Sqrt,
  Abs,
  Random,
}

impl Builtin {
  pub const ALL: [Builtin; 8] = [
    Builtin::Sin,
    Builtin::Cos,
    Builtin::Tan,
    Builtin::Exp,
    Builtin::Log,
    Builtin::Sqrt,
    Builtin::Abs,
    Builtin::Random,
  ];

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|b| b.name() == name)
  }

  pub fn name(self) -> &'static str {
    match self {
      Builtin::Sin => "sin",
      Builtin::Cos => "cos",
      Builtin::Tan => "tan",
      Builtin::Exp => "exp",
      Builtin::Log => "log",
      Builtin::Sqrt => "sqrt",
      Builtin::Abs => "abs",
      Builtin::Random => "random",
    }
  }

  pub fn arity(self) -> usize {
    match self {
      Builtin::Random => 0,
      _ => 1,
    }
  }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
  #[error("name '{0}' is not defined")]
  UnknownName(String),
  #[error("function '{0}' is not defined")]
  UnknownFunction(String),
  #[error("{function}() takes {expected} argument(s) but {found} were given")]
  WrongArity {
    function: &'static str,
    expected: usize,
    found: usize,
  },
  #[error("expected {expected} input(s), got {found}")]
  InputCount { expected: usize, found: usize },
  #[error("division by zero")]
  DivisionByZero,
  #[error("math domain error: {function}({argument})")]
  Domain {
    function: &'static str,
    argument: f64,
  },
  #[error("result is not a real number")]
  NonReal,
  #[error("numeric overflow")]
  NonFinite,
}

/// Resolved expression tree. Every leaf is a literal, an input slot, or a
/// marker for a name outside the vocabulary.
#[derive(Debug, Clone)]
enum Node {
  Constant(f64),
  Variable(usize),
  UnknownName(String),
  UnknownFunction(String),
  Call {
    function: Builtin,
    args: Vec<Node>,
  },
  Negate(Box<Node>),
  Binary {
    op: BinaryOperator,
    left: Box<Node>,
    right: Box<Node>,
  },
}

/// A compiled expression bound to an ordered list of input variables.
///
/// `random()` draws from the function's own RNG, so two functions compiled
/// from the same seed but different streams never interleave their draws.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
  source: String,
  variables: Vec<String>,
  body: Node,
  rng: ChaCha8Rng,
}

impl CompiledFunction {
  pub fn source(&self) -> &str {
    &self.source
  }

  pub fn variables(&self) -> &[String] {
    &self.variables
  }

  pub fn arity(&self) -> usize {
    self.variables.len()
  }

  /// Evaluate once. `inputs` are matched positionally to `variables()`.
  pub fn call(&mut self, inputs: &[f64]) -> Result<f64, EvalError> {
    if inputs.len() != self.variables.len() {
      return Err(EvalError::InputCount {
        expected: self.variables.len(),
        found: inputs.len(),
      });
    }
    eval_node(&self.body, inputs, &mut self.rng)
  }
}

/// Compile `expression` over `variables`, seeding `random()` from `seed`.
pub fn compile(
  expression: &str,
  variables: &[&str],
  seed: u64,
) -> Result<CompiledFunction, CompileError> {
  compile_with_rng(expression, variables, ChaCha8Rng::seed_from_u64(seed))
}

pub fn compile_with_rng(
  expression: &str,
  variables: &[&str],
  rng: ChaCha8Rng,
) -> Result<CompiledFunction, CompileError> {
  check_variables(variables)?;
  let expr = crate::parse_expression(expression)?;
  let body = resolve(&expr, variables);
  Ok(CompiledFunction {
    source: expression.trim().to_string(),
    variables: variables.iter().map(|v| v.to_string()).collect(),
    body,
    rng,
  })
}

fn check_variables(variables: &[&str]) -> Result<(), CompileError> {
  for (i, name) in variables.iter().enumerate() {
    let mut chars = name.chars();
    let well_formed = chars
      .next()
      .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
      && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    let reserved = Builtin::from_name(name).is_some()
      || CONSTANTS.iter().any(|(c, _)| c == name);
    if !well_formed || reserved || variables[..i].contains(name) {
      return Err(CompileError::InvalidVariable(name.to_string()));
    }
  }
  Ok(())
}

/// Strip the `math.` qualifier. Other dotted names stay as they are and
/// therefore never match the vocabulary.
fn unqualified(name: &str) -> &str {
  match name.strip_prefix(QUALIFIER) {
    Some(rest) if !rest.contains('.') => rest,
    _ => name,
  }
}

fn resolve(expr: &Expr, variables: &[&str]) -> Node {
  match expr {
    Expr::Number(n) => Node::Constant(*n),
    Expr::Identifier(name) => {
      if let Some(slot) = variables.iter().position(|v| v == name) {
        return Node::Variable(slot);
      }
      let bare = unqualified(name);
      match CONSTANTS.iter().find(|(c, _)| *c == bare) {
        Some((_, value)) => Node::Constant(*value),
        None => Node::UnknownName(name.clone()),
      }
    }
    Expr::FunctionCall { name, args } => {
      match Builtin::from_name(unqualified(name)) {
        Some(function) => Node::Call {
          function,
          args: args.iter().map(|a| resolve(a, variables)).collect(),
        },
        None => Node::UnknownFunction(name.clone()),
      }
    }
    Expr::UnaryOp { op, operand } => {
      let operand = resolve(operand, variables);
      match op {
        UnaryOperator::Plus => operand,
        UnaryOperator::Minus => Node::Negate(Box::new(operand)),
      }
    }
    Expr::BinaryOp { op, left, right } => Node::Binary {
      op: *op,
      left: Box::new(resolve(left, variables)),
      right: Box::new(resolve(right, variables)),
    },
  }
}

fn eval_node(
  node: &Node,
  inputs: &[f64],
  rng: &mut ChaCha8Rng,
) -> Result<f64, EvalError> {
  let value = match node {
    Node::Constant(value) => *value,
    Node::Variable(slot) => inputs[*slot],
    Node::UnknownName(name) => {
      return Err(EvalError::UnknownName(name.clone()));
    }
    Node::UnknownFunction(name) => {
      return Err(EvalError::UnknownFunction(name.clone()));
    }
    Node::Negate(operand) => -eval_node(operand, inputs, rng)?,
    Node::Call { function, args } => {
      if args.len() != function.arity() {
        return Err(EvalError::WrongArity {
          function: function.name(),
          expected: function.arity(),
          found: args.len(),
        });
      }
      match args.first() {
        None => rng.gen::<f64>(),
        Some(arg) => apply(*function, eval_node(arg, inputs, rng)?)?,
      }
    }
    Node::Binary { op, left, right } => {
      let l = eval_node(left, inputs, rng)?;
      let r = eval_node(right, inputs, rng)?;
      match op {
        BinaryOperator::Plus => l + r,
        BinaryOperator::Minus => l - r,
        BinaryOperator::Times => l * r,
        BinaryOperator::Divide => {
          if r == 0.0 {
            return Err(EvalError::DivisionByZero);
          }
          l / r
        }
        BinaryOperator::Power => power(l, r)?,
      }
    }
  };
  check_finite(value)
}

fn apply(function: Builtin, x: f64) -> Result<f64, EvalError> {
  let value = match function {
    Builtin::Sin => x.sin(),
    Builtin::Cos => x.cos(),
    Builtin::Tan => x.tan(),
    Builtin::Exp => x.exp(),
    Builtin::Log => {
      if x <= 0.0 {
        return Err(EvalError::Domain {
          function: "log",
          argument: x,
        });
      }
      x.ln()
    }
    Builtin::Sqrt => {
      if x < 0.0 {
        return Err(EvalError::Domain {
          function: "sqrt",
          argument: x,
        });
      }
      x.sqrt()
    }
    Builtin::Abs => x.abs(),
    Builtin::Random => {
      return Err(EvalError::WrongArity {
        function: "random",
        expected: 0,
        found: 1,
      });
    }
  };
  Ok(value)
}

fn power(base: f64, exponent: f64) -> Result<f64, EvalError> {
  if base == 0.0 && exponent < 0.0 {
    return Err(EvalError::DivisionByZero);
  }
  if base < 0.0 && exponent.fract() != 0.0 {
    return Err(EvalError::NonReal);
  }
  Ok(base.powf(exponent))
}

// Intermediate results must stay finite too; an overflow partway through
// fails the sample even if later arithmetic would bring it back in range.
fn check_finite(value: f64) -> Result<f64, EvalError> {
  if value.is_nan() {
    Err(EvalError::NonReal)
  } else if value.is_infinite() {
    Err(EvalError::NonFinite)
  } else {
    Ok(value)
  }
}
