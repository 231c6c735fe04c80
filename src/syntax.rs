use once_cell::sync::Lazy;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};

use crate::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
  Plus,
  Minus,
  Times,
  Divide,
  Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
  Minus,
  Plus,
}

/// Syntax tree of a parsed expression. Names are kept as written; resolving
/// them against the evaluation vocabulary is the compiler's job.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Number(f64),
  Identifier(String),
  FunctionCall {
    name: String,
    args: Vec<Expr>,
  },
  UnaryOp {
    op: UnaryOperator,
    operand: Box<Expr>,
  },
  BinaryOp {
    op: BinaryOperator,
    left: Box<Expr>,
    right: Box<Expr>,
  },
}

// Exponentiation binds tighter than unary minus, so `-x**2` is `-(x**2)`
// and `2**-1` is still accepted.
static PRATT_PARSER: Lazy<PrattParser<Rule>> = Lazy::new(|| {
  PrattParser::new()
    .op(
      Op::infix(Rule::Add, Assoc::Left)
        | Op::infix(Rule::Subtract, Assoc::Left),
    )
    .op(
      Op::infix(Rule::Multiply, Assoc::Left)
        | Op::infix(Rule::Divide, Assoc::Left),
    )
    .op(Op::prefix(Rule::Negate) | Op::prefix(Rule::UnaryPlus))
    .op(Op::infix(Rule::Power, Assoc::Right))
});

/// Convert an `Expression` pair produced by the grammar into an [`Expr`].
pub fn pair_to_expr(pair: Pair<Rule>) -> Result<Expr, String> {
  match pair.as_rule() {
    Rule::Program => {
      let inner = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::Expression)
        .ok_or_else(|| "program without an expression".to_string())?;
      pair_to_expr(inner)
    }
    Rule::Expression => fold_expression(pair),
    _ => primary_to_expr(pair),
  }
}

fn fold_expression(pair: Pair<Rule>) -> Result<Expr, String> {
  PRATT_PARSER
    .map_primary(primary_to_expr)
    .map_prefix(|op, operand| {
      let op = match op.as_rule() {
        Rule::Negate => UnaryOperator::Minus,
        Rule::UnaryPlus => UnaryOperator::Plus,
        rule => return Err(format!("unexpected prefix operator {rule:?}")),
      };
      Ok(Expr::UnaryOp {
        op,
        operand: Box::new(operand?),
      })
    })
    .map_infix(|left, op, right| {
      let op = match op.as_rule() {
        Rule::Add => BinaryOperator::Plus,
        Rule::Subtract => BinaryOperator::Minus,
        Rule::Multiply => BinaryOperator::Times,
        Rule::Divide => BinaryOperator::Divide,
        Rule::Power => BinaryOperator::Power,
        rule => return Err(format!("unexpected infix operator {rule:?}")),
      };
      Ok(Expr::BinaryOp {
        op,
        left: Box::new(left?),
        right: Box::new(right?),
      })
    })
    .parse(pair.into_inner())
}

fn primary_to_expr(pair: Pair<Rule>) -> Result<Expr, String> {
  match pair.as_rule() {
    Rule::Number => pair
      .as_str()
      .parse::<f64>()
      .map(Expr::Number)
      .map_err(|e| format!("invalid number '{}': {e}", pair.as_str())),
    Rule::Identifier => Ok(Expr::Identifier(pair.as_str().to_string())),
    Rule::FunctionCall => {
      let mut inner = pair.into_inner();
      let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| "function call without a name".to_string())?;
      let args = inner.map(pair_to_expr).collect::<Result<Vec<_>, _>>()?;
      Ok(Expr::FunctionCall { name, args })
    }
    Rule::Expression => fold_expression(pair),
    rule => Err(format!("unexpected rule {rule:?}")),
  }
}

/// Render an expression back to text, fully parenthesized.
pub fn expr_to_string(expr: &Expr) -> String {
  match expr {
    Expr::Number(n) => n.to_string(),
    Expr::Identifier(name) => name.clone(),
    Expr::FunctionCall { name, args } => {
      let args: Vec<String> = args.iter().map(expr_to_string).collect();
      format!("{name}({})", args.join(", "))
    }
    Expr::UnaryOp { op, operand } => {
      let sign = match op {
        UnaryOperator::Minus => "-",
        UnaryOperator::Plus => "+",
      };
      format!("{sign}{}", expr_to_string(operand))
    }
    Expr::BinaryOp { op, left, right } => {
      let symbol = match op {
        BinaryOperator::Plus => "+",
        BinaryOperator::Minus => "-",
        BinaryOperator::Times => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Power => "**",
      };
      format!("({} {symbol} {})", expr_to_string(left), expr_to_string(right))
    }
  }
}
