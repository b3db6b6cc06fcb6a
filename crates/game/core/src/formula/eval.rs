//! Stack evaluation of postfix formulas.

use std::fmt;
use std::str::FromStr;

use super::Bindings;
use super::token::{Operator, Token};

/// Divisors with a magnitude below this are treated as zero by the float evaluator.
pub const FLOAT_ZERO_TOLERANCE: f32 = 1e-6;

/// Why a formula could not be evaluated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("malformed expression `{expression}`: {reason}")]
    MalformedExpression {
        expression: String,
        reason: Malformation,
    },

    #[error("division by zero in `{expression}`")]
    DivisionByZero { expression: String },

    #[error("integer overflow in `{expression}`")]
    Overflow { expression: String },
}

/// Structural problem found while evaluating a formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Malformation {
    UnknownToken(String),
    MissingOperands(Operator),
    /// Final stack held this many values instead of exactly one.
    LeftoverValues(usize),
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformation::UnknownToken(token) => write!(f, "unknown token `{token}`"),
            Malformation::MissingOperands(op) => {
                write!(f, "not enough operands for operator `{op}`")
            }
            Malformation::LeftoverValues(count) => {
                write!(f, "expected a single result, found {count} values")
            }
        }
    }
}

/// Arithmetic failure raised by a single operator application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticFault {
    DivisionByZero,
    Overflow,
}

/// Numeric type an evaluator entry point computes in.
pub trait Operand: Copy + Default + FromStr {
    /// Parses a numeric literal, returning `None` for anything else.
    fn parse_literal(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    fn apply(op: Operator, lhs: Self, rhs: Self) -> Result<Self, ArithmeticFault>;
}

impl Operand for i32 {
    fn apply(op: Operator, lhs: i32, rhs: i32) -> Result<i32, ArithmeticFault> {
        let result = match op {
            Operator::Add => lhs.checked_add(rhs),
            Operator::Sub => lhs.checked_sub(rhs),
            Operator::Mul => lhs.checked_mul(rhs),
            Operator::Div | Operator::Rem if rhs == 0 => {
                return Err(ArithmeticFault::DivisionByZero);
            }
            Operator::Div => lhs.checked_div(rhs),
            Operator::Rem => lhs.checked_rem(rhs),
        };
        result.ok_or(ArithmeticFault::Overflow)
    }
}

impl Operand for f32 {
    /// Only plain decimal literals count; `inf` or `NaN` are treated as names.
    fn parse_literal(raw: &str) -> Option<f32> {
        if !raw.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok().filter(|v: &f32| v.is_finite())
    }

    fn apply(op: Operator, lhs: f32, rhs: f32) -> Result<f32, ArithmeticFault> {
        match op {
            Operator::Add => Ok(lhs + rhs),
            Operator::Sub => Ok(lhs - rhs),
            Operator::Mul => Ok(lhs * rhs),
            Operator::Div | Operator::Rem if rhs.abs() < FLOAT_ZERO_TOLERANCE => {
                Err(ArithmeticFault::DivisionByZero)
            }
            Operator::Div => Ok(lhs / rhs),
            Operator::Rem => Ok(lhs % rhs),
        }
    }
}

/// Evaluates a postfix expression.
///
/// An empty expression evaluates to zero. Tokens are separated by single
/// spaces; runs of spaces produce empty tokens, which are skipped.
///
/// # Example
/// ```
/// # use game_core::formula::{Bindings, evaluate};
/// let bindings = Bindings::new().with("wave", 3);
/// let health = evaluate("95 wave 12 * + wave wave * 2 * +", &bindings).unwrap();
/// assert_eq!(health, 149);
/// ```
pub fn evaluate<T: Operand>(expression: &str, bindings: &Bindings<'_, T>) -> Result<T, FormulaError> {
    if expression.is_empty() {
        return Ok(T::default());
    }

    let malformed = |reason| FormulaError::MalformedExpression {
        expression: expression.to_owned(),
        reason,
    };

    let mut stack: Vec<T> = Vec::new();
    for raw in expression.split(' ').filter(|t| !t.is_empty()) {
        match Token::classify(raw, bindings) {
            Token::Value(value) => stack.push(value),
            Token::Operator(op) => {
                let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                    return Err(malformed(Malformation::MissingOperands(op)));
                };
                let value = T::apply(op, lhs, rhs).map_err(|fault| match fault {
                    ArithmeticFault::DivisionByZero => FormulaError::DivisionByZero {
                        expression: expression.to_owned(),
                    },
                    ArithmeticFault::Overflow => FormulaError::Overflow {
                        expression: expression.to_owned(),
                    },
                })?;
                stack.push(value);
            }
            Token::Unknown(token) => {
                return Err(malformed(Malformation::UnknownToken(token.to_owned())));
            }
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        values => Err(malformed(Malformation::LeftoverValues(values.len()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(expression: &str) -> Result<i32, FormulaError> {
        evaluate(expression, &Bindings::new())
    }

    #[test]
    fn evaluates_class_health_curve() {
        let bindings = Bindings::new().with("wave", 3);
        assert_eq!(
            evaluate("95 wave 12 * + wave wave * 2 * +", &bindings),
            Ok(149)
        );
    }

    #[test]
    fn empty_expression_is_zero() {
        assert_eq!(int(""), Ok(0));
        assert_eq!(evaluate::<f32>("", &Bindings::new()), Ok(0.0));
    }

    #[test]
    fn repeated_spaces_are_skipped() {
        assert_eq!(int("2  3   +"), Ok(5));
    }

    #[test]
    fn integer_division_truncates_toward_zero() {
        assert_eq!(int("7 2 /"), Ok(3));
        assert_eq!(int("-7 2 /"), Ok(-3));
        assert_eq!(int("7 3 %"), Ok(1));
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert!(matches!(int("5 0 /"), Err(FormulaError::DivisionByZero { .. })));
        assert!(matches!(int("5 0 %"), Err(FormulaError::DivisionByZero { .. })));
        assert!(matches!(
            evaluate::<f32>("1 0.0000001 /", &Bindings::new()),
            Err(FormulaError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn lone_operator_is_malformed() {
        assert!(matches!(
            int("+"),
            Err(FormulaError::MalformedExpression {
                reason: Malformation::MissingOperands(Operator::Add),
                ..
            })
        ));
    }

    #[test]
    fn unknown_token_and_leftovers_are_malformed() {
        assert!(matches!(
            int("power 2 *"),
            Err(FormulaError::MalformedExpression {
                reason: Malformation::UnknownToken(_),
                ..
            })
        ));
        assert!(matches!(
            int("1 2"),
            Err(FormulaError::MalformedExpression {
                reason: Malformation::LeftoverValues(2),
                ..
            })
        ));
        assert!(matches!(
            int("   "),
            Err(FormulaError::MalformedExpression {
                reason: Malformation::LeftoverValues(0),
                ..
            })
        ));
    }

    #[test]
    fn integer_overflow_is_reported() {
        assert!(matches!(
            int("2147483647 1 +"),
            Err(FormulaError::Overflow { .. })
        ));
    }

    #[test]
    fn float_evaluation_uses_fractions() {
        let bindings = Bindings::new().with("power", 10.0_f32);
        let value = evaluate("power 4 / 0.5 +", &bindings).unwrap();
        assert!((value - 3.0).abs() < 1e-6);
    }

    #[test]
    fn integer_entry_point_rejects_fractional_literals() {
        assert!(matches!(
            int("1.5 2 *"),
            Err(FormulaError::MalformedExpression { .. })
        ));
    }
}
