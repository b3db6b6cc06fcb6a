//! Token classification shared by the integer and float evaluators.

use super::Bindings;
use super::eval::Operand;

/// Binary arithmetic operators understood by the evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Rem,
}

/// A single classified token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token<'a, T> {
    /// Numeric literal or bound variable, already resolved to a value.
    Value(T),
    Operator(Operator),
    /// Neither a literal, a bound variable, nor an operator.
    Unknown(&'a str),
}

impl<'a, T: Operand> Token<'a, T> {
    /// Classifies `raw` in literal → variable → operator order.
    ///
    /// A lone `-` is an operator while `-3` is a literal, since literals are
    /// tried first and `-` on its own does not parse as a number.
    pub fn classify(raw: &'a str, bindings: &Bindings<'_, T>) -> Self {
        if let Some(value) = T::parse_literal(raw) {
            return Token::Value(value);
        }
        if let Some(value) = bindings.get(raw) {
            return Token::Value(value);
        }
        match raw.parse::<Operator>() {
            Ok(op) => Token::Operator(op),
            Err(_) => Token::Unknown(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_literals_variables_and_operators() {
        let bindings = Bindings::new().with("wave", 4);
        assert_eq!(Token::<i32>::classify("12", &bindings), Token::Value(12));
        assert_eq!(Token::<i32>::classify("-3", &bindings), Token::Value(-3));
        assert_eq!(Token::<i32>::classify("wave", &bindings), Token::Value(4));
        assert_eq!(
            Token::<i32>::classify("-", &bindings),
            Token::Operator(Operator::Sub)
        );
        assert_eq!(
            Token::<i32>::classify("power", &bindings),
            Token::Unknown("power")
        );
    }

    #[test]
    fn float_literals_reject_named_constants() {
        let bindings = Bindings::<f32>::new();
        assert_eq!(Token::<f32>::classify("0.5", &bindings), Token::Value(0.5));
        assert_eq!(Token::<f32>::classify("inf", &bindings), Token::Unknown("inf"));
        assert_eq!(Token::<f32>::classify("NaN", &bindings), Token::Unknown("NaN"));
    }
}
