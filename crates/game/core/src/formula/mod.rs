//! Postfix (reverse-Polish) formulas over named variables.
//!
//! Every designer-tunable number in the content files is a formula such as
//! `"95 wave 12 * + wave wave * 2 * +"`. Formulas are immutable and evaluated
//! against a fresh [`Bindings`] per call, through either the integer
//! ([`Formula::eval_int`]) or float ([`Formula::eval_float`]) entry point.
mod eval;
mod token;

use std::fmt;

pub use eval::{ArithmeticFault, FLOAT_ZERO_TOLERANCE, FormulaError, Malformation, Operand, evaluate};
pub use token::{Operator, Token};

/// Variable names bound by the combat rules.
pub mod vars {
    pub const WAVE: &str = "wave";
    pub const POWER: &str = "power";
    pub const BASE: &str = "base";
}

/// Name → value map supplied to a single evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings<'a, T> {
    entries: Vec<(&'a str, T)>,
}

impl<'a, T: Copy> Bindings<'a, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder-style [`Bindings::set`].
    pub fn with(mut self, name: &'a str, value: T) -> Self {
        self.set(name, value);
        self
    }

    /// Binds `name`, replacing any previous value.
    pub fn set(&mut self, name: &'a str, value: T) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| *value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An immutable postfix formula.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Formula(String);

impl Formula {
    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }

    /// Formula that always evaluates to `value`.
    pub fn constant(value: impl fmt::Display) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn eval_int(&self, bindings: &Bindings<'_, i32>) -> Result<i32, FormulaError> {
        evaluate(&self.0, bindings)
    }

    pub fn eval_float(&self, bindings: &Bindings<'_, f32>) -> Result<f32, FormulaError> {
        evaluate(&self.0, bindings)
    }
}

impl From<&str> for Formula {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Formula {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Formula {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Content files write formulas either as strings or as bare numbers.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Formula {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FormulaVisitor;

        impl serde::de::Visitor<'_> for FormulaVisitor {
            type Value = Formula;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a postfix formula string or a number")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Formula, E> {
                Ok(Formula::new(v))
            }

            fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Formula, E> {
                Ok(Formula(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Formula, E> {
                Ok(Formula::constant(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Formula, E> {
                Ok(Formula::constant(v))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Formula, E> {
                Ok(Formula::constant(v))
            }
        }

        deserializer.deserialize_any(FormulaVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_replace_existing_names() {
        let mut bindings = Bindings::new().with(vars::WAVE, 1);
        bindings.set(vars::WAVE, 7);
        assert_eq!(bindings.get(vars::WAVE), Some(7));
        assert_eq!(bindings.get(vars::POWER), None);
    }

    #[test]
    fn constant_formulas_round_trip_through_evaluation() {
        assert_eq!(Formula::constant(42).eval_int(&Bindings::new()), Ok(42));
        assert_eq!(Formula::default().eval_int(&Bindings::new()), Ok(0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_strings_and_numbers() {
        let parsed: Vec<Formula> = serde_json::from_str(r#"["wave 2 *", 3, 0.5]"#).unwrap();
        assert_eq!(parsed[0].as_str(), "wave 2 *");
        assert_eq!(parsed[1].as_str(), "3");
        assert_eq!(parsed[2].as_str(), "0.5");
    }
}
