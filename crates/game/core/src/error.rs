//! Common error infrastructure for game-core.
//!
//! Domain-specific errors (e.g. [`FormulaError`], [`CasterError`]) are defined
//! in their respective modules alongside the operations that raise them.
//! [`CombatError`] gathers them for engine-level operations.
//!
//! Cast rejections (not enough mana, spell on cooldown, empty slot) are not
//! errors: they are routine outcomes reported through
//! [`crate::caster::CastOutcome`].

use crate::caster::CasterError;
use crate::events::Channel;
use crate::formula::FormulaError;
use crate::state::RelicId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry with different input
/// - **Validation**: invalid input that should be rejected without retry
/// - **Content**: authored data is broken and must be fixed before release
/// - **Internal**: unexpected state inconsistency that indicates a bug
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Content,
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Content => "content",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on who has to act, not on impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log fields and test assertions.
    fn error_code(&self) -> &'static str;
}

impl GameError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Content
    }

    fn error_code(&self) -> &'static str {
        match self {
            FormulaError::MalformedExpression { .. } => "MALFORMED_EXPRESSION",
            FormulaError::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            FormulaError::Overflow { .. } => "FORMULA_OVERFLOW",
        }
    }
}

impl GameError for CasterError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            CasterError::InvalidSlot { .. } => "INVALID_SLOT",
        }
    }
}

/// Errors surfaced by [`crate::engine::CombatEngine`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Caster(#[from] CasterError),

    #[error("{0} is not part of the relic collection")]
    UnknownRelic(RelicId),
}

/// A relic listener that failed while an event was being dispatched.
///
/// Dispatch carries on with the remaining listeners; the engine keeps the
/// failure until [`crate::engine::CombatEngine::drain_faults`] is called.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelicFault {
    pub relic: RelicId,
    pub channel: Channel,
    pub error: FormulaError,
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CombatError::Formula(e) => e.severity(),
            CombatError::Caster(e) => e.severity(),
            CombatError::UnknownRelic(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CombatError::Formula(e) => e.error_code(),
            CombatError::Caster(e) => e.error_code(),
            CombatError::UnknownRelic(_) => "UNKNOWN_RELIC",
        }
    }
}
