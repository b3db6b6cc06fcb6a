//! Damage values and kinds.

use std::str::FromStr;

/// Damage kind carried by every hit.
///
/// Kinds are parsed case-insensitively from content; anything unknown falls
/// back to [`DamageKind::Arcane`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DamageKind {
    #[default]
    Arcane,
    Fire,
    Physical,
}

impl DamageKind {
    /// Parses `raw`, falling back to the default kind.
    pub fn parse_or_default(raw: &str) -> Self {
        DamageKind::from_str(raw).unwrap_or_default()
    }
}

/// A single instance of damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Damage {
    pub amount: i32,
    pub kind: DamageKind,
}

impl Damage {
    pub fn new(amount: i32, kind: DamageKind) -> Self {
        Self { amount, kind }
    }

    /// Same kind, amount scaled by `factor` and rounded to nearest.
    pub fn decayed(self, factor: f32) -> Self {
        Self {
            amount: (self.amount as f32 * factor).round() as i32,
            kind: self.kind,
        }
    }
}
