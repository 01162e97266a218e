use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The pressure tier a network section operates at.
///
/// A steady-state solve runs on one level at a time. Record files use the
/// conventional tier codes `BP`, `MP`, and `HP`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PressureLevel {
    /// Low pressure distribution, gauge pressures with a linear drop law.
    #[default]
    #[serde(rename = "BP", alias = "low")]
    Low,
    /// Medium pressure distribution, absolute pressures with a squared drop law.
    #[serde(rename = "MP", alias = "medium")]
    Medium,
    /// High pressure transport, absolute pressures with a squared drop law.
    #[serde(rename = "HP", alias = "high")]
    High,
}

/// Error returned when parsing an unknown pressure level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pressure level `{0}`, expected BP, MP, or HP")]
pub struct UnknownLevelError(pub String);

impl PressureLevel {
    /// The tier code used in records and logs.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Low => "BP",
            Self::Medium => "MP",
            Self::High => "HP",
        }
    }

    /// Returns `true` if the drop law works on squared absolute pressures.
    #[must_use]
    pub fn is_squared(self) -> bool {
        !matches!(self, Self::Low)
    }
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PressureLevel {
    type Err = UnknownLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bp" | "low" => Ok(Self::Low),
            "mp" | "medium" => Ok(Self::Medium),
            "hp" | "high" => Ok(Self::High),
            _ => Err(UnknownLevelError(s.to_owned())),
        }
    }
}
