//! Strategy and mode enumerations shared by configuration and the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Text written into null cells resolved with [`FillStrategy::Unknown`].
pub const UNKNOWN_SENTINEL: &str = "UNKNOWN";

/// How null cells in a summary column are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    /// Replace nulls with numeric 0.
    Zero,
    /// Replace nulls with the mean of the column's non-null values.
    Mean,
    /// Replace nulls with the median of the column's non-null values.
    Median,
    /// Replace nulls with [`UNKNOWN_SENTINEL`].
    Unknown,
    /// Leave nulls in place and warn that the column is a drop candidate.
    Drop,
    /// Leave nulls in place for downstream null-aware processing.
    Flag,
}

impl FillStrategy {
    pub const ALL: [FillStrategy; 6] = [
        Self::Zero,
        Self::Mean,
        Self::Median,
        Self::Unknown,
        Self::Drop,
        Self::Flag,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Unknown => "unknown",
            Self::Drop => "drop",
            Self::Flag => "flag",
        }
    }

    /// Whether applying this strategy removes every null from the column.
    #[must_use]
    pub const fn fills_nulls(self) -> bool {
        matches!(self, Self::Zero | Self::Mean | Self::Median | Self::Unknown)
    }

    /// Whether the strategy needs numeric values to compute its fill.
    #[must_use]
    pub const fn requires_numeric(self) -> bool {
        matches!(self, Self::Mean | Self::Median)
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| format!("unknown fill strategy '{value}'"))
    }
}

/// Whether a table write replaces the destination or appends to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    #[default]
    Replace,
    Append,
}

impl LoadMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            other => Err(format!("unknown load mode '{other}'")),
        }
    }
}
