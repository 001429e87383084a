//! Series identity definitions.

use std::{fmt, str::FromStr};

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Unique identifier of a financial entity (equity, bond, portfolio, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
pub struct Uid(pub String);

impl Uid {
    /// Create a new uid.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Uid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Uid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Integer code of a series kind (price, dividend, fundamental metric).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
pub struct DtypeCode(pub i64);

impl DtypeCode {
    /// Create a new datatype code.
    #[must_use]
    pub const fn new(code: i64) -> Self {
        Self(code)
    }
}

/// Identity of one stored series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Entity the series belongs to.
    pub uid: Uid,
    /// Kind of series.
    pub dtype: DtypeCode,
}

impl SeriesKey {
    /// Create a new series key.
    #[must_use]
    pub fn new(uid: impl Into<Uid>, dtype: i64) -> Self {
        Self { uid: uid.into(), dtype: DtypeCode(dtype) }
    }

    /// Create a key from already-typed parts.
    #[must_use]
    pub const fn from_parts(uid: Uid, dtype: DtypeCode) -> Self {
        Self { uid, dtype }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.dtype)
    }
}

/// Error parsing a [`SeriesKey`] or [`AssetClass`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse `{input}`: {reason}")]
pub struct ParseKeyError {
    /// Offending input.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl FromStr for SeriesKey {
    type Err = ParseKeyError;

    /// Parse `uid:dtype`. The split happens on the last colon so uids may
    /// themselves contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (uid, dtype) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseKeyError { input: s.to_string(), reason: "expected uid:dtype" })?;
        if uid.is_empty() {
            return Err(ParseKeyError { input: s.to_string(), reason: "empty uid" });
        }
        let dtype = dtype
            .trim()
            .parse::<i64>()
            .map_err(|_| ParseKeyError { input: s.to_string(), reason: "dtype is not an integer" })?;
        Ok(Self::new(uid.trim(), dtype))
    }
}

/// Asset class of an entity, which decides the table its series live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Listed equity.
    Equity,
    /// Bond.
    Bond,
    /// Foreign exchange pair.
    Fx,
    /// Interest rate.
    Rate,
    /// Market index.
    Index,
    /// Series derived from other series (portfolios, synthetic indices).
    DerivedSeries,
    /// Company-level fundamentals.
    CompanyFundamentals,
}

impl AssetClass {
    /// All asset classes.
    pub const ALL: [Self; 7] = [
        Self::Equity,
        Self::Bond,
        Self::Fx,
        Self::Rate,
        Self::Index,
        Self::DerivedSeries,
        Self::CompanyFundamentals,
    ];

    /// Name of the table holding this class's time series.
    #[must_use]
    pub const fn ts_table(&self) -> &'static str {
        match self {
            Self::Equity => "EquityTS",
            Self::Bond => "BondTS",
            Self::Fx => "FxTS",
            Self::Rate => "RateTS",
            Self::Index => "IndexTS",
            Self::DerivedSeries => "DerivedSeriesTS",
            Self::CompanyFundamentals => "CompanyFundamentals",
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Bond => "bond",
            Self::Fx => "fx",
            Self::Rate => "rate",
            Self::Index => "index",
            Self::DerivedSeries => "derived",
            Self::CompanyFundamentals => "fundamentals",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetClass {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == lower || c.ts_table().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| ParseKeyError { input: s.to_string(), reason: "unknown asset class" })
    }
}
