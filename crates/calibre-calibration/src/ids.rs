//! Identifiers for curve groups, curves, feeds, and market data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// Name of a curve group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveGroupName(String);

impl CurveGroupName {
    /// Creates the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurveGroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurveGroupName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Name of a curve within a group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveName(String);

impl CurveName {
    /// Creates the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurveName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Source of market data, e.g. a vendor feed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketDataFeed(String);

impl MarketDataFeed {
    /// Creates the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketDataFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarketDataFeed {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Default for MarketDataFeed {
    fn default() -> Self {
        Self::new("Default")
    }
}

/// Key of an observable market quote: a scheme plus a value within it.
///
/// Written as `scheme~value`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuoteKey {
    scheme: String,
    value: String,
}

impl QuoteKey {
    /// Creates a key.
    #[must_use]
    pub fn of(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Scheme of the key.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Value within the scheme.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for QuoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.scheme, self.value)
    }
}

impl FromStr for QuoteKey {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('~') {
            Some((scheme, value)) if !scheme.is_empty() && !value.is_empty() => {
                Ok(Self::of(scheme, value))
            }
            _ => Err(CalibrationError::invalid_configuration(format!(
                "quote key '{s}' is not of the form scheme~value"
            ))),
        }
    }
}

impl TryFrom<String> for QuoteKey {
    type Error = CalibrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuoteKey> for String {
    fn from(key: QuoteKey) -> Self {
        key.to_string()
    }
}

/// Identifies a curve group as sourced from a feed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurveGroupId {
    /// Group name.
    pub name: CurveGroupName,
    /// Market data feed.
    pub feed: MarketDataFeed,
}

impl CurveGroupId {
    /// Creates the identifier.
    #[must_use]
    pub fn new(name: CurveGroupName, feed: MarketDataFeed) -> Self {
        Self { name, feed }
    }
}

impl fmt::Display for CurveGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.feed)
    }
}

/// Identifies the bundle of par rates one curve needs.
///
/// This is a non-observable requirement: the bundle is assembled from
/// individual quotes outside calibration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParRatesId {
    /// Group the curve belongs to.
    pub group: CurveGroupName,
    /// Curve name.
    pub curve: CurveName,
    /// Market data feed.
    pub feed: MarketDataFeed,
}

impl ParRatesId {
    /// Creates the identifier.
    #[must_use]
    pub fn new(group: CurveGroupName, curve: CurveName, feed: MarketDataFeed) -> Self {
        Self { group, curve, feed }
    }
}

impl fmt::Display for ParRatesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParRates({}/{}/{})", self.group, self.curve, self.feed)
    }
}
