//! Market data snapshots and requirements.

use std::collections::{BTreeMap, BTreeSet};

use calibre_core::Date;
use calibre_curves::index::IborIndex;
use serde::{Deserialize, Serialize};

use crate::config::CurveConfig;
use crate::error::{CalibrationError, CalibrationResult};
use crate::ids::{ParRatesId, QuoteKey};

/// Resolved quotes for one curve, keyed by the nodes' quote keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParRates {
    rates: BTreeMap<QuoteKey, f64>,
}

impl ParRates {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate.
    #[must_use]
    pub fn with_rate(mut self, key: QuoteKey, rate: f64) -> Self {
        self.rates.insert(key, rate);
        self
    }

    /// Looks up a rate.
    #[must_use]
    pub fn rate(&self, key: &QuoteKey) -> Option<f64> {
        self.rates.get(key).copied()
    }

    /// Number of rates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if the bundle holds no rates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Assembles the bundle for `curve` from observable quotes.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::MissingMarketData`] naming the first quote
    /// key that `quotes` does not contain.
    pub fn from_quotes(curve: &CurveConfig, quotes: &BTreeMap<QuoteKey, f64>) -> CalibrationResult<Self> {
        let mut rates = BTreeMap::new();
        for key in curve.nodes().iter().filter_map(|node| node.quote_key()) {
            let rate = quotes.get(key).copied().ok_or_else(|| {
                CalibrationError::missing_market_data(format!(
                    "quote {key} for curve '{}'",
                    curve.name()
                ))
            })?;
            rates.insert(key.clone(), rate);
        }
        Ok(Self { rates })
    }
}

impl FromIterator<(QuoteKey, f64)> for ParRates {
    fn from_iter<I: IntoIterator<Item = (QuoteKey, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

/// Immutable market data at a valuation date.
///
/// Lookups that miss return [`CalibrationError::MissingMarketData`]; there
/// are no default values.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataSnapshot {
    valuation_date: Date,
    quotes: BTreeMap<QuoteKey, f64>,
    par_rates: BTreeMap<ParRatesId, ParRates>,
    fixings: BTreeMap<IborIndex, BTreeMap<Date, f64>>,
}

impl MarketDataSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new(valuation_date: Date) -> Self {
        Self {
            valuation_date,
            quotes: BTreeMap::new(),
            par_rates: BTreeMap::new(),
            fixings: BTreeMap::new(),
        }
    }

    /// Adds an observable quote.
    #[must_use]
    pub fn with_quote(mut self, key: QuoteKey, value: f64) -> Self {
        self.quotes.insert(key, value);
        self
    }

    /// Adds a par rates bundle.
    #[must_use]
    pub fn with_par_rates(mut self, id: ParRatesId, rates: ParRates) -> Self {
        self.par_rates.insert(id, rates);
        self
    }

    /// Adds a fixing of an index.
    #[must_use]
    pub fn with_fixing(mut self, index: IborIndex, date: Date, rate: f64) -> Self {
        self.fixings.entry(index).or_default().insert(date, rate);
        self
    }

    /// The valuation date.
    #[must_use]
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Looks up an observable quote.
    pub fn quote(&self, key: &QuoteKey) -> CalibrationResult<f64> {
        self.quotes
            .get(key)
            .copied()
            .ok_or_else(|| CalibrationError::missing_market_data(format!("quote {key}")))
    }

    /// All observable quotes.
    #[must_use]
    pub fn quotes(&self) -> &BTreeMap<QuoteKey, f64> {
        &self.quotes
    }

    /// Looks up a par rates bundle.
    pub fn par_rates(&self, id: &ParRatesId) -> CalibrationResult<&ParRates> {
        self.par_rates
            .get(id)
            .ok_or_else(|| CalibrationError::missing_market_data(id.to_string()))
    }

    /// Fixing series by index.
    #[must_use]
    pub fn fixings(&self) -> &BTreeMap<IborIndex, BTreeMap<Date, f64>> {
        &self.fixings
    }
}

/// Market data a configuration needs before it can be calibrated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDataRequirements {
    /// Individual quotes.
    pub observables: BTreeSet<QuoteKey>,
    /// Derived bundles, one per curve that uses market quotes.
    pub non_observables: BTreeSet<ParRatesId>,
}

impl MarketDataRequirements {
    /// Returns true if nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observables.is_empty() && self.non_observables.is_empty()
    }

    /// Descriptions of the requirements `snapshot` does not satisfy.
    #[must_use]
    pub fn missing_from(&self, snapshot: &MarketDataSnapshot) -> Vec<String> {
        let quotes = self
            .observables
            .iter()
            .filter(|key| snapshot.quote(key).is_err())
            .map(|key| format!("quote {key}"));
        let bundles = self
            .non_observables
            .iter()
            .filter(|id| snapshot.par_rates(id).is_err())
            .map(ToString::to_string);
        quotes.chain(bundles).collect()
    }

    /// Checks that `snapshot` satisfies every requirement.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::MissingMarketData`] listing every missing
    /// item.
    pub fn check(&self, snapshot: &MarketDataSnapshot) -> CalibrationResult<()> {
        let missing = self.missing_from(snapshot);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CalibrationError::missing_market_data(missing.join(", ")))
        }
    }
}
