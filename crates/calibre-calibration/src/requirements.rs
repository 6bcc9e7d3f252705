//! Market data requirements of curve groups.

use tracing::debug;

use crate::config::{CurveGroupConfig, MarketDataConfig};
use crate::error::{CalibrationError, CalibrationResult};
use crate::ids::{CurveGroupId, MarketDataFeed, ParRatesId};
use crate::market_data::MarketDataRequirements;

/// Market data needed to calibrate `group` from `feed`.
///
/// A curve whose nodes are all fixed needs nothing. A curve with at least
/// one market-quote node needs one [`ParRatesId`] bundle for
/// `(group, curve, feed)`; the individual quotes behind the bundle are
/// resolved elsewhere and are not listed. No fixing series are required.
///
/// Pure and deterministic: the result depends only on the arguments.
#[must_use]
pub fn curve_group_requirements(group: &CurveGroupConfig, feed: &MarketDataFeed) -> MarketDataRequirements {
    let mut requirements = MarketDataRequirements::default();
    for entry in group.entries() {
        if entry.curve.requires_market_data() {
            requirements.non_observables.insert(ParRatesId::new(
                group.name().clone(),
                entry.curve.name().clone(),
                feed.clone(),
            ));
        }
    }
    debug!(
        group = %group.name(),
        feed = %feed,
        bundles = requirements.non_observables.len(),
        "Resolved curve group requirements"
    );
    requirements
}

/// Market data needed for the group identified by `id`.
///
/// # Errors
///
/// Returns [`CalibrationError::InvalidConfiguration`] if `config` has no
/// group of that name.
pub fn requirements(id: &CurveGroupId, config: &MarketDataConfig) -> CalibrationResult<MarketDataRequirements> {
    let group = config.group(&id.name).ok_or_else(|| {
        CalibrationError::invalid_configuration(format!("no curve group named '{}'", id.name))
    })?;
    Ok(curve_group_requirements(group, &id.feed))
}
