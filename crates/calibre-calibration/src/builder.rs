//! Curve group calibration.
//!
//! All curves of a group are solved simultaneously: the parameter vector
//! holds one zero rate per node, concatenated in configuration order, and the
//! residual vector holds the present value of each node's instrument. Newton
//! iteration drives every residual to zero in the fitting space of the
//! nodes' parameter constraints.
//!
//! # Example
//!
//! ```rust
//! use calibre_calibration::prelude::*;
//! use calibre_curves::products::FraTemplate;
//!
//! let fra = |m: i32, rate: f64| {
//!     CurveNode::fixed(FraTemplate::of(m, m + 3, IborIndex::UsdLibor3M), rate)
//! };
//! let curve = CurveConfig::builder("USD")
//!     .add_nodes([fra(1, 0.003), fra(3, 0.0037), fra(6, 0.0054)])
//!     .build()
//!     .unwrap();
//! let config = CurveGroupConfig::builder("Test")
//!     .add_curve(curve, Currency::USD, IborIndex::UsdLibor3M)
//!     .build()
//!     .unwrap();
//!
//! let snapshot = MarketDataSnapshot::new(Date::from_ymd(2011, 3, 8).unwrap());
//! let group = build_curve_group(&config, &snapshot, &MarketDataFeed::default()).unwrap();
//! assert!(group.diagnostics().residual_norm < 1e-12);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use calibre_core::{Currency, Date};
use calibre_curves::curve::InterpolatedCurve;
use calibre_curves::index::IborIndex;
use calibre_curves::pricer::{DiscountingTradePricer, TradePricer};
use calibre_curves::products::Trade;
use calibre_curves::provider::CurveRatesProvider;
use calibre_math::differentiation::VectorFieldFirstOrderDifferentiator;
use calibre_math::solvers::{
    CancellationToken, NewtonConfig, NewtonVectorRootFinder, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE,
};
use calibre_math::transform::{
    LimitDirection, NonLinearTransformFunction, ParameterTransform, ParameterTransformSet,
};
use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::adapter;
use crate::config::{CurveConfig, CurveGroupConfig, ParameterConstraint};
use crate::error::{CalibrationError, CalibrationResult};
use crate::group::{CalibrationDiagnostics, CurveGroup};
use crate::ids::{CurveName, MarketDataFeed, ParRatesId};
use crate::market_data::MarketDataSnapshot;
use crate::requirements::curve_group_requirements;

/// Distance from a one-sided limit at which an out-of-domain node starts.
const LIMIT_SEED_OFFSET: f64 = 0.01;

/// Root finder settings used by curve group calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootFinderConfig {
    /// Convergence threshold on the norm of the present value vector.
    pub absolute_tolerance: f64,
    /// Maximum number of Newton steps.
    pub maximum_iterations: u32,
    /// Relative bump used for the finite-difference Jacobian.
    pub finite_difference_step: f64,
}

impl Default for RootFinderConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: DEFAULT_TOLERANCE,
            maximum_iterations: DEFAULT_MAX_ITERATIONS,
            finite_difference_step: 1e-6,
        }
    }
}

impl RootFinderConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_absolute_tolerance(mut self, tolerance: f64) -> Self {
        self.absolute_tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_maximum_iterations(mut self, iterations: u32) -> Self {
        self.maximum_iterations = iterations;
        self
    }

    /// Sets the finite-difference step.
    #[must_use]
    pub fn with_finite_difference_step(mut self, step: f64) -> Self {
        self.finite_difference_step = step;
        self
    }

    fn validate(&self) -> CalibrationResult<()> {
        if !(self.absolute_tolerance.is_finite() && self.absolute_tolerance > 0.0) {
            return Err(CalibrationError::invalid_configuration(format!(
                "tolerance must be positive, got {}",
                self.absolute_tolerance
            )));
        }
        if !(self.finite_difference_step.is_finite() && self.finite_difference_step > 0.0) {
            return Err(CalibrationError::invalid_configuration(format!(
                "finite-difference step must be positive, got {}",
                self.finite_difference_step
            )));
        }
        Ok(())
    }
}

/// Calibrates curve groups from market data.
///
/// Holds no state between calls, so one instance may serve concurrent
/// builds. The pricer is injected; [`DiscountingTradePricer`] is the default.
#[derive(Clone)]
pub struct CurveGroupMarketDataFunction {
    config: RootFinderConfig,
    pricer: Arc<dyn TradePricer>,
    cancellation: Option<CancellationToken>,
}

impl Default for CurveGroupMarketDataFunction {
    fn default() -> Self {
        Self::new(RootFinderConfig::default())
    }
}

impl std::fmt::Debug for CurveGroupMarketDataFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveGroupMarketDataFunction")
            .field("config", &self.config)
            .field("cancellation", &self.cancellation)
            .finish_non_exhaustive()
    }
}

impl CurveGroupMarketDataFunction {
    /// Creates a builder with the discounting pricer.
    #[must_use]
    pub fn new(config: RootFinderConfig) -> Self {
        Self {
            config,
            pricer: Arc::new(DiscountingTradePricer),
            cancellation: None,
        }
    }

    /// Sets the root finder configuration.
    #[must_use]
    pub fn with_root_finder_config(mut self, config: RootFinderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the pricer used to value calibration instruments.
    #[must_use]
    pub fn with_pricer(mut self, pricer: Arc<dyn TradePricer>) -> Self {
        self.pricer = pricer;
        self
    }

    /// Attaches a cancellation token, checked between Newton iterations.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The root finder configuration.
    #[must_use]
    pub fn root_finder_config(&self) -> &RootFinderConfig {
        &self.config
    }

    /// Calibrates every curve of `config` against `snapshot`.
    ///
    /// On success every node's instrument reprices to within the configured
    /// tolerance of zero against the returned group. Failures are returned,
    /// never partially applied.
    ///
    /// # Errors
    ///
    /// - [`CalibrationError::MissingMarketData`] if a required par rates
    ///   bundle or quote is absent
    /// - [`CalibrationError::InvalidConfiguration`] if node dates do not
    ///   increase within a curve
    /// - [`CalibrationError::NumericalFailure`] if the Jacobian is singular
    /// - [`CalibrationError::ConvergenceFailure`] if the iteration budget runs
    ///   out
    /// - [`CalibrationError::Cancelled`] if the token is raised
    pub fn build_curve_group(
        &self,
        config: &CurveGroupConfig,
        snapshot: &MarketDataSnapshot,
        feed: &MarketDataFeed,
    ) -> CalibrationResult<CurveGroup> {
        info!(
            group = %config.name(),
            feed = %feed,
            curves = config.entries().len(),
            nodes = config.node_count(),
            "Building curve group"
        );
        self.calibrate(config, snapshot, feed).map_err(|e| {
            warn!(group = %config.name(), kind = ?e.kind(), "Curve group calibration failed: {e}");
            e
        })
    }

    fn calibrate(
        &self,
        config: &CurveGroupConfig,
        snapshot: &MarketDataSnapshot,
        feed: &MarketDataFeed,
    ) -> CalibrationResult<CurveGroup> {
        self.config.validate()?;
        curve_group_requirements(config, feed).check(snapshot)?;

        let valuation_date = snapshot.valuation_date();
        let layout = GroupLayout::new(config, snapshot, feed)?;
        let n = layout.parameter_count();
        let transforms = ParameterTransformSet::new(
            layout.seeds.clone(),
            layout.transforms.clone(),
            vec![false; n],
        )?;
        if transforms.fitting_len() != layout.trades.len() {
            return Err(CalibrationError::invalid_configuration(format!(
                "{} free parameters for {} instruments",
                transforms.fitting_len(),
                layout.trades.len()
            )));
        }

        let pricer = self.pricer.as_ref();
        let model = |x: &DVector<f64>| -> CalibrationResult<DVector<f64>> {
            let provider = layout.provider(x.as_slice(), valuation_date)?;
            let mut residuals = DVector::zeros(layout.trades.len());
            for (i, trade) in layout.trades.iter().enumerate() {
                residuals[i] = adapter::residual(trade, &provider, pricer)?;
            }
            Ok(residuals)
        };
        let differentiator =
            VectorFieldFirstOrderDifferentiator::default().with_eps(self.config.finite_difference_step);
        let jacobian = |x: &DVector<f64>| differentiator.jacobian(&model, x);
        let fitting = NonLinearTransformFunction::new(&model, jacobian, transforms);

        let mut solver = NewtonVectorRootFinder::new(NewtonConfig::new(
            self.config.absolute_tolerance,
            self.config.maximum_iterations,
        ))
        .with_differentiator(differentiator);
        if let Some(token) = &self.cancellation {
            solver = solver.with_cancellation(token.clone());
        }

        let start = fitting.transforms().start_fitting()?;
        let solution = solver.solve(
            fitting.fitting_function(),
            Some(fitting.fitting_jacobian()),
            &start,
        )?;
        let parameters = fitting.transforms().inverse_transform(&solution.root)?;

        let curves = layout.curves(parameters.as_slice())?;
        let diagnostics = CalibrationDiagnostics {
            iterations: solution.iterations,
            residual_norm: solution.residual_norm,
        };
        info!(
            group = %config.name(),
            iterations = diagnostics.iterations,
            residual_norm = diagnostics.residual_norm,
            "Calibrated curve group"
        );

        Ok(CurveGroup::new(
            config.name().clone(),
            valuation_date,
            layout.names.iter().cloned().zip(curves).collect(),
            layout.discount.clone(),
            layout.forward.clone(),
            snapshot.fixings().clone(),
            diagnostics,
        ))
    }
}

/// Calibrates `config` with default settings and the discounting pricer.
///
/// # Errors
///
/// See [`CurveGroupMarketDataFunction::build_curve_group`].
pub fn build_curve_group(
    config: &CurveGroupConfig,
    snapshot: &MarketDataSnapshot,
    feed: &MarketDataFeed,
) -> CalibrationResult<CurveGroup> {
    CurveGroupMarketDataFunction::default().build_curve_group(config, snapshot, feed)
}

/// Everything about a group that does not depend on the parameters.
struct GroupLayout<'a> {
    names: Vec<CurveName>,
    templates: Vec<InterpolatedCurve>,
    offsets: Vec<usize>,
    trades: Vec<Trade>,
    seeds: Vec<f64>,
    transforms: Vec<ParameterTransform>,
    discount: BTreeMap<Currency, usize>,
    forward: BTreeMap<IborIndex, usize>,
    fixings: &'a BTreeMap<IborIndex, BTreeMap<Date, f64>>,
}

impl<'a> GroupLayout<'a> {
    fn new(
        config: &CurveGroupConfig,
        snapshot: &'a MarketDataSnapshot,
        feed: &MarketDataFeed,
    ) -> CalibrationResult<Self> {
        let valuation_date = snapshot.valuation_date();
        let mut layout = GroupLayout {
            names: Vec::new(),
            templates: Vec::new(),
            offsets: Vec::new(),
            trades: Vec::new(),
            seeds: Vec::new(),
            transforms: Vec::new(),
            discount: BTreeMap::new(),
            forward: BTreeMap::new(),
            fixings: snapshot.fixings(),
        };

        for (position, entry) in config.entries().iter().enumerate() {
            let curve = &entry.curve;
            let par_rates = if curve.requires_market_data() {
                let id = ParRatesId::new(config.name().clone(), curve.name().clone(), feed.clone());
                Some(snapshot.par_rates(&id)?)
            } else {
                None
            };

            let mut times = Vec::with_capacity(curve.nodes().len());
            layout.offsets.push(layout.seeds.len());
            for node in curve.nodes() {
                let rate = adapter::node_rate(node, par_rates)?;
                let transform = node.constraint.to_transform()?;
                let date = node.template.node_date(valuation_date)?;
                times.push(curve.day_count().year_fraction_f64(valuation_date, date));
                layout.trades.push(adapter::build_trade(node, valuation_date, par_rates)?);
                layout.seeds.push(seed(rate, node.constraint, &transform));
                layout.transforms.push(transform);
            }
            check_node_times(curve, &times)?;
            debug!(curve = %curve.name(), nodes = times.len(), "Laid out curve nodes");

            let values = layout.seeds[layout.offsets[position]..].to_vec();
            layout.templates.push(template_curve(curve, valuation_date, times, values)?);
            layout.names.push(curve.name().clone());
            for currency in &entry.discount_currencies {
                layout.discount.insert(*currency, position);
            }
            for index in &entry.forward_indices {
                layout.forward.insert(*index, position);
            }
        }
        Ok(layout)
    }

    fn parameter_count(&self) -> usize {
        self.seeds.len()
    }

    /// Curves at a parameter vector, in configuration order.
    fn curves(&self, parameters: &[f64]) -> CalibrationResult<Vec<Arc<InterpolatedCurve>>> {
        if let Some(i) = parameters.iter().position(|p| !p.is_finite()) {
            return Err(CalibrationError::NumericalFailure(format!(
                "parameter {i} diverged to {}",
                parameters[i]
            )));
        }
        self.templates
            .iter()
            .enumerate()
            .map(|(i, template)| {
                let start = self.offsets[i];
                let end = start + template.parameter_count();
                Ok(Arc::new(template.with_values(parameters[start..end].to_vec())?))
            })
            .collect()
    }

    fn provider(&self, parameters: &[f64], valuation_date: Date) -> CalibrationResult<CurveRatesProvider> {
        let curves = self.curves(parameters)?;
        let mut provider = CurveRatesProvider::new(valuation_date);
        for (currency, &i) in &self.discount {
            provider = provider.with_discount_curve(*currency, Arc::clone(&curves[i]));
        }
        for (index, &i) in &self.forward {
            provider = provider.with_forward_curve(*index, Arc::clone(&curves[i]));
        }
        for (index, series) in self.fixings {
            provider = provider.with_fixings(*index, series.clone());
        }
        Ok(provider)
    }
}

fn template_curve(
    curve: &CurveConfig,
    valuation_date: Date,
    times: Vec<f64>,
    values: Vec<f64>,
) -> CalibrationResult<InterpolatedCurve> {
    Ok(InterpolatedCurve::new(
        curve.name().as_str(),
        curve.day_count(),
        valuation_date,
        times,
        values,
        curve.interpolation(),
        curve.left_extrapolation(),
        curve.right_extrapolation(),
    )?)
}

fn check_node_times(curve: &CurveConfig, times: &[f64]) -> CalibrationResult<()> {
    if let Some(i) = times.iter().position(|t| !(t.is_finite() && *t > 0.0)) {
        return Err(CalibrationError::invalid_configuration(format!(
            "node {} of curve '{}' does not mature after the valuation date",
            curve.nodes()[i].label(),
            curve.name()
        )));
    }
    if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
        return Err(CalibrationError::invalid_configuration(format!(
            "node {} of curve '{}' does not mature after node {}",
            curve.nodes()[i + 1].label(),
            curve.name(),
            curve.nodes()[i].label()
        )));
    }
    Ok(())
}

/// Starting parameter for a node: its rate, moved inside the constraint's
/// domain if it lies outside.
fn seed(rate: f64, constraint: ParameterConstraint, transform: &ParameterTransform) -> f64 {
    if transform.contains(rate) {
        return rate;
    }
    match constraint {
        ParameterConstraint::Unconstrained => rate,
        ParameterConstraint::Range { lower, upper } => 0.5 * (lower + upper),
        ParameterConstraint::Limit { limit, direction } => match direction {
            LimitDirection::GreaterThan => limit + LIMIT_SEED_OFFSET,
            LimitDirection::LessThan => limit - LIMIT_SEED_OFFSET,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CurveNode;
    use crate::error::CalibrationErrorKind;
    use approx::assert_relative_eq;
    use calibre_curves::products::FraTemplate;

    fn valuation() -> Date {
        Date::from_ymd(2011, 3, 8).unwrap()
    }

    fn fra(m: i32, rate: f64) -> CurveNode {
        CurveNode::fixed(FraTemplate::of(m, m + 3, IborIndex::UsdLibor3M), rate)
    }

    fn group(nodes: Vec<CurveNode>) -> CalibrationResult<CurveGroupConfig> {
        let curve = CurveConfig::builder("USD").add_nodes(nodes).build()?;
        CurveGroupConfig::builder("Test")
            .add_curve(curve, Currency::USD, IborIndex::UsdLibor3M)
            .build()
    }

    #[test]
    fn test_root_finder_config_defaults() {
        let config = RootFinderConfig::default();
        assert_eq!(config.absolute_tolerance, 1e-12);
        assert_eq!(config.maximum_iterations, 100);
        assert_eq!(config.finite_difference_step, 1e-6);

        let config = config
            .with_absolute_tolerance(1e-8)
            .with_maximum_iterations(5)
            .with_finite_difference_step(1e-5);
        assert_eq!(config.maximum_iterations, 5);
        assert!(RootFinderConfig::new().with_absolute_tolerance(0.0).validate().is_err());
        assert!(RootFinderConfig::new().with_finite_difference_step(-1.0).validate().is_err());
    }

    #[test]
    fn test_seed_respects_constraints() {
        let range = ParameterConstraint::Range {
            lower: 0.0,
            upper: 0.1,
        };
        let limit = ParameterConstraint::Limit {
            limit: 0.0,
            direction: LimitDirection::GreaterThan,
        };
        let range_t = range.to_transform().unwrap();
        let limit_t = limit.to_transform().unwrap();

        assert_eq!(seed(0.02, range, &range_t), 0.02);
        assert_eq!(seed(0.5, range, &range_t), 0.05);
        assert_eq!(seed(-0.01, limit, &limit_t), 0.01);
        assert_eq!(seed(-0.01, ParameterConstraint::Unconstrained, &ParameterTransform::Identity), -0.01);
    }

    #[test]
    fn test_single_fra_calibrates() {
        let config = group(vec![fra(3, 0.0037)]).unwrap();
        let snapshot = MarketDataSnapshot::new(valuation());
        let group = build_curve_group(&config, &snapshot, &MarketDataFeed::default()).unwrap();

        let provider = group.rates_provider(valuation()).unwrap();
        let trade = FraTemplate::of(3, 6, IborIndex::UsdLibor3M)
            .create_trade(valuation(), 0.0037, 1.0)
            .unwrap();
        let pv = DiscountingTradePricer
            .present_value(&trade.into(), &provider)
            .unwrap();
        assert_relative_eq!(pv.amount, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unordered_nodes_are_rejected() {
        let config = group(vec![fra(6, 0.0054), fra(3, 0.0037)]).unwrap();
        let snapshot = MarketDataSnapshot::new(valuation());
        let err = build_curve_group(&config, &snapshot, &MarketDataFeed::default()).unwrap_err();
        assert_eq!(err.kind(), CalibrationErrorKind::InvalidConfiguration);
    }

    #[test]
    fn test_iteration_budget() {
        let config = group(vec![fra(1, 0.003), fra(3, 0.0037), fra(6, 0.0054)]).unwrap();
        let snapshot = MarketDataSnapshot::new(valuation());
        let function = CurveGroupMarketDataFunction::default()
            .with_root_finder_config(RootFinderConfig::new().with_maximum_iterations(0));
        let err = function
            .build_curve_group(&config, &snapshot, &MarketDataFeed::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::ConvergenceFailure { iterations: 0, .. }
        ));
    }
}
