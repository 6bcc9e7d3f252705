//! Curve group configuration.
//!
//! Configurations are immutable once built. Node order inside a
//! [`CurveConfig`] defines the layout of the calibrated parameter vector and
//! is preserved exactly through serialization.

use std::collections::{BTreeMap, BTreeSet};

use calibre_core::daycounts::DayCountConvention;
use calibre_core::Currency;
use calibre_curves::index::IborIndex;
use calibre_curves::products::TradeTemplate;
use calibre_math::extrapolation::ExtrapolationMethod;
use calibre_math::interpolation::InterpolationMethod;
use calibre_math::transform::{LimitDirection, ParameterTransform};
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};
use crate::ids::{CurveGroupName, CurveName, QuoteKey};

/// Source of the rate a node is calibrated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeRate {
    /// A literal rate fixed in the configuration.
    Fixed(f64),
    /// A rate looked up in the market data by key.
    MarketQuote(QuoteKey),
}

/// Domain constraint on a node's curve parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ParameterConstraint {
    /// Any real value.
    #[default]
    Unconstrained,
    /// Strictly between two bounds.
    Range {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
    /// Strictly on one side of a limit.
    Limit {
        /// The limit.
        limit: f64,
        /// Side on which values lie.
        direction: LimitDirection,
    },
}

impl ParameterConstraint {
    /// The transform enforcing this constraint.
    pub fn to_transform(&self) -> CalibrationResult<ParameterTransform> {
        let transform = match *self {
            ParameterConstraint::Unconstrained => ParameterTransform::Identity,
            ParameterConstraint::Range { lower, upper } => {
                ParameterTransform::two_sided_range(lower, upper)?
            }
            ParameterConstraint::Limit { limit, direction } => {
                ParameterTransform::one_sided_limit(limit, direction)?
            }
        };
        Ok(transform)
    }
}

/// One calibration instrument on a curve.
///
/// Each node contributes one parameter to its curve and one residual to the
/// calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveNode {
    /// Instrument built from the node.
    pub template: TradeTemplate,
    /// Rate the instrument is traded at.
    pub rate: NodeRate,
    /// Constraint on the node's curve parameter.
    #[serde(default)]
    pub constraint: ParameterConstraint,
    /// Label used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CurveNode {
    /// A node calibrated to a literal rate.
    #[must_use]
    pub fn fixed(template: impl Into<TradeTemplate>, rate: f64) -> Self {
        Self::new(template.into(), NodeRate::Fixed(rate))
    }

    /// A node calibrated to a market quote.
    #[must_use]
    pub fn quoted(template: impl Into<TradeTemplate>, key: QuoteKey) -> Self {
        Self::new(template.into(), NodeRate::MarketQuote(key))
    }

    fn new(template: TradeTemplate, rate: NodeRate) -> Self {
        Self {
            template,
            rate,
            constraint: ParameterConstraint::Unconstrained,
            label: None,
        }
    }

    /// Sets the parameter constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: ParameterConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, defaulting to the instrument description.
    #[must_use]
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.template.label())
    }

    /// The quote key, if the node needs market data.
    #[must_use]
    pub fn quote_key(&self) -> Option<&QuoteKey> {
        match &self.rate {
            NodeRate::Fixed(_) => None,
            NodeRate::MarketQuote(key) => Some(key),
        }
    }
}

/// Configuration of one curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveConfigData")]
pub struct CurveConfig {
    name: CurveName,
    day_count: DayCountConvention,
    interpolation: InterpolationMethod,
    left_extrapolation: ExtrapolationMethod,
    right_extrapolation: ExtrapolationMethod,
    nodes: Vec<CurveNode>,
}

#[derive(Deserialize)]
struct CurveConfigData {
    name: CurveName,
    #[serde(default)]
    day_count: DayCountConvention,
    #[serde(default)]
    interpolation: InterpolationMethod,
    #[serde(default)]
    left_extrapolation: ExtrapolationMethod,
    #[serde(default)]
    right_extrapolation: ExtrapolationMethod,
    nodes: Vec<CurveNode>,
}

impl TryFrom<CurveConfigData> for CurveConfig {
    type Error = CalibrationError;

    fn try_from(data: CurveConfigData) -> Result<Self, Self::Error> {
        CurveConfigBuilder {
            name: data.name,
            day_count: data.day_count,
            interpolation: data.interpolation,
            left_extrapolation: data.left_extrapolation,
            right_extrapolation: data.right_extrapolation,
            nodes: data.nodes,
        }
        .build()
    }
}

impl CurveConfig {
    /// Starts building a curve configuration.
    #[must_use]
    pub fn builder(name: impl Into<CurveName>) -> CurveConfigBuilder {
        CurveConfigBuilder {
            name: name.into(),
            day_count: DayCountConvention::default(),
            interpolation: InterpolationMethod::default(),
            left_extrapolation: ExtrapolationMethod::default(),
            right_extrapolation: ExtrapolationMethod::default(),
            nodes: Vec::new(),
        }
    }

    /// Curve name.
    #[must_use]
    pub fn name(&self) -> &CurveName {
        &self.name
    }

    /// Day count measuring curve time.
    #[must_use]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Interpolation between nodes.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// Extrapolation before the first node.
    #[must_use]
    pub fn left_extrapolation(&self) -> ExtrapolationMethod {
        self.left_extrapolation
    }

    /// Extrapolation after the last node.
    #[must_use]
    pub fn right_extrapolation(&self) -> ExtrapolationMethod {
        self.right_extrapolation
    }

    /// Nodes in parameter order. Never empty.
    #[must_use]
    pub fn nodes(&self) -> &[CurveNode] {
        &self.nodes
    }

    /// Returns true if any node needs market data.
    #[must_use]
    pub fn requires_market_data(&self) -> bool {
        self.nodes.iter().any(|node| node.quote_key().is_some())
    }
}

/// Builder for [`CurveConfig`].
#[derive(Debug, Clone)]
pub struct CurveConfigBuilder {
    name: CurveName,
    day_count: DayCountConvention,
    interpolation: InterpolationMethod,
    left_extrapolation: ExtrapolationMethod,
    right_extrapolation: ExtrapolationMethod,
    nodes: Vec<CurveNode>,
}

impl CurveConfigBuilder {
    /// Sets the day count.
    #[must_use]
    pub fn day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Sets the interpolation.
    #[must_use]
    pub fn interpolation(mut self, interpolation: InterpolationMethod) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets both extrapolations.
    #[must_use]
    pub fn extrapolation(mut self, left: ExtrapolationMethod, right: ExtrapolationMethod) -> Self {
        self.left_extrapolation = left;
        self.right_extrapolation = right;
        self
    }

    /// Appends a node.
    #[must_use]
    pub fn add_node(mut self, node: CurveNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends several nodes.
    #[must_use]
    pub fn add_nodes(mut self, nodes: impl IntoIterator<Item = CurveNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::InvalidConfiguration`] if the curve has no
    /// nodes, a constraint is malformed, or a literal rate is not finite.
    pub fn build(self) -> CalibrationResult<CurveConfig> {
        if self.nodes.is_empty() {
            return Err(CalibrationError::invalid_configuration(format!(
                "curve '{}' has no nodes",
                self.name
            )));
        }
        for node in &self.nodes {
            node.constraint.to_transform().map_err(|e| {
                CalibrationError::invalid_configuration(format!(
                    "curve '{}' node {}: {e}",
                    self.name,
                    node.label()
                ))
            })?;
            if let NodeRate::Fixed(rate) = node.rate {
                if !rate.is_finite() {
                    return Err(CalibrationError::invalid_configuration(format!(
                        "curve '{}' node {} has a non-finite rate",
                        self.name,
                        node.label()
                    )));
                }
            }
        }
        Ok(CurveConfig {
            name: self.name,
            day_count: self.day_count,
            interpolation: self.interpolation,
            left_extrapolation: self.left_extrapolation,
            right_extrapolation: self.right_extrapolation,
            nodes: self.nodes,
        })
    }
}

/// A curve and the roles it plays in its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGroupEntry {
    /// The curve.
    pub curve: CurveConfig,
    /// Currencies discounted with the curve.
    #[serde(default)]
    pub discount_currencies: Vec<Currency>,
    /// Indices forecast with the curve.
    #[serde(default)]
    pub forward_indices: Vec<IborIndex>,
}

/// An ordered set of curves calibrated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveGroupConfigData")]
pub struct CurveGroupConfig {
    name: CurveGroupName,
    entries: Vec<CurveGroupEntry>,
}

#[derive(Deserialize)]
struct CurveGroupConfigData {
    name: CurveGroupName,
    entries: Vec<CurveGroupEntry>,
}

impl TryFrom<CurveGroupConfigData> for CurveGroupConfig {
    type Error = CalibrationError;

    fn try_from(data: CurveGroupConfigData) -> Result<Self, Self::Error> {
        CurveGroupConfigBuilder {
            name: data.name,
            entries: data.entries,
        }
        .build()
    }
}

impl CurveGroupConfig {
    /// Starts building a group.
    #[must_use]
    pub fn builder(name: impl Into<CurveGroupName>) -> CurveGroupConfigBuilder {
        CurveGroupConfigBuilder {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &CurveGroupName {
        &self.name
    }

    /// Curves in parameter order.
    #[must_use]
    pub fn entries(&self) -> &[CurveGroupEntry] {
        &self.entries
    }

    /// Looks up a curve by name.
    #[must_use]
    pub fn curve(&self, name: &CurveName) -> Option<&CurveConfig> {
        self.entries
            .iter()
            .map(|entry| &entry.curve)
            .find(|curve| curve.name() == name)
    }

    /// Total number of nodes over all curves.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.entries.iter().map(|e| e.curve.nodes().len()).sum()
    }
}

/// Builder for [`CurveGroupConfig`].
#[derive(Debug, Clone)]
pub struct CurveGroupConfigBuilder {
    name: CurveGroupName,
    entries: Vec<CurveGroupEntry>,
}

impl CurveGroupConfigBuilder {
    /// Adds a curve used both for discounting `currency` and forecasting `index`.
    #[must_use]
    pub fn add_curve(self, curve: CurveConfig, currency: Currency, index: IborIndex) -> Self {
        self.add_entry(CurveGroupEntry {
            curve,
            discount_currencies: vec![currency],
            forward_indices: vec![index],
        })
    }

    /// Adds a discount-only curve.
    #[must_use]
    pub fn add_discount_curve(self, curve: CurveConfig, currency: Currency) -> Self {
        self.add_entry(CurveGroupEntry {
            curve,
            discount_currencies: vec![currency],
            forward_indices: Vec::new(),
        })
    }

    /// Adds a forward-only curve.
    #[must_use]
    pub fn add_forward_curve(self, curve: CurveConfig, index: IborIndex) -> Self {
        self.add_entry(CurveGroupEntry {
            curve,
            discount_currencies: Vec::new(),
            forward_indices: vec![index],
        })
    }

    /// Adds a curve with explicit roles.
    #[must_use]
    pub fn add_entry(mut self, entry: CurveGroupEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Validates and builds the group.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::InvalidConfiguration`] if the group is
    /// empty, curve names repeat, or a currency or index is assigned to more
    /// than one curve.
    pub fn build(self) -> CalibrationResult<CurveGroupConfig> {
        if self.entries.is_empty() {
            return Err(CalibrationError::invalid_configuration(format!(
                "curve group '{}' has no curves",
                self.name
            )));
        }

        let mut names = BTreeSet::new();
        let mut currencies = BTreeMap::new();
        let mut indices = BTreeMap::new();
        for entry in &self.entries {
            let name = entry.curve.name();
            if !names.insert(name) {
                return Err(CalibrationError::invalid_configuration(format!(
                    "curve '{name}' appears twice in group '{}'",
                    self.name
                )));
            }
            for currency in &entry.discount_currencies {
                if let Some(other) = currencies.insert(*currency, name) {
                    return Err(CalibrationError::invalid_configuration(format!(
                        "{currency} discounting assigned to both '{other}' and '{name}'"
                    )));
                }
            }
            for index in &entry.forward_indices {
                if let Some(other) = indices.insert(*index, name) {
                    return Err(CalibrationError::invalid_configuration(format!(
                        "{index} forecasting assigned to both '{other}' and '{name}'"
                    )));
                }
            }
        }

        Ok(CurveGroupConfig {
            name: self.name,
            entries: self.entries,
        })
    }
}

/// Curve group configurations by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDataConfig {
    groups: BTreeMap<CurveGroupName, CurveGroupConfig>,
}

impl MarketDataConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group, replacing any group of the same name.
    #[must_use]
    pub fn with_group(mut self, group: CurveGroupConfig) -> Self {
        self.groups.insert(group.name().clone(), group);
        self
    }

    /// Looks up a group.
    #[must_use]
    pub fn group(&self, name: &CurveGroupName) -> Option<&CurveGroupConfig> {
        self.groups.get(name)
    }

    /// All groups, ordered by name.
    pub fn groups(&self) -> impl Iterator<Item = &CurveGroupConfig> {
        self.groups.values()
    }
}
