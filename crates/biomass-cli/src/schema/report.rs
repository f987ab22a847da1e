use biomass_uncertainty::{FractionEstimate, LognormalEstimate};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::schema::sheet::CombineMode;

/// How the CI of a sum is propagated
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::FromStr)]
#[serde(rename_all = "snake_case")]
pub enum SumMethod {
    /// Monte Carlo simulation of the total
    #[default]
    Sampling,
    /// Moment-matched lognormal approximation
    Analytic,
}

/// An estimate with its 95% range spelled out
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EstimateSummary {
    pub point: f64,
    pub mul_ci: f64,
    pub lower: f64,
    pub upper: f64,
}

impl From<LognormalEstimate> for EstimateSummary {
    fn from(estimate: LognormalEstimate) -> Self {
        Self {
            point: estimate.point(),
            mul_ci: estimate.mul_ci(),
            lower: estimate.lower(),
            upper: estimate.upper(),
        }
    }
}

/// Result of a sum propagation
#[derive(Debug, Clone, Serialize)]
pub struct SumReport {
    pub method: SumMethod,
    /// Seed of the Monte Carlo generator, for replaying the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub estimate: EstimateSummary,
}

/// Result of a fraction summary
#[derive(Debug, Clone, Serialize)]
pub struct FractionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Fractions after boundary clamping, when clamping was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clamped: Option<Vec<f64>>,
    #[serde(flatten)]
    pub estimate: FractionEstimate,
}

/// Result of combining an estimate sheet
#[derive(Debug, Clone, Serialize)]
pub struct CombineReport {
    /// Name of the sheet
    pub name: String,
    /// Timestamp when the report was computed (ISO 8601 format)
    pub computed_at: DateTime<Utc>,
    pub combine: CombineMode,
    /// Sum propagation method, for sum sheets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<SumMethod>,
    /// Seed of the Monte Carlo generator used for fractions and sums
    pub seed: Option<u64>,
    pub estimate: EstimateSummary,
    pub parameters: Vec<ParameterReport>,
}

/// A resolved sheet parameter
#[derive(Debug, Clone, Serialize)]
pub struct ParameterReport {
    pub name: String,
    /// Which kind of input the parameter was given as
    pub source: &'static str,
    /// Whether the no-data uncertainty was assumed
    pub assumed_uncertainty: bool,
    pub estimate: EstimateSummary,
}
