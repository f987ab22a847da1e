use std::path::PathBuf;

use anyhow::Context;
use biomass_uncertainty::{LognormalEstimate, MonteCarlo, ci_prod_prop};
use serde::Serialize;

use crate::{
    command::{SamplingArg, sum_propagator},
    schema::report::{EstimateSummary, SumMethod, SumReport},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GeoCiArg {
    /// Independent positive estimates of the same quantity
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<f64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ProdCiArg {
    /// Multiplicative 95% CIs of the factors
    #[arg(required = true, allow_negative_numbers = true)]
    mul_cis: Vec<f64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SumCiArg {
    /// Point estimates of the addends (comma-separated)
    #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    estimates: Vec<f64>,
    /// Multiplicative 95% CIs of the addends (comma-separated, same order)
    #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    mul_cis: Vec<f64>,
    /// Propagation method: sampling or analytic
    #[arg(long, default_value = "sampling")]
    method: SumMethod,
    #[clap(flatten)]
    sampling: SamplingArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ProdReport {
    mul_ci: f64,
}

pub(crate) fn run_geo_ci(arg: &GeoCiArg) -> anyhow::Result<()> {
    let estimate = LognormalEstimate::from_samples(&arg.values)
        .context("Failed to compute the geometric mean CI")?;
    eprintln!(
        "Geometric mean of {} values: {:.4e} (x/ {:.3})",
        arg.values.len(),
        estimate.point(),
        estimate.mul_ci()
    );
    Output::save_json(&EstimateSummary::from(estimate), arg.output.as_deref())
}

pub(crate) fn run_prod_ci(arg: &ProdCiArg) -> anyhow::Result<()> {
    let mul_ci = ci_prod_prop(&arg.mul_cis).context("Failed to propagate the product CI")?;
    Output::save_json(&ProdReport { mul_ci }, arg.output.as_deref())
}

pub(crate) fn run_sum_ci(arg: &SumCiArg) -> anyhow::Result<()> {
    let mut mc = arg.sampling.monte_carlo()?;
    eprintln!(
        "Propagating the CI of a sum of {} estimates ({:?})...",
        arg.estimates.len(),
        arg.method
    );
    let report = sum_report(&arg.estimates, &arg.mul_cis, arg.method, &mut mc)?;
    Output::save_json(&report, arg.output.as_deref())
}

/// Propagates the sum CI; the seed is reported only when sampling was used.
fn sum_report(
    estimates: &[f64],
    mul_cis: &[f64],
    method: SumMethod,
    mc: &mut MonteCarlo,
) -> anyhow::Result<SumReport> {
    let mul_ci = sum_propagator(method, mc)
        .sum_ci(estimates, mul_cis)
        .context("Failed to propagate the sum CI")?;
    let estimate = LognormalEstimate::new(estimates.iter().sum::<f64>(), mul_ci)
        .context("Sum of the estimates is not a valid estimate")?;
    let seed = match method {
        SumMethod::Sampling => mc.seed(),
        SumMethod::Analytic => None,
    };
    Ok(SumReport {
        method,
        seed,
        estimate: estimate.into(),
    })
}
