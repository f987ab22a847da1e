use std::{borrow::Cow, path::PathBuf};

use anyhow::Context;
use biomass_uncertainty::{FractionEstimate, MonteCarlo, fraction::clamp_fractions, frac_mean};
use serde::Serialize;

use crate::{command::SamplingArg, schema::report::FractionReport, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FracMeanArg {
    /// Measured fractions, each strictly inside (0, 1)
    #[arg(required = true, allow_negative_numbers = true)]
    fractions: Vec<f64>,
    /// Weights of the fractions (comma-separated, same order)
    #[arg(long, value_delimiter = ',')]
    weights: Option<Vec<f64>>,
    /// Pull fractions at the boundary to [EPS, 1 - EPS] instead of rejecting them
    #[arg(long, value_name = "EPS")]
    clamp: Option<f64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FracCiArg {
    /// Measured fractions, each strictly inside (0, 1)
    #[arg(required = true, allow_negative_numbers = true)]
    fractions: Vec<f64>,
    /// Pull fractions at the boundary to [EPS, 1 - EPS] instead of rejecting them
    #[arg(long, value_name = "EPS")]
    clamp: Option<f64>,
    #[clap(flatten)]
    sampling: SamplingArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct MeanReport {
    mean: f64,
}

/// Applies the optional boundary clamp, returning the fractions to use and
/// how many of them were moved.
fn prepare(fractions: &[f64], clamp: Option<f64>) -> anyhow::Result<(Cow<'_, [f64]>, usize)> {
    let Some(epsilon) = clamp else {
        return Ok((Cow::Borrowed(fractions), 0));
    };
    let clamped = clamp_fractions(fractions, epsilon).context("Failed to clamp fractions")?;
    let moved = fractions
        .iter()
        .filter(|&&f| f < epsilon || f > 1.0 - epsilon)
        .count();
    Ok((Cow::Owned(clamped), moved))
}

fn prepare_logged(fractions: &[f64], clamp: Option<f64>) -> anyhow::Result<Cow<'_, [f64]>> {
    let (fractions, moved) = prepare(fractions, clamp)?;
    if let Some(epsilon) = clamp
        && moved > 0
    {
        eprintln!("Clamped {moved} fraction(s) to [{epsilon}, {}]", 1.0 - epsilon);
    }
    Ok(fractions)
}

fn fraction_report(
    fractions: &[f64],
    clamp: Option<f64>,
    mc: &mut MonteCarlo,
) -> anyhow::Result<FractionReport> {
    let fractions = prepare_logged(fractions, clamp)?;
    let estimate = FractionEstimate::from_fractions(&fractions, None, mc)
        .context("Failed to compute the fraction CI")?;
    Ok(FractionReport {
        seed: mc.seed(),
        clamped: clamp.map(|_| fractions.into_owned()),
        estimate,
    })
}

pub(crate) fn run_frac_mean(arg: &FracMeanArg) -> anyhow::Result<()> {
    let fractions = prepare_logged(&arg.fractions, arg.clamp)?;
    let mean = frac_mean(&fractions, arg.weights.as_deref())
        .context("Failed to compute the fraction mean")?;
    Output::save_json(&MeanReport { mean }, arg.output.as_deref())
}

pub(crate) fn run_frac_ci(arg: &FracCiArg) -> anyhow::Result<()> {
    let mut mc = arg.sampling.monte_carlo()?;
    eprintln!(
        "Sampling {} odds values for {} fractions...",
        mc.samples(),
        arg.fractions.len()
    );
    let report = fraction_report(&arg.fractions, arg.clamp, &mut mc)?;
    Output::save_json(&report, arg.output.as_deref())
}
