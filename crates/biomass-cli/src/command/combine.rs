use std::path::PathBuf;

use anyhow::Context;
use biomass_uncertainty::{FractionEstimate, LognormalEstimate, MonteCarlo, interval::NO_DATA_MUL_CI};
use chrono::Utc;

use crate::{
    command::{SamplingArg, sum_propagator},
    schema::{
        report::{CombineReport, ParameterReport, SumMethod},
        sheet::{CombineMode, EstimateSheet, Parameter, ParameterSource},
    },
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CombineArg {
    /// Estimate sheet JSON file
    sheet: PathBuf,
    /// Propagation method for sum sheets: sampling or analytic
    #[arg(long, default_value = "sampling")]
    method: SumMethod,
    #[clap(flatten)]
    sampling: SamplingArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CombineArg) -> anyhow::Result<()> {
    let sheet = util::read_sheet_file(&arg.sheet)?;
    eprintln!(
        "Loaded sheet '{}' with {} parameters from {}",
        sheet.name,
        sheet.parameters.len(),
        arg.sheet.display()
    );

    let mut mc = arg.sampling.monte_carlo()?;
    let report = combine_sheet(&sheet, arg.method, &mut mc)?;

    for parameter in &report.parameters {
        let note = if parameter.assumed_uncertainty {
            " (assumed)"
        } else {
            ""
        };
        eprintln!(
            "  {}: {:.4e} x/ {:.3}{note}",
            parameter.name, parameter.estimate.point, parameter.estimate.mul_ci
        );
    }
    eprintln!(
        "{}: {:.4e} x/ {:.3}",
        report.name, report.estimate.point, report.estimate.mul_ci
    );

    Output::save_json(&report, arg.output.as_deref())
}

fn combine_sheet(
    sheet: &EstimateSheet,
    method: SumMethod,
    mc: &mut MonteCarlo,
) -> anyhow::Result<CombineReport> {
    anyhow::ensure!(
        !sheet.parameters.is_empty(),
        "Sheet '{}' has no parameters",
        sheet.name
    );

    let mut estimates = Vec::with_capacity(sheet.parameters.len());
    let mut parameters = Vec::with_capacity(sheet.parameters.len());
    let mut sampled = false;
    for parameter in &sheet.parameters {
        let (estimate, assumed_uncertainty) = resolve(parameter, mc)
            .with_context(|| format!("Invalid parameter '{}'", parameter.name))?;
        sampled |= matches!(parameter.source, ParameterSource::Fractions { .. });
        estimates.push(estimate);
        parameters.push(ParameterReport {
            name: parameter.name.clone(),
            source: parameter.source.kind(),
            assumed_uncertainty,
            estimate: estimate.into(),
        });
    }

    let (estimate, method) = match sheet.combine {
        CombineMode::Product => (
            LognormalEstimate::product(estimates).context("Failed to multiply the parameters")?,
            None,
        ),
        CombineMode::Sum => {
            sampled |= method == SumMethod::Sampling;
            let mut propagator = sum_propagator(method, mc);
            let estimate = LognormalEstimate::sum(estimates, &mut *propagator)
                .context("Failed to add the parameters")?;
            (estimate, Some(method))
        }
    };

    Ok(CombineReport {
        name: sheet.name.clone(),
        computed_at: Utc::now(),
        combine: sheet.combine,
        method,
        seed: if sampled { mc.seed() } else { None },
        estimate: estimate.into(),
        parameters,
    })
}

/// Resolves a parameter to an estimate, and whether its uncertainty was assumed.
fn resolve(
    parameter: &Parameter,
    mc: &mut MonteCarlo,
) -> biomass_uncertainty::Result<(LognormalEstimate, bool)> {
    match &parameter.source {
        ParameterSource::Value { value, uncertainty } => {
            let mul_ci = uncertainty.unwrap_or(NO_DATA_MUL_CI);
            let estimate = LognormalEstimate::new(*value, mul_ci)?;
            Ok((estimate, uncertainty.is_none()))
        }
        ParameterSource::Measurements { measurements } => {
            Ok((LognormalEstimate::from_samples(measurements)?, false))
        }
        ParameterSource::Fractions { fractions, weights } => {
            let fraction = FractionEstimate::from_fractions(fractions, weights.as_deref(), mc)?;
            Ok((fraction.as_factor()?, false))
        }
    }
}
