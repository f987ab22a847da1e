use biomass_uncertainty::{FentonWilkinson, MonteCarlo, SumPropagator, sampling::DEFAULT_SAMPLE_COUNT};
use clap::{Parser, Subcommand};

use crate::schema::report::SumMethod;

use self::{
    combine::CombineArg,
    fraction::{FracCiArg, FracMeanArg},
    interval::{GeoCiArg, ProdCiArg, SumCiArg},
};

mod combine;
mod fraction;
mod interval;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Geometric mean and its multiplicative 95% CI
    GeoCi(#[clap(flatten)] GeoCiArg),
    /// Multiplicative 95% CI of a product of independent factors
    ProdCi(#[clap(flatten)] ProdCiArg),
    /// Multiplicative 95% CI of a sum of independent estimates
    SumCi(#[clap(flatten)] SumCiArg),
    /// Odds-space mean of fractions
    FracMean(#[clap(flatten)] FracMeanArg),
    /// Odds-space mean of fractions and its multiplicative 95% CI
    FracCi(#[clap(flatten)] FracCiArg),
    /// Combine the parameters of an estimate sheet into one estimate
    Combine(#[clap(flatten)] CombineArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::GeoCi(arg) => interval::run_geo_ci(&arg)?,
        Mode::ProdCi(arg) => interval::run_prod_ci(&arg)?,
        Mode::SumCi(arg) => interval::run_sum_ci(&arg)?,
        Mode::FracMean(arg) => fraction::run_frac_mean(&arg)?,
        Mode::FracCi(arg) => fraction::run_frac_ci(&arg)?,
        Mode::Combine(arg) => combine::run(&arg)?,
    }
    Ok(())
}

/// Monte Carlo settings shared by the sampling commands
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SamplingArg {
    /// Number of Monte Carlo draws per estimate
    #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
    samples: usize,
    /// Seed for reproducible draws (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

impl SamplingArg {
    pub(crate) fn monte_carlo(&self) -> anyhow::Result<MonteCarlo> {
        let mc = match self.seed {
            Some(seed) => MonteCarlo::with_seed(seed),
            None => MonteCarlo::new(),
        };
        Ok(mc.with_samples(self.samples)?)
    }
}

/// Builds the propagator for `method`, reusing `mc` for sampling.
pub(crate) fn sum_propagator(
    method: SumMethod,
    mc: &mut MonteCarlo,
) -> Box<dyn SumPropagator + '_> {
    match method {
        SumMethod::Sampling => Box::new(mc),
        SumMethod::Analytic => Box::new(FentonWilkinson),
    }
}
