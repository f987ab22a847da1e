//! Uncertainty of a sum of independent lognormal estimates.
//!
//! A sum of lognormal variables has no closed-form distribution. The
//! reference strategy simulates it: draw every addend many times, add the
//! draws element-wise, and read the 95% range of the simulated total.
//! [`SumPropagator`] hides that strategy so an analytic approximation
//! ([`FentonWilkinson`]) can stand in without touching callers.
//!
//! # Summary rule
//!
//! Both strategies reduce a distribution of the total to one multiplicative
//! factor the same way: `upper = p97.5 / mean`, `lower = mean / p2.5`, and the
//! reported CI is the average of the two. Right-skewed totals make `lower`
//! larger than `upper`, so for a single addend with a wide CI the result
//! exceeds the input CI (about 25% above it at `mul_ci = 10`). For CIs up to
//! about 2 the difference is below 1%.
//!
//! # Reproducibility
//!
//! [`ci_sum_prop`] seeds its generator from the operating system, so repeated
//! calls differ within sampling noise. Use [`MonteCarlo::with_seed`] for
//! reproducible results; [`MonteCarlo::seed`] reports the seed in use so a
//! run can be replayed.

use biomass_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};
use rand::{Rng, SeedableRng as _};
use rand_distr::LogNormal;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, UncertaintyError},
    interval::Z_95,
    validate,
};

/// Number of draws per addend used unless configured otherwise.
pub const DEFAULT_SAMPLE_COUNT: usize = 100_000;

const LOWER_PERCENTILE: f64 = 2.5;
const UPPER_PERCENTILE: f64 = 97.5;

/// Strategy for the multiplicative 95% CI of a sum of lognormal estimates.
pub trait SumPropagator {
    /// Returns the multiplicative 95% CI of `sum(estimates)`, where each
    /// estimate carries the multiplicative CI at the same index of `mul_cis`.
    ///
    /// # Errors
    ///
    /// Fails if the slices are empty or differ in length, if an estimate is
    /// not strictly positive, or if a CI is below 1.
    fn sum_ci(&mut self, estimates: &[f64], mul_cis: &[f64]) -> Result<f64>;
}

impl<P> SumPropagator for &mut P
where
    P: SumPropagator + ?Sized,
{
    fn sum_ci(&mut self, estimates: &[f64], mul_cis: &[f64]) -> Result<f64> {
        (**self).sum_ci(estimates, mul_cis)
    }
}

/// The mean and central 95% range of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval95 {
    /// Mean of the distribution.
    pub mean: f64,
    /// 2.5th percentile.
    pub low: f64,
    /// 97.5th percentile.
    pub high: f64,
}

impl Interval95 {
    /// Summarizes a sample. Returns `None` for an empty sample.
    #[must_use]
    pub fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        samples.sort_by(f64::total_cmp);
        let stats = DescriptiveStats::from_sorted(&samples)?;
        let bounds = Percentiles::from_sorted(&samples, &[LOWER_PERCENTILE, UPPER_PERCENTILE]);
        Some(Self {
            mean: stats.mean,
            low: bounds.get(LOWER_PERCENTILE)?,
            high: bounds.get(UPPER_PERCENTILE)?,
        })
    }

    /// Multiplicative CI of the range relative to its own mean.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::mul_ci_around`].
    pub fn mul_ci(&self) -> Result<f64> {
        self.mul_ci_around(self.mean)
    }

    /// Average of `high / center` and `center / low`, never below 1.
    ///
    /// A zero-width range gives 1 (up to rounding of the sample mean).
    ///
    /// # Errors
    ///
    /// Fails with [`UncertaintyError::NonFiniteRange`] if the range or either
    /// ratio overflowed, which happens when the inputs' CIs are too wide to
    /// represent.
    pub fn mul_ci_around(&self, center: f64) -> Result<f64> {
        let upper = self.high / center;
        let lower = center / self.low;
        let mul_ci = f64::midpoint(upper, lower);
        if !(self.mean.is_finite() && center.is_finite() && mul_ci.is_finite()) {
            return Err(UncertaintyError::NonFiniteRange {
                mean: self.mean,
                low: self.low,
                high: self.high,
            });
        }
        Ok(mul_ci.max(1.0))
    }
}

/// Monte Carlo propagation backed by a seedable generator.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::sampling::{MonteCarlo, SumPropagator};
///
/// let mut mc = MonteCarlo::with_seed(7).with_samples(20_000).unwrap();
/// let ci = mc.sum_ci(&[3.0, 1.0], &[1.5, 2.0]).unwrap();
/// assert!(ci > 1.0 && ci < 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct MonteCarlo<R = Pcg64> {
    rng: R,
    samples: usize,
    seed: Option<u64>,
}

impl Default for MonteCarlo {
    fn default() -> Self {
        Self::new()
    }
}

impl MonteCarlo {
    /// Creates a propagator seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for reproducible results.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            samples: DEFAULT_SAMPLE_COUNT,
            seed: Some(seed),
        }
    }
}

impl<R> MonteCarlo<R>
where
    R: Rng,
{
    /// Sets the number of draws per addend.
    ///
    /// # Errors
    ///
    /// Fails if `samples` is zero.
    pub fn with_samples(mut self, samples: usize) -> Result<Self> {
        if samples == 0 {
            return Err(UncertaintyError::InvalidSampleCount);
        }
        self.samples = samples;
        Ok(self)
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Seed the generator was created from, if it was created from one.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Simulates the distribution of `sum(estimates)` and summarizes it.
    ///
    /// Addend `i` is drawn from a lognormal whose underlying normal has mean
    /// `ln(estimates[i])` and standard deviation `ln(mul_cis[i]) / 1.96`, so
    /// its 95% range matches the declared multiplicative CI.
    ///
    /// # Errors
    ///
    /// Same conditions as [`SumPropagator::sum_ci`].
    pub fn simulate_sum(&mut self, estimates: &[f64], mul_cis: &[f64]) -> Result<Interval95> {
        validate_sum_inputs(estimates, mul_cis)?;

        let mut totals = vec![0.0; self.samples];
        for (index, (&estimate, &mul_ci)) in estimates.iter().zip(mul_cis).enumerate() {
            let distr = lognormal(estimate.ln(), mul_ci.ln() / Z_95, index)?;
            for total in &mut totals {
                *total += self.rng.sample(&distr);
            }
        }
        Interval95::from_samples(totals).ok_or(UncertaintyError::InvalidSampleCount)
    }

    /// Draws `self.samples()` values from a lognormal with the given
    /// parameters of its underlying normal.
    pub(crate) fn draw_lognormal(&mut self, mu: f64, sigma: f64) -> Result<Vec<f64>> {
        let distr = lognormal(mu, sigma, 0)?;
        Ok((0..self.samples)
            .map(|_| self.rng.sample(&distr))
            .collect())
    }
}

impl<R> SumPropagator for MonteCarlo<R>
where
    R: Rng,
{
    fn sum_ci(&mut self, estimates: &[f64], mul_cis: &[f64]) -> Result<f64> {
        self.simulate_sum(estimates, mul_cis)?.mul_ci()
    }
}

/// Closed-form propagation approximating the sum by a single lognormal with
/// the same mean and variance (Fenton-Wilkinson moment matching).
///
/// Deterministic and cheap. Accurate when the addends' CIs are moderate; with
/// very wide CIs the matched lognormal misplaces the tails.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::sampling::{FentonWilkinson, SumPropagator};
///
/// let ci = FentonWilkinson.sum_ci(&[3.0, 1.0], &[1.5, 2.0]).unwrap();
/// assert!(ci > 1.0 && ci < 2.0);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FentonWilkinson;

impl FentonWilkinson {
    /// Mean and 95% range of the moment-matched lognormal.
    ///
    /// # Errors
    ///
    /// Same conditions as [`SumPropagator::sum_ci`].
    pub fn interval(estimates: &[f64], mul_cis: &[f64]) -> Result<Interval95> {
        validate_sum_inputs(estimates, mul_cis)?;

        let (mean, variance) = estimates.iter().zip(mul_cis).fold(
            (0.0, 0.0),
            |(mean, variance), (&estimate, &mul_ci)| {
                let sigma_sq = (mul_ci.ln() / Z_95).powi(2);
                let addend_mean = estimate * (sigma_sq / 2.0).exp();
                let addend_variance = sigma_sq.exp_m1() * addend_mean.powi(2);
                (mean + addend_mean, variance + addend_variance)
            },
        );

        let sigma_sq = (variance / mean.powi(2)).ln_1p();
        let mu = mean.ln() - sigma_sq / 2.0;
        let half_width = Z_95 * sigma_sq.sqrt();
        Ok(Interval95 {
            mean,
            low: (mu - half_width).exp(),
            high: (mu + half_width).exp(),
        })
    }
}

impl SumPropagator for FentonWilkinson {
    fn sum_ci(&mut self, estimates: &[f64], mul_cis: &[f64]) -> Result<f64> {
        Self::interval(estimates, mul_cis)?.mul_ci()
    }
}

/// Multiplicative 95% CI of a sum of independent lognormal estimates.
///
/// Simulates [`DEFAULT_SAMPLE_COUNT`] draws per estimate with an OS-seeded
/// generator. Use [`MonteCarlo`] directly for a fixed seed or sample count.
///
/// # Errors
///
/// Same conditions as [`SumPropagator::sum_ci`].
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::sampling::ci_sum_prop;
///
/// let ci = ci_sum_prop(&[450.0, 70.0, 12.0], &[1.2, 10.0, 1.6]).unwrap();
/// assert!(ci >= 1.0);
/// ```
pub fn ci_sum_prop(estimates: &[f64], mul_cis: &[f64]) -> Result<f64> {
    MonteCarlo::new().sum_ci(estimates, mul_cis)
}

fn validate_sum_inputs(estimates: &[f64], mul_cis: &[f64]) -> Result<()> {
    validate::positive(estimates)?;
    validate::same_length(estimates, mul_cis)?;
    validate::mul_cis(mul_cis)
}

fn lognormal(mu: f64, sigma: f64, index: usize) -> Result<LogNormal<f64>> {
    LogNormal::new(mu, sigma).map_err(|_| UncertaintyError::NonFinite {
        index,
        value: sigma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> MonteCarlo {
        MonteCarlo::with_seed(seed)
    }

    #[test]
    fn test_single_addend_recovers_its_ci() {
        for mul_ci in [1.5, 2.0] {
            for seed in 0..5 {
                let ci = seeded(seed).sum_ci(&[4.2e15], &[mul_ci]).unwrap();
                assert!(
                    ((ci - mul_ci) / mul_ci).abs() < 0.05,
                    "seed {seed}: expected about {mul_ci}, got {ci}"
                );
            }
        }
    }

    #[test]
    fn test_zero_variance_inputs_give_one() {
        let ci = seeded(1).sum_ci(&[2.0, 3.0, 5.0], &[1.0, 1.0, 1.0]).unwrap();
        assert!((ci - 1.0).abs() < 1e-9, "got {ci}");
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let a = seeded(99).sum_ci(&[1.0, 2.0], &[3.0, 1.5]).unwrap();
        let b = seeded(99).sum_ci(&[1.0, 2.0], &[3.0, 1.5]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_monotone_in_component_ci() {
        let mut previous = 1.0;
        for mul_ci in [1.0, 1.2, 1.5, 2.0, 3.0, 5.0] {
            let ci = seeded(3).sum_ci(&[100.0, 50.0], &[mul_ci, 2.0]).unwrap();
            assert!(ci >= previous, "{mul_ci}: {ci} < {previous}");
            previous = ci;
        }
    }

    #[test]
    fn test_sum_is_narrower_than_widest_addend() {
        // Two equal addends: relative spread of the total shrinks.
        let ci = seeded(5).sum_ci(&[1.0, 1.0], &[2.0, 2.0]).unwrap();
        assert!(ci > 1.0 && ci < 2.0, "got {ci}");
    }

    #[test]
    #[expect(clippy::cast_precision_loss)]
    fn test_wide_equal_addends_converge_across_seeds() {
        let batch_mean = |seeds: std::ops::Range<u64>| {
            let count = seeds.end - seeds.start;
            seeds
                .map(|seed| seeded(seed).sum_ci(&[1.0, 1.0], &[10.0, 10.0]).unwrap())
                .sum::<f64>()
                / count as f64
        };
        let first = batch_mean(0..5);
        let second = batch_mean(100..105);
        assert!(first > 5.0 && first < 11.0, "got {first}");
        assert!(
            ((first - second) / first).abs() < 0.03,
            "batches disagree: {first} vs {second}"
        );
    }

    #[test]
    fn test_fenton_wilkinson_matches_simulation() {
        let estimates = [3.0, 1.0, 0.5];
        let mul_cis = [1.5, 2.0, 1.8];
        let simulated = seeded(11).sum_ci(&estimates, &mul_cis).unwrap();
        let analytic = FentonWilkinson.sum_ci(&estimates, &mul_cis).unwrap();
        assert!(
            ((simulated - analytic) / simulated).abs() < 0.05,
            "simulated {simulated}, analytic {analytic}"
        );
    }

    #[test]
    fn test_fenton_wilkinson_zero_variance() {
        let interval = FentonWilkinson::interval(&[2.0, 3.0], &[1.0, 1.0]).unwrap();
        assert!((interval.mean - 5.0).abs() < 1e-12);
        assert!((interval.mul_ci().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overflowing_range_is_an_error() {
        // exp(sigma^2) overflows, so the moment-matched range is NaN.
        for mul_ci in [1e17, 1e20, 1e40] {
            assert!(
                matches!(
                    FentonWilkinson.sum_ci(&[1.0], &[mul_ci]),
                    Err(UncertaintyError::NonFiniteRange { .. })
                ),
                "{mul_ci}"
            );
        }
        // Wide but representable CIs still propagate.
        let ci = FentonWilkinson.sum_ci(&[1.0], &[1e10]).unwrap();
        assert!(ci.is_finite() && ci > 1e10);

        let mut mc = seeded(0).with_samples(1_000).unwrap();
        assert!(matches!(
            mc.sum_ci(&[1.0], &[1e300]),
            Err(UncertaintyError::NonFiniteRange { .. })
        ));
    }

    #[test]
    fn test_mul_ci_rejects_non_finite_bounds() {
        let interval = Interval95 {
            mean: 4.0,
            low: 0.0,
            high: f64::NAN,
        };
        assert!(interval.mul_ci().is_err());
        let interval = Interval95 {
            mean: 4.0,
            low: 2.0,
            high: 8.0,
        };
        assert!((interval.mul_ci().unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_interval_from_samples() {
        let interval = Interval95::from_samples((0..=100).map(f64::from).collect()).unwrap();
        assert!((interval.mean - 50.0).abs() < 1e-12);
        assert!((interval.low - 2.5).abs() < 1e-9);
        assert!((interval.high - 97.5).abs() < 1e-9);
        assert!(Interval95::from_samples(Vec::new()).is_none());
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let mut mc = seeded(0);
        assert_eq!(
            mc.sum_ci(&[1.0, 2.0], &[1.5]),
            Err(UncertaintyError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            mc.sum_ci(&[1.0, 0.0], &[1.5, 1.5]),
            Err(UncertaintyError::NonPositive { index: 1, .. })
        ));
        assert!(matches!(
            mc.sum_ci(&[1.0], &[0.5]),
            Err(UncertaintyError::CiBelowOne { index: 0, .. })
        ));
        assert_eq!(mc.sum_ci(&[], &[]), Err(UncertaintyError::Empty));
        assert!(
            MonteCarlo::with_seed(0)
                .with_samples(0)
                .is_err_and(|e| e == UncertaintyError::InvalidSampleCount)
        );
    }

    #[test]
    fn test_seed_is_reported() {
        assert_eq!(seeded(42).seed(), Some(42));
        assert_eq!(seeded(0).samples(), DEFAULT_SAMPLE_COUNT);
    }
}
