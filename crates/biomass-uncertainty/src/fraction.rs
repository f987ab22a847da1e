//! Means and confidence intervals of fractions.
//!
//! A fraction `f = X / (X + Y)` is bounded by (0, 1), so lognormal statistics
//! cannot be applied to it directly. Instead it is mapped to the unbounded
//! odds `alpha = X / Y = f / (1 - f)`, the statistics are computed on the odds,
//! and the results are mapped back with `f = 1 / (1 + 1 / alpha)`.
//!
//! Exact 0 and 1 have no finite log-odds and are rejected. Callers that
//! knowingly work with boundary values can opt into [`clamp_fractions`].

use biomass_stats::descriptive::{self, DescriptiveStats};
use rand::Rng;

use crate::{
    error::{Result, UncertaintyError},
    sampling::{Interval95, MonteCarlo},
    validate,
};

/// Maps a fraction in (0, 1) to its odds in (0, inf).
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::fraction::to_odds;
///
/// assert_eq!(to_odds(0.5), 1.0);
/// assert_eq!(to_odds(0.75), 3.0);
/// ```
#[must_use]
pub fn to_odds(fraction: f64) -> f64 {
    fraction / (1.0 - fraction)
}

/// Maps odds in (0, inf) back to a fraction in (0, 1). Inverse of [`to_odds`].
#[must_use]
pub fn from_odds(odds: f64) -> f64 {
    1.0 / (1.0 + 1.0 / odds)
}

/// Mean of several fractions, taken as the geometric mean of their odds.
///
/// With `weights`, the log-odds are averaged with those weights.
///
/// # Errors
///
/// Fails if `fractions` is empty or holds a value outside the open interval
/// (0, 1), or if `weights` differ in length from `fractions`, are negative,
/// non-finite or all zero.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::fraction::frac_mean;
///
/// let mean = frac_mean(&[0.31, 0.51], None).unwrap();
/// assert!(mean > 0.31 && mean < 0.51);
///
/// let weighted = frac_mean(&[0.31, 0.51], Some(&[1.0, 0.0])).unwrap();
/// assert!((weighted - 0.31).abs() < 1e-12);
/// ```
pub fn frac_mean(fractions: &[f64], weights: Option<&[f64]>) -> Result<f64> {
    validate::fractions(fractions)?;
    let log_odds = fractions
        .iter()
        .map(|&f| to_odds(f).log10())
        .collect::<Vec<_>>();

    let mean_log_odds = match weights {
        Some(weights) => {
            validate::same_length(fractions, weights)?;
            validate::weights(weights)?;
            descriptive::weighted_mean(&log_odds, weights).ok_or(UncertaintyError::InvalidWeights)?
        }
        None => descriptive::mean(&log_odds).ok_or(UncertaintyError::Empty)?,
    };
    Ok(from_odds(10f64.powf(mean_log_odds)))
}

/// Multiplicative 95% CI of [`frac_mean`], in fraction units.
///
/// Seeds its generator from the operating system; see [`frac_ci_with`].
///
/// # Errors
///
/// Same conditions as [`frac_mean`] without weights.
pub fn frac_ci(fractions: &[f64]) -> Result<f64> {
    frac_ci_with(fractions, &mut MonteCarlo::new())
}

/// Multiplicative 95% CI of [`frac_mean`], drawing from `mc`.
///
/// The log-odds of the fractions give a mean and a standard error
/// (Bessel-corrected standard deviation over `sqrt(n)`). Odds are drawn from
/// the lognormal with those parameters and mapped back to fractions; the
/// result is the average of `p97.5 / mean` and `mean / p2.5` of those
/// fractions, where `mean` is [`frac_mean`]. The draws pass through the
/// inverse odds transform, so the simulated range itself stays inside (0, 1).
/// The returned factor averages two ratios, and `mean * ci` can still exceed
/// 1 for fractions close to the boundary.
///
/// A single fraction has zero standard error and yields 1.
///
/// # Errors
///
/// Same conditions as [`frac_mean`] without weights.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::{fraction::frac_ci_with, sampling::MonteCarlo};
///
/// let mut mc = MonteCarlo::with_seed(3);
/// let ci = frac_ci_with(&[0.2, 0.3, 0.25], &mut mc).unwrap();
/// assert!(ci > 1.0 && ci < 1.5);
/// ```
pub fn frac_ci_with<R>(fractions: &[f64], mc: &mut MonteCarlo<R>) -> Result<f64>
where
    R: Rng,
{
    let center = frac_mean(fractions, None)?;
    sampled_interval(fractions, mc)?.mul_ci_around(center)
}

/// Range of fractions simulated from the log-odds mean and standard error.
fn sampled_interval<R>(fractions: &[f64], mc: &mut MonteCarlo<R>) -> Result<Interval95>
where
    R: Rng,
{
    let log_odds = DescriptiveStats::new(fractions.iter().map(|&f| to_odds(f).ln()))
        .ok_or(UncertaintyError::Empty)?;
    let sampled = mc
        .draw_lognormal(log_odds.mean, log_odds.std_error)?
        .into_iter()
        .map(from_odds)
        .collect();
    Interval95::from_samples(sampled).ok_or(UncertaintyError::InvalidSampleCount)
}

/// Pulls fractions at or near the boundary to `[epsilon, 1 - epsilon]`.
///
/// Meant for data sets where an exact 0 or 1 is a reporting artifact (a
/// component below detection, say) and the caller accepts the bias. Values
/// outside `[0, 1]` are still rejected.
///
/// # Errors
///
/// Fails if `epsilon` is not inside (0, 0.5), if `fractions` is empty, or if a
/// value is non-finite or outside `[0, 1]`.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::fraction::{clamp_fractions, frac_mean};
///
/// let clamped = clamp_fractions(&[0.0, 0.2, 1.0], 0.001).unwrap();
/// assert_eq!(clamped, vec![0.001, 0.2, 0.999]);
/// assert!(frac_mean(&clamped, None).is_ok());
/// ```
pub fn clamp_fractions(fractions: &[f64], epsilon: f64) -> Result<Vec<f64>> {
    if !(epsilon > 0.0 && epsilon < 0.5) {
        return Err(UncertaintyError::InvalidEpsilon { epsilon });
    }
    if fractions.is_empty() {
        return Err(UncertaintyError::Empty);
    }
    fractions
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if !value.is_finite() {
                return Err(UncertaintyError::NonFinite { index, value });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(UncertaintyError::OutsideUnitInterval { index, value });
            }
            Ok(value.clamp(epsilon, 1.0 - epsilon))
        })
        .collect()
}
