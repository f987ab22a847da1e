//! Multiplicative confidence intervals of geometric means and products.
//!
//! A multiplicative 95% confidence interval is a factor `k >= 1` such that the
//! true value lies in `[estimate / k, estimate * k]` with 95% confidence.
//! Everything here works in `log10` space, where a lognormal quantity becomes
//! normal and multiplicative spreads become additive.

use biomass_stats::descriptive::{self, DescriptiveStats};

use crate::{
    error::{Result, UncertaintyError},
    validate,
};

/// Two-sided 95% quantile of the standard normal distribution.
pub const Z_95: f64 = 1.96;

/// Uncertainty assigned to a quantity with no usable spread information: an
/// order of magnitude either way.
pub const NO_DATA_MUL_CI: f64 = 10.0;

/// Geometric mean of strictly positive values.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::interval::geo_mean;
///
/// let mean = geo_mean(&[1.0, 100.0]).unwrap();
/// assert!((mean - 10.0).abs() < 1e-12);
/// ```
pub fn geo_mean(estimates: &[f64]) -> Result<f64> {
    validate::positive(estimates)?;
    let logs = estimates.iter().map(|x| x.log10()).collect::<Vec<_>>();
    let mean_log = descriptive::mean(&logs).unwrap_or_default();
    Ok(10f64.powf(mean_log))
}

/// Multiplicative 95% confidence interval of the geometric mean of `estimates`.
///
/// The estimates are treated as independent lognormal samples of one
/// quantity. The result is `10 ^ (1.96 * s / sqrt(n))`, where `s` is the
/// Bessel-corrected standard deviation of `log10(estimates)`.
///
/// A single estimate has no spread and yields exactly 1.
///
/// # Errors
///
/// Fails if `estimates` is empty or contains a non-finite or non-positive value.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::interval::geo_ci_calc;
///
/// assert_eq!(geo_ci_calc(&[3.2e15]).unwrap(), 1.0);
///
/// let ci = geo_ci_calc(&[0.28e15, 0.64e15]).unwrap();
/// assert!(ci > 2.0 && ci < 2.5);
/// ```
pub fn geo_ci_calc(estimates: &[f64]) -> Result<f64> {
    validate::positive(estimates)?;
    let stats = DescriptiveStats::new(estimates.iter().map(|x| x.log10()))
        .ok_or(UncertaintyError::Empty)?;
    Ok(10f64.powf(Z_95 * stats.std_error))
}

/// Multiplicative 95% confidence interval of a product of independent factors.
///
/// Each `log10(mul_ci)` is treated as the half-width of an independent
/// Gaussian error in log space; the half-widths combine in quadrature:
/// `10 ^ sqrt(sum(log10(mul_ci)^2))`.
///
/// # Errors
///
/// Fails if `mul_cis` is empty or contains a non-finite value or a value below 1.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::interval::ci_prod_prop;
///
/// assert_eq!(ci_prod_prop(&[1.0, 1.0, 1.0]).unwrap(), 1.0);
///
/// // Two factors of 10 combine to 10^sqrt(2), not 100.
/// let ci = ci_prod_prop(&[10.0, 10.0]).unwrap();
/// assert!((ci - 10f64.powf(2f64.sqrt())).abs() < 1e-9);
/// ```
pub fn ci_prod_prop(mul_cis: &[f64]) -> Result<f64> {
    validate::mul_cis(mul_cis)?;
    let sum_of_squares = mul_cis.iter().map(|ci| ci.log10().powi(2)).sum::<f64>();
    Ok(10f64.powf(sum_of_squares.sqrt()))
}

/// The most conservative (largest) of several candidate uncertainties.
///
/// Used when the same quantity has intra-study, inter-study and inter-method
/// uncertainty projections and the estimate should carry the widest of them.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::interval::conservative_ci;
///
/// assert_eq!(conservative_ci(&[1.3, 2.4, 1.9]).unwrap(), 2.4);
/// ```
pub fn conservative_ci(mul_cis: &[f64]) -> Result<f64> {
    validate::mul_cis(mul_cis)?;
    Ok(mul_cis.iter().copied().fold(1.0, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
        assert!(
            ((actual - expected) / expected).abs() < rel_tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_geo_ci_single_estimate_is_one() {
        assert_eq!(geo_ci_calc(&[42.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_geo_ci_identical_estimates_is_one() {
        assert_close(geo_ci_calc(&[5.0, 5.0, 5.0]).unwrap(), 1.0, 1e-12);
    }

    #[test]
    fn test_geo_ci_two_literature_values() {
        // With two values the standard error of the log mean is half their log distance.
        let ci = geo_ci_calc(&[0.28e15, 0.64e15]).unwrap();
        let expected = 10f64.powf(Z_95 * (0.64f64 / 0.28).log10() / 2.0);
        assert_close(ci, expected, 1e-9);
        assert!(ci > 2.2 && ci < 2.3);
    }

    #[test]
    fn test_geo_ci_order_invariant() {
        let a = geo_ci_calc(&[1.0, 4.0, 9.0, 30.0]).unwrap();
        let b = geo_ci_calc(&[30.0, 1.0, 9.0, 4.0]).unwrap();
        assert_close(a, b, 1e-12);
    }

    #[test]
    fn test_geo_ci_scale_invariant() {
        let values = [2.0, 7.0, 11.0, 0.5];
        let base = geo_ci_calc(&values).unwrap();
        for k in [1e-6, 0.3, 17.0, 1e12] {
            let scaled = values.iter().map(|v| v * k).collect::<Vec<_>>();
            assert_close(geo_ci_calc(&scaled).unwrap(), base, 1e-9);
        }
    }

    #[test]
    fn test_geo_ci_rejects_non_positive() {
        assert_eq!(
            geo_ci_calc(&[1.0, -2.0]),
            Err(UncertaintyError::NonPositive {
                index: 1,
                value: -2.0
            })
        );
        assert_eq!(geo_ci_calc(&[]), Err(UncertaintyError::Empty));
    }

    #[test]
    fn test_geo_mean() {
        assert_close(geo_mean(&[2.0, 8.0]).unwrap(), 4.0, 1e-12);
        assert_close(geo_mean(&[3.0]).unwrap(), 3.0, 1e-12);
        assert!(geo_mean(&[0.0]).is_err());
    }

    #[test]
    fn test_prod_single_ci_unchanged() {
        for c in [1.0, 1.5, 3.0, 10.0, 42.0] {
            assert_close(ci_prod_prop(&[c]).unwrap(), c, 1e-12);
        }
    }

    #[test]
    fn test_prod_by_hand() {
        let ci = ci_prod_prop(&[1.5, 1.4, 2.2]).unwrap();
        let expected = 10f64.powf(
            (1.5f64.log10().powi(2) + 1.4f64.log10().powi(2) + 2.2f64.log10().powi(2)).sqrt(),
        );
        assert_close(ci, expected, 1e-12);
    }

    #[test]
    fn test_prod_permutation_symmetric() {
        let a = ci_prod_prop(&[1.5, 1.4, 2.2]).unwrap();
        let b = ci_prod_prop(&[2.2, 1.5, 1.4]).unwrap();
        assert_close(a, b, 1e-12);
    }

    #[test]
    fn test_prod_all_ones() {
        assert_eq!(ci_prod_prop(&[1.0; 5]).unwrap(), 1.0);
    }

    #[test]
    fn test_prod_rejects_ci_below_one() {
        assert_eq!(
            ci_prod_prop(&[1.2, 0.9]),
            Err(UncertaintyError::CiBelowOne {
                index: 1,
                value: 0.9
            })
        );
    }

    #[test]
    fn test_conservative_ci() {
        assert_eq!(conservative_ci(&[1.0]).unwrap(), 1.0);
        assert!(conservative_ci(&[]).is_err());
    }
}
