use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, UncertaintyError},
    fraction,
    interval::{self, NO_DATA_MUL_CI},
    sampling::{MonteCarlo, SumPropagator},
};

/// A positive quantity believed to be approximately lognormal.
///
/// With 95% confidence the quantity lies in `[point / mul_ci, point * mul_ci]`.
///
/// # Examples
///
/// ```
/// use biomass_uncertainty::estimate::LognormalEstimate;
///
/// // Soil microbial biomass times the fungal fraction of it.
/// let microbes = LognormalEstimate::new(3.0e16, 2.5).unwrap();
/// let fraction = LognormalEstimate::new(0.6, 1.5).unwrap();
/// let fungi = LognormalEstimate::product([microbes, fraction]).unwrap();
///
/// assert!((fungi.point() - 1.8e16).abs() < 1e3);
/// assert!(fungi.mul_ci() > 2.5 && fungi.mul_ci() < 2.5 * 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEstimate", into = "RawEstimate")]
pub struct LognormalEstimate {
    point: f64,
    mul_ci: f64,
}

#[derive(Serialize, Deserialize)]
struct RawEstimate {
    point: f64,
    mul_ci: f64,
}

impl TryFrom<RawEstimate> for LognormalEstimate {
    type Error = UncertaintyError;

    fn try_from(raw: RawEstimate) -> Result<Self> {
        Self::new(raw.point, raw.mul_ci)
    }
}

impl From<LognormalEstimate> for RawEstimate {
    fn from(estimate: LognormalEstimate) -> Self {
        Self {
            point: estimate.point,
            mul_ci: estimate.mul_ci,
        }
    }
}

impl LognormalEstimate {
    /// # Errors
    ///
    /// Fails unless `point` is finite and positive and `mul_ci` is finite and at least 1.
    pub fn new(point: f64, mul_ci: f64) -> Result<Self> {
        crate::validate::positive(&[point])?;
        crate::validate::mul_cis(&[mul_ci])?;
        Ok(Self { point, mul_ci })
    }

    /// An estimate with no usable spread information, assigned an
    /// order-of-magnitude uncertainty ([`NO_DATA_MUL_CI`]).
    ///
    /// # Errors
    ///
    /// Fails unless `point` is finite and positive.
    pub fn order_of_magnitude(point: f64) -> Result<Self> {
        Self::new(point, NO_DATA_MUL_CI)
    }

    /// Geometric mean of independent measurements, with the multiplicative
    /// 95% CI of that mean.
    ///
    /// # Errors
    ///
    /// Same conditions as [`interval::geo_ci_calc`].
    pub fn from_samples(values: &[f64]) -> Result<Self> {
        Ok(Self {
            point: interval::geo_mean(values)?,
            mul_ci: interval::geo_ci_calc(values)?,
        })
    }

    /// Product of independent estimates.
    ///
    /// # Errors
    ///
    /// Fails if `estimates` is empty or the product is not finite.
    pub fn product<I>(estimates: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let (points, mul_cis) = split(estimates);
        let point = points.iter().product::<f64>();
        Self::new(point, interval::ci_prod_prop(&mul_cis)?)
    }

    /// Sum of independent estimates, its CI propagated by `propagator`.
    ///
    /// # Errors
    ///
    /// Fails if `estimates` is empty or the sum is not finite.
    pub fn sum<I, P>(estimates: I, propagator: &mut P) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
        P: SumPropagator + ?Sized,
    {
        let (points, mul_cis) = split(estimates);
        let mul_ci = propagator.sum_ci(&points, &mul_cis)?;
        Self::new(points.iter().sum::<f64>(), mul_ci)
    }

    #[must_use]
    pub fn point(&self) -> f64 {
        self.point
    }

    #[must_use]
    pub fn mul_ci(&self) -> f64 {
        self.mul_ci
    }

    /// Lower end of the 95% range.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.point / self.mul_ci
    }

    /// Upper end of the 95% range.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.point * self.mul_ci
    }

    /// The same estimate with the larger of its own and `other_ci`.
    ///
    /// # Errors
    ///
    /// Fails if `other_ci` is not finite or below 1.
    pub fn widened(self, other_ci: f64) -> Result<Self> {
        let mul_ci = interval::conservative_ci(&[self.mul_ci, other_ci])?;
        Ok(Self { mul_ci, ..self })
    }
}

fn split<I>(estimates: I) -> (Vec<f64>, Vec<f64>)
where
    I: IntoIterator<Item = LognormalEstimate>,
{
    estimates
        .into_iter()
        .map(|e| (e.point, e.mul_ci))
        .unzip()
}

/// A quantity in (0, 1), averaged and bounded in odds space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionEstimate {
    /// Odds-space mean of the measured fractions.
    pub mean: f64,
    /// Multiplicative 95% CI of `mean`, in fraction units.
    pub mul_ci: f64,
}

impl FractionEstimate {
    /// Summarizes measured fractions, optionally weighted for the mean.
    ///
    /// The CI is always computed unweighted.
    ///
    /// # Errors
    ///
    /// Same conditions as [`fraction::frac_mean`].
    ///
    /// # Examples
    ///
    /// ```
    /// use biomass_uncertainty::{estimate::FractionEstimate, sampling::MonteCarlo};
    ///
    /// let mut mc = MonteCarlo::with_seed(1);
    /// let archaea = FractionEstimate::from_fractions(&[0.08, 0.15, 0.11], None, &mut mc).unwrap();
    /// assert!(archaea.mean > 0.08 && archaea.mean < 0.15);
    /// assert!(archaea.mul_ci > 1.0);
    /// ```
    pub fn from_fractions<R>(
        fractions: &[f64],
        weights: Option<&[f64]>,
        mc: &mut MonteCarlo<R>,
    ) -> Result<Self>
    where
        R: Rng,
    {
        Ok(Self {
            mean: fraction::frac_mean(fractions, weights)?,
            mul_ci: fraction::frac_ci_with(fractions, mc)?,
        })
    }

    /// Treats the fraction as a multiplicative factor of some total.
    ///
    /// # Errors
    ///
    /// Never fails for a value produced by [`Self::from_fractions`].
    pub fn as_factor(&self) -> Result<LognormalEstimate> {
        LognormalEstimate::new(self.mean, self.mul_ci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::FentonWilkinson;

    #[test]
    fn test_new_validates() {
        assert!(LognormalEstimate::new(1.0, 1.0).is_ok());
        assert!(matches!(
            LognormalEstimate::new(0.0, 2.0),
            Err(UncertaintyError::NonPositive { .. })
        ));
        assert!(matches!(
            LognormalEstimate::new(1.0, 0.5),
            Err(UncertaintyError::CiBelowOne { .. })
        ));
        assert!(matches!(
            LognormalEstimate::new(f64::NAN, 2.0),
            Err(UncertaintyError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_range() {
        let e = LognormalEstimate::new(50.0, 2.0).unwrap();
        assert_eq!(e.lower(), 25.0);
        assert_eq!(e.upper(), 100.0);
    }

    #[test]
    fn test_order_of_magnitude() {
        let e = LognormalEstimate::order_of_magnitude(3.0).unwrap();
        assert_eq!(e.mul_ci(), 10.0);
    }

    #[test]
    fn test_from_samples() {
        let e = LognormalEstimate::from_samples(&[2.0, 8.0]).unwrap();
        assert!((e.point() - 4.0).abs() < 1e-12);
        assert!(e.mul_ci() > 1.0);

        let single = LognormalEstimate::from_samples(&[7.0]).unwrap();
        assert_eq!(single.mul_ci(), 1.0);
    }

    #[test]
    fn test_product() {
        let e = LognormalEstimate::product([
            LognormalEstimate::new(2.0, 1.5).unwrap(),
            LognormalEstimate::new(3.0, 1.4).unwrap(),
            LognormalEstimate::new(0.5, 2.2).unwrap(),
        ])
        .unwrap();
        assert!((e.point() - 3.0).abs() < 1e-12);
        assert!((e.mul_ci() - interval::ci_prod_prop(&[1.5, 1.4, 2.2]).unwrap()).abs() < 1e-12);

        assert_eq!(
            LognormalEstimate::product([]),
            Err(UncertaintyError::Empty)
        );
    }

    #[test]
    fn test_sum_with_propagators() {
        let parts = [
            LognormalEstimate::new(450.0, 1.2).unwrap(),
            LognormalEstimate::new(70.0, 1.8).unwrap(),
        ];
        let analytic = LognormalEstimate::sum(parts, &mut FentonWilkinson).unwrap();
        let simulated = LognormalEstimate::sum(parts, &mut MonteCarlo::with_seed(2)).unwrap();
        assert_eq!(analytic.point(), 520.0);
        assert_eq!(simulated.point(), 520.0);
        assert!((analytic.mul_ci() - simulated.mul_ci()).abs() < 0.05);
        // The total is less uncertain than its least certain part.
        assert!(simulated.mul_ci() < 1.8);
    }

    #[test]
    fn test_widened() {
        let e = LognormalEstimate::new(5.0, 1.5).unwrap();
        assert_eq!(e.widened(3.0).unwrap().mul_ci(), 3.0);
        assert_eq!(e.widened(1.2).unwrap().mul_ci(), 1.5);
        assert!(e.widened(0.2).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let e: LognormalEstimate = serde_json::from_str(r#"{"point": 2.0, "mul_ci": 1.5}"#).unwrap();
        assert_eq!(e, LognormalEstimate::new(2.0, 1.5).unwrap());
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            r#"{"point":2.0,"mul_ci":1.5}"#
        );
        assert!(serde_json::from_str::<LognormalEstimate>(r#"{"point": -2.0, "mul_ci": 1.5}"#).is_err());
    }

    #[test]
    fn test_fraction_estimate_as_factor() {
        let mut mc = MonteCarlo::with_seed(6);
        let f = FractionEstimate::from_fractions(&[0.3, 0.4], Some(&[1.0, 3.0]), &mut mc).unwrap();
        let factor = f.as_factor().unwrap();
        assert_eq!(factor.point(), f.mean);
        assert_eq!(factor.mul_ci(), f.mul_ci);
    }
}
