//! Multiplicative uncertainty for biomass estimates.
//!
//! Biomass estimates are positive quantities whose errors are multiplicative,
//! so every estimate is carried as a point value and a multiplicative 95%
//! confidence interval `k >= 1`: the true value lies in
//! `[point / k, point * k]`. This crate combines such estimates consistently.
//!
//! # Primitives
//!
//! | Operation | Function |
//! |---|---|
//! | CI of a geometric mean of measurements | [`geo_ci_calc`] |
//! | CI of a product of independent factors | [`ci_prod_prop`] |
//! | CI of a sum of independent estimates | [`ci_sum_prop`], [`SumPropagator`] |
//! | Mean of fractions in (0, 1) | [`frac_mean`] |
//! | CI of that mean | [`frac_ci`], [`frac_ci_with`] |
//!
//! [`LognormalEstimate`] and [`FractionEstimate`] wrap the primitives for
//! callers that assemble an estimate from parts.
//!
//! # Modules
//!
//! - [`interval`]: geometric means, product propagation, conservative choice
//! - [`sampling`]: sum propagation by simulation or moment matching
//! - [`fraction`]: the odds transform and fraction statistics
//! - [`estimate`]: estimate value types
//! - [`error`]: the error type shared by every operation
//!
//! # Randomness
//!
//! Sum propagation and fraction CIs are Monte Carlo estimates. The plain
//! functions seed from the operating system; pass a
//! [`MonteCarlo::with_seed`] instance to the `_with` variants or to
//! [`SumPropagator::sum_ci`] for reproducible results. The crate holds no
//! global state.
//!
//! # Limitations
//!
//! - Every operation assumes lognormal (or log-odds-normal) errors. Nothing
//!   checks that assumption against the data.
//! - Exact 0 and 1 fractions are rejected rather than patched; see
//!   [`fraction::clamp_fractions`] for an explicit opt-in.
//!
//! # Example
//!
//! ```
//! use biomass_uncertainty::{LognormalEstimate, MonteCarlo, ci_prod_prop, geo_ci_calc};
//!
//! // Cell counts reported by two studies.
//! let counts = LognormalEstimate::from_samples(&[0.28e15, 0.64e15]).unwrap();
//! assert!((counts.mul_ci() - geo_ci_calc(&[0.28e15, 0.64e15]).unwrap()).abs() < 1e-12);
//!
//! // Times carbon per cell.
//! let carbon = LognormalEstimate::new(1.4e-14, 1.8).unwrap();
//! let biomass = LognormalEstimate::product([counts, carbon]).unwrap();
//! assert!((biomass.mul_ci() - ci_prod_prop(&[counts.mul_ci(), 1.8]).unwrap()).abs() < 1e-12);
//!
//! // Added to another environment's biomass.
//! let other = LognormalEstimate::new(2.0, 3.0).unwrap();
//! let total = LognormalEstimate::sum([biomass, other], &mut MonteCarlo::with_seed(0)).unwrap();
//! assert!(total.mul_ci() > 1.0);
//! ```

pub mod error;
pub mod estimate;
pub mod fraction;
pub mod interval;
pub mod sampling;
mod validate;

pub use self::{
    error::{Result, UncertaintyError},
    estimate::{FractionEstimate, LognormalEstimate},
    fraction::{frac_ci, frac_ci_with, frac_mean},
    interval::{ci_prod_prop, geo_ci_calc},
    sampling::{FentonWilkinson, MonteCarlo, SumPropagator, ci_sum_prop},
};
