//! Statistical building blocks for the biomass uncertainty toolkit.
//!
//! This crate provides the small set of sample statistics the uncertainty
//! primitives are built from:
//!
//! - **Descriptive statistics**: mean, median, Bessel-corrected variance and
//!   standard deviation, standard error of the mean, weighted mean
//! - **Percentiles**: linearly interpolated percentiles of a sample
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing samples
//! - [`percentiles`]: Percentile computation and storage
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use biomass_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.5);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use biomass_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::from_sorted(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```

pub mod descriptive;
pub mod percentiles;
