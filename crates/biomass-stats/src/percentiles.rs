/// Precomputed percentile values for a sample.
///
/// Stores percentile-value pairs for lookup of the points a caller asked for,
/// typically the 2.5th and 97.5th percentiles bounding a 95% interval.
///
/// # Examples
///
/// ```
/// use biomass_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let percentiles = Percentiles::from_sorted(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(3.0));
/// assert_eq!(percentiles.get(25.0), Some(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// Percentile-value pairs in the order they were requested.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed.
    ///
    /// # Examples
    ///
    /// ```
    /// use biomass_stats::percentiles::Percentiles;
    ///
    /// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    /// let percentiles = Percentiles::from_sorted(&values, &[25.0, 75.0]);
    ///
    /// assert_eq!(percentiles.get(75.0), Some(4.0));
    /// assert_eq!(percentiles.get(50.0), None); // Not precomputed
    /// ```
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - percentile).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }
}

/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest ranks: the k-th
/// percentile sits at fractional position `(n - 1) * k / 100`. This is the
/// default definition in most numerical environments, so Monte Carlo
/// summaries are comparable with values reported elsewhere.
///
/// Returns `f64::NAN` if the input is empty. `percentile` is clamped to
/// `[0, 100]`.
///
/// # Examples
///
/// ```
/// use biomass_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let last = sorted_values.len() - 1;
    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lower = (rank.floor() as usize).min(last);
    let upper = (rank.ceil() as usize).min(last);
    let fraction = rank - lower as f64;
    sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * fraction
}
