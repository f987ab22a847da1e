/// Descriptive statistics summarizing a sample.
///
/// Dispersion is measured with the sample (Bessel-corrected) variance,
/// dividing by `n - 1`. A single-element sample has zero variance instead of
/// an undefined one, so callers working with one literature value still get a
/// well-defined spread.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    /// Number of values in the sample.
    pub count: usize,
    /// The minimum value in the sample.
    pub min: f64,
    /// The maximum value in the sample.
    pub max: f64,
    /// The arithmetic mean of the sample.
    pub mean: f64,
    /// The median value of the sample.
    pub median: f64,
    /// The sample variance (divides by `n - 1`).
    pub variance: f64,
    /// The sample standard deviation.
    pub std_dev: f64,
    /// The standard error of the mean (`std_dev / sqrt(n)`).
    pub std_error: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the sample contains at least one value
    /// * `None` - if the sample is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use biomass_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, 2.5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// Use this when the data is already sorted to skip the sorting step.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use biomass_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::from_sorted(&[2.0]).unwrap();
    /// assert_eq!(stats.std_dev, 0.0);
    /// assert_eq!(stats.std_error, 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = if count % 2 == 0 {
            f64::midpoint(sorted_values[count / 2 - 1], sorted_values[count / 2])
        } else {
            sorted_values[count / 2]
        };
        let variance = sample_variance(sorted_values, mean);
        let std_dev = variance.sqrt();
        let std_error = std_dev / n.sqrt();

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
            std_error,
        })
    }
}

/// Bessel-corrected variance around a precomputed mean; zero for fewer than two values.
#[expect(clippy::cast_precision_loss)]
fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Arithmetic mean of `values`.
///
/// Returns `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use biomass_stats::descriptive::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
/// assert_eq!(mean(&[]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Weighted arithmetic mean `sum(w * x) / sum(w)`.
///
/// Returns `None` when the slices differ in length, are empty, or the
/// weights sum to zero.
///
/// # Examples
///
/// ```
/// use biomass_stats::descriptive::weighted_mean;
///
/// assert_eq!(weighted_mean(&[1.0, 3.0], &[3.0, 1.0]), Some(1.5));
/// assert_eq!(weighted_mean(&[1.0, 3.0], &[0.0, 0.0]), None);
/// ```
#[must_use]
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    if values.is_empty() || values.len() != weights.len() {
        return None;
    }
    let total_weight = weights.iter().sum::<f64>();
    if total_weight == 0.0 {
        return None;
    }
    let weighted_sum = values
        .iter()
        .zip(weights)
        .map(|(v, w)| v * w)
        .sum::<f64>();
    Some(weighted_sum / total_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::new()).is_none());
    }

    #[test]
    fn test_single_value_has_zero_spread() {
        let stats = DescriptiveStats::new([7.5]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.median, 7.5);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_error, 0.0);
    }

    #[test]
    fn test_bessel_corrected_variance() {
        // Population variance would be 1.25; sample variance divides by n - 1.
        let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((stats.variance - 5.0 / 3.0).abs() < 1e-12);
        assert!((stats.std_error - (5.0_f64 / 3.0).sqrt() / 2.0).abs() < 1e-12);
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let stats = DescriptiveStats::new([3.0, -1.0, 2.0]).unwrap();
        assert_eq!(stats.min, -1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.median, 2.0);
    }

    #[test]
    #[should_panic(expected = "values must be sorted")]
    fn test_from_sorted_rejects_unsorted() {
        let _ = DescriptiveStats::from_sorted(&[2.0, 1.0]);
    }

    #[test]
    fn test_weighted_mean_length_mismatch() {
        assert_eq!(weighted_mean(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_weighted_mean_ignores_zero_weight() {
        let mean = weighted_mean(&[1.0, 100.0, 3.0], &[1.0, 0.0, 1.0]).unwrap();
        assert!((mean - 2.0).abs() < 1e-12);
    }
}
