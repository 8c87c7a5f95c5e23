use crate::percentiles::{self, quantile_sorted};

/// Multiplier applied to the interquartile range to obtain the outlier fences.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Five-number summary plus outliers for one group of values.
///
/// Quartiles are linear-interpolated (see [`quantile_sorted`]). Whiskers are
/// the most extreme data points that survive the `1.5 * IQR` fences, not the
/// fences themselves.
///
/// The following ordering always holds:
///
/// ```text
/// whisker_low <= q1 <= median <= q3 <= whisker_high
/// ```
///
/// For groups of one or two values the box can extend past every surviving
/// point; the whisker then ends at the box edge. This never changes which
/// values are reported as outliers.
///
/// # Examples
///
/// ```
/// use airq_stats::boxplot::BoxPlotStats;
///
/// let stats = BoxPlotStats::new([1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
/// assert_eq!(stats.median, 3.5);
/// assert_eq!(stats.whisker_high, 5.0);
/// assert_eq!(stats.outliers, vec![100.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotStats {
    /// Number of finite values the statistics were computed from.
    pub count: usize,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    /// Lower whisker end: the smallest value not below `q1 - 1.5 * IQR`,
    /// or `q1` if that value lies above the box.
    pub whisker_low: f64,
    /// Upper whisker end: the largest value not above `q3 + 1.5 * IQR`,
    /// or `q3` if that value lies below the box.
    ///
    /// Only in the clamped case is this not a data point.
    pub whisker_high: f64,
    /// Values outside the whiskers, in ascending order.
    pub outliers: Vec<f64>,
}

impl BoxPlotStats {
    /// Computes box plot statistics from unsorted values.
    ///
    /// NaN and infinite values are treated as missing and skipped.
    ///
    /// # Returns
    ///
    /// * `Some(BoxPlotStats)` - if at least one finite value remains
    /// * `None` - if the group is empty after filtering
    ///
    /// # Examples
    ///
    /// ```
    /// # use airq_stats::boxplot::BoxPlotStats;
    /// assert!(BoxPlotStats::new([f64::NAN]).is_none());
    ///
    /// let stats = BoxPlotStats::new([3.0, f64::NAN, 1.0, 2.0]).unwrap();
    /// assert_eq!(stats.count, 3);
    /// assert_eq!(stats.median, 2.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let sorted = percentiles::sorted_finite(values);
        Self::from_sorted(&sorted)
    }

    /// Computes box plot statistics from pre-sorted finite values.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let q1 = quantile_sorted(sorted_values, 0.25)?;
        let median = quantile_sorted(sorted_values, 0.5)?;
        let q3 = quantile_sorted(sorted_values, 0.75)?;
        let iqr = q3 - q1;
        let lower_fence = q1 - WHISKER_IQR_FACTOR * iqr;
        let upper_fence = q3 + WHISKER_IQR_FACTOR * iqr;

        let low_idx = sorted_values.partition_point(|&v| v < lower_fence);
        let high_idx = sorted_values.partition_point(|&v| v <= upper_fence);
        let surviving = sorted_values.get(low_idx..high_idx)?;
        let (&first_surviving, &last_surviving) = (surviving.first()?, surviving.last()?);

        let outliers = sorted_values[..low_idx]
            .iter()
            .chain(&sorted_values[high_idx..])
            .copied()
            .collect();

        Some(Self {
            count: sorted_values.len(),
            q1,
            median,
            q3,
            whisker_low: first_surviving.min(q1),
            whisker_high: last_surviving.max(q3),
            outliers,
        })
    }

    /// Returns the interquartile range (`q3 - q1`).
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Returns whether `value` lies outside the whiskers.
    #[must_use]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.whisker_low || value > self.whisker_high
    }

    /// Returns the smallest and largest value drawn for this group,
    /// including outliers.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        let low = self
            .outliers
            .first()
            .map_or(self.whisker_low, |&v| v.min(self.whisker_low));
        let high = self
            .outliers
            .last()
            .map_or(self.whisker_high, |&v| v.max(self.whisker_high));
        (low, high)
    }
}
