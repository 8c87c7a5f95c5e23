use std::iter;

use crate::{
    nice::{NiceStep, usize_to_f64},
    percentiles,
};

/// Step candidates tried per alignment before falling back to an even split.
const MAX_STEP_CANDIDATES: usize = 8;

/// Smallest domain span relative to the magnitude of the data, so that bin
/// edges stay distinct floats.
const MIN_RELATIVE_SPAN: f64 = 1e-12;

/// Errors returned when a histogram cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum HistogramError {
    #[display("bucket count must be positive")]
    ZeroBuckets,
    #[display("cannot bin an empty set of values")]
    NoValues,
}

/// A fixed-width histogram over a "niced" domain.
///
/// The domain `[min, max]` of the data is extended so that every bin boundary
/// is a round number: the bin width is the smallest step of the form
/// `{1, 2, 2.5, 5} * 10^k` for which `bucket_count` bins, starting at a
/// multiple of the width, reach the maximum value. When no such width is
/// close to the data (a single bin straddling zero, for instance), the first
/// bin starts at a multiple of the width's power of ten instead. Domains too
/// wide for either are split evenly between `min` and `max`.
///
/// Values are assigned to half-open bins `[low, high)`, except the last bin,
/// which is closed so that it contains the upper domain boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// The bins in ascending order. Empty bins are kept.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Inclusive lower boundary.
    pub low: f64,
    /// Upper boundary (exclusive, except for the last bin).
    pub high: f64,
    /// The number of values that fall within this bin.
    pub count: u64,
}

impl HistogramBin {
    /// Returns the bin width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

impl Histogram {
    /// Creates a histogram with `bucket_count` bins from unsorted values.
    ///
    /// NaN and infinite values are treated as missing and skipped.
    ///
    /// # Errors
    ///
    /// * [`HistogramError::ZeroBuckets`] - if `bucket_count` is zero
    /// * [`HistogramError::NoValues`] - if no finite value is given
    ///
    /// # Examples
    ///
    /// ```
    /// # use airq_stats::histogram::Histogram;
    /// let values = (0..12).map(f64::from);
    /// let histogram = Histogram::new(values, 12).unwrap();
    /// assert_eq!(histogram.bins.len(), 12);
    /// assert!(histogram.bins.iter().all(|bin| bin.count == 1));
    /// assert_eq!(histogram.domain(), (0.0, 12.0));
    /// ```
    pub fn new<I>(values: I, bucket_count: usize) -> Result<Self, HistogramError>
    where
        I: IntoIterator<Item = f64>,
    {
        let sorted = percentiles::sorted_finite(values);
        Self::from_sorted(&sorted, bucket_count)
    }

    /// Creates a histogram from pre-sorted finite values.
    ///
    /// # Errors
    ///
    /// Same as [`Histogram::new`].
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    pub fn from_sorted(sorted_values: &[f64], bucket_count: usize) -> Result<Self, HistogramError> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        if bucket_count == 0 {
            return Err(HistogramError::ZeroBuckets);
        }
        let (Some(&min), Some(&max)) = (sorted_values.first(), sorted_values.last()) else {
            return Err(HistogramError::NoValues);
        };

        let edges = bin_edges(min, max, bucket_count);
        let mut bins = edges
            .windows(2)
            .map(|edge| HistogramBin {
                low: edge[0],
                high: edge[1],
                count: 0,
            })
            .collect::<Vec<_>>();

        // Interior edges only: anything at or past the last edge lands in the last bin.
        let interior = &edges[1..bucket_count];
        for &value in sorted_values {
            let idx = interior.partition_point(|&edge| edge <= value);
            bins[idx].count += 1;
        }

        Ok(Self { bins })
    }

    /// Returns the covered domain `(low of first bin, high of last bin)`.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => (first.low, last.high),
            _ => (f64::NAN, f64::NAN),
        }
    }

    /// Returns the total number of values counted.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Returns the largest bin count.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}

/// Computes `bucket_count + 1` round bin boundaries covering `[min, max]`.
fn bin_edges(min: f64, max: f64, bucket_count: usize) -> Vec<f64> {
    let magnitude = min.abs().max(max.abs());
    // A single distinct value still needs a non-degenerate domain.
    let span = if max > min { max - min } else { 1.0 };
    let span = span.max(magnitude * MIN_RELATIVE_SPAN);

    let first = NiceStep::at_least(span / usize_to_f64(bucket_count));
    let candidates =
        || iter::successors(Some(first), |step| Some(step.next())).take(MAX_STEP_CANDIDATES);
    let aligned_to_step = candidates().map(|step| (step, 1.0));
    let aligned_to_decade = candidates().map(|step| (step.decade(), step.mantissa()));

    aligned_to_step
        .chain(aligned_to_decade)
        .find_map(|(grid, stride)| {
            let start = grid.floor_index(min);
            let edges = (0..=bucket_count)
                .map(|i| grid.multiple(start + usize_to_f64(i) * stride))
                .collect::<Vec<_>>();
            covers(&edges, min, max).then_some(edges)
        })
        .unwrap_or_else(|| even_edges(min, max, bucket_count))
}

/// Returns whether `edges` are finite, strictly increasing and span `[min, max]`.
fn covers(edges: &[f64], min: f64, max: f64) -> bool {
    edges.iter().all(|edge| edge.is_finite())
        && edges.windows(2).all(|pair| pair[0] < pair[1])
        && edges.first().is_some_and(|&first| first <= min)
        && edges.last().is_some_and(|&last| last >= max)
}

fn even_edges(min: f64, max: f64, bucket_count: usize) -> Vec<f64> {
    let (low, high) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let buckets = usize_to_f64(bucket_count);
    // Interpolated rather than `low + i * width` so huge spans do not overflow.
    (0..=bucket_count)
        .map(|i| {
            let t = usize_to_f64(i) / buckets;
            low * (1.0 - t) + high * t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn bounds(histogram: &Histogram) -> Vec<(f64, f64)> {
        histogram
            .bins
            .iter()
            .map(|bin| (bin.low, bin.high))
            .collect()
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            Histogram::new([1.0, 2.0], 0).unwrap_err(),
            HistogramError::ZeroBuckets
        );
        assert_eq!(
            Histogram::new(std::iter::empty(), 12).unwrap_err(),
            HistogramError::NoValues
        );
        assert_eq!(
            Histogram::new([f64::NAN], 12).unwrap_err(),
            HistogramError::NoValues
        );
    }

    #[test]
    fn test_one_value_per_bucket() {
        let histogram = Histogram::new((0..12).map(f64::from), 12).unwrap();
        assert_eq!(histogram.bins.len(), 12);
        for (i, bin) in histogram.bins.iter().enumerate() {
            assert_eq!(bin.low, i as f64);
            assert_eq!(bin.high, (i + 1) as f64);
            assert_eq!(bin.count, 1);
        }
    }

    #[test]
    fn test_hours_of_day() {
        // Peak-hour readings span 0..=23; twelve buckets give two-hour bins.
        let values = [0.0, 1.0, 5.0, 7.0, 7.0, 8.0, 12.0, 22.0, 23.0];
        let histogram = Histogram::new(values, 12).unwrap();
        assert_eq!(histogram.domain(), (0.0, 24.0));
        assert!(histogram.bins.iter().all(|bin| bin.width() == 2.0));
        let counts = histogram
            .bins
            .iter()
            .map(|bin| bin.count)
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![2, 0, 1, 2, 1, 0, 1, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_last_bin_is_closed() {
        let histogram = Histogram::new([0.0, 10.0], 5).unwrap();
        assert_eq!(
            bounds(&histogram),
            vec![(0.0, 2.0), (2.0, 4.0), (4.0, 6.0), (6.0, 8.0), (8.0, 10.0)]
        );
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[4].count, 1);
    }

    #[test]
    fn test_boundaries_are_round() {
        let histogram = Histogram::new([0.13, 0.42, 0.77], 4).unwrap();
        assert_eq!(
            bounds(&histogram),
            vec![(0.0, 0.2), (0.2, 0.4), (0.4, 0.6), (0.6, 0.8)]
        );
        assert_eq!(histogram.total_count(), 3);
    }

    #[test]
    fn test_step_grows_when_offset_start_falls_short() {
        // 3.0 / 3 = 1.0, but starting at 1.5 rounds down to 1.0 and three
        // unit bins only reach 4.0.
        let histogram = Histogram::new([1.5, 4.5], 3).unwrap();
        assert_eq!(
            bounds(&histogram),
            vec![(0.0, 2.0), (2.0, 4.0), (4.0, 6.0)]
        );
    }

    #[test]
    fn test_single_distinct_value() {
        let histogram = Histogram::new([7.0, 7.0, 7.0], 12).unwrap();
        assert_eq!(histogram.bins.len(), 12);
        assert_eq!(histogram.total_count(), 3);
        let (low, high) = histogram.domain();
        assert!(low <= 7.0 && 7.0 <= high);
        assert!(high > low);
    }

    #[test]
    fn test_negative_values() {
        // Width 2 starting at -6 only reaches 2.0, so the step grows to 2.5.
        let histogram = Histogram::new([-5.0, -1.0, 0.0, 3.0], 4).unwrap();
        assert_eq!(
            bounds(&histogram),
            vec![(-5.0, -2.5), (-2.5, 0.0), (0.0, 2.5), (2.5, 5.0)]
        );
        assert!(histogram.bins.iter().all(|bin| bin.count == 1));
    }

    #[test]
    fn test_single_bucket_across_zero() {
        let histogram = Histogram::new([-1.0, 1.0], 1).unwrap();
        assert_eq!(bounds(&histogram), vec![(-1.0, 1.0)]);
        assert_eq!(histogram.total_count(), 2);

        let histogram = Histogram::new([-5770.53, 5293.26], 1).unwrap();
        assert_eq!(histogram.domain(), (-10000.0, 10000.0));
        assert_eq!(histogram.total_count(), 2);
    }

    #[test]
    fn test_huge_single_value() {
        let histogram = Histogram::new([1.0e18], 12).unwrap();
        assert_eq!(histogram.bins.len(), 12);
        assert_eq!(histogram.total_count(), 1);
        let (low, high) = histogram.domain();
        assert!(low.is_finite() && high.is_finite());
        assert!(low <= 1.0e18 && 1.0e18 <= high);
        assert!(histogram.bins.iter().all(|bin| bin.low < bin.high));
    }

    #[test]
    fn test_span_beyond_f64_range_is_split_evenly() {
        let histogram = Histogram::new([-1.0e308, 1.0e308], 3).unwrap();
        assert_eq!(histogram.domain(), (-1.0e308, 1.0e308));
        assert!(histogram.bins.iter().all(|bin| bin.low < bin.high));
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[2].count, 1);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let histogram = Histogram::new([1.0, f64::NAN, 2.0, f64::INFINITY], 2).unwrap();
        assert_eq!(histogram.total_count(), 2);
        assert_eq!(histogram.max_count(), 1);
    }

    proptest! {
        #[test]
        fn test_counts_cover_all_values(
            values in prop::collection::vec(-1.0e4..1.0e4_f64, 1..300),
            bucket_count in 1usize..40,
        ) {
            let histogram = Histogram::new(values.clone(), bucket_count).unwrap();
            prop_assert_eq!(histogram.bins.len(), bucket_count);
            prop_assert_eq!(histogram.total_count(), values.len() as u64);

            let (low, high) = histogram.domain();
            for &v in &values {
                prop_assert!(low <= v && v <= high);
            }
            for pair in histogram.bins.windows(2) {
                prop_assert_eq!(pair[0].high, pair[1].low);
                prop_assert!(pair[0].low < pair[0].high);
            }
        }
    }
}
