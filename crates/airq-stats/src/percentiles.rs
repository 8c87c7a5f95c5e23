/// Computes a quantile from sorted data using linear interpolation.
///
/// This is the "R-7" estimator (the default of R, `NumPy` and d3): for `n` sorted
/// values the `p`-quantile sits at fractional rank `h = (n - 1) * p` and is
/// interpolated between the two order statistics around it.
///
/// `p` is clamped to `0.0..=1.0`.
///
/// # Arguments
///
/// * `sorted_values` - Values sorted in ascending order
/// * `p` - The quantile to compute (0.0 to 1.0)
///
/// # Returns
///
/// The interpolated value, or `None` if the input is empty or `p` is NaN.
///
/// # Examples
///
/// ```
/// use airq_stats::percentiles::quantile_sorted;
///
/// let values = [10.0, 20.0, 30.0, 1000.0];
/// assert_eq!(quantile_sorted(&values, 0.25), Some(17.5));
/// assert_eq!(quantile_sorted(&values, 0.5), Some(25.0));
/// assert_eq!(quantile_sorted(&values, 0.75), Some(272.5));
/// assert_eq!(quantile_sorted(&[], 0.5), None);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn quantile_sorted(sorted_values: &[f64], p: f64) -> Option<f64> {
    debug_assert!(
        sorted_values.is_sorted_by(|a, b| a <= b),
        "values must be sorted in ascending order"
    );

    let (&first, &last) = (sorted_values.first()?, sorted_values.last()?);
    if p.is_nan() {
        return None;
    }
    if p <= 0.0 || sorted_values.len() < 2 {
        return Some(first);
    }
    if p >= 1.0 {
        return Some(last);
    }

    let rank = (sorted_values.len() - 1) as f64 * p;
    let lower_idx = rank.floor() as usize;
    let lower = sorted_values[lower_idx];
    let upper = sorted_values[lower_idx + 1];
    Some(lower + (upper - lower) * (rank - rank.floor()))
}

/// Computes a quantile from unsorted values.
///
/// Non-finite values are ignored. The remaining values are sorted internally.
///
/// # Examples
///
/// ```
/// use airq_stats::percentiles::quantile;
///
/// let values = [5.0, f64::NAN, 1.0, 3.0];
/// assert_eq!(quantile(values, 0.5), Some(3.0));
/// ```
#[must_use]
pub fn quantile<I>(values: I, p: f64) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let sorted = sorted_finite(values);
    quantile_sorted(&sorted, p)
}

/// Collects the finite values of an iterator in ascending order.
///
/// NaN and infinite values are dropped, so the result is safe to feed into
/// [`quantile_sorted`] and the other `from_sorted` constructors of this crate.
///
/// # Examples
///
/// ```
/// use airq_stats::percentiles::sorted_finite;
///
/// let sorted = sorted_finite([3.0, f64::INFINITY, 1.0, f64::NAN, 2.0]);
/// assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
/// ```
#[must_use]
pub fn sorted_finite<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted = values
        .into_iter()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    sorted.sort_by(f64::total_cmp);
    sorted
}
