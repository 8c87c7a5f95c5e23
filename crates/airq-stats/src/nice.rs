//! Round-number steps for bin boundaries and axis ticks.
//!
//! Two flavours are provided:
//!
//! - [`NiceStep`]: steps of the form `{1, 2, 2.5, 5} * 10^k`, used to pick bin
//!   widths that are never narrower than requested.
//! - [`ticks`]/[`tick_step`]: axis ticks rounded to the *nearest* `{1, 2, 5} * 10^k`
//!   step, the way d3 axes do it.
//!
//! Multiples of a step are computed from the integer mantissa and an exact
//! power of ten, so `3 * 0.1` comes out as `0.3` rather than
//! `0.30000000000000004`.

const MANTISSAS: [f64; 4] = [1.0, 2.0, 2.5, 5.0];

/// A round step `mantissa * 10^exponent` with mantissa in `{1, 2, 2.5, 5}`.
///
/// # Examples
///
/// ```
/// use airq_stats::nice::NiceStep;
///
/// let step = NiceStep::at_least(0.92);
/// assert_eq!(step.value(), 1.0);
/// assert_eq!(NiceStep::at_least(1.3).value(), 2.0);
/// assert_eq!(NiceStep::at_least(0.021).value(), 0.025);
/// assert_eq!(NiceStep::at_least(0.021).multiple(3.0), 0.075);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NiceStep {
    mantissa_idx: usize,
    exponent: i32,
}

impl NiceStep {
    /// Returns the smallest nice step that is greater than or equal to `raw`.
    ///
    /// Non-positive or non-finite input yields a step of `1`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn at_least(raw: f64) -> Self {
        if !raw.is_finite() || raw <= 0.0 {
            return Self {
                mantissa_idx: 0,
                exponent: 0,
            };
        }

        let exponent = raw.log10().floor() as i32;
        let mut step = Self {
            mantissa_idx: 0,
            exponent,
        };
        // log10 can land one decade off for values right at a power of ten.
        while step.value() > raw && !step.is_tolerably_equal(raw) {
            step = step.prev();
        }
        while step.value() < raw && !step.is_tolerably_equal(raw) {
            step = step.next();
        }
        step
    }

    /// Returns the step value as a float.
    #[must_use]
    pub fn value(self) -> f64 {
        self.multiple(1.0)
    }

    /// Returns the mantissa, one of `1`, `2`, `2.5` or `5`.
    #[must_use]
    pub fn mantissa(self) -> f64 {
        MANTISSAS[self.mantissa_idx]
    }

    /// Returns the power of ten the mantissa is scaled by, as a step of its own.
    ///
    /// Every multiple of `self` is a multiple of the decade, up to the
    /// mantissa factor.
    ///
    /// # Examples
    ///
    /// ```
    /// use airq_stats::nice::NiceStep;
    ///
    /// assert_eq!(NiceStep::at_least(25.0).decade().value(), 10.0);
    /// assert_eq!(NiceStep::at_least(0.5).decade().value(), 0.1);
    /// ```
    #[must_use]
    pub fn decade(self) -> Self {
        Self {
            mantissa_idx: 0,
            ..self
        }
    }

    /// Returns `k * step`, computed exactly enough to print as a round number.
    ///
    /// `k` is expected to be integral; it is a float so that indices of very
    /// large values stay representable.
    #[must_use]
    pub fn multiple(self, k: f64) -> f64 {
        scale_by_power_of_ten(k * self.mantissa(), self.exponent)
    }

    /// Returns the next larger nice step.
    #[must_use]
    pub fn next(self) -> Self {
        if self.mantissa_idx + 1 < MANTISSAS.len() {
            Self {
                mantissa_idx: self.mantissa_idx + 1,
                ..self
            }
        } else {
            Self {
                mantissa_idx: 0,
                exponent: self.exponent + 1,
            }
        }
    }

    fn prev(self) -> Self {
        match self.mantissa_idx.checked_sub(1) {
            Some(mantissa_idx) => Self {
                mantissa_idx,
                ..self
            },
            None => Self {
                mantissa_idx: MANTISSAS.len() - 1,
                exponent: self.exponent - 1,
            },
        }
    }

    /// Returns the largest integral `k` such that `k * step <= value`.
    ///
    /// Beyond `2^53` neighbouring indices are no longer distinct; the result
    /// is then the nearest representable index.
    #[must_use]
    pub fn floor_index(self, value: f64) -> f64 {
        floor_index_by(value, self.value(), |k| self.multiple(k))
    }

    /// Returns the smallest integral `k` such that `k * step >= value`.
    #[must_use]
    pub fn ceil_index(self, value: f64) -> f64 {
        ceil_index_by(value, self.value(), |k| self.multiple(k))
    }

    fn is_tolerably_equal(self, raw: f64) -> bool {
        (self.value() - raw).abs() <= raw * 1e-9
    }
}

/// Returns the d3-style tick step for about `count` ticks over `[min, max]`.
///
/// The raw step `(max - min) / count` is rounded to the nearest of
/// `{1, 2, 5} * 10^k`. Returns `None` for an empty, inverted or non-finite
/// domain, or when `count` is zero.
///
/// # Examples
///
/// ```
/// use airq_stats::nice::tick_step;
///
/// assert_eq!(tick_step(0.0, 23.0, 10), Some(2.0));
/// assert_eq!(tick_step(0.0, 1.0, 5), Some(0.2));
/// assert_eq!(tick_step(1.0, 1.0, 5), None);
/// ```
#[must_use]
pub fn tick_step(min: f64, max: f64, count: usize) -> Option<f64> {
    TickStep::new(min, max, count).map(|step| step.value_at(1.0))
}

/// Returns round tick values inside `[min, max]`, about `count` of them.
///
/// # Examples
///
/// ```
/// use airq_stats::nice::ticks;
///
/// assert_eq!(ticks(0.0, 23.0, 5), vec![0.0, 5.0, 10.0, 15.0, 20.0]);
/// assert_eq!(ticks(0.0, 1.0, 4), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
/// ```
#[must_use]
pub fn ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let Some(step) = TickStep::new(min, max, count) else {
        return if min == max && min.is_finite() {
            vec![min]
        } else {
            vec![]
        };
    };
    let (start, stop) = step.index_range(min, max);
    if stop < start {
        return vec![];
    }
    // The raw step is span / count, so the range holds about `count` ticks.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let len = (stop - start) as usize;
    (0..=len)
        .map(|i| step.value_at(start + usize_to_f64(i)))
        .collect()
}

/// Extends `[min, max]` outward to the tick step chosen for `count` ticks.
///
/// # Examples
///
/// ```
/// use airq_stats::nice::nice_domain;
///
/// assert_eq!(nice_domain(0.3, 22.6, 10), (0.0, 24.0));
/// assert_eq!(nice_domain(5.0, 5.0, 10), (5.0, 5.0));
/// ```
#[must_use]
pub fn nice_domain(min: f64, max: f64, count: usize) -> (f64, f64) {
    let Some(step) = TickStep::new(min, max, count) else {
        return (min, max);
    };
    (
        step.value_at(step.floor_index(min)),
        step.value_at(step.ceil_index(max)),
    )
}

/// Tick step `mantissa * 10^exponent` with mantissa in `{1, 2, 5}`.
#[derive(Debug, Clone, Copy)]
struct TickStep {
    mantissa: f64,
    exponent: i32,
}

impl TickStep {
    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn new(min: f64, max: f64, count: usize) -> Option<Self> {
        if count == 0 || !min.is_finite() || !max.is_finite() || max <= min {
            return None;
        }
        let raw = (max - min) / count as f64;
        if !raw.is_finite() {
            return None;
        }
        let mut exponent = raw.log10().floor() as i32;
        let error = raw / 10f64.powi(exponent);
        let mantissa = if error >= 50f64.sqrt() {
            exponent += 1;
            1.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };
        Some(Self { mantissa, exponent })
    }

    fn value_at(self, k: f64) -> f64 {
        scale_by_power_of_ten(k * self.mantissa, self.exponent)
    }

    fn floor_index(self, value: f64) -> f64 {
        floor_index_by(value, self.value_at(1.0), |k| self.value_at(k))
    }

    fn ceil_index(self, value: f64) -> f64 {
        ceil_index_by(value, self.value_at(1.0), |k| self.value_at(k))
    }

    fn index_range(self, min: f64, max: f64) -> (f64, f64) {
        (self.ceil_index(min), self.floor_index(max))
    }
}

/// Returns `x * 10^exponent`, dividing by an exact power of ten for small steps.
fn scale_by_power_of_ten(x: f64, exponent: i32) -> f64 {
    if exponent >= 0 {
        x * 10f64.powi(exponent)
    } else {
        x / 10f64.powi(-exponent)
    }
}

/// Estimates `floor(value / step)` and corrects it by one against the exact
/// multiples, which can round either way.
fn floor_index_by(value: f64, step: f64, multiple: impl Fn(f64) -> f64) -> f64 {
    let k = (value / step).floor();
    if multiple(k) > value {
        k - 1.0
    } else if multiple(k + 1.0) <= value {
        k + 1.0
    } else {
        k
    }
}

fn ceil_index_by(value: f64, step: f64, multiple: impl Fn(f64) -> f64) -> f64 {
    let k = (value / step).ceil();
    if multiple(k) < value {
        k + 1.0
    } else if multiple(k - 1.0) >= value {
        k - 1.0
    } else {
        k
    }
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn usize_to_f64(i: usize) -> f64 {
    i as f64
}
