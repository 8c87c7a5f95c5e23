//! Mappings from data space to screen space.

/// Ordinal scale dividing a continuous range into uniform bands.
///
/// `n` bands are laid out over `range` with `padding_inner` (fraction of the
/// step left between bands) and `padding_outer` (fraction of the step left
/// before the first and after the last band). Bands are centered in the range.
///
/// # Examples
///
/// ```
/// use airq_analysis::scale::BandScale;
///
/// let scale = BandScale::new(4, (0.0, 100.0), 0.0);
/// assert_eq!(scale.bandwidth(), 25.0);
/// assert_eq!(scale.position(1), Some(25.0));
/// assert_eq!(scale.position(4), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    len: usize,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Creates a scale using `padding` for both inner and outer padding.
    #[must_use]
    pub fn new(len: usize, range: (f64, f64), padding: f64) -> Self {
        Self::with_padding(len, range, padding, padding)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn with_padding(
        len: usize,
        (r0, r1): (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> Self {
        let padding_inner = padding_inner.clamp(0.0, 1.0);
        let padding_outer = padding_outer.max(0.0);
        let n = len as f64;
        let step = (r1 - r0) / (n - padding_inner + padding_outer * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding_inner)) * 0.5;
        Self {
            len,
            start,
            step,
            bandwidth: step * (1.0 - padding_inner),
        }
    }

    /// Returns the start of band `index`, or `None` if out of bounds.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn position(&self, index: usize) -> Option<f64> {
        (index < self.len).then(|| self.start + self.step * index as f64)
    }

    /// Returns the center of band `index`, or `None` if out of bounds.
    #[must_use]
    pub fn center(&self, index: usize) -> Option<f64> {
        self.position(index).map(|x| x + self.bandwidth / 2.0)
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Distance between the starts of adjacent bands.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Affine map from a data domain to a screen range.
///
/// The range may be inverted (`range.0 > range.1`), as for a y axis whose
/// screen coordinate grows downward.
///
/// # Examples
///
/// ```
/// use airq_analysis::scale::LinearScale;
///
/// let y = LinearScale::new((0.0, 20.0), (100.0, 0.0));
/// assert_eq!(y.map(5.0), 75.0);
/// assert_eq!(y.invert(75.0), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a domain value to the range.
    ///
    /// A degenerate domain maps everything to the middle of the range.
    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Maps a range value back to the domain.
    #[must_use]
    pub fn invert(&self, position: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return (d0 + d1) / 2.0;
        }
        d0 + (position - r0) / (r1 - r0) * (d1 - d0)
    }
}
