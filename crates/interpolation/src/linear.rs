//! Piecewise-linear interpolation over one field.

/// Value returned for any query outside the sample domain.
pub const OUT_OF_DOMAIN_FILL: f64 = 0.0;

/// Piecewise-linear function through `(timestamp, value)` samples.
///
/// Inside `[first, last]` the function passes through every sample exactly and
/// blends linearly between neighbours. Outside it returns
/// [`OUT_OF_DOMAIN_FILL`], never the boundary value.
///
/// # Example
///
/// ```
/// use interpolation::LinearInterpolator;
///
/// let alt = LinearInterpolator::new([(0.0, 0.0), (10.0, 100.0)]);
/// assert_eq!(alt.eval(5.0), 50.0);
/// assert_eq!(alt.eval(10.0), 100.0);
/// assert_eq!(alt.eval(11.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    times: Box<[f64]>,
    values: Box<[f64]>,
}

impl LinearInterpolator {
    /// Builds an interpolator from samples.
    ///
    /// Samples are stably sorted by timestamp, so equal timestamps keep their
    /// input order and the first one answers exact queries.
    #[must_use]
    pub fn new(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut points: Vec<(f64, f64)> = points.into_iter().collect();
        if points.windows(2).any(|w| w[1].0 < w[0].0) {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        let (times, values): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
        Self {
            times: times.into_boxed_slice(),
            values: values.into_boxed_slice(),
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// `(first, last)` sample time, `None` without samples.
    #[must_use]
    pub fn domain(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Whether `t` lies inside the closed domain. NaN never does.
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        self.domain().is_some_and(|(lo, hi)| t >= lo && t <= hi)
    }

    /// Evaluates the function at `t`.
    #[must_use]
    pub fn eval(&self, t: f64) -> f64 {
        if !self.contains(t) {
            return OUT_OF_DOMAIN_FILL;
        }

        // first index with times[idx] >= t; exists because t <= last
        let idx = self.times.partition_point(|&x| x < t);
        if self.times[idx] == t {
            return self.values[idx];
        }

        // times[idx - 1] < t < times[idx]
        let (t0, v0) = (self.times[idx - 1], self.values[idx - 1]);
        let (t1, v1) = (self.times[idx], self.values[idx]);
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }

    /// Samples in time order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}
