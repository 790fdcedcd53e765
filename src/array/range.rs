//! Range specifications for sequence construction

use crate::error::{Error, Result};

/// Longest sequence whose `Vec<f64>` fits in the address space
const MAX_LEN: f64 = (isize::MAX as usize / std::mem::size_of::<f64>()) as f64;

/// A validated `start → end` sequence with a fixed step magnitude
///
/// The sequence starts at `start` and walks toward `end` (exclusive) in
/// steps of `|step|`; the sign of `step` is ignored, the direction comes from
/// the bounds.
///
/// ```
/// use densela::array::RangeSpec;
///
/// let up = RangeSpec::new(0.0, 1.0, 5.0).unwrap();
/// assert_eq!(up.values(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
///
/// let down = RangeSpec::new(5.0, 1.0, 0.0).unwrap();
/// assert_eq!(down.values(), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RangeSpec {
    start: f64,
    step: f64,
    end: f64,
}

impl RangeSpec {
    /// Validate `(start, step, end)`
    ///
    /// Fails with `InvalidRange` when a bound or the step is non-finite, when
    /// `step == 0`, when `|step| > |end - start|`, or when the sequence is
    /// too long to allocate.
    pub fn new(start: f64, step: f64, end: f64) -> Result<Self> {
        if !(start.is_finite() && step.is_finite() && end.is_finite()) {
            return Err(Error::invalid_range(format!(
                "non-finite parameter in ({start}, {step}, {end})"
            )));
        }
        if step == 0.0 {
            return Err(Error::invalid_range("step must be non-zero"));
        }
        let extent = (end - start).abs();
        if step.abs() > extent {
            return Err(Error::invalid_range(format!(
                "step {step} exceeds the extent {extent} of [{start}, {end})"
            )));
        }
        let count = (extent / step.abs()).ceil();
        if count > MAX_LEN {
            return Err(Error::invalid_range(format!(
                "{count} values from {start} to {end} in steps of {step} cannot be allocated"
            )));
        }
        Ok(Self {
            start,
            step: step.abs(),
            end,
        })
    }

    /// Build from positional arguments `[start, end]` or `[start, step, end]`
    pub fn from_args(args: &[f64]) -> Result<Self> {
        match *args {
            [start, end] => Self::new(start, 1.0, end),
            [start, step, end] => Self::new(start, step, end),
            _ => Err(Error::invalid_range(format!(
                "expected 2 or 3 arguments, got {}",
                args.len()
            ))),
        }
    }

    /// First value
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Step magnitude
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Exclusive bound
    pub fn end(&self) -> f64 {
        self.end
    }

    fn direction(&self) -> f64 {
        if self.end < self.start {
            -1.0
        } else {
            1.0
        }
    }

    /// Number of values in the sequence
    pub fn len(&self) -> usize {
        let dir = self.direction();
        let mut n = ((self.end - self.start).abs() / self.step).ceil() as usize;
        // Rounding in the division can overshoot by one
        while n > 0 && dir * (self.value(n - 1) - self.end) >= 0.0 {
            n -= 1;
        }
        n
    }

    /// Returns true if the sequence is empty (never, for a validated range)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn value(&self, i: usize) -> f64 {
        self.start + self.direction() * self.step * i as f64
    }

    /// Materialize the sequence
    pub fn values(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.value(i)).collect()
    }
}
