//! Numeric ranges `[begin : step : end]`.

use std::cmp::Ordering;

/// Largest number of elements a `for`/`each` clause materializes from one
/// range or collection.
pub const MAX_RANGE_STEPS: u32 = 1_000_000;

/// A numeric range. The end is inclusive when it lies on a step.
#[derive(Clone, Copy, Debug)]
pub struct RangeType {
    begin: f64,
    step: f64,
    end: f64,
}

impl RangeType {
    pub const EMPTY: RangeType = RangeType {
        begin: 0.0,
        step: 0.0,
        end: 0.0,
    };

    pub fn new(begin: f64, step: f64, end: f64) -> Self {
        RangeType { begin, step, end }
    }

    /// `[begin : end]`, stepping by one.
    pub fn with_default_step(begin: f64, end: f64) -> Self {
        RangeType::new(begin, 1.0, end)
    }

    pub fn begin(&self) -> f64 {
        self.begin
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Number of values the range yields.
    ///
    /// Zero when any bound is NaN or the step points away from the end;
    /// one when the bounds are equal or the step is infinite; `u32::MAX`
    /// when iteration would never finish (infinite bounds or zero step).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn num_values(&self) -> u32 {
        let (begin, step, end) = (self.begin, self.step, self.end);
        if begin.is_nan() || end.is_nan() || step.is_nan() {
            return 0;
        }
        if step < 0.0 {
            if begin < end {
                return 0;
            }
        } else if begin > end {
            return 0;
        }
        if begin == end || step.is_infinite() {
            return 1;
        }
        if begin.is_infinite() || end.is_infinite() || step == 0.0 {
            return u32::MAX;
        }
        // Nudge up so a quotient just below a whole number still counts
        // the final step.
        let steps = next_up((end - begin) / step);
        if steps >= f64::from(u32::MAX) {
            return u32::MAX;
        }
        steps as u32 + 1
    }

    /// Value at position `i`. Does not check `i < num_values()`.
    pub fn value_at(&self, i: u32) -> f64 {
        self.begin + self.step * f64::from(i)
    }

    pub fn iter(&self) -> RangeIter {
        let count = if self.step == 0.0 || self.step.is_nan() {
            0
        } else {
            self.num_values()
        };
        RangeIter {
            range: *self,
            index: 0,
            count,
        }
    }

    /// Structural equality: equal when both are empty, or when begin,
    /// step and element count agree.
    pub fn range_eq(&self, other: &RangeType) -> bool {
        let (n1, n2) = (self.num_values(), other.num_values());
        if n1 == 0 {
            return n2 == 0;
        }
        n2 != 0 && self.begin == other.begin && self.step == other.step && n1 == n2
    }

    /// Total order used by `<`, `<=`, `>` and `>=`: empty ranges sort
    /// first, then by begin, step and element count.
    pub fn range_cmp(&self, other: &RangeType) -> Ordering {
        let (n1, n2) = (self.num_values(), other.num_values());
        match (n1, n2) {
            (0, 0) => return Ordering::Equal,
            (0, _) => return Ordering::Less,
            (_, 0) => return Ordering::Greater,
            _ => {}
        }
        self.begin
            .partial_cmp(&other.begin)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.step.partial_cmp(&other.step).unwrap_or(Ordering::Equal))
            .then(n1.cmp(&n2))
    }
}

/// The next representable double towards positive infinity.
fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Iterator over the values of a range.
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: RangeType,
    index: u32,
    count: u32,
}

impl Iterator for RangeIter {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.index >= self.count {
            return None;
        }
        let value = self.range.value_at(self.index);
        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index) as usize;
        (remaining, Some(remaining))
    }
}
