//! Min/max summary statistics for a dataset or dataset group.
//!
//! Grounded on `mdal_utils.cpp`'s `calculateStatistics`/`combineStatistics`:
//! a vector value's magnitude is `hypot(x, y)`, invalid (NaN) values are
//! skipped rather than propagated, and a dataset group's statistics are the
//! elementwise min/max across all of its datasets' own statistics.

/// The minimum and maximum valid value found while scanning a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    /// The smallest valid value seen, or `f64::INFINITY` if none were.
    pub min: f64,
    /// The largest valid value seen, or `f64::NEG_INFINITY` if none were.
    pub max: f64,
    /// Whether at least one valid (non-NaN) value was scanned.
    pub is_valid: bool,
}

impl Statistics {
    /// The identity element for [`combine_statistics`]: no valid values yet.
    pub fn empty() -> Self {
        Statistics {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            is_valid: false,
        }
    }

    fn push(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.is_valid = true;
    }
}

/// A single scalar value, or a 2-component vector, read from a dataset.
///
/// Vector magnitude is `hypot(x, y)`, matching the original source's
/// treatment of vector datasets for statistics purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A scalar sample; `NaN` marks an invalid/missing value.
    Scalar(f64),
    /// A vector sample; either component `NaN` marks the whole sample
    /// invalid.
    Vector(f64, f64),
}

impl Value {
    fn magnitude(self) -> f64 {
        match self {
            Value::Scalar(v) => v,
            Value::Vector(x, y) => {
                if x.is_nan() || y.is_nan() {
                    f64::NAN
                } else {
                    x.hypot(y)
                }
            }
        }
    }
}

/// Scans `values`, returning the min/max magnitude across all valid samples.
pub fn calculate_statistics(values: impl IntoIterator<Item = Value>) -> Statistics {
    let mut stats = Statistics::empty();
    for value in values {
        stats.push(value.magnitude());
    }
    stats
}

/// Folds a set of per-dataset statistics into one elementwise min/max.
///
/// Mirrors `combineStatistics`'s role in rolling per-dataset extents up into
/// a dataset group's own `Statistics`.
pub fn combine_statistics(stats: impl IntoIterator<Item = Statistics>) -> Statistics {
    let mut combined = Statistics::empty();
    for s in stats {
        if !s.is_valid {
            continue;
        }
        combined.min = combined.min.min(s.min);
        combined.max = combined.max.max(s.max);
        combined.is_valid = true;
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_statistics_skip_nan() {
        let stats = calculate_statistics([
            Value::Scalar(1.0),
            Value::Scalar(f64::NAN),
            Value::Scalar(-3.0),
        ]);
        assert_eq!(stats.min, -3.0);
        assert_eq!(stats.max, 1.0);
        assert!(stats.is_valid);
    }

    #[test]
    fn vector_statistics_use_hypot() {
        let stats = calculate_statistics([Value::Vector(3.0, 4.0)]);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn vector_with_nan_component_is_invalid() {
        let stats = calculate_statistics([Value::Vector(1.0, f64::NAN)]);
        assert!(!stats.is_valid);
    }

    #[test]
    fn empty_input_is_invalid() {
        let stats = calculate_statistics(std::iter::empty());
        assert!(!stats.is_valid);
    }

    #[test]
    fn combine_statistics_takes_elementwise_extent() {
        let a = Statistics {
            min: 1.0,
            max: 5.0,
            is_valid: true,
        };
        let b = Statistics {
            min: -2.0,
            max: 3.0,
            is_valid: true,
        };
        let combined = combine_statistics([a, b, Statistics::empty()]);
        assert_eq!(combined.min, -2.0);
        assert_eq!(combined.max, 5.0);
    }
}
