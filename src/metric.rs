//! Numeric metrics that may be undefined
//!
//! A metric that cannot be computed (no present characters, no scenes) is
//! reported as [`Metric::Undefined`] and serialized as `null`, never as a
//! made-up number.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Defined(f64),
    Undefined,
}

impl Metric {
    /// `numerator / denominator * 100`, undefined for a zero denominator
    pub fn percentage(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Self::Undefined
        } else {
            Self::Defined(numerator as f64 / denominator as f64 * 100.0)
        }
    }

    /// Arithmetic mean of the defined values, undefined if there are none
    pub fn mean_of<I: IntoIterator<Item = Metric>>(values: I) -> Self {
        let (sum, count) = values
            .into_iter()
            .filter_map(Metric::value)
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            Self::Undefined
        } else {
            Self::Defined(sum / count as f64)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(v),
            Self::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }

    pub fn rounded(self, decimals: u32) -> Self {
        match self {
            Self::Defined(v) => Self::Defined(round_to(v, decimals)),
            Self::Undefined => Self::Undefined,
        }
    }
}

impl From<Option<f64>> for Metric {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Undefined, Self::Defined)
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Defined(v) => serializer.serialize_f64(*v),
            Self::Undefined => serializer.serialize_none(),
        }
    }
}

/// Round half away from zero to a number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
