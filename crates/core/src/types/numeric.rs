//! Real-valued data.

use crate::types::{entropic, DataType, FiniteDataType, Lens};
use std::fmt;

const SIGN_BIT: u64 = 1 << 63;

/// Real numbers stored as `f64`.
///
/// Finite over the 2^64 IEEE-754 bit patterns. Selection flips the sign bit
/// of the index, so index 0 is `-0.0` and index 2^63 is `0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Numeric {
    supports_missing_values: bool,
}

impl Numeric {
    /// Presents values as their index over the bit patterns.
    pub const ENTROPIC: Lens<Numeric, u128> = entropic(1);

    pub const fn new(supports_missing_values: bool) -> Self {
        Self {
            supports_missing_values,
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DataType for Numeric {
    type Internal = f64;
    type External = f64;

    const REPRESENTATIONS: &'static [&'static str] = &["canonical", "entropic"];

    fn supports_missing_values(&self) -> bool {
        self.supports_missing_values
    }

    fn initial(&self) -> f64 {
        0.0
    }

    fn is_valid_internal(&self, _value: &f64) -> bool {
        true
    }

    fn is_valid_external(&self, _value: &f64) -> bool {
        true
    }

    fn convert_to_internal(&self, value: f64) -> f64 {
        value
    }

    fn convert_to_external(&self, value: &f64) -> f64 {
        *value
    }

    fn format_internal(&self, value: &f64) -> String {
        value.to_string()
    }
}

impl FiniteDataType for Numeric {
    fn entropy(&self) -> u128 {
        1u128 << 64
    }

    fn select(&self, selection: u128) -> Option<f64> {
        if selection >= self.entropy() {
            return None;
        }
        Some(f64::from_bits((selection as u64) ^ SIGN_BIT))
    }

    fn index_of(&self, value: &f64) -> Option<u128> {
        Some(u128::from(value.to_bits() ^ SIGN_BIT))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Numeric")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Numeric::new(true), Numeric::new(true));
        assert_ne!(Numeric::new(true), Numeric::new(false));
    }

    #[test]
    fn test_entropy() {
        let numeric = Numeric::new(false);
        assert_eq!(numeric.entropy(), 1u128 << 64);
        assert_eq!(numeric.select(1u128 << 64), None);
    }

    #[test]
    fn test_select_index_of() {
        let numeric = Numeric::new(false);
        for value in [0.0, -0.0, 1.5, -3.25, f64::MAX, f64::MIN, f64::INFINITY] {
            let index = numeric.index_of(&value).unwrap();
            assert_eq!(numeric.select(index).map(f64::to_bits), Some(value.to_bits()));
        }
        assert_eq!(numeric.select(1u128 << 63), Some(0.0));
    }

    #[test]
    fn test_entropic_lens() {
        let numeric = Numeric::new(false);
        let lens = Numeric::ENTROPIC;
        assert_eq!(lens.name(), "entropic");
        let index = lens.to_presented(&numeric, &2.0);
        assert_eq!(lens.to_internal(&numeric, index), 2.0);
        assert!(!lens.is_valid(&numeric, &(1u128 << 64)));
    }
}
