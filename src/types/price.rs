//! Fixed-point price utilities.
//!
//! ## Overview
//!
//! Catalog prices are stored as `u64` minor units (cents) to avoid binary
//! floating-point drift in the per-category price indices. Two equal prices
//! must compare equal as tree keys, which `f64` cannot promise.
//!
//! ## Scale Factor
//!
//! We use a scale factor of 10^2 (100): the textual form always carries two
//! decimal digits (`"##.##"`).
//!
//! ## Examples
//!
//! ```
//! use aisle_catalog::types::price::{to_fixed, from_fixed};
//!
//! let price = to_fixed("12.34").unwrap();
//! assert_eq!(price, 1_234);
//!
//! assert_eq!(from_fixed(price), "12.34");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::types::Price;

/// Scaling factor for fixed-point prices: 10^2
pub const SCALE: u64 = 100;

/// Number of decimal places in the textual price form
pub const DECIMAL_PLACES: u32 = 2;

/// Largest percentage accepted by a price hike
pub const MAX_HIKE_PERCENT: u32 = 100;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to a fixed-point price
///
/// Extra precision beyond two decimals is truncated toward zero.
///
/// # Returns
///
/// * `Some(u64)` - The price in cents
/// * `None` - If parsing fails, the value is negative, or out of range
///
/// # Example
///
/// ```
/// use aisle_catalog::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1.00"), Some(100));
/// assert_eq!(to_fixed("0.07"), Some(7));
/// assert_eq!(to_fixed("3.999"), Some(399));
/// assert_eq!(to_fixed("-1.00"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<Price> {
    let decimal = s.trim().parse::<Decimal>().ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to a fixed-point price, truncating toward zero
///
/// # Returns
///
/// * `Some(u64)` - The price in cents
/// * `None` - If the value is negative or out of range
pub fn decimal_to_fixed(d: Decimal) -> Option<Price> {
    if d.is_sign_negative() && !d.is_zero() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled.trunc().to_u64()
}

/// Convert a fixed-point price to a Decimal
pub fn fixed_to_decimal(value: Price) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Convert a fixed-point price to a string with two decimal places
///
/// # Example
///
/// ```
/// use aisle_catalog::types::price::from_fixed;
///
/// assert_eq!(from_fixed(100), "1.00");
/// assert_eq!(from_fixed(5), "0.05");
/// assert_eq!(from_fixed(123_456), "1234.56");
/// ```
pub fn from_fixed(value: Price) -> String {
    format!("{:.2}", fixed_to_decimal(value))
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Net increase of `price` raised by `percent` percent.
///
/// Computed as `price * percent / 100` with integer truncation, through a
/// 128-bit intermediate so the product cannot overflow.
///
/// # Example
///
/// ```
/// use aisle_catalog::types::price::percent_increment;
///
/// assert_eq!(percent_increment(100, 10), 10);
/// assert_eq!(percent_increment(199, 10), 19);
/// assert_eq!(percent_increment(1, 50), 0);
/// ```
pub fn percent_increment(price: Price, percent: u32) -> Price {
    let increment = (price as u128 * percent as u128) / 100;
    u64::try_from(increment).unwrap_or(u64::MAX)
}

/// Check whether `percent` is an acceptable hike rate: `(0, 100]`
#[inline]
pub fn is_valid_hike_percent(percent: u32) -> bool {
    percent > 0 && percent <= MAX_HIKE_PERCENT
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_constant() {
        assert_eq!(SCALE, 100);
        assert_eq!(10u64.pow(DECIMAL_PLACES), SCALE);
    }

    #[test]
    fn test_to_fixed_basic() {
        assert_eq!(to_fixed("1.00"), Some(100));
        assert_eq!(to_fixed("1"), Some(100));
        assert_eq!(to_fixed("0.50"), Some(50));
        assert_eq!(to_fixed("0.01"), Some(1));
        assert_eq!(to_fixed("12345.67"), Some(1_234_567));
    }

    #[test]
    fn test_to_fixed_truncates() {
        assert_eq!(to_fixed("0.009"), Some(0));
        assert_eq!(to_fixed("9.999"), Some(999));
        assert_eq!(to_fixed(" 2.50 "), Some(250));
    }

    #[test]
    fn test_to_fixed_edge_cases() {
        assert_eq!(to_fixed("0"), Some(0));
        assert_eq!(to_fixed("0.00"), Some(0));
        assert_eq!(to_fixed("-0.00"), Some(0));

        assert_eq!(to_fixed("-1.00"), None);
        assert_eq!(to_fixed("abc"), None);
        assert_eq!(to_fixed(""), None);
    }

    #[test]
    fn test_from_fixed() {
        assert_eq!(from_fixed(0), "0.00");
        assert_eq!(from_fixed(1), "0.01");
        assert_eq!(from_fixed(50), "0.50");
        assert_eq!(from_fixed(100), "1.00");
        assert_eq!(from_fixed(1_234_567), "12345.67");
    }

    #[test]
    fn test_roundtrip() {
        for s in ["0.00", "0.01", "1.10", "99.99", "123456.78"] {
            let fixed = to_fixed(s).unwrap();
            assert_eq!(from_fixed(fixed), s, "Roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_percent_increment() {
        assert_eq!(percent_increment(100, 10), 10);
        assert_eq!(percent_increment(333, 10), 33);
        assert_eq!(percent_increment(1_000, 100), 1_000);
        assert_eq!(percent_increment(0, 50), 0);

        // No overflow on huge prices
        assert_eq!(percent_increment(u64::MAX, 100), u64::MAX);
        assert_eq!(percent_increment(u64::MAX, 50), u64::MAX / 2);
    }

    #[test]
    fn test_hike_percent_range() {
        assert!(!is_valid_hike_percent(0));
        assert!(is_valid_hike_percent(1));
        assert!(is_valid_hike_percent(100));
        assert!(!is_valid_hike_percent(101));
        assert!(!is_valid_hike_percent(150));
    }
}
