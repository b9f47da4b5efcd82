//! Fare arithmetic in minor currency units.
//!
//! The backend speaks in major units (`450` or `450.5`); everything on the
//! client side is held as whole minor units so totals never drift.
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// An amount of money in minor units (paise, cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fare {
    minor: i64,
}

impl Fare {
    pub const ZERO: Self = Self { minor: 0 };

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Convert a major-unit amount, rounding to the nearest minor unit.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_major(major: f64) -> Option<Self> {
        if !major.is_finite() {
            return None;
        }
        let minor = (major * 100.0).round();
        if minor.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self {
            minor: minor as i64,
        })
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.minor
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_major(self) -> f64 {
        self.minor as f64 / 100.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.minor > 0
    }

    /// Multiply by a seat count, saturating instead of overflowing.
    #[must_use]
    pub fn times(self, count: usize) -> Self {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        Self {
            minor: self.minor.saturating_mul(count),
        }
    }

    /// Render with a currency symbol, e.g. `₹1200.50`.
    #[must_use]
    pub fn display_with(self, symbol: &str) -> String {
        format!("{symbol}{self}")
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Fare {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

struct FareVisitor;

impl Visitor<'_> for FareVisitor {
    type Value = Fare;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a price as a number or numeric string")
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Fare, E> {
        Fare::from_major(v as f64).ok_or_else(|| E::custom("price out of range"))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Fare, E> {
        Fare::from_major(v as f64).ok_or_else(|| E::custom("price out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Fare, E> {
        Fare::from_major(v).ok_or_else(|| E::custom("price is not finite"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Fare, E> {
        v.trim()
            .parse::<f64>()
            .ok()
            .and_then(Fare::from_major)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Fare, E> {
        Ok(Fare::ZERO)
    }
}

impl<'de> Deserialize<'de> for Fare {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FareVisitor)
    }
}

/// The per-seat fare: a custom price for the chosen segment wins over the base price.
#[must_use]
pub fn effective_fare(custom: Option<Fare>, base: Fare) -> Fare {
    custom.unwrap_or(base)
}

/// Total for `seat_count` seats at the effective fare.
#[must_use]
pub fn total_price(seat_count: usize, custom: Option<Fare>, base: Fare) -> Fare {
    effective_fare(custom, base).times(seat_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_major_units_with_rounding() {
        assert_eq!(Fare::from_major(450.0), Some(Fare::from_minor(45_000)));
        assert_eq!(Fare::from_major(19.999), Some(Fare::from_minor(2_000)));
        assert_eq!(Fare::from_major(f64::NAN), None);
        assert_eq!(Fare::from_major(f64::INFINITY), None);
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Fare::from_minor(120_050).to_string(), "1200.50");
        assert_eq!(Fare::from_minor(-250).to_string(), "-2.50");
        assert_eq!(Fare::from_minor(7).display_with("₹"), "₹0.07");
    }

    #[test]
    fn custom_price_overrides_base() {
        let base = Fare::from_minor(50_000);
        let custom = Fare::from_minor(35_000);
        assert_eq!(effective_fare(Some(custom), base), custom);
        assert_eq!(effective_fare(None, base), base);
        assert_eq!(total_price(3, Some(custom), base), Fare::from_minor(105_000));
        assert_eq!(total_price(3, None, base), Fare::from_minor(150_000));
        assert_eq!(total_price(0, Some(custom), base), Fare::ZERO);
    }

    #[test]
    fn deserializes_numbers_and_numeric_strings() {
        let fares: Vec<Fare> = serde_json::from_str(r#"[450, 450.5, "399.99", null]"#).unwrap();
        assert_eq!(
            fares,
            vec![
                Fare::from_minor(45_000),
                Fare::from_minor(45_050),
                Fare::from_minor(39_999),
                Fare::ZERO,
            ]
        );
        assert!(serde_json::from_str::<Fare>(r#""cheap""#).is_err());
    }

    #[test]
    fn times_saturates() {
        let fare = Fare::from_minor(i64::MAX / 2);
        assert_eq!(fare.times(4).minor(), i64::MAX);
    }
}
