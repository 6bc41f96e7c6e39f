use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

/// Fixed-point monetary amount held in minor units (two decimal places).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const SCALE: i64 = 100; // 2 decimal places
    pub const TARGET_DECIMALS: u32 = 2;
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn as_minor(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Converts a decimal into minor units, rounding half to even at the
    /// second fractional digit. `None` when the result does not fit in `i64`.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let rounded =
            value.round_dp_with_strategy(Self::TARGET_DECIMALS, RoundingStrategy::MidpointNearestEven);
        let scaled = rounded.checked_mul(Decimal::from(Self::SCALE))?;
        scaled.to_i64().map(Self)
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, Self::TARGET_DECIMALS)
    }

    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        Decimal::from_str(s).ok().and_then(Self::from_decimal)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let minor = self.0;
        let abs = minor.unsigned_abs();
        let scale = Self::SCALE as u64;
        let int_part = abs / scale;
        let frac_part = abs % scale;
        if minor < 0 {
            write!(f, "-{}.{:02}", int_part, frac_part)
        } else {
            write!(f, "{}.{:02}", int_part, frac_part)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_decimal_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid Money format: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn bankers_round_half_even() {
        let v = Money::from_decimal_str("1.245").unwrap();
        assert_eq!(format!("{}", v), "1.24");
        let v = Money::from_decimal_str("1.235").unwrap();
        assert_eq!(format!("{}", v), "1.24");
        let v = Money::from_decimal_str("-1.245").unwrap();
        assert_eq!(format!("{}", v), "-1.24");
        let v = Money::from_decimal_str("-1.255").unwrap();
        assert_eq!(format!("{}", v), "-1.26");
    }

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(Money::from_decimal_str("10000"), Some(Money::from_minor(1_000_000)));
        assert_eq!(Money::from_decimal_str(" 0.01 "), Some(Money::from_minor(1)));
        assert_eq!(Money::from_decimal_str("7.5"), Some(Money::from_minor(750)));
        assert_eq!(Money::from_decimal_str(""), None);
        assert_eq!(Money::from_decimal_str("abc"), None);
        assert_eq!(Money::from_decimal_str("1.2.3"), None);
    }

    #[test]
    fn display_pads_minor_units() {
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-5).to_string(), "-0.05");
        assert_eq!(Money::from_minor(123_400).to_string(), "1234.00");
    }

    #[test]
    fn repeated_cent_debits_do_not_drift() {
        let mut balance = Money::from_decimal_str("1.00").unwrap();
        let cent = Money::from_decimal_str("0.01").unwrap();
        for _ in 0..100 {
            balance = balance.checked_sub(cent).unwrap();
        }
        assert!(balance.is_zero());
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_decimal_str("999999999999999999999"), None);
    }

    #[test]
    fn decimal_round_trip_keeps_scale() {
        let v = Money::from_minor(1050);
        assert_eq!(v.to_decimal().to_string(), "10.50");
    }
}
