use rust_decimal::Decimal;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use crate::error::ValidationError;

/// Non-negative currency amount backed by an exact decimal.
///
/// Values are stored with at most [`Money::SCALE`] fractional digits so they
/// round-trip through the database's integer minor units without loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Fractional digits kept in storage.
    pub const SCALE: u32 = 4;

    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::NegativeAmount(amount));
        }
        let normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(ValidationError::TooPrecise {
                value: amount,
                max_scale: Self::SCALE,
            });
        }
        let money = Self(normalized);
        if money.to_minor_units().is_none() {
            return Err(ValidationError::AmountOverflow(amount));
        }
        Ok(money)
    }

    /// Like [`Money::new`] but also rejects zero.
    pub fn positive(amount: Decimal) -> Result<Self, ValidationError> {
        let money = Self::new(amount)?;
        if money.is_zero() {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        Ok(money)
    }

    /// Parse user input such as `1,234.50` or `$20`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let cleaned: String = trimmed
            .strip_prefix('$')
            .unwrap_or(trimmed)
            .chars()
            .filter(|c| *c != ',' && *c != '_')
            .collect();
        let amount = Decimal::from_str(&cleaned)
            .map_err(|_| ValidationError::InvalidAmount(s.to_string()))?;
        Self::new(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `None` when the sum no longer fits the stored representation.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0
            .checked_add(other.0)
            .and_then(|sum| Money::new(sum).ok())
    }

    /// Signed `self - other`; negative when `other` is larger.
    pub fn difference(self, other: Money) -> Decimal {
        self.0 - other.0
    }

    /// `self / whole * 100` in full decimal precision, or zero when `whole`
    /// is zero.
    pub fn percent_of(self, whole: Money) -> Decimal {
        if whole.is_zero() {
            return Decimal::ZERO;
        }
        match self.0.checked_div(whole.0) {
            Some(ratio) => ratio * Decimal::ONE_HUNDRED,
            None => Decimal::MAX,
        }
    }

    pub fn to_minor_units(self) -> Option<i64> {
        let mut scaled = self.0;
        scaled.rescale(Self::SCALE);
        i64::try_from(scaled.mantissa()).ok()
    }

    pub fn from_minor_units(units: i64) -> Result<Self, ValidationError> {
        Self::new(Decimal::new(units, Self::SCALE))
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Formats with thousand separators and 2 decimal places, e.g. `$1,234,567.89`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}

/// Format any decimal amount the way [`Money`] displays, keeping the sign.
pub fn format_amount(val: Decimal) -> String {
    let abs = val.abs().round_dp(2);
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO && !abs.is_zero() {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}
