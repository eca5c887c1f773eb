//! Exact fixed-point currency amounts.
//!
//! An [`Amount`] is a `(currency, value, fraction)` triple where `value`
//! counts whole units and `fraction` counts sub-units of
//! [`FRACTION_BASE`](crate::constants::FRACTION_BASE). Arithmetic is plain
//! integer math on the total number of sub-units; no floating point is
//! involved anywhere.
//!
//! The canonical text form is `CURRENCY:VALUE[.FRACTION]`, e.g. `KUDOS:1.5`,
//! which is also the serde representation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{AMOUNT_MAX_VALUE, FRACTION_BASE, FRACTION_DIGITS, MAX_CURRENCY_LEN};
use crate::{MintselError, Result};

/// Largest representable amount, in sub-units.
const MAX_UNITS: u128 =
    AMOUNT_MAX_VALUE as u128 * FRACTION_BASE as u128 + (FRACTION_BASE as u128 - 1);

/// An exact currency amount.
///
/// Always normalized: `fraction < FRACTION_BASE` and `value <= AMOUNT_MAX_VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount {
    currency: String,
    value: u64,
    fraction: u32,
}

impl Amount {
    /// Create an amount from its components.
    ///
    /// # Errors
    /// `InvalidAmount` for a bad currency code or an unnormalized fraction,
    /// `Overflow` if `value` exceeds the maximum.
    pub fn new(currency: &str, value: u64, fraction: u32) -> Result<Self> {
        let currency = Self::normalize_currency(currency)?;
        if fraction >= FRACTION_BASE {
            return Err(MintselError::InvalidAmount {
                reason: format!("fraction {fraction} is not below {FRACTION_BASE}"),
            });
        }
        if value > AMOUNT_MAX_VALUE {
            return Err(MintselError::Overflow);
        }
        Ok(Self {
            currency,
            value,
            fraction,
        })
    }

    /// The zero amount of a currency.
    pub fn zero(currency: &str) -> Result<Self> {
        Self::new(currency, 0, 0)
    }

    /// The zero amount in this amount's currency.
    #[must_use]
    pub fn zero_like(&self) -> Self {
        Self {
            currency: self.currency.clone(),
            value: 0,
            fraction: 0,
        }
    }

    /// Build an amount from a total number of sub-units.
    ///
    /// # Errors
    /// `Overflow` if the amount exceeds the maximum.
    pub fn from_units(currency: &str, units: u128) -> Result<Self> {
        let currency = Self::normalize_currency(currency)?;
        Self::from_units_unchecked_currency(currency, units)
    }

    fn from_units_unchecked_currency(currency: String, units: u128) -> Result<Self> {
        if units > MAX_UNITS {
            return Err(MintselError::Overflow);
        }
        let base = u128::from(FRACTION_BASE);
        let value = u64::try_from(units / base).map_err(|_| MintselError::Overflow)?;
        let fraction = u32::try_from(units % base).map_err(|_| MintselError::Overflow)?;
        Ok(Self {
            currency,
            value,
            fraction,
        })
    }

    /// Currency code (upper case).
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Whole units.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Sub-units, always below `FRACTION_BASE`.
    #[must_use]
    pub fn fraction(&self) -> u32 {
        self.fraction
    }

    /// Total number of sub-units.
    #[must_use]
    pub fn to_units(&self) -> u128 {
        u128::from(self.value) * u128::from(FRACTION_BASE) + u128::from(self.fraction)
    }

    /// Whether this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value == 0 && self.fraction == 0
    }

    /// Whether both amounts share a currency.
    #[must_use]
    pub fn same_currency(&self, other: &Self) -> bool {
        self.currency == other.currency
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<()> {
        if self.same_currency(other) {
            Ok(())
        } else {
            Err(MintselError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            })
        }
    }

    /// `self + other`, normalizing the fraction carry into `value`.
    ///
    /// # Errors
    /// `CurrencyMismatch` or `Overflow`.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.ensure_same_currency(other)?;
        let base = FRACTION_BASE;
        let mut fraction = self.fraction + other.fraction;
        let mut carry = 0;
        if fraction >= base {
            fraction -= base;
            carry = 1;
        }
        let value = self
            .value
            .checked_add(other.value)
            .and_then(|v| v.checked_add(carry))
            .filter(|v| *v <= AMOUNT_MAX_VALUE)
            .ok_or(MintselError::Overflow)?;
        Ok(Self {
            currency: self.currency.clone(),
            value,
            fraction,
        })
    }

    /// `self - other`.
    ///
    /// # Errors
    /// `CurrencyMismatch`, or `NegativeAmount` if `other > self`.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.ensure_same_currency(other)?;
        let (mut value, mut fraction) = (self.value, self.fraction);
        if fraction < other.fraction {
            value = value.checked_sub(1).ok_or(MintselError::NegativeAmount)?;
            fraction += FRACTION_BASE;
        }
        let value = value
            .checked_sub(other.value)
            .ok_or(MintselError::NegativeAmount)?;
        Ok(Self {
            currency: self.currency.clone(),
            value,
            fraction: fraction - other.fraction,
        })
    }

    /// `self * n`.
    ///
    /// # Errors
    /// `Overflow` if the product exceeds the maximum.
    pub fn checked_mul(&self, n: u32) -> Result<Self> {
        let units = self
            .to_units()
            .checked_mul(u128::from(n))
            .ok_or(MintselError::Overflow)?;
        Self::from_units_unchecked_currency(self.currency.clone(), units)
    }

    /// `self / n`, rounded down to the smallest unit.
    ///
    /// # Errors
    /// `InvalidAmount` if `n` is zero.
    pub fn checked_div(&self, n: u32) -> Result<Self> {
        if n == 0 {
            return Err(MintselError::InvalidAmount {
                reason: "division by zero".to_string(),
            });
        }
        Self::from_units_unchecked_currency(self.currency.clone(), self.to_units() / u128::from(n))
    }

    /// Compare two amounts of the same currency.
    ///
    /// # Errors
    /// `CurrencyMismatch` if the currencies differ.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self
            .value
            .cmp(&other.value)
            .then(self.fraction.cmp(&other.fraction)))
    }

    /// Sum a sequence of amounts, starting from zero in `currency`.
    ///
    /// # Errors
    /// `CurrencyMismatch` if any element differs from `currency`, or `Overflow`.
    pub fn sum<'a>(currency: &str, amounts: impl IntoIterator<Item = &'a Amount>) -> Result<Self> {
        amounts
            .into_iter()
            .try_fold(Self::zero(currency)?, |acc, a| acc.checked_add(a))
    }

    /// The amount as an exact decimal number of whole units.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        // MAX_UNITS fits the 96-bit decimal mantissa.
        #[allow(clippy::cast_possible_wrap)]
        let units = self.to_units() as i128;
        Decimal::from_i128_with_scale(units, FRACTION_DIGITS).normalize()
    }

    /// Validate a currency code and bring it to its canonical upper-case form.
    ///
    /// # Errors
    /// `InvalidAmount` if the code is empty, too long, or has characters
    /// outside `[A-Za-z0-9_*-]`.
    pub fn normalize_currency(currency: &str) -> Result<String> {
        let valid = !currency.is_empty()
            && currency.len() <= MAX_CURRENCY_LEN
            && currency
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'*' | b'-'));
        if !valid {
            return Err(MintselError::InvalidAmount {
                reason: format!("invalid currency code {currency:?}"),
            });
        }
        Ok(currency.to_ascii_uppercase())
    }

    /// Parse the canonical `CURRENCY:VALUE[.FRACTION]` form.
    ///
    /// # Errors
    /// `InvalidAmount` for malformed input, `Overflow` for values above the maximum.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| MintselError::InvalidAmount {
            reason: format!("{reason}: {s:?}"),
        };
        let (currency, number) = s.split_once(':').ok_or_else(|| invalid("missing ':'"))?;
        let currency = Self::normalize_currency(currency)?;

        let (whole, frac) = match number.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (number, None),
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || frac.is_some_and(|f| !all_digits(f)) {
            return Err(invalid("malformed number"));
        }
        if frac.is_some_and(|f| f.len() > FRACTION_DIGITS as usize) {
            return Err(invalid("too many fractional digits"));
        }

        let decimal = Decimal::from_str_exact(number).map_err(|_| invalid("number out of range"))?;
        let shift = 10i128.pow(FRACTION_DIGITS - decimal.scale());
        let units = decimal
            .mantissa()
            .checked_mul(shift)
            .and_then(|u| u128::try_from(u).ok())
            .ok_or(MintselError::Overflow)?;
        Self::from_units_unchecked_currency(currency, units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.currency, self.to_decimal())
    }
}

impl FromStr for Amount {
    type Err = MintselError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Amount {
    type Error = MintselError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn parse_and_display() {
        let a = amt("kudos:1.5");
        assert_eq!(a.currency(), "KUDOS");
        assert_eq!(a.value(), 1);
        assert_eq!(a.fraction(), 50_000_000);
        assert_eq!(a.to_string(), "KUDOS:1.5");
        assert_eq!(amt("EUR:7").to_string(), "EUR:7");
        assert_eq!(amt("EUR:0.00000001").fraction(), 1);
        assert_eq!(amt("EUR:0").to_string(), "EUR:0");
    }

    #[test]
    fn parse_rejects_malformed() {
        for s in ["KUDOS", "KUDOS:", ":1", "KUDOS:1.", "KUDOS:.5", "KUDOS:-1", "KUDOS:1.123456789", "WAYTOOLONGCUR:1", "KU DOS:1"] {
            assert!(Amount::parse(s).is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn parse_rejects_above_max() {
        let s = format!("KUDOS:{}", AMOUNT_MAX_VALUE + 1);
        assert_eq!(Amount::parse(&s).unwrap_err(), MintselError::Overflow);
        let max = format!("KUDOS:{AMOUNT_MAX_VALUE}");
        assert!(Amount::parse(&max).is_ok());
    }

    #[test]
    fn new_rejects_unnormalized_fraction() {
        assert!(matches!(
            Amount::new("KUDOS", 1, FRACTION_BASE),
            Err(MintselError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn add_carries_fraction() {
        let sum = amt("KUDOS:0.7").checked_add(&amt("KUDOS:0.6")).unwrap();
        assert_eq!(sum, amt("KUDOS:1.3"));
    }

    #[test]
    fn sub_borrows_fraction() {
        let diff = amt("KUDOS:2.1").checked_sub(&amt("KUDOS:0.2")).unwrap();
        assert_eq!(diff, amt("KUDOS:1.9"));
    }

    #[test]
    fn sub_negative_fails() {
        let err = amt("KUDOS:1").checked_sub(&amt("KUDOS:1.00000001")).unwrap_err();
        assert_eq!(err, MintselError::NegativeAmount);
    }

    #[test]
    fn add_then_sub_is_identity() {
        let samples = ["KUDOS:0", "KUDOS:0.99999999", "KUDOS:3.5", "KUDOS:123456.00000007"];
        for a in samples {
            for b in samples {
                let (a, b) = (amt(a), amt(b));
                let back = a.checked_add(&b).unwrap().checked_sub(&b).unwrap();
                assert_eq!(back, a);
            }
        }
    }

    #[test]
    fn add_overflow() {
        let max = Amount::new("KUDOS", AMOUNT_MAX_VALUE, FRACTION_BASE - 1).unwrap();
        let tiny = amt("KUDOS:0.00000001");
        assert_eq!(max.checked_add(&tiny).unwrap_err(), MintselError::Overflow);
    }

    #[test]
    fn currency_guard() {
        let a = amt("KUDOS:1");
        let b = amt("EUR:1");
        assert!(matches!(a.checked_add(&b), Err(MintselError::CurrencyMismatch { .. })));
        assert!(matches!(a.checked_sub(&b), Err(MintselError::CurrencyMismatch { .. })));
        assert!(matches!(a.try_cmp(&b), Err(MintselError::CurrencyMismatch { .. })));
    }

    #[test]
    fn compare() {
        assert_eq!(amt("KUDOS:1.2").try_cmp(&amt("KUDOS:1.10")).unwrap(), Ordering::Greater);
        assert_eq!(amt("KUDOS:1").try_cmp(&amt("KUDOS:1.0")).unwrap(), Ordering::Equal);
        assert_eq!(amt("KUDOS:0.5").try_cmp(&amt("KUDOS:2")).unwrap(), Ordering::Less);
    }

    #[test]
    fn multiply_and_sum() {
        assert_eq!(amt("KUDOS:0.25").checked_mul(6).unwrap(), amt("KUDOS:1.5"));
        let parts = [amt("KUDOS:1"), amt("KUDOS:0.5"), amt("KUDOS:0.5")];
        assert_eq!(Amount::sum("KUDOS", &parts).unwrap(), amt("KUDOS:2"));
        assert_eq!(Amount::sum("KUDOS", &[]).unwrap(), amt("KUDOS:0"));
    }

    #[test]
    fn units_roundtrip() {
        let a = amt("KUDOS:12.34");
        assert_eq!(Amount::from_units("KUDOS", a.to_units()).unwrap(), a);
    }

    #[test]
    fn zero_checks() {
        assert!(Amount::zero("KUDOS").unwrap().is_zero());
        assert!(!amt("KUDOS:0.00000001").is_zero());
        assert!(amt("KUDOS:5").zero_like().is_zero());
    }

    #[test]
    fn serde_uses_string_form() {
        let a = amt("KUDOS:10.5");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"KUDOS:10.5\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<Amount>("\"KUDOS:abc\"").is_err());
    }

    #[test]
    fn divide_rounds_down() {
        assert_eq!(amt("KUDOS:10").checked_div(4).unwrap(), amt("KUDOS:2.5"));
        assert_eq!(amt("KUDOS:1").checked_div(3).unwrap(), amt("KUDOS:0.33333333"));
        assert_eq!(amt("KUDOS:7.5").checked_div(1).unwrap(), amt("KUDOS:7.5"));
        assert!(matches!(
            amt("KUDOS:1").checked_div(0),
            Err(MintselError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn currency_codes_normalize_to_upper_case() {
        assert_eq!(Amount::normalize_currency("kudos").unwrap(), "KUDOS");
        assert_eq!(Amount::normalize_currency("Tst-Ku_1").unwrap(), "TST-KU_1");
        assert!(Amount::normalize_currency("").is_err());
        assert!(Amount::normalize_currency("KU DOS").is_err());
    }
}
