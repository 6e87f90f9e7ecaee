// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exact amount conversion between wei and NAS.
//!
//! Nebulas nodes report balances, values and gas prices as base-10 strings in
//! the smallest unit (wei). The display unit (NAS) is that value divided by
//! `10^18`. Both directions are exact: converting NAS to wei fails instead of
//! rounding when the input carries more precision than the coin has.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decimal places of the NAS coin (1 NAS = 10^18 wei).
pub const NAS_DECIMALS: u32 = 18;

/// Errors produced while parsing or converting amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The input is not a valid non-negative integer or decimal number.
    #[error("invalid amount `{input}`: {reason}")]
    Parse { input: String, reason: &'static str },

    /// The value is not a whole number of smallest units at this precision.
    #[error("amount `{input}` has more than {decimals} decimal places")]
    Conversion { input: String, decimals: u32 },
}

impl AmountError {
    fn parse(input: &str, reason: &'static str) -> Self {
        AmountError::Parse {
            input: input.to_string(),
            reason,
        }
    }
}

fn pow10(exponent: u32) -> BigUint {
    BigUint::from(10u32).pow(exponent)
}

/// Parse a non-empty run of ASCII digits.
fn parse_digits(digits: &str) -> Option<BigUint> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
}

// =============================================================================
// Amount (smallest unit)
// =============================================================================

/// Non-negative amount in the smallest unit of the coin (wei).
///
/// Serialized as a base-10 string, which is how the node encodes balances,
/// transfer values and gas prices.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Amount(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    /// Divide by `10^decimals`.
    pub fn to_decimal(&self, decimals: u32) -> DecimalAmount {
        DecimalAmount::new(self.0.clone(), decimals)
    }

    /// Value in NAS.
    pub fn to_nas(&self) -> DecimalAmount {
        self.to_decimal(NAS_DECIMALS)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('+').unwrap_or(s);
        parse_digits(digits)
            .map(Amount)
            .ok_or_else(|| AmountError::parse(s, "expected a non-negative base-10 integer"))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Amount(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(BigUint::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(BigUint::from(value))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// DecimalAmount (display unit)
// =============================================================================

/// Exact decimal value `mantissa / 10^scale`.
///
/// Always normalized: the fraction carries no trailing zeros, so two values
/// compare equal exactly when they are numerically equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DecimalAmount {
    mantissa: BigUint,
    scale: u32,
}

impl DecimalAmount {
    pub fn new(mantissa: BigUint, scale: u32) -> Self {
        let mut value = Self { mantissa, scale };
        value.normalize();
        value
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// Number of significant fractional digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn mantissa(&self) -> &BigUint {
        &self.mantissa
    }

    /// Multiply by `10^decimals`.
    ///
    /// Fails with [`AmountError::Conversion`] when the result would not be an
    /// integer, i.e. the value has more than `decimals` fractional digits.
    pub fn to_smallest_unit(&self, decimals: u32) -> Result<Amount, AmountError> {
        if self.scale > decimals {
            return Err(AmountError::Conversion {
                input: self.to_string(),
                decimals,
            });
        }
        Ok(Amount(&self.mantissa * pow10(decimals - self.scale)))
    }

    /// Value in wei.
    pub fn to_wei(&self) -> Result<Amount, AmountError> {
        self.to_smallest_unit(NAS_DECIMALS)
    }

    fn normalize(&mut self) {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return;
        }
        let ten = BigUint::from(10u32);
        while self.scale > 0 && (&self.mantissa % &ten).is_zero() {
            self.mantissa /= &ten;
            self.scale -= 1;
        }
    }
}

impl FromStr for DecimalAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsigned = s.strip_prefix('+').unwrap_or(s);
        if unsigned.starts_with('-') {
            return Err(AmountError::parse(s, "amount must not be negative"));
        }

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::parse(s, "expected a decimal number"));
        }
        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole) || !is_digits(fraction) {
            return Err(AmountError::parse(s, "expected a decimal number"));
        }

        // Trailing zeros carry no precision.
        let fraction = fraction.trim_end_matches('0');
        let scale = u32::try_from(fraction.len())
            .map_err(|_| AmountError::parse(s, "too many fractional digits"))?;

        let digits = format!("{whole}{fraction}");
        let mantissa = if digits.is_empty() {
            BigUint::zero()
        } else {
            parse_digits(&digits).ok_or_else(|| AmountError::parse(s, "expected a decimal number"))?
        };

        Ok(Self::new(mantissa, scale))
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let divisor = pow10(self.scale);
        let whole = &self.mantissa / &divisor;
        let fraction = (&self.mantissa % &divisor).to_string();
        write!(
            f,
            "{}.{:0>width$}",
            whole,
            fraction,
            width = self.scale as usize
        )
    }
}

impl Ord for DecimalAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        let lhs = &self.mantissa * pow10(scale - self.scale);
        let rhs = &other.mantissa * pow10(scale - other.scale);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for DecimalAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for DecimalAmount {
    fn from(value: u64) -> Self {
        Self::new(BigUint::from(value), 0)
    }
}

impl Serialize for DecimalAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// String conversions
// =============================================================================

/// Convert a wei string into NAS.
pub fn to_decimal(amount: &str) -> Result<DecimalAmount, AmountError> {
    Ok(amount.parse::<Amount>()?.to_nas())
}

/// Convert a NAS string into wei, refusing to drop precision.
pub fn to_smallest_unit(decimal: &str) -> Result<Amount, AmountError> {
    decimal.parse::<DecimalAmount>()?.to_wei()
}
