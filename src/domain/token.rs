//! Token addressing and fixed-point amount handling.
//!
//! Every balance in the ledger is an unsigned 18-decimal fixed-point
//! amount carried as `u128` atomic units. Conversion to and from
//! human-readable decimals happens only at the config/display boundary,
//! via `rust_decimal`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Atomic token amount (18-decimal fixed point).
pub type Amount = u128;

/// Number of atomic units in one whole token.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Decimal places of the atomic unit.
pub const DECIMALS: u32 = 18;

/// A 20-byte account or token address.
///
/// The all-zero address is reserved as the gas-token sentinel: inside a
/// token-keyed table it denotes the chain's native currency rather than
/// a contract-backed token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The gas-token sentinel (and the "unset" backer value).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Construct from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Construct an address whose low 8 bytes carry `value`.
    ///
    /// Handy for tests and demo fixtures where addresses only need to be
    /// distinct.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Raw byte view.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the gas-token sentinel.
    pub fn is_gas_token(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != 40 {
            return Err(LedgerError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in hex.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| LedgerError::InvalidAddress(s.to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| LedgerError::InvalidAddress(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

/// Parse a human-readable decimal token amount into atomic units.
///
/// Fails on negative values, more than 18 fractional digits, or values
/// that overflow `u128`.
pub fn parse_units(value: &str) -> Result<Amount, LedgerError> {
    let dec = Decimal::from_str(value)
        .map_err(|_| LedgerError::InvalidAmount(value.to_string()))?;
    decimal_to_units(dec).ok_or_else(|| LedgerError::InvalidAmount(value.to_string()))
}

/// `UNIT` as `u64`, for `Decimal` conversion (1e18 fits in 64 bits).
#[allow(clippy::cast_possible_truncation)]
const UNIT_U64: u64 = UNIT as u64;

/// Convert a `Decimal` token amount into atomic units.
pub fn decimal_to_units(value: Decimal) -> Option<Amount> {
    if value.is_sign_negative() {
        return None;
    }
    let scaled = value.checked_mul(Decimal::from(UNIT_U64))?;
    if scaled.fract() != Decimal::ZERO {
        return None;
    }
    scaled.to_u128()
}

/// Format atomic units as a human-readable decimal.
///
/// Whole-token counts beyond `Decimal`'s 96-bit mantissa saturate; any
/// realistic pool balance stays exact.
pub fn format_units(amount: Amount) -> Decimal {
    let whole = Decimal::from_u128(amount / UNIT).unwrap_or(Decimal::MAX);
    #[allow(clippy::cast_possible_truncation)]
    let frac = Decimal::from((amount % UNIT) as u64) / Decimal::from(UNIT_U64);
    whole + frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_is_gas_token() {
        assert!(Address::ZERO.is_gas_token());
        assert!(!Address::from_low_u64(1).is_gas_token());
    }

    #[test]
    fn test_address_display_roundtrip() {
        let addr = Address::from_low_u64(0xdead_beef);
        let shown = addr.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.len(), 42);
        assert_eq!(shown.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_parse_without_prefix() {
        let addr: Address = "00000000000000000000000000000000000000ff".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64(0xff));
    }

    #[test]
    fn test_address_parse_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz00000000000000000000000000000000000000".parse::<Address>().is_err());
    }

    #[test]
    fn test_parse_units_whole_and_fractional() {
        assert_eq!(parse_units("10").unwrap(), 10 * UNIT);
        assert_eq!(parse_units("0.1").unwrap(), UNIT / 10);
        assert_eq!(parse_units("9.9").unwrap(), 99 * UNIT / 10);
    }

    #[test]
    fn test_parse_units_rejects_negative_and_too_precise() {
        assert!(parse_units("-1").is_err());
        assert!(parse_units("0.0000000000000000001").is_err());
        assert!(parse_units("abc").is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(10 * UNIT), dec!(10));
        assert_eq!(format_units(99 * UNIT / 10), dec!(9.9));
        assert_eq!(format_units(0), dec!(0));
    }
}
