//! # Chain Primitives
//!
//! Address, hash and amount types shared by every crate in the workspace.

use primitive_types::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

// Re-export primitive types for convenience
pub use primitive_types::{H160 as Address, H256 as TxHash, U256 as RawU256};

/// Block number type (u64)
pub type BlockNumber = u64;

/// Decimals between wei and ether.
pub const ETHER_DECIMALS: usize = 18;

/// Render an address as a full `0x`-prefixed lowercase hex string.
///
/// `Display` on `H160` abbreviates the middle of the value, which is not
/// what callers want in JSON bodies or log lines.
pub fn format_address(address: &Address) -> String {
    format!("{:#x}", address)
}

/// Parse a `0x`-prefixed (or bare) 40 hex digit address.
pub fn parse_address(value: &str) -> Result<Address, ParseError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != 40 {
        return Err(ParseError::InvalidAddress(value.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| ParseError::InvalidAddress(value.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Parse a 32-byte transaction hash.
pub fn parse_tx_hash(value: &str) -> Result<TxHash, ParseError> {
    let digits = value.trim().trim_start_matches("0x");
    if digits.len() != 64 {
        return Err(ParseError::InvalidHash(value.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| ParseError::InvalidHash(value.to_string()))?;
    Ok(TxHash::from_slice(&bytes))
}

/// An amount of wei.
///
/// Serializes as a decimal string, deserializes from a decimal string,
/// a `0x` hex string (as returned by `eth_getBalance`) or a JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Wei(pub U256);

impl Wei {
    pub const ZERO: Wei = Wei(U256::zero());

    /// Whole ether expressed in wei.
    pub fn from_ether(ether: u64) -> Self {
        Wei(U256::from(ether) * U256::exp10(ETHER_DECIMALS))
    }

    #[inline]
    pub fn from_dec_str(s: &str) -> Result<Self, ParseError> {
        U256::from_dec_str(s.trim())
            .map(Wei)
            .map_err(|_| ParseError::InvalidAmount(s.to_string()))
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn into_inner(self) -> U256 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Wei)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Wei)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Wei(self.0.saturating_sub(other.0))
    }

    /// Render as an ether decimal string with trailing zeros trimmed.
    ///
    /// `1_500_000_000_000_000_000` wei becomes `"1.5"`, whole amounts carry
    /// no fractional part.
    pub fn format_ether(&self) -> String {
        let mut word = [0u8; 32];
        self.0.to_big_endian(&mut word);
        let amount = alloy_primitives::U256::from_be_bytes(word);
        let text = alloy_primitives::utils::format_ether(amount);
        match text.split_once('.') {
            Some((whole, fraction)) => {
                let fraction = fraction.trim_end_matches('0');
                if fraction.is_empty() {
                    whole.to_string()
                } else {
                    format!("{whole}.{fraction}")
                }
            }
            None => text,
        }
    }
}

impl From<u64> for Wei {
    fn from(v: u64) -> Self {
        Wei(U256::from(v))
    }
}

impl From<u128> for Wei {
    fn from(v: u128) -> Self {
        Wei(U256::from(v))
    }
}

impl From<U256> for Wei {
    fn from(v: U256) -> Self {
        Wei(v)
    }
}

impl From<Wei> for U256 {
    fn from(v: Wei) -> Self {
        v.0
    }
}

impl FromStr for Wei {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex_str) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            U256::from_str_radix(hex_str, 16)
                .map(Wei)
                .map_err(|_| ParseError::InvalidAmount(s.to_string()))
        } else {
            Wei::from_dec_str(trimmed)
        }
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Wei {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WeiVisitor;

        impl<'de> de::Visitor<'de> for WeiVisitor {
            type Value = Wei;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a decimal string, a 0x hex string or an integer")
            }

            fn visit_str<E>(self, value: &str) -> Result<Wei, E>
            where
                E: de::Error,
            {
                Wei::from_str(value).map_err(de::Error::custom)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Wei, E>
            where
                E: de::Error,
            {
                Ok(Wei::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> Result<Wei, E>
            where
                E: de::Error,
            {
                Ok(Wei::from(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Wei, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Wei::from)
                    .map_err(|_| de::Error::custom("amount must not be negative"))
            }

            // serde_json hands integers above u64 to the visitor as f64.
            fn visit_f64<E>(self, value: f64) -> Result<Wei, E>
            where
                E: de::Error,
            {
                if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
                    return Err(de::Error::custom(
                        "amount must be a whole number of wei, send fractions as a decimal string",
                    ));
                }
                // `{:.0}` prints the exact integer the float holds.
                Wei::from_dec_str(&format!("{value:.0}")).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(WeiVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_ether_whole_and_fractional() {
        assert_eq!(Wei::from_ether(100).format_ether(), "100");
        assert_eq!(Wei::ZERO.format_ether(), "0");
        assert_eq!(Wei::from(1_500_000_000_000_000_000u128).format_ether(), "1.5");
        assert_eq!(Wei::from(100u64).format_ether(), "0.0000000000000001");
    }

    #[test]
    fn test_wei_deserializes_from_string_hex_and_number() {
        let from_dec: Wei = serde_json::from_str("\"1000000000000000000\"").unwrap();
        let from_hex: Wei = serde_json::from_str("\"0xde0b6b3a7640000\"").unwrap();
        let from_num: Wei = serde_json::from_str("1000000000000000000").unwrap();
        assert_eq!(from_dec, Wei::from_ether(1));
        assert_eq!(from_hex, Wei::from_ether(1));
        assert_eq!(from_num, Wei::from_ether(1));
    }

    #[test]
    fn test_wei_rejects_negative_and_float() {
        assert!(serde_json::from_str::<Wei>("-1").is_err());
        assert!(serde_json::from_str::<Wei>("1.5").is_err());
        assert!(serde_json::from_str::<Wei>("\"ten\"").is_err());
        assert!(serde_json::from_str::<Wei>("-1e21").is_err());
    }

    #[test]
    fn test_wei_accepts_large_json_numbers() {
        let wei: Wei = serde_json::from_str("1e+21").unwrap();
        assert_eq!(wei, Wei::from_ether(1000));
        let wei: Wei = serde_json::from_str("100000000000000000000").unwrap();
        assert_eq!(wei, Wei::from_ether(100));
        assert!(serde_json::from_str::<Wei>("1e80").is_err());
    }

    #[test]
    fn test_wei_serializes_as_decimal_string() {
        let json = serde_json::to_string(&Wei::from_ether(2)).unwrap();
        assert_eq!(json, "\"2000000000000000000\"");
    }

    #[test]
    fn test_address_formatting_is_full_length() {
        let address = Address::repeat_byte(0xab);
        let text = format_address(&address);
        assert_eq!(text.len(), 42);
        assert!(text.starts_with("0xabab"));
        assert_eq!(parse_address(&text).unwrap(), address);
    }

    #[test]
    fn test_parse_address_rejects_bad_input() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz00000000000000000000000000000000000000").is_err());
        assert!(parse_address("").is_err());
    }

    #[test]
    fn test_parse_tx_hash() {
        let hash = TxHash::repeat_byte(0x11);
        assert_eq!(parse_tx_hash(&format!("{:#x}", hash)).unwrap(), hash);
        assert!(parse_tx_hash("0x11").is_err());
    }

    proptest! {
        #[test]
        fn format_ether_never_ends_with_zero_fraction(wei in any::<u128>()) {
            let text = Wei::from(wei).format_ether();
            if let Some((_, fraction)) = text.split_once('.') {
                prop_assert!(!fraction.ends_with('0'));
                prop_assert!(fraction.len() <= ETHER_DECIMALS);
            }
        }
    }
}
