use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AllowlistError, Result};

/// Number of bytes in an Ethereum address.
pub const ADDRESS_LEN: usize = 20;

/// Canonical form of an allowlist entry: the 20 raw address bytes.
///
/// Two addresses are equal iff their canonical bytes are equal, so
/// `0xAB..` and `0xab..` compare equal once parsed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Parses an Ethereum address from a hex string.
    ///
    /// # Arguments
    /// * `addr_str` - The address string, `0x`-prefixed, surrounding whitespace ignored
    ///
    /// # Errors
    /// Returns [`AllowlistError::InvalidAddressFormat`] if the prefix is missing,
    /// the body is not 40 hex characters, or the address is all zeros.
    pub fn parse(addr_str: &str) -> Result<Self> {
        let trimmed = addr_str.trim();
        let cleaned = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AllowlistError::invalid_address(addr_str, "missing 0x prefix"))?;
        if cleaned.len() != 2 * ADDRESS_LEN {
            return Err(AllowlistError::invalid_address(
                addr_str,
                format!(
                    "expected {} hex chars, got {}",
                    2 * ADDRESS_LEN,
                    cleaned.len()
                ),
            ));
        }
        let mut address = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(cleaned, &mut address)
            .map_err(|e| AllowlistError::invalid_address(addr_str, e.to_string()))?;
        if address == [0u8; ADDRESS_LEN] {
            return Err(AllowlistError::invalid_address(
                addr_str,
                "zero address not allowed",
            ));
        }
        Ok(Self(address))
    }

    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AllowlistError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
