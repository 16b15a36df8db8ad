use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::common::keccak256;
use crate::error::AddressError;

/// A 20-byte Ethereum address.
///
/// Equality and hashing use the raw bytes, so two spellings of the same
/// address that differ only in case are the same key. `Display` renders the
/// EIP-55 checksummed form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parses an Ethereum address from a hex string.
    ///
    /// All-lowercase and all-uppercase inputs are accepted as-is. Mixed-case
    /// input is treated as checksummed and must match EIP-55.
    ///
    /// # Errors
    /// Fails if the input is not 40 hex characters, has a bad checksum, or is
    /// the zero address.
    pub fn parse(addr_str: &str) -> Result<Self, AddressError> {
        let trimmed = addr_str.trim();
        let cleaned = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if cleaned.len() != 40 {
            return Err(AddressError::InvalidLength(cleaned.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes == [0u8; 20] {
            return Err(AddressError::ZeroAddress);
        }

        let address = Address(bytes);
        let has_lower = cleaned.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = cleaned.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.checksum_hex() != cleaned {
            return Err(AddressError::BadChecksum(trimmed.to_string()));
        }
        Ok(address)
    }

    /// Returns the 40 EIP-55 checksummed hex digits, without prefix.
    pub fn checksum_hex(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(&[lower.as_bytes()]);
        lower
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let nibble = (digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
                if c.is_ascii_alphabetic() && nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.checksum_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_with_prefix() {
        let addr = "0x1234567890abcdef1234567890abcdef12345678";
        let result = Address::parse(addr).unwrap();
        assert_eq!(result.as_bytes()[0], 0x12);
    }

    #[test]
    fn test_parse_address_without_prefix() {
        let addr = "1234567890abcdef1234567890abcdef12345678";
        assert!(Address::parse(addr).is_ok());
    }

    #[test]
    fn test_parse_address_invalid_length() {
        assert_eq!(
            Address::parse("0x1234"),
            Err(AddressError::InvalidLength(4))
        );
    }

    #[test]
    fn test_parse_address_invalid_hex() {
        let addr = "0xghijklmnopqrstuvwxyz1234567890abcdef1234";
        assert!(matches!(
            Address::parse(addr),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_parse_address_rejects_zero() {
        let addr = format!("0x{}", "0".repeat(40));
        assert_eq!(Address::parse(&addr), Err(AddressError::ZeroAddress));
    }

    #[test]
    fn test_checksum_display() {
        let checksummed = [
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
            "0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65",
        ];
        for expected in checksummed {
            let parsed = Address::parse(&expected.to_lowercase()).unwrap();
            assert_eq!(parsed.to_string(), expected);
        }
    }

    #[test]
    fn test_case_variants_collapse() {
        let lower = Address::parse("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc").unwrap();
        let upper = Address::parse("0x3C44CDDDB6A900FA2B585DD299E03D12FA4293BC").unwrap();
        let checksummed = Address::parse("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, checksummed);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let addr = "0x3c44CdDdB6a900fa2b585dd299e03d12FA4293BC";
        assert!(matches!(
            Address::parse(addr),
            Err(AddressError::BadChecksum(_))
        ));
    }

    #[test]
    fn test_serde_uses_checksummed_string() {
        let address = Address::parse("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0x70997970C51812dc3A010C7d01b50e0d17dc79C8\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
