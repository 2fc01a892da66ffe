//! Address parsing and validation (EIP-55 checksummed hex)

use crate::error::{Error, Result};
use alloy_primitives::Address;
use std::str::FromStr;

/// Parse and validate an account address
///
/// Accepts `0x`-prefixed 40-digit hex. All-lowercase and all-uppercase forms
/// carry no checksum and are accepted as-is; mixed case must match the
/// [EIP-55](https://eips.ethereum.org/EIPS/eip-55) checksum.
pub fn parse_address(address: &str) -> Result<Address> {
    let address = address.trim();
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| Error::Address(format!("Missing 0x prefix: {}", address)))?;

    if digits.len() != 40 {
        return Err(Error::Address(format!(
            "Expected 40 hex digits, found {}",
            digits.len()
        )));
    }

    let parsed = Address::from_str(digits)
        .map_err(|e| Error::Address(format!("Failed to parse address: {}", e)))?;

    if is_mixed_case(digits) && &parsed.to_checksum(None)[2..] != digits {
        return Err(Error::Address(format!(
            "Checksum mismatch for {}",
            address
        )));
    }

    Ok(parsed)
}

/// Validate an address format without returning it
pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

/// Canonical checksummed form of an address string
pub fn to_checksum(address: &str) -> Result<String> {
    parse_address(address).map(|a| a.to_checksum(None))
}

fn is_mixed_case(digits: &str) -> bool {
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    has_lower && has_upper
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors from EIP-55
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksummed_addresses_parse() {
        for addr in CHECKSUMMED {
            let parsed = parse_address(addr).unwrap();
            assert_eq!(parsed.to_checksum(None), addr);
        }
    }

    #[test]
    fn test_single_case_addresses_parse() {
        let lower = CHECKSUMMED[0].to_lowercase();
        let upper = format!("0x{}", CHECKSUMMED[0][2..].to_uppercase());
        assert!(is_valid_address(&lower));
        assert!(is_valid_address(&upper));
        assert_eq!(to_checksum(&lower).unwrap(), CHECKSUMMED[0]);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // flip the case of one letter
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(parse_address(bad), Err(Error::Address(_))));
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x123"));
        assert!(!is_valid_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!is_valid_address("0xZZAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!is_valid_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00"));
    }
}
