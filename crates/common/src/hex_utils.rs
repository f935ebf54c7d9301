//! Small hex-parsing helpers shared by `treb-abi`, `treb-params` and
//! `treb-senders`, all of which accept `0x`-prefixed user input of a known
//! byte length.

use crate::error::{CommonError, Result};

/// Parses `0x`-prefixed hex into exactly `N` bytes. Used for the fixed-width
/// scalar types `spec.md` §4.6 names (`address`, `bytes32`).
pub fn parse_fixed_hex<const N: usize>(field: &'static str, s: &str) -> Result<[u8; N]> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|source| CommonError::InvalidHex { field, source })?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| CommonError::NotFound(format!("{field}: expected {N} bytes, got different length")))
}

/// Parses `0x`-prefixed, even-length hex of arbitrary length (the `bytes`
/// scalar type).
pub fn parse_hex_bytes(field: &'static str, s: &str) -> Result<Vec<u8>> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.len() % 2 != 0 {
        return Err(CommonError::NotFound(format!("{field}: odd-length hex string")));
    }
    hex::decode(stripped).map_err(|source| CommonError::InvalidHex { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixed_hex_accepts_canonical_address() {
        let bytes = parse_fixed_hex::<20>("address", "0x000000000000000000000000000000000000aa").unwrap();
        assert_eq!(bytes[19], 0xaa);
    }

    #[test]
    fn parse_fixed_hex_rejects_wrong_length() {
        assert!(parse_fixed_hex::<20>("address", "0xaa").is_err());
    }

    #[test]
    fn parse_hex_bytes_rejects_odd_length() {
        assert!(parse_hex_bytes("bytes", "0xabc").is_err());
    }

    #[test]
    fn parse_hex_bytes_accepts_empty() {
        assert_eq!(parse_hex_bytes("bytes", "0x").unwrap(), Vec::<u8>::new());
    }
}
