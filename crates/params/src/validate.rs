//! Per-scalar-type validators (§4.6).

use crate::error::{ParamError, Result};
use crate::types::ParamType;

pub fn validate_scalar(name: &str, ty: ParamType, value: &str) -> Result<()> {
    let ok = match ty {
        ParamType::String => true,
        ParamType::Address => is_hex_of_len(value, 40),
        ParamType::Bytes32 => is_hex_of_len(value, 64),
        ParamType::Bytes => is_even_hex(value),
        ParamType::Uint256 => is_uint(value),
        ParamType::Int256 => is_int(value),
        ParamType::Sender | ParamType::Deployment | ParamType::Artifact => true,
    };
    if ok {
        Ok(())
    } else {
        Err(ParamError::InvalidParameter { name: name.to_string(), reason: format!("{value:?} is not a valid {ty:?}") })
    }
}

fn is_hex_of_len(value: &str, hex_digits: usize) -> bool {
    value.strip_prefix("0x").is_some_and(|rest| rest.len() == hex_digits && rest.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_even_hex(value: &str) -> bool {
    value.strip_prefix("0x").is_some_and(|rest| rest.len() % 2 == 0 && rest.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_uint(value: &str) -> bool {
    if let Some(rest) = value.strip_prefix("0x") {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit())
    } else {
        !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
    }
}

fn is_int(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    is_uint(unsigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_requires_40_hex_digits() {
        assert!(validate_scalar("owner", ParamType::Address, "0x0000000000000000000000000000000000000001").is_ok());
        assert!(validate_scalar("owner", ParamType::Address, "0x01").is_err());
    }

    #[test]
    fn int256_allows_leading_minus_uint256_does_not() {
        assert!(validate_scalar("x", ParamType::Int256, "-5").is_ok());
        assert!(validate_scalar("x", ParamType::Uint256, "-5").is_err());
    }

    #[test]
    fn bytes_requires_even_length_hex() {
        assert!(validate_scalar("x", ParamType::Bytes, "0xabcd").is_ok());
        assert!(validate_scalar("x", ParamType::Bytes, "0xabc").is_err());
    }

    #[test]
    fn uint256_accepts_decimal_or_hex() {
        assert!(validate_scalar("x", ParamType::Uint256, "42").is_ok());
        assert!(validate_scalar("x", ParamType::Uint256, "0x2a").is_ok());
    }
}
