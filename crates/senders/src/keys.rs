//! secp256k1 address derivation for `private_key` senders (§4.5).

use alloy_primitives::{keccak256, Address};
use k256::ecdsa::SigningKey;

use crate::error::{Result, SenderError};

pub fn derive_address(name: &str, scalar: &[u8; 32]) -> Result<Address> {
    let signing_key = SigningKey::from_bytes(scalar.into()).map_err(|source| SenderError::InvalidKey { name: name.to_string(), source })?;
    let verifying_key = signing_key.verifying_key();
    let encoded = verifying_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

pub fn parse_scalar(name: &str, hex_str: &str) -> Result<[u8; 32]> {
    treb_common::hex_utils::parse_fixed_hex::<32>("private_key", hex_str.trim_start_matches("0x"))
        .map_err(|source| SenderError::InvalidKeyHex { name: name.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_deterministic_address_from_scalar() {
        let scalar = [1u8; 32];
        let addr = derive_address("deployer", &scalar).unwrap();
        let addr2 = derive_address("deployer", &scalar).unwrap();
        assert_eq!(addr, addr2);
    }

    #[test]
    fn different_scalars_derive_different_addresses() {
        let a = derive_address("a", &[1u8; 32]).unwrap();
        let b = derive_address("b", &[2u8; 32]).unwrap();
        assert_ne!(a, b);
    }
}
