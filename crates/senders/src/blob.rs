//! Fixed byte layouts for the runner's init blob (§4.5).

use crate::types::{ResolvedSender, SenderKind};

const TAG_PRIVATE_KEY: u8 = 1;
const TAG_HARDWARE: u8 = 2;
const TAG_MULTISIG: u8 = 3;

fn push_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// Encodes one sender's kind-specific payload (without the outer
/// per-sender frame length prefix `encode_init_blob` adds).
pub fn encode_config_bytes(kind: &SenderKind) -> Vec<u8> {
    let mut buf = Vec::new();
    match kind {
        SenderKind::PrivateKey { scalar } => {
            buf.push(TAG_PRIVATE_KEY);
            buf.extend_from_slice(scalar);
        }
        SenderKind::Hardware { derivation_path } => {
            buf.push(TAG_HARDWARE);
            push_len_prefixed(&mut buf, derivation_path.as_bytes());
        }
        SenderKind::Multisig { safe_address, signer_name, proposer_name } => {
            buf.push(TAG_MULTISIG);
            buf.extend_from_slice(safe_address.as_slice());
            push_len_prefixed(&mut buf, signer_name.as_bytes());
            match proposer_name {
                Some(name) => {
                    buf.push(1);
                    push_len_prefixed(&mut buf, name.as_bytes());
                }
                None => buf.push(0),
            }
        }
    }
    buf
}

/// `u32` sender count, then one length-prefixed frame per sender in the
/// order it was resolved — topological, per §4.5.
pub fn encode_init_blob(senders: &[ResolvedSender]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(senders.len() as u32).to_be_bytes());
    for sender in senders {
        push_len_prefixed(&mut buf, &sender.config_bytes);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn private_key_round_trip_length() {
        let bytes = encode_config_bytes(&SenderKind::PrivateKey { scalar: [7u8; 32] });
        assert_eq!(bytes.len(), 1 + 32);
        assert_eq!(bytes[0], TAG_PRIVATE_KEY);
    }

    #[test]
    fn multisig_encodes_optional_proposer_flag() {
        let kind = SenderKind::Multisig { safe_address: Address::repeat_byte(1), signer_name: "deployer".into(), proposer_name: None };
        let bytes = encode_config_bytes(&kind);
        assert_eq!(bytes[0], TAG_MULTISIG);
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn init_blob_prefixes_sender_count() {
        let senders = vec![ResolvedSender {
            name: "deployer".into(),
            kind: SenderKind::PrivateKey { scalar: [1u8; 32] },
            account: Address::ZERO,
            can_broadcast: true,
            config_bytes: encode_config_bytes(&SenderKind::PrivateKey { scalar: [1u8; 32] }),
        }];
        let blob = encode_init_blob(&senders);
        assert_eq!(u32::from_be_bytes(blob[..4].try_into().unwrap()), 1);
    }
}
