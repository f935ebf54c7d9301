//! Shared plumbing for the treb workspace: error kinds that more than one
//! crate needs, atomic file writes, and the small capability traits
//! (`Vcs`, `Clock`) that keep the core deterministic and testable.

pub mod clock;
pub mod error;
pub mod fs;
pub mod hex_utils;
pub mod vcs;

pub use clock::{Clock, SystemClock};
pub use error::{CommonError, Result};
pub use vcs::{GitVcs, NoVcs, Vcs};

/// Keccak-256, re-exported so every crate hashes the same way without each
/// pulling `alloy-primitives` for just this.
pub fn keccak256(data: &[u8]) -> alloy_primitives::B256 {
    alloy_primitives::keccak256(data)
}

/// `address_hex` formats an address using EIP-55 mixed-case checksumming, the
/// canonical display form `spec.md` §4.3 asks for ("address → EIP-55 hex").
pub fn address_hex(addr: &alloy_primitives::Address) -> String {
    addr.to_checksum(None)
}
