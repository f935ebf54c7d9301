//! C5 — sender configuration builder.

pub mod blob;
pub mod doc_tag;
pub mod error;
pub mod keys;
pub mod resolve;
pub mod types;

pub use blob::{encode_config_bytes, encode_init_blob};
pub use doc_tag::parse_senders_tag;
pub use error::{Result, SenderError};
pub use resolve::SenderBuilder;
pub use types::{AccountConfig, AccountType, ResolvedSender, SenderKind};
