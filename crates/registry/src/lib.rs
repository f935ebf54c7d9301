//! C9 — the registry store. Exclusive owner of `Deployment`, `Transaction`,
//! and `SafeTransaction` persisted state under a project's `.treb/`
//! directory.

pub mod changeset;
pub mod error;
pub mod local_config;
pub mod lock;
pub mod store;
pub mod types;

pub use changeset::{Changeset, EntityDiff};
pub use error::{RegistryError, Result};
pub use local_config::LocalConfig;
pub use store::{ListFilter, RegistryStore};
pub use types::*;
