//! The `Builder` capability.
//!
//! §4.2: "Triggers an out-of-band compile through an injected `Builder`
//! capability before indexing artifacts; fails the whole index if the compile
//! fails." The compiler itself is out of scope (§1 Non-goals) — this is only
//! the seam.

use std::path::Path;

pub trait Builder: Send + Sync {
    /// Compiles the project rooted at `root`. Any non-zero exit / compiler
    /// diagnostic becomes an `Err`; `Indexer::index` wraps it in
    /// [`crate::IndexError::Build`].
    fn compile(&self, root: &Path) -> eyre::Result<()>;
}

/// Test/CI double for projects whose artifacts are already on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBuilder;

impl Builder for NoopBuilder {
    fn compile(&self, _root: &Path) -> eyre::Result<()> {
        Ok(())
    }
}
