//! C6 — script parameter documentation-tag scanning and validation.

pub mod error;
pub mod meta;
pub mod resolve;
pub mod scan;
pub mod types;
pub mod validate;

pub use error::{ParamError, Result};
pub use meta::{MetaResolver, NoopMetaResolver, ResolveOutcome, Selector};
pub use resolve::ParamParser;
pub use scan::scan_params;
pub use types::{ParamDecl, ParamType};
