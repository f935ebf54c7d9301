//! The `Clock` capability.
//!
//! Nothing in `spec.md` demands wall-clock time in its invariants, but several
//! persisted records (`deployment_info.timestamp`) need one, and the registry's
//! lock timeout (§5, default 30s) needs a deadline source tests can control
//! without sleeping for real.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
    fn now_instant(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_secs()
    }

    fn now_instant(&self) -> Instant {
        Instant::now()
    }
}
