//! Rate-limit circuit breaker shared between the queue and site-facing code.
//!
//! One-way for the lifetime of a batch: the first restricted-page signal
//! trips the guard, admission stops, and nothing resets it within the run.
//! Better to stop early than risk an account-level restriction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable handle to the shared trip flag. Every clone observes the same
/// underlying state, so collaborators can signal from anywhere.
#[derive(Debug, Clone, Default)]
pub struct RateLimitGuard {
    tripped: Arc<AtomicBool>,
}

impl RateLimitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rate-limit signal. Idempotent; the guard never untrips.
    pub fn observe(&self) {
        if !self.tripped.swap(true, Ordering::Relaxed) {
            tracing::warn!("rate-limit signal observed; guard tripped for the rest of the run");
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Relaxed)
    }
}
