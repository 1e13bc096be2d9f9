//! Concurrency gate: a fair counting semaphore bounding parallel
//! compressions.
//!
//! A full decode of a large photo plus its working candidates costs tens of
//! megabytes, so the number of requests in flight is capped at three even on
//! wide machines. The default gate is process-global and shared by every
//! [`Compressor`](crate::Compressor) that does not inject its own.

use std::sync::{Arc, OnceLock};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Upper bound on concurrent compressions regardless of core count.
const MAX_PERMITS: usize = 3;

#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    permits: usize,
}

impl ConcurrencyGate {
    pub fn new(permits: usize) -> Self {
        let permits = permits.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            permits,
        }
    }

    /// Gate sized for this host: `clamp(cores − 1, 1, 3)`.
    pub fn for_host() -> Self {
        Self::new(num_cpus::get().saturating_sub(1).clamp(1, MAX_PERMITS))
    }

    /// The shared process-global gate, created on first use.
    pub fn shared() -> Arc<ConcurrencyGate> {
        static SHARED: OnceLock<Arc<ConcurrencyGate>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(ConcurrencyGate::for_host())).clone()
    }

    pub fn permits(&self) -> usize {
        self.permits
    }

    /// Wait for a slot. The permit is released on drop, so every exit path
    /// (success, error, cancellation at an await point) gives the slot back.
    /// Waiters are served in FIFO order.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("compression gate semaphore is never closed")
    }
}
