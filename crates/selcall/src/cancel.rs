//! Cooperative cancellation.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

/// Sticky cancellation flag with a waker.
///
/// Once cancelled it stays cancelled. Every blocking wait in the engine races
/// against [`cancelled`](Self::cancelled).
pub struct CancelToken<M: RawMutex> {
    flag: AtomicBool,
    wake: Signal<M, ()>,
}

impl<M: RawMutex> CancelToken<M> {
    /// Token in the running state.
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            wake: Signal::new(),
        }
    }

    /// Request cancellation and wake the waiter, if any.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
        self.wake.signal(());
    }

    /// `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Resolve when the token is cancelled.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            self.wake.wait().await;
        }
    }
}

impl<M: RawMutex> Default for CancelToken<M> {
    fn default() -> Self {
        Self::new()
    }
}
