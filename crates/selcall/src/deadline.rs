//! Absolute deadlines with cancellable waits.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Timer};

use crate::cancel::CancelToken;
use crate::error::Cancelled;

/// A point in time after which a window is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `window` from now. Saturates at [`Instant::MAX`].
    pub fn after(window: Duration) -> Self {
        Self::at(Instant::now().checked_add(window).unwrap_or(Instant::MAX))
    }

    /// Deadline at an absolute instant.
    pub const fn at(at: Instant) -> Self {
        Self { at }
    }

    /// The instant itself.
    pub const fn instant(&self) -> Instant {
        self.at
    }

    /// `true` once `now >= deadline`.
    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at
            .checked_duration_since(Instant::now())
            .unwrap_or(Duration::from_ticks(0))
    }

    /// Suspend until the deadline or cancellation, whichever comes first.
    ///
    /// # Errors
    ///
    /// [`Cancelled`] if the token fires first (or already has).
    pub async fn wait<M: RawMutex>(&self, cancel: &CancelToken<M>) -> Result<(), Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        match select(Timer::at(self.at), cancel.cancelled()).await {
            Either::First(()) => Ok(()),
            Either::Second(()) => Err(Cancelled),
        }
    }
}

/// Sleep for `duration` unless cancelled first.
///
/// # Errors
///
/// [`Cancelled`] if the token fires before the time is up.
pub async fn sleep<M: RawMutex>(duration: Duration, cancel: &CancelToken<M>) -> Result<(), Cancelled> {
    Deadline::after(duration).wait(cancel).await
}
