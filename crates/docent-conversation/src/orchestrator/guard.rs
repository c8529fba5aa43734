use std::sync::atomic::{AtomicBool, Ordering};

use crate::TurnError;

/// Clears the in-flight flag on drop, so every exit path of a turn
/// releases it.
pub(crate) struct TurnGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TurnGuard<'a> {
    /// Fails with `Busy` if a turn already holds the flag.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, TurnError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(TurnError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
