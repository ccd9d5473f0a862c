use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// A cooperative cancellation signal for [`Poller::show`](crate::Poller::show).
///
/// The token is an [`Arc`] around its internal state, so clones share it: cancel
/// any clone from any thread and the poller observes it at its next wait.
/// A token stays canceled once canceled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal and wakes every waiter.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_canceled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until either `timeout` elapses or the token is canceled,
    /// whichever comes first. Returns true if the token was canceled.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let canceled = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (canceled, _) = cvar
            .wait_timeout_while(canceled, timeout, |canceled| !*canceled)
            .unwrap_or_else(PoisonError::into_inner);
        *canceled
    }
}
