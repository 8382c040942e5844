//! A minimal cancellation token shared by every background sweeper/timer
//! in the resilience core (cache expiry sweep, rate limiter cleanup,
//! governor metrics/optimization/watchdog timers).

use tokio::sync::watch;

/// Owns the cancellation signal. Dropping this (or calling [`Self::shutdown`])
/// tells every cloned [`ShutdownSignal`] to stop.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

/// A cloneable handle background tasks poll to know when to exit.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

/// Creates a linked `(ShutdownHandle, ShutdownSignal)` pair.
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, ShutdownSignal { rx })
}

impl ShutdownHandle {
    /// Signals every cloned [`ShutdownSignal`] to stop.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ShutdownSignal {
    /// Resolves once [`ShutdownHandle::shutdown`] has been called (or the
    /// handle was dropped).
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Non-blocking check of whether shutdown has already been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_resolves_after_shutdown() {
        let (handle, mut signal) = shutdown_channel();
        assert!(!signal.is_cancelled());

        handle.shutdown();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn dropping_handle_also_cancels() {
        let (handle, mut signal) = shutdown_channel();
        drop(handle);
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }
}
