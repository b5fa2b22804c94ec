//! Cooperative shutdown
//!
//! Shutdown is a cancellation flag set by a signal handler and polled at
//! well-defined points: between cycles, between mentions, and inside every
//! long wait. An in-flight remote call is never interrupted; the flag is
//! re-checked once the current unit of work completes.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Shutdown flag shared between the signal handlers and the loop
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request shutdown
    pub fn request(&self) {
        self.token.cancel();
    }

    /// Has shutdown been requested?
    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Sleep for `duration`, waking early on shutdown
    ///
    /// Returns `false` if the sleep was cut short by a shutdown request.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.token.cancelled() => false,
        }
    }

    /// Install OS signal handlers (Ctrl-C, and SIGTERM on unix)
    pub fn install_signal_handlers(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received, finishing up...");
                signal.request();
            }
        });

        #[cfg(unix)]
        {
            let signal = self.clone();
            tokio::spawn(async move {
                use tokio::signal::unix::{signal as unix_signal, SignalKind};
                if let Ok(mut sigterm) = unix_signal(SignalKind::terminate()) {
                    sigterm.recv().await;
                    tracing::info!("SIGTERM received, finishing up...");
                    signal.request();
                }
            });
        }
    }
}
