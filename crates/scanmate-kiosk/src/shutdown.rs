//! Termination signal handling.
//!
//! SIGINT and SIGTERM only raise a flag. The kiosk loop looks at the flag
//! once per iteration, so a transaction in progress always runs to
//! completion before the kiosk shuts down.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Shared "please stop" flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task that raises the flag on SIGINT or SIGTERM.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(()) => {
                    info!("termination signal received");
                    shutdown.trigger();
                }
                Err(e) => warn!(error = %e, "cannot listen for termination signals"),
            }
        })
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = signal::ctrl_c() => result,
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_is_shared_between_clones() {
        let shutdown = ShutdownSignal::new();
        let observer = shutdown.clone();
        assert!(!observer.is_triggered());

        shutdown.trigger();

        assert!(observer.is_triggered());
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_listener_does_not_trigger_without_signal() {
        let shutdown = ShutdownSignal::new();
        let listener = shutdown.listen();

        tokio::task::yield_now().await;

        assert!(!shutdown.is_triggered());
        listener.abort();
    }
}
