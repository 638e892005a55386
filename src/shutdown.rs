//! Process-wide shutdown signal
//!
//! A single Ctrl-C listener is installed for the whole process. Store runs
//! and the start page prompt all wait on clones of the same [`Shutdown`]
//! handle, so an interrupt is seen wherever the program happens to be.

use tokio::sync::watch;

/// Sending half of the shutdown signal
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Signals shutdown to every handle
    ///
    /// Calling it more than once has no further effect.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("Shutdown signaled");
        }
    }
}

/// Receiving half of the shutdown signal; clones share the same state
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A handle that is never triggered
    pub fn never() -> Self {
        let (_trigger, shutdown) = channel();
        shutdown
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown was signaled, immediately if it already was
    ///
    /// Never resolves when the trigger is dropped without firing.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Creates a linked trigger and handle
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Installs the process Ctrl-C listener
///
/// The first Ctrl-C triggers the returned handle so runs can flush what they
/// released. A second one exits right away.
pub fn on_ctrl_c() -> Shutdown {
    let (trigger, shutdown) = channel();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            return;
        }
        tracing::warn!("Ctrl-C received, saving progress (press again to quit now)");
        trigger.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second Ctrl-C, exiting without saving");
            std::process::exit(130);
        }
    });

    shutdown
}
