//! Process-wide stop signal for entity tasks.

use tokio::sync::watch;

/// Fires the shutdown signal. Dropping the trigger also counts as firing.
#[derive(Debug)]
pub(crate) struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Idempotent; later calls are no-ops.
    pub(crate) fn fire(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving side, cloned into every task.
#[derive(Debug, Clone)]
pub(crate) struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    #[cfg(test)]
    pub(crate) fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once the trigger fires or is dropped.
    pub(crate) async fn wait(&self) {
        let mut rx = self.rx.clone();
        // An error means the trigger is gone, which is a shutdown as well.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

pub(crate) fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}
