//! Cooperative cancellation for the update loop
//!
//! [`Shutdown`] is the trigger side, held by whoever observes process
//! termination (signal handler, host application). [`ShutdownWaiter`] is the
//! scheduler side and implements [`AbortWaiter`].
//!
//! ```rust
//! use noip_core::shutdown::Shutdown;
//! use noip_core::traits::AbortWaiter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (shutdown, waiter) = Shutdown::new();
//! shutdown.trigger();
//! assert!(waiter.wait_or_abort(3600).await);
//! # }
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::traits::AbortWaiter;

/// Trigger handle for cancellation
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: std::sync::Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a trigger and the waiter it controls
    pub fn new() -> (Self, ShutdownWaiter) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                tx: std::sync::Arc::new(tx),
            },
            ShutdownWaiter { rx },
        )
    }

    /// Request cancellation; idempotent
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been requested
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Another waiter bound to this trigger
    pub fn waiter(&self) -> ShutdownWaiter {
        ShutdownWaiter {
            rx: self.tx.subscribe(),
        }
    }
}

/// Interruptible sleep bound to a [`Shutdown`] trigger
#[derive(Debug, Clone)]
pub struct ShutdownWaiter {
    rx: watch::Receiver<bool>,
}

impl ShutdownWaiter {
    /// Whether cancellation has been requested
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested
    ///
    /// A dropped trigger can never fire, so this then never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|triggered| *triggered).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl AbortWaiter for ShutdownWaiter {
    async fn wait_or_abort(&self, seconds: u64) -> bool {
        if self.is_aborted() {
            return true;
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(seconds)) => false,
            _ = self.cancelled() => {
                debug!("Wait aborted");
                true
            }
        }
    }
}
