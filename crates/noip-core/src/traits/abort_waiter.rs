// # Abort Waiter Trait
//
// The interruptible sleep between update attempts.

use async_trait::async_trait;

/// Trait for the cancellable wait primitive
///
/// The scheduler's only suspension point. Implementations must return
/// `true` as soon as cancellation is requested, including when it was
/// requested before the call.
#[async_trait]
pub trait AbortWaiter: Send + Sync {
    /// Wait for `seconds` or until cancellation
    ///
    /// # Returns
    ///
    /// `true` if the wait was aborted, `false` if the full duration elapsed
    async fn wait_or_abort(&self, seconds: u64) -> bool;
}
