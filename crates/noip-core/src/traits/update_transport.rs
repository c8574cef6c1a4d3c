// # Update Transport Trait
//
// Defines the interface for issuing one update request to the provider.
//
// ## Implementations
//
// - No-IP / dyndns2: `noip-provider` crate

use async_trait::async_trait;

use crate::config::Configuration;
use crate::error::TransportError;

/// Trait for provider update clients
///
/// # Single-Shot
///
/// One call is one HTTP request. Implementations must not retry, sleep or
/// spawn tasks: when to try again is decided by `UpdateScheduler`.
///
/// # Security
///
/// The username and password in `config` must never reach a log sink or an
/// error string.
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    /// Perform one update request
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The full response body
    /// - `Err(TransportError)`: Network, TLS, timeout or non-2xx failure
    async fn perform_update(
        &self,
        config: &Configuration,
        user_agent: &str,
    ) -> Result<String, TransportError>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
