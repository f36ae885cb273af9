use async_trait::async_trait;
use timeguard_core::Timestamp;

use crate::error::NetworkResult;

/// Port for an external time service
///
/// A single call is one attempt. Failures are reported, never retried here;
/// retry policy belongs to the caller.
#[async_trait]
pub trait TrustedTimeSource: Send + Sync {
    /// Query the service once
    async fn fetch(&self) -> NetworkResult<Timestamp>;

    /// Identifier of the queried service
    fn server(&self) -> &str;
}
