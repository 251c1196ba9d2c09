use async_trait::async_trait;

/// Best-effort check that the network is reachable. A `true` answer is no
/// guarantee that the next request succeeds.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
