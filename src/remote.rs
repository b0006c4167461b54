use crate::errors::{AppError, AppResult};
use rand::Rng;
use std::future::Future;
use std::pin::Pin;
use tokio::time::Duration;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

pub type RemoteFuture = Pin<Box<dyn Future<Output = AppResult<serde_json::Value>> + Send>>;

/// The sole network-shaped boundary. A real deployment would swap in an
/// HTTP/RPC client that preserves the same settle-after-delay contract.
pub trait RemoteService: Send + Sync {
    fn call(&self, payload: serde_json::Value, delay: Duration) -> RemoteFuture;
}

/// Simulated service: echoes the payload after `delay`, failing with a fixed
/// probability rolled independently per call. Rates of 0.0 and 1.0 make it a
/// deterministic test double.
#[derive(Debug, Clone)]
pub struct SimulatedRemote {
    failure_rate: f64,
}

impl SimulatedRemote {
    pub fn new(failure_rate: f64) -> Self {
        Self { failure_rate }
    }
}

impl Default for SimulatedRemote {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_RATE)
    }
}

impl RemoteService for SimulatedRemote {
    fn call(&self, payload: serde_json::Value, delay: Duration) -> RemoteFuture {
        let failure_rate = self.failure_rate;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            if rand::rng().random::<f64>() < failure_rate {
                Err(AppError::Network(NETWORK_ERROR_MESSAGE.to_string()))
            } else {
                Ok(payload)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteService, SimulatedRemote, NETWORK_ERROR_MESSAGE};
    use crate::errors::AppError;
    use serde_json::json;
    use tokio::time::Duration;

    #[tokio::test]
    async fn zero_rate_echoes_payload() {
        let remote = SimulatedRemote::new(0.0);
        let payload = json!({"id": "1"});
        let result = remote
            .call(payload.clone(), Duration::from_millis(1))
            .await
            .expect("call succeeds");
        assert_eq!(result, payload);
    }

    #[tokio::test]
    async fn full_rate_always_fails_with_network_error() {
        let remote = SimulatedRemote::new(1.0);
        let err = remote
            .call(json!({}), Duration::from_millis(1))
            .await
            .expect_err("call fails");
        match err {
            AppError::Network(message) => assert_eq!(message, NETWORK_ERROR_MESSAGE),
            other => panic!("unexpected error: {other}"),
        }
    }
}
