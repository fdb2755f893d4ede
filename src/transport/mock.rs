//! Mock transport for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::traits::{Transport, TransportFactory};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::operation::AUTHENTICATE_OPERATION;
use crate::request::Payload;

/// A call observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: String,
    pub payload: Payload,
}

/// Mock transport for testing.
///
/// Answers `AuthenticationTokenGet` with a configurable token and every other
/// operation with a configured response (an empty object by default).
pub struct MockTransport {
    token: Option<String>,
    auth_error: Option<TransportError>,
    responses: HashMap<String, Value>,
    failures: HashMap<String, TransportError>,
    latency: Option<Duration>,
    auth_calls: AtomicU32,
    operation_calls: AtomicU32,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Create a mock that authenticates with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            auth_error: None,
            responses: HashMap::new(),
            failures: HashMap::new(),
            latency: None,
            auth_calls: AtomicU32::new(0),
            operation_calls: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Authentication succeeds at the transport level but carries no token.
    pub fn without_token(mut self) -> Self {
        self.token = None;
        self
    }

    /// Authentication fails with `error`.
    pub fn with_auth_error(mut self, error: TransportError) -> Self {
        self.auth_error = Some(error);
        self
    }

    /// Set the result returned for `operation`.
    pub fn with_response(mut self, operation: impl Into<String>, response: Value) -> Self {
        self.responses.insert(operation.into(), response);
        self
    }

    /// Make `operation` fail with `error`.
    pub fn with_failure(mut self, operation: impl Into<String>, error: TransportError) -> Self {
        self.failures.insert(operation.into(), error);
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of authentication calls received.
    pub fn auth_calls(&self) -> u32 {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Number of non-authentication calls received.
    pub fn operation_calls(&self) -> u32 {
        self.operation_calls.load(Ordering::SeqCst)
    }

    /// All calls received, in arrival order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// The most recent call to `operation`.
    pub async fn last_call(&self, operation: &str) -> Option<RecordedCall> {
        self.calls
            .lock()
            .await
            .iter()
            .rev()
            .find(|c| c.operation == operation)
            .cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new("mock-token")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, operation: &str, payload: &Payload) -> Result<Value, TransportError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.calls.lock().await.push(RecordedCall {
            operation: operation.to_string(),
            payload: payload.clone(),
        });

        if operation == AUTHENTICATE_OPERATION {
            self.auth_calls.fetch_add(1, Ordering::SeqCst);

            if let Some(err) = &self.auth_error {
                return Err(err.clone());
            }

            return Ok(match &self.token {
                Some(token) => json!({ "AuthenticationTokenGetResult": token }),
                None => json!({}),
            });
        }

        self.operation_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.failures.get(operation) {
            return Err(err.clone());
        }

        Ok(self
            .responses
            .get(operation)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

/// Factory handing out a shared [`MockTransport`].
pub struct MockTransportFactory {
    transport: Arc<MockTransport>,
    error: Option<TransportError>,
    latency: Option<Duration>,
    connects: AtomicU32,
}

impl MockTransportFactory {
    pub fn new(transport: Arc<MockTransport>) -> Self {
        Self {
            transport,
            error: None,
            latency: None,
            connects: AtomicU32::new(0),
        }
    }

    /// Every connect attempt fails with `error`.
    pub fn failing(error: TransportError) -> Self {
        let mut factory = Self::new(Arc::new(MockTransport::default()));
        factory.error = Some(error);
        factory
    }

    /// Delay every connect attempt by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of connect attempts.
    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn transport(&self) -> &Arc<MockTransport> {
        &self.transport
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn connect(&self, _config: &ClientConfig) -> Result<Arc<dyn Transport>, TransportError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        Ok(self.transport.clone() as Arc<dyn Transport>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_authenticates() {
        let transport = MockTransport::new("T");

        let result = transport
            .call(AUTHENTICATE_OPERATION, &Payload::new())
            .await
            .unwrap();

        assert_eq!(result["AuthenticationTokenGetResult"], "T");
        assert_eq!(transport.auth_calls(), 1);
        assert_eq!(transport.operation_calls(), 0);
    }

    #[tokio::test]
    async fn test_mock_failure_and_response() {
        let transport = MockTransport::default()
            .with_response("GetInventory", json!({"GetInventoryResult": {"Items": []}}))
            .with_failure("CancelPickTicket", TransportError::Network("reset".into()));

        let ok = transport.call("GetInventory", &Payload::new()).await.unwrap();
        assert_eq!(ok, json!({"GetInventoryResult": {"Items": []}}));

        let err = transport.call("CancelPickTicket", &Payload::new()).await;
        assert_eq!(err, Err(TransportError::Network("reset".into())));

        assert_eq!(transport.operation_calls(), 2);
        assert_eq!(transport.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_factory_counts_attempts() {
        let factory = MockTransportFactory::failing(TransportError::Unavailable("down".into()));
        let config = ClientConfig::new("acme.example", "user", "pw");

        assert!(factory.connect(&config).await.is_err());
        assert_eq!(factory.connects(), 1);
    }
}
