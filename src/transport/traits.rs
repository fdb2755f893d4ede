//! Core traits for remote transports.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::request::Payload;

/// A handle capable of invoking named remote operations.
///
/// Outcomes are reported exactly once per call: either a result value or an
/// error, never both. Results are returned as decoded, without validation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Invoke `operation` with `payload` as its request body.
    async fn call(&self, operation: &str, payload: &Payload) -> Result<Value, TransportError>;
}

/// Creates transport handles for a configuration.
///
/// A session calls `connect` at most once.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn Transport>, TransportError>;
}
