//! Bergen V3 Client - Warehouse Management API
//!
//! Async client for the Bergen V3 SOAP service (inventory, receiving tickets,
//! pick tickets, product master).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             BergenClient                │
//! │   (named operations → generic invoke)   │
//! └────────────────┬────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │            RequestBuilder               │
//! │  (token projection + parameter merge)   │
//! └────────────────┬────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │               Session                   │
//! │ (transport + token, created at most     │
//! │  once, shared by concurrent callers)    │
//! └────────────────┬────────────────────────┘
//!                  │
//!                  ▼
//! ┌───────────────┐     ┌───────────────┐
//! │ SoapTransport │     │ MockTransport │
//! └───────────────┘     └───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use bergen_v3_client::{BergenClient, ClientConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BergenClient::new(
//!     ClientConfig::new("acme.example", "warehouse", "secret")
//!         .with_service_url("https://sandbox.example.com/service.asmx"),
//! );
//!
//! // First call connects and authenticates; later calls reuse the token
//! let _inventory = client.get_inventory().await?;
//! let _status = client
//!     .get_pick_ticket_add_status(json!({ "pickTicketNumber": "PT-1001" }).as_object().cloned())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod request;
pub mod session;
pub mod transport;

pub use client::BergenClient;
pub use config::{ClientConfig, Environment, ServiceDescription};
pub use error::{Error, Result, SessionError, TransportError};
pub use operation::{Operation, OperationGroup, AUTHENTICATE_OPERATION, CATALOG};
pub use request::{to_params, Params, Payload, RequestBuilder, TokenShape};
pub use session::{AuthToken, Session};
pub use transport::{
    MockTransport, MockTransportFactory, SoapTransport, SoapTransportFactory, Transport,
    TransportFactory,
};
