//! Transport abstraction layer.
//!
//! The client core only needs something that can invoke a named remote
//! operation with a payload. Implementations:
//! - SOAP 1.1 over HTTP (the vendor's wire protocol)
//! - Mock transport for testing

pub mod mock;
pub mod soap;
pub mod traits;

pub use mock::{MockTransport, MockTransportFactory, RecordedCall};
pub use soap::{SoapTransport, SoapTransportFactory};
pub use traits::{Transport, TransportFactory};
