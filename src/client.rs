//! Bergen V3 client façade
//!
//! Every vendor operation goes through [`BergenClient::invoke`]: build the
//! payload from the session's cached token, call the operation on the cached
//! transport, and surface a transport error as
//! [`Error::RemoteOperationFailed`]. The named methods are thin wrappers over
//! the [operation catalog](crate::operation).

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::operation::{self, Operation};
use crate::request::{Params, RequestBuilder};
use crate::session::Session;
use crate::transport::{SoapTransportFactory, TransportFactory};

/// Async client for the Bergen V3 warehouse management API.
///
/// Each client owns its own session: one transport handle and one token,
/// created on first use and shared by all calls made through this client.
///
/// # Example
///
/// ```rust,no_run
/// use bergen_v3_client::{BergenClient, ClientConfig, Environment};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BergenClient::new(
///     ClientConfig::new("acme.example", "warehouse", "secret")
///         .with_environment(Environment::Production)
///         .with_service_url("https://wms.example.com/service.asmx"),
/// );
///
/// let params = json!({ "Style": "TEE-01" }).as_object().cloned();
/// let inventory = client.get_inventory_by_style(params).await?;
/// println!("{}", inventory);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BergenClient {
    session: Arc<Session>,
    requests: RequestBuilder,
}

impl BergenClient {
    /// Create a client that talks SOAP to the configured endpoint
    pub fn new(config: ClientConfig) -> Self {
        Self::with_factory(config, Arc::new(SoapTransportFactory::new()))
    }

    /// Create a client with a custom transport factory
    pub fn with_factory(config: ClientConfig, factory: Arc<dyn TransportFactory>) -> Self {
        let session = Arc::new(Session::new(config, factory));
        Self {
            requests: RequestBuilder::new(Arc::clone(&session)),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        self.session.config()
    }

    /// Invoke a catalog operation
    pub async fn invoke(&self, operation: &Operation, params: Option<Params>) -> Result<Value> {
        let request = self.requests.build(operation.token_shape, params).await?;

        debug!(operation = operation.name, "Invoking remote operation");

        match request.transport.call(operation.name, &request.body).await {
            Ok(result) => Ok(result),
            Err(source) => {
                warn!(operation = operation.name, error = %source, "Remote operation failed");
                Err(Error::RemoteOperationFailed {
                    operation: operation.name.to_string(),
                    source,
                })
            }
        }
    }

    /// Invoke an operation by its remote name
    pub async fn invoke_named(&self, name: &str, params: Option<Params>) -> Result<Value> {
        let operation =
            Operation::lookup(name).ok_or_else(|| Error::UnknownOperation(name.to_string()))?;
        self.invoke(operation, params).await
    }

    // ==================== Inventory ====================

    /// Full inventory snapshot
    pub async fn get_inventory(&self) -> Result<Value> {
        self.invoke(&operation::GET_INVENTORY, None).await
    }

    /// Inventory changed since `FromDateTime` (mm/dd/yyyy hh24:mi:ss)
    pub async fn get_inventory_from_date_time(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_INVENTORY_FROM_DATE_TIME, params).await
    }

    /// Inventory changed since `fromDateTime`, paged by `batchNumber`
    pub async fn get_inventory_from_date_time_by_batch(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(&operation::GET_INVENTORY_FROM_DATE_TIME_BY_BATCH, params)
            .await
    }

    pub async fn get_inventory_by_upcs(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_INVENTORY_BY_UPCS, params).await
    }

    pub async fn get_inventory_by_style(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_INVENTORY_BY_STYLE, params).await
    }

    // ==================== Receiving ====================

    /// Receiving statuses between `StartDate` and `EndDate`
    pub async fn get_receiving_statuses_by_date(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_RECEIVING_STATUSES_BY_DATE, params)
            .await
    }

    /// Receiving statuses by date, with a `dateType` selector
    pub async fn get_receiving_statuses_by_date_configurable(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(&operation::GET_RECEIVING_STATUSES_BY_DATE_CONFIGURABLE, params)
            .await
    }

    pub async fn get_receiving_tickets_by_po(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_RECEIVING_TICKETS_BY_PO, params).await
    }

    pub async fn get_receiving_ticket_object_by_ticket_no(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(&operation::GET_RECEIVING_TICKET_OBJECT_BY_TICKET_NO, params)
            .await
    }

    pub async fn get_receiving_tickets_by_status_and_create_date(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(
            &operation::GET_RECEIVING_TICKETS_BY_STATUS_AND_CREATE_DATE,
            params,
        )
        .await
    }

    /// Create a receiving ticket (`receivingTicket` with supplier details and shipment lines)
    pub async fn receiving_ticket_add(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::RECEIVING_TICKET_ADD, params).await
    }

    /// Poll the status of a receiving ticket creation
    pub async fn get_receiving_ticket_add_status(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_RECEIVING_TICKET_ADD_STATUS, params)
            .await
    }

    // ==================== Pick tickets ====================

    /// Create a pick ticket (`PickTicket` with addresses and `LineItem`s)
    pub async fn pick_ticket_add(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::PICK_TICKET_ADD, params).await
    }

    /// Poll the status of a pick ticket creation
    pub async fn get_pick_ticket_add_status(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_PICK_TICKET_ADD_STATUS, params).await
    }

    pub async fn cancel_pick_ticket(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::CANCEL_PICK_TICKET, params).await
    }

    pub async fn get_pick_ticket_object_by_bar_code(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(&operation::GET_PICK_TICKET_OBJECT_BY_BAR_CODE, params)
            .await
    }

    pub async fn get_pick_tickets_by_order_number(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_PICK_TICKETS_BY_ORDER_NUMBER, params)
            .await
    }

    pub async fn get_pick_tickets_by_status_and_create_date(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(&operation::GET_PICK_TICKETS_BY_STATUS_AND_CREATE_DATE, params)
            .await
    }

    pub async fn get_pick_ticket_object_items_in_boxes(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(&operation::GET_PICK_TICKET_OBJECT_ITEMS_IN_BOXES, params)
            .await
    }

    pub async fn get_pick_ticket_statuses_by_date(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::GET_PICK_TICKET_STATUSES_BY_DATE, params)
            .await
    }

    // ==================== Product master ====================

    /// Create style master products (`products[].StyleMasterProduct`)
    pub async fn style_master_product_add(&self, params: Option<Params>) -> Result<Value> {
        self.invoke(&operation::STYLE_MASTER_PRODUCT_ADD, params).await
    }

    pub async fn get_style_master_product_add_status(
        &self,
        params: Option<Params>,
    ) -> Result<Value> {
        self.invoke(&operation::GET_STYLE_MASTER_PRODUCT_ADD_STATUS, params)
            .await
    }
}
