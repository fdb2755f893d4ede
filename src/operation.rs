//! Remote operation catalog
//!
//! Each vendor operation is a `{name, token_shape}` record. The token shape is
//! fixed per operation: most operations expect `AuthenticationString`, a few
//! expect the lower-camel `authenticationString`.

use crate::request::TokenShape;
use serde::Serialize;

/// Remote operation that exchanges credentials for a token
pub const AUTHENTICATE_OPERATION: &str = "AuthenticationTokenGet";

/// Functional area of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationGroup {
    Inventory,
    Receiving,
    PickTicket,
    Product,
}

/// A named remote operation and the token shape it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Operation {
    pub name: &'static str,
    pub token_shape: TokenShape,
    pub group: OperationGroup,
}

impl Operation {
    pub const fn new(name: &'static str, token_shape: TokenShape, group: OperationGroup) -> Self {
        Self {
            name,
            token_shape,
            group,
        }
    }

    const fn canonical(name: &'static str, group: OperationGroup) -> Self {
        Self::new(name, TokenShape::Canonical, group)
    }

    const fn lower_camel(name: &'static str, group: OperationGroup) -> Self {
        Self::new(name, TokenShape::LowerCamel, group)
    }

    /// Find a catalog entry by remote name (exact match first, then case-insensitive)
    pub fn lookup(name: &str) -> Option<&'static Operation> {
        CATALOG
            .iter()
            .find(|op| op.name == name)
            .or_else(|| CATALOG.iter().find(|op| op.name.eq_ignore_ascii_case(name)))
    }
}

use OperationGroup::{Inventory, PickTicket, Product, Receiving};

// Inventory
pub const GET_INVENTORY: Operation = Operation::canonical("GetInventory", Inventory);
pub const GET_INVENTORY_FROM_DATE_TIME: Operation =
    Operation::canonical("GetInventoryFromDateTime", Inventory);
pub const GET_INVENTORY_FROM_DATE_TIME_BY_BATCH: Operation =
    Operation::lower_camel("GetInventoryFromDateTimeByBatch", Inventory);
pub const GET_INVENTORY_BY_UPCS: Operation = Operation::canonical("GetInventoryByUPCs", Inventory);
pub const GET_INVENTORY_BY_STYLE: Operation =
    Operation::canonical("GetInventoryByStyle", Inventory);

// Receiving tickets
pub const GET_RECEIVING_STATUSES_BY_DATE: Operation =
    Operation::canonical("GetReceivingStatusesByDate", Receiving);
pub const GET_RECEIVING_STATUSES_BY_DATE_CONFIGURABLE: Operation =
    Operation::canonical("GetReceivingStatusesByDateConfigurable", Receiving);
pub const GET_RECEIVING_TICKETS_BY_PO: Operation =
    Operation::canonical("GetReceivingTicketsByPO", Receiving);
pub const GET_RECEIVING_TICKET_OBJECT_BY_TICKET_NO: Operation =
    Operation::canonical("GetReceivingTicketObjectByTicketNo", Receiving);
pub const GET_RECEIVING_TICKETS_BY_STATUS_AND_CREATE_DATE: Operation =
    Operation::canonical("GetReceivingTicketsByStatusAndCreateDate", Receiving);
pub const RECEIVING_TICKET_ADD: Operation = Operation::canonical("ReceivingTicketAdd", Receiving);
pub const GET_RECEIVING_TICKET_ADD_STATUS: Operation =
    Operation::lower_camel("GetReceivingTicketAddStatus", Receiving);

// Pick tickets
pub const PICK_TICKET_ADD: Operation = Operation::canonical("PickTicketAdd", PickTicket);
pub const GET_PICK_TICKET_ADD_STATUS: Operation =
    Operation::lower_camel("GetPickTicketAddStatus", PickTicket);
pub const CANCEL_PICK_TICKET: Operation = Operation::canonical("CancelPickTicket", PickTicket);
pub const GET_PICK_TICKET_OBJECT_BY_BAR_CODE: Operation =
    Operation::canonical("GetPickTicketObjectByBarCode", PickTicket);
pub const GET_PICK_TICKETS_BY_ORDER_NUMBER: Operation =
    Operation::lower_camel("GetPickTicketsByOrderNumber", PickTicket);
/// The vendor publishes this operation with the "Tickes" spelling.
pub const GET_PICK_TICKETS_BY_STATUS_AND_CREATE_DATE: Operation =
    Operation::canonical("GetPickTickesByStatusAndCreateDate", PickTicket);
pub const GET_PICK_TICKET_OBJECT_ITEMS_IN_BOXES: Operation =
    Operation::canonical("GetPickTicketObjectItemsInBoxes", PickTicket);
pub const GET_PICK_TICKET_STATUSES_BY_DATE: Operation =
    Operation::canonical("GetPickTicketStatusesByDate", PickTicket);

// Product master
pub const STYLE_MASTER_PRODUCT_ADD: Operation =
    Operation::canonical("StyleMasterProductAdd", Product);
pub const GET_STYLE_MASTER_PRODUCT_ADD_STATUS: Operation =
    Operation::canonical("GetStyleMasterProductAddStatus", Product);

/// Every operation exposed by the client
pub static CATALOG: &[Operation] = &[
    GET_INVENTORY,
    GET_INVENTORY_FROM_DATE_TIME,
    GET_INVENTORY_FROM_DATE_TIME_BY_BATCH,
    GET_INVENTORY_BY_UPCS,
    GET_INVENTORY_BY_STYLE,
    GET_RECEIVING_STATUSES_BY_DATE,
    GET_RECEIVING_STATUSES_BY_DATE_CONFIGURABLE,
    GET_RECEIVING_TICKETS_BY_PO,
    GET_RECEIVING_TICKET_OBJECT_BY_TICKET_NO,
    GET_RECEIVING_TICKETS_BY_STATUS_AND_CREATE_DATE,
    RECEIVING_TICKET_ADD,
    GET_RECEIVING_TICKET_ADD_STATUS,
    PICK_TICKET_ADD,
    GET_PICK_TICKET_ADD_STATUS,
    CANCEL_PICK_TICKET,
    GET_PICK_TICKET_OBJECT_BY_BAR_CODE,
    GET_PICK_TICKETS_BY_ORDER_NUMBER,
    GET_PICK_TICKETS_BY_STATUS_AND_CREATE_DATE,
    GET_PICK_TICKET_OBJECT_ITEMS_IN_BOXES,
    GET_PICK_TICKET_STATUSES_BY_DATE,
    STYLE_MASTER_PRODUCT_ADD,
    GET_STYLE_MASTER_PRODUCT_ADD_STATUS,
];
