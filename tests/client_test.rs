//! Client behaviour against the mock transport.

use bergen_v3_client::{
    BergenClient, ClientConfig, Error, MockTransport, MockTransportFactory, Params, SessionError,
    TransportError, CATALOG,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn config() -> ClientConfig {
    ClientConfig::new("acme.example", "warehouse", "secret")
}

fn client_with(factory: MockTransportFactory) -> (BergenClient, Arc<MockTransportFactory>) {
    let factory = Arc::new(factory);
    let client = BergenClient::with_factory(config(), factory.clone());
    (client, factory)
}

fn params(value: Value) -> Option<Params> {
    value.as_object().cloned()
}

#[tokio::test]
async fn test_concurrent_calls_share_one_session() {
    let transport = MockTransport::new("TOKEN").with_latency(Duration::from_millis(10));
    let (client, factory) = client_with(
        MockTransportFactory::new(Arc::new(transport)).with_latency(Duration::from_millis(25)),
    );

    let mut handles = Vec::new();
    for i in 0..12 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                client.get_inventory().await
            } else {
                client
                    .get_inventory_by_style(params(json!({"Style": format!("S-{}", i)})))
                    .await
            }
        }));
    }

    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    assert_eq!(factory.connects(), 1);
    assert_eq!(factory.transport().auth_calls(), 1);
    assert_eq!(factory.transport().operation_calls(), 12);
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_failed_operation_does_not_poison_session() {
    let transport = MockTransport::new("TOKEN")
        .with_failure(
            "GetInventory",
            TransportError::Fault {
                code: "soap:Server".into(),
                message: "Inventory unavailable".into(),
            },
        )
        .with_response(
            "GetInventoryByStyle",
            json!({"GetInventoryByStyleResult": {"Style": "TEE-01"}}),
        );
    let (client, factory) = client_with(MockTransportFactory::new(Arc::new(transport)));

    let err = assert_err!(client.get_inventory().await);
    assert_eq!(err.operation(), Some("GetInventory"));
    assert!(!err.is_session_failure());

    let result = assert_ok!(
        client
            .get_inventory_by_style(params(json!({"Style": "TEE-01"})))
            .await
    );
    assert_eq!(result["GetInventoryByStyleResult"]["Style"], "TEE-01");

    assert_eq!(factory.connects(), 1);
    assert_eq!(factory.transport().auth_calls(), 1);
}

#[tokio::test]
async fn test_authentication_failure_is_sticky() {
    let transport = MockTransport::new("TOKEN").with_auth_error(TransportError::Fault {
        code: "soap:Client".into(),
        message: "Invalid credentials".into(),
    });
    let (client, factory) = client_with(MockTransportFactory::new(Arc::new(transport)));

    for _ in 0..3 {
        let err = assert_err!(client.get_pick_ticket_statuses_by_date(None).await);
        assert!(err.is_session_failure());
        assert!(matches!(
            err,
            Error::SessionUnavailable(SessionError::AuthenticationFailed(_))
        ));
    }

    let err = assert_err!(client.get_inventory().await);
    assert!(err.is_session_failure());

    assert_eq!(factory.transport().auth_calls(), 1);
    assert_eq!(factory.transport().operation_calls(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_sticky() {
    let (client, factory) = client_with(MockTransportFactory::failing(
        TransportError::Unavailable("service description not found".into()),
    ));

    for _ in 0..2 {
        let err = assert_err!(client.cancel_pick_ticket(None).await);
        assert!(matches!(
            err,
            Error::SessionUnavailable(SessionError::TransportUnavailable(_))
        ));
    }

    assert_eq!(factory.connects(), 1);
    assert_eq!(factory.transport().auth_calls(), 0);
}

#[tokio::test]
async fn test_every_catalog_operation_sends_its_token_shape() {
    let (client, factory) = client_with(MockTransportFactory::new(Arc::new(MockTransport::new(
        "TOKEN",
    ))));

    for op in CATALOG {
        assert_ok!(client.invoke(op, params(json!({"Reference": op.name}))).await);

        let call = factory.transport().last_call(op.name).await.unwrap();
        let field = op.token_shape.field_name();
        assert_eq!(call.payload.get(field), Some(&json!("TOKEN")), "{}", op.name);
        assert_eq!(call.payload.get("Reference"), Some(&json!(op.name)));
        assert_eq!(call.payload.len(), 2);
    }

    assert_eq!(factory.transport().auth_calls(), 1);
    assert_eq!(factory.transport().operation_calls() as usize, CATALOG.len());
}

#[tokio::test]
async fn test_pick_ticket_add_payload() {
    let (client, factory) = client_with(MockTransportFactory::new(Arc::new(MockTransport::new(
        "TOKEN",
    ))));

    let ticket = params(json!({
        "PickTicket": {
            "PickTicketNumber": "PT-1001",
            "ShipToAddress": {"Name": "Acme", "City": "Secaucus"},
            "LineItem": [
                {"UPC": "012345678905", "Quantity": 2},
                {"UPC": "012345678912", "Quantity": 1}
            ]
        }
    }));

    assert_ok!(client.pick_ticket_add(ticket).await);

    let call = factory.transport().last_call("PickTicketAdd").await.unwrap();
    assert_eq!(
        Value::Object(call.payload),
        json!({
            "AuthenticationString": "TOKEN",
            "PickTicket": {
                "PickTicketNumber": "PT-1001",
                "ShipToAddress": {"Name": "Acme", "City": "Secaucus"},
                "LineItem": [
                    {"UPC": "012345678905", "Quantity": 2},
                    {"UPC": "012345678912", "Quantity": 1}
                ]
            }
        })
    );
}

#[tokio::test]
async fn test_credentials_sent_once() {
    let (client, factory) = client_with(MockTransportFactory::new(Arc::new(MockTransport::new(
        "TOKEN",
    ))));

    assert_ok!(client.get_receiving_tickets_by_po(params(json!({"PONumber": "PO-9"}))).await);
    assert_ok!(client.get_receiving_tickets_by_po(params(json!({"PONumber": "PO-10"}))).await);

    let auth: Vec<_> = factory
        .transport()
        .calls()
        .await
        .into_iter()
        .filter(|c| c.operation == "AuthenticationTokenGet")
        .collect();

    assert_eq!(auth.len(), 1);
    assert_eq!(
        Value::Object(auth[0].payload.clone()),
        json!({"WebAddress": "acme.example", "UserName": "warehouse", "Password": "secret"})
    );
}

#[tokio::test]
async fn test_separate_clients_have_separate_sessions() {
    let shared = Arc::new(MockTransport::new("TOKEN"));
    let first =
        BergenClient::with_factory(config(), Arc::new(MockTransportFactory::new(shared.clone())));
    let second =
        BergenClient::with_factory(config(), Arc::new(MockTransportFactory::new(shared.clone())));

    assert_ok!(first.get_inventory().await);
    assert_ok!(second.get_inventory().await);

    assert_eq!(shared.auth_calls(), 2);
}
