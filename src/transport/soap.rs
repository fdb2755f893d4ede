//! SOAP 1.1 transport over HTTP.
//!
//! Request bodies are JSON payloads rendered as document/literal elements:
//! objects become nested elements, arrays repeat the element, `null` becomes
//! an `xsi:nil` element. Responses are decoded back into JSON with the same
//! rules, and the contents of `<{Operation}Response>` are returned verbatim.
//! Without a schema a one-item list decodes as a single element, not an array.

use async_trait::async_trait;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use reqwest::{header, Client};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::traits::{Transport, TransportFactory};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::request::Payload;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// SOAP transport bound to one service endpoint.
pub struct SoapTransport {
    client: Client,
    endpoint: String,
    namespace: String,
}

impl SoapTransport {
    /// Create a transport for `endpoint` using `namespace` for operations.
    pub fn new(
        endpoint: impl Into<String>,
        namespace: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            namespace: namespace.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn soap_action(&self, operation: &str) -> String {
        if self.namespace.ends_with('/') {
            format!("\"{}{}\"", self.namespace, operation)
        } else {
            format!("\"{}/{}\"", self.namespace, operation)
        }
    }
}

#[async_trait]
impl Transport for SoapTransport {
    async fn call(&self, operation: &str, payload: &Payload) -> Result<Value, TransportError> {
        let envelope = encode_envelope(operation, &self.namespace, payload)?;

        debug!(operation, endpoint = %self.endpoint, "Sending SOAP request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", self.soap_action(operation))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Servers report faults with a 500 and a fault envelope
            if let Err(fault @ TransportError::Fault { .. }) = decode_response(operation, &body) {
                return Err(fault);
            }
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        decode_response(operation, &body)
    }
}

/// Creates [`SoapTransport`]s from client configuration.
#[derive(Debug, Clone, Default)]
pub struct SoapTransportFactory;

impl SoapTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for SoapTransportFactory {
    async fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn Transport>, TransportError> {
        let description = config.service_description();

        let endpoint = config.service_url.as_deref().ok_or_else(|| {
            TransportError::Unavailable(format!(
                "no service URL configured for {} ({})",
                description.environment, description.resource
            ))
        })?;

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(TransportError::Unavailable(format!(
                "unsupported service URL: {}",
                endpoint
            )));
        }

        let transport = SoapTransport::new(
            endpoint,
            config.namespace(),
            Duration::from_millis(config.request_timeout_ms),
        )?;

        Ok(Arc::new(transport))
    }
}

// ==================== Encoding ====================

/// Render `payload` as a SOAP 1.1 request envelope for `operation`.
///
/// Every key becomes an element name and must be a valid XML NCName;
/// otherwise the payload is rejected with [`TransportError::InvalidPayload`].
pub fn encode_envelope(
    operation: &str,
    namespace: &str,
    payload: &Payload,
) -> Result<String, TransportError> {
    check_element_name(operation)?;
    for (name, value) in payload {
        check_names(name, value)?;
    }

    write_envelope(operation, namespace, payload)
        .map_err(|e| TransportError::InvalidPayload(format!("failed to encode envelope: {}", e)))
}

fn check_names(name: &str, value: &Value) -> Result<(), TransportError> {
    check_element_name(name)?;
    match value {
        Value::Object(fields) => fields
            .iter()
            .try_for_each(|(child, child_value)| check_names(child, child_value)),
        // Array items are written under the parent's name
        Value::Array(items) => items.iter().try_for_each(|item| check_names(name, item)),
        _ => Ok(()),
    }
}

fn check_element_name(name: &str) -> Result<(), TransportError> {
    if is_ncname(name) {
        Ok(())
    } else {
        Err(TransportError::InvalidPayload(format!(
            "{:?} is not a valid element name",
            name
        )))
    }
}

/// XML NCName: a name start character followed by name characters, no colon.
fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

fn write_envelope(
    operation: &str,
    namespace: &str,
    payload: &Payload,
) -> quick_xml::Result<String> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("soap:Envelope").with_attributes([
        ("xmlns:soap", SOAP_ENV_NS),
        ("xmlns:xsi", XSI_NS),
        ("xmlns:xsd", XSD_NS),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("soap:Body")))?;
    writer.write_event(Event::Start(
        BytesStart::new(operation).with_attributes([("xmlns", namespace)]),
    ))?;

    for (name, value) in payload {
        write_value(&mut writer, name, value)?;
    }

    writer.write_event(Event::End(BytesEnd::new(operation)))?;
    writer.write_event(Event::End(BytesEnd::new("soap:Body")))?;
    writer.write_event(Event::End(BytesEnd::new("soap:Envelope")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> quick_xml::Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_value(writer, name, item)?;
            }
        }
        Value::Null => {
            writer.write_event(Event::Empty(
                BytesStart::new(name).with_attributes([("xsi:nil", "true")]),
            ))?;
        }
        Value::Object(fields) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            for (child, child_value) in fields {
                write_value(writer, child, child_value)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Value::String(s) => write_text_element(writer, name, s)?,
        Value::Bool(b) => write_text_element(writer, name, &b.to_string())?,
        Value::Number(n) => write_text_element(writer, name, &n.to_string())?,
    }
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

// ==================== Decoding ====================

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
    nil: bool,
}

impl Frame {
    fn new(name: String, nil: bool) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
            nil,
        }
    }

    /// Leaf text is kept as sent; text between child elements is layout.
    fn into_value(self) -> Value {
        if !self.children.is_empty() {
            Value::Object(self.children)
        } else if self.nil {
            Value::Null
        } else {
            Value::String(self.text)
        }
    }
}

/// Repeated sibling elements collapse into an array.
fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

fn is_nil(element: &BytesStart<'_>) -> bool {
    element.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true"
    })
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

/// Decode an XML document into JSON, keyed by local element names.
pub fn xml_to_value(xml: &str) -> Result<Value, TransportError> {
    let mut reader = Reader::from_str(xml);

    let mut stack = vec![Frame::new(String::new(), false)];

    loop {
        let event = reader
            .read_event()
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        match event {
            Event::Start(e) => {
                stack.push(Frame::new(local_name(&e), is_nil(&e)));
            }
            Event::Empty(e) => {
                let value = if is_nil(&e) {
                    Value::Null
                } else {
                    Value::String(String::new())
                };
                if let Some(parent) = stack.last_mut() {
                    insert_child(&mut parent.children, local_name(&e), value);
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| TransportError::Parse(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(TransportError::Parse("unbalanced end tag".to_string()));
                }
                if let Some(frame) = stack.pop() {
                    let name = frame.name.clone();
                    if let Some(parent) = stack.last_mut() {
                        insert_child(&mut parent.children, name, frame.into_value());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(TransportError::Parse("unexpected end of document".to_string()));
    }

    Ok(stack
        .pop()
        .map(|root| Value::Object(root.children))
        .unwrap_or(Value::Null))
}

/// Extract the result of `operation` from a response envelope.
///
/// Returns the contents of `<{operation}Response>`, or the fault carried in
/// the body.
pub fn decode_response(operation: &str, xml: &str) -> Result<Value, TransportError> {
    let document = xml_to_value(xml)?;

    let body = document
        .get("Envelope")
        .and_then(|envelope| envelope.get("Body"))
        .ok_or_else(|| TransportError::Parse("missing SOAP Body".to_string()))?;

    if let Some(fault) = body.get("Fault") {
        let field = |name: &str| {
            fault
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        return Err(TransportError::Fault {
            code: field("faultcode"),
            message: field("faultstring"),
        });
    }

    let response_name = format!("{}Response", operation);
    match body.get(&response_name) {
        Some(Value::String(s)) if s.is_empty() => Ok(Value::Object(Map::new())),
        Some(result) => Ok(result.clone()),
        None => Err(TransportError::Parse(format!(
            "missing {} element",
            response_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_encode_envelope_shapes() {
        let body = payload(json!({
            "AuthenticationString": "T&1",
            "UPCs": {"string": ["111", "222"]},
            "BatchNumber": 3,
            "Memo": null,
        }));

        let xml = encode_envelope("GetInventoryByUPCs", "http://tempuri.org/", &body).unwrap();

        assert!(xml.contains("<GetInventoryByUPCs xmlns=\"http://tempuri.org/\">"));
        assert!(xml.contains("<AuthenticationString>T&amp;1</AuthenticationString>"));
        assert!(xml.contains("<UPCs><string>111</string><string>222</string></UPCs>"));
        assert!(xml.contains("<BatchNumber>3</BatchNumber>"));
        assert!(xml.contains("<Memo xsi:nil=\"true\"/>"));
    }

    #[test]
    fn test_decode_response_unwraps_result() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetInventoryByStyleResponse xmlns="http://tempuri.org/">
      <GetInventoryByStyleResult>
        <Item><UPC>111</UPC><Quantity>4</Quantity></Item>
        <Item><UPC>222</UPC><Quantity>0</Quantity></Item>
      </GetInventoryByStyleResult>
    </GetInventoryByStyleResponse>
  </soap:Body>
</soap:Envelope>"#;

        let result = decode_response("GetInventoryByStyle", xml).unwrap();

        assert_eq!(
            result,
            json!({
                "GetInventoryByStyleResult": {
                    "Item": [
                        {"UPC": "111", "Quantity": "4"},
                        {"UPC": "222", "Quantity": "0"}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_decode_fault() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>Invalid authentication string</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

        let err = decode_response("GetInventory", xml).unwrap_err();
        assert_eq!(
            err,
            TransportError::Fault {
                code: "soap:Client".into(),
                message: "Invalid authentication string".into(),
            }
        );
    }

    #[test]
    fn test_decode_nil_and_empty() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Body>
    <CancelPickTicketResponse xmlns="http://tempuri.org/">
      <CancelPickTicketResult xsi:nil="true"/>
      <Message></Message>
    </CancelPickTicketResponse>
  </soap:Body>
</soap:Envelope>"#;

        let result = decode_response("CancelPickTicket", xml).unwrap();
        assert_eq!(result, json!({"CancelPickTicketResult": null, "Message": ""}));
    }

    #[test]
    fn test_decode_missing_response_element() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><Other/></soap:Body></soap:Envelope>"#;
        assert!(matches!(
            decode_response("GetInventory", xml),
            Err(TransportError::Parse(_))
        ));
    }

    #[test]
    fn test_decode_keeps_leaf_whitespace() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetInventoryResponse xmlns="http://tempuri.org/">
      <GetInventoryResult>
        <Memo>  two spaces  </Memo>
        <Blank>   </Blank>
        <Note>line one
line two</Note>
      </GetInventoryResult>
    </GetInventoryResponse>
  </soap:Body>
</soap:Envelope>"#;

        let result = decode_response("GetInventory", xml).unwrap();

        assert_eq!(
            result,
            json!({
                "GetInventoryResult": {
                    "Memo": "  two spaces  ",
                    "Blank": "   ",
                    "Note": "line one\nline two"
                }
            })
        );
    }

    #[test]
    fn test_decode_single_item_list_is_not_an_array() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetInventoryByStyleResponse xmlns="http://tempuri.org/">
      <GetInventoryByStyleResult>
        <Item><UPC>111</UPC></Item>
      </GetInventoryByStyleResult>
    </GetInventoryByStyleResponse>
  </soap:Body>
</soap:Envelope>"#;

        let result = decode_response("GetInventoryByStyle", xml).unwrap();
        assert_eq!(result["GetInventoryByStyleResult"]["Item"], json!({"UPC": "111"}));
    }

    #[test]
    fn test_encode_rejects_invalid_element_names() {
        for bad in [
            json!({"bad key<": "x"}),
            json!({"": "x"}),
            json!({"1Style": "x"}),
            json!({"ns:Style": "x"}),
            json!({"PickTicket": {"Ship To": "x"}}),
            json!({"LineItem": [{"UPC": "1"}, {"Qty>": 2}]}),
        ] {
            let result =
                encode_envelope("GetInventory", "http://tempuri.org/", &payload(bad.clone()));
            assert!(
                matches!(result, Err(TransportError::InvalidPayload(_))),
                "accepted {}",
                bad
            );
        }

        assert!(matches!(
            encode_envelope("Get Inventory", "http://tempuri.org/", &Payload::new()),
            Err(TransportError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_encode_accepts_ncnames() {
        let body = payload(json!({
            "_private": "1",
            "ship-to.city": "Secaucus",
            "Größe": "M",
            "Item2": {"UPC_Code": "012345678905"}
        }));

        let xml = encode_envelope("PickTicketAdd", "http://tempuri.org/", &body).unwrap();
        assert!(xml.contains("<ship-to.city>Secaucus</ship-to.city>"));
        assert!(xml.contains("<Größe>M</Größe>"));
    }

    #[tokio::test]
    async fn test_factory_requires_service_url() {
        for environment in [Environment::Sandbox, Environment::Production] {
            let config =
                ClientConfig::new("acme.example", "user", "pw").with_environment(environment);
            let result = SoapTransportFactory::new().connect(&config).await;
            assert!(
                matches!(
                    result,
                    Err(TransportError::Unavailable(ref msg)) if msg.contains("no service URL")
                ),
                "{} connected without a service URL",
                environment
            );
        }
    }

    #[tokio::test]
    async fn test_factory_uses_service_url() {
        let config = ClientConfig::new("acme.example", "user", "pw")
            .with_environment(Environment::Production)
            .with_service_url("https://wms.example.com/service.asmx");
        assert!(SoapTransportFactory::new().connect(&config).await.is_ok());

        let config = ClientConfig::new("acme.example", "user", "pw")
            .with_service_url("ftp://wms.example.com/service.asmx");
        assert!(matches!(
            SoapTransportFactory::new().connect(&config).await,
            Err(TransportError::Unavailable(_))
        ));
    }
}
