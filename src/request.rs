//! Request payload construction
//!
//! A payload is the cached token projected into the operation's token shape,
//! with caller parameters deep-merged on top. Caller values win on collision.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::session::{AuthToken, Session};
use crate::transport::Transport;

/// Field mapping sent to a remote operation
pub type Payload = Map<String, Value>;

/// Caller-supplied call parameters
pub type Params = Map<String, Value>;

/// Field name under which the token is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenShape {
    /// `{ "AuthenticationString": token }`
    #[default]
    Canonical,
    /// `{ "authenticationString": token }`
    LowerCamel,
}

impl TokenShape {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Canonical => "AuthenticationString",
            Self::LowerCamel => "authenticationString",
        }
    }

    /// Project `token` into this shape
    pub fn project(&self, token: &AuthToken) -> Payload {
        let mut payload = Payload::new();
        payload.insert(
            self.field_name().to_string(),
            Value::String(token.as_str().to_string()),
        );
        payload
    }
}

/// Deep-merge `params` into `base`.
///
/// Objects merge key by key, arrays merge index by index, anything else is
/// replaced by the incoming value.
pub fn merge(base: &mut Payload, params: Params) {
    for (key, value) in params {
        match base.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

fn merge_value(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => merge(target, source),
        (Value::Array(target), Value::Array(source)) => {
            for (i, item) in source.into_iter().enumerate() {
                match target.get_mut(i) {
                    Some(existing) => merge_value(existing, item),
                    None => target.push(item),
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Convert a serializable request type into call parameters
pub fn to_params<T: Serialize>(value: &T) -> Result<Params> {
    match serde_json::to_value(value)? {
        Value::Object(params) => Ok(params),
        other => Err(Error::InvalidParams(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A payload ready to send, with the transport it was authenticated on
pub struct PreparedRequest {
    pub transport: Arc<dyn Transport>,
    pub body: Payload,
}

/// Builds payloads from the session's cached token
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    session: Arc<Session>,
}

impl RequestBuilder {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Build the payload for a call using `shape` for the token field.
    ///
    /// `None` and an empty map produce the same payload.
    pub async fn build(
        &self,
        shape: TokenShape,
        params: Option<Params>,
    ) -> Result<PreparedRequest> {
        let token = self.session.acquire_token().await?;
        let transport = self.session.acquire_transport().await?;

        let mut body = shape.project(&token);
        if let Some(params) = params {
            merge(&mut body, params);
        }

        Ok(PreparedRequest { transport, body })
    }
}
