//! Client configuration
//!
//! Credentials, environment selection and transport settings. Loaded from
//! TOML or built directly; the CLI binds the same fields to flags and env vars.

use crate::error::{Error, Result};
use crate::request::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Backend environment the client binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Sandbox,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Sandbox => "sandbox",
        }
    }

    /// Static service description for this environment
    pub fn service_description(&self) -> &'static ServiceDescription {
        match self {
            Self::Production => &PRODUCTION,
            Self::Sandbox => &SANDBOX,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(Error::Config(format!("unknown environment: {}", other))),
        }
    }
}

/// Binding information for one backend environment.
///
/// The vendor ships one service description per environment. The SOAP
/// namespace is shared; the endpoint URL is deployment specific and comes
/// from [`ClientConfig::service_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescription {
    pub environment: Environment,
    /// Service description resource for this environment
    pub resource: &'static str,
    /// Target namespace of the SOAP operations
    pub namespace: &'static str,
}

const DEFAULT_NAMESPACE: &str = "http://tempuri.org/";

static PRODUCTION: ServiceDescription = ServiceDescription {
    environment: Environment::Production,
    resource: "wsdl/production/production.wsdl",
    namespace: DEFAULT_NAMESPACE,
};

static SANDBOX: ServiceDescription = ServiceDescription {
    environment: Environment::Sandbox,
    resource: "wsdl/sandbox/sandbox.wsdl",
    namespace: DEFAULT_NAMESPACE,
};

/// Configuration for a [`BergenClient`](crate::BergenClient)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account web address sent with the authentication request
    #[serde(alias = "WebAddress")]
    pub web_address: String,

    /// Account user name
    #[serde(alias = "UserName")]
    pub user_name: String,

    /// Account password
    #[serde(alias = "Password")]
    pub password: String,

    /// Backend environment
    #[serde(default)]
    pub environment: Environment,

    /// SOAP endpoint URL for the selected environment
    #[serde(default)]
    pub service_url: Option<String>,

    /// Override for the SOAP target namespace
    #[serde(default)]
    pub service_namespace: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl ClientConfig {
    /// Create a sandbox configuration with the given credentials
    pub fn new(
        web_address: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            web_address: web_address.into(),
            user_name: user_name.into(),
            password: password.into(),
            environment: Environment::default(),
            service_url: None,
            service_namespace: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.web_address.trim().is_empty() {
            return Err(Error::Config("web_address is required".to_string()));
        }
        if self.user_name.trim().is_empty() {
            return Err(Error::Config("user_name is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::Config("password is required".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn service_description(&self) -> &'static ServiceDescription {
        self.environment.service_description()
    }

    /// Effective SOAP namespace
    pub fn namespace(&self) -> &str {
        self.service_namespace
            .as_deref()
            .unwrap_or(self.service_description().namespace)
    }

    /// Body of the `AuthenticationTokenGet` request
    pub fn auth_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("WebAddress".into(), Value::String(self.web_address.clone()));
        payload.insert("UserName".into(), Value::String(self.user_name.clone()));
        payload.insert("Password".into(), Value::String(self.password.clone()));
        payload
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("web_address", &self.web_address)
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("service_url", &self.service_url)
            .field("service_namespace", &self.service_namespace)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}
