//! bergen - command-line client for the Bergen V3 warehouse API

use anyhow::{bail, Context};
use bergen_v3_client::{BergenClient, ClientConfig, Environment, Params, CATALOG};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Call Bergen V3 warehouse operations from the command line
#[derive(Parser, Debug)]
#[command(name = "bergen")]
#[command(about = "Command-line client for the Bergen V3 warehouse management API")]
struct Args {
    /// TOML configuration file (flags and env vars override its values)
    #[arg(long, env = "BERGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Account web address
    #[arg(long, env = "BERGEN_WEB_ADDRESS")]
    web_address: Option<String>,

    /// Account user name
    #[arg(long, env = "BERGEN_USER_NAME")]
    user_name: Option<String>,

    /// Account password
    #[arg(long, env = "BERGEN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Backend environment (production, sandbox)
    #[arg(long, env = "BERGEN_ENVIRONMENT")]
    environment: Option<Environment>,

    /// SOAP endpoint URL
    #[arg(long, env = "BERGEN_SERVICE_URL")]
    service_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, env = "BERGEN_REQUEST_TIMEOUT_MS")]
    request_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the operation catalog
    Operations,

    /// Invoke a remote operation and print its result as JSON
    Call {
        /// Remote operation name (e.g. GetInventoryByStyle)
        operation: String,

        /// Call parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
}

impl Args {
    /// Merge the config file (if any) with flag and env overrides
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => {
                let (Some(web_address), Some(user_name), Some(password)) =
                    (&self.web_address, &self.user_name, &self.password)
                else {
                    bail!(
                        "--web-address, --user-name and --password are required without --config"
                    );
                };
                ClientConfig::new(web_address, user_name, password)
            }
        };

        if let Some(web_address) = &self.web_address {
            config.web_address = web_address.clone();
        }
        if let Some(user_name) = &self.user_name {
            config.user_name = user_name.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(service_url) = &self.service_url {
            config.service_url = Some(service_url.clone());
        }
        if let Some(timeout) = self.request_timeout_ms {
            config.request_timeout_ms = timeout;
        }

        if config.service_url.is_none() {
            bail!("--service-url (or service_url in the config file) is required");
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("bergen_v3_client={},warn", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &args.command {
        Command::Operations => {
            for op in CATALOG {
                let group = format!("{:?}", op.group);
                println!("{:<42} {:<12} {}", op.name, group, op.token_shape.field_name());
            }
            Ok(())
        }
        Command::Call { operation, params } => {
            let params: Option<Params> = params
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("--params must be a JSON object")?;

            let config = args.client_config()?;
            info!(environment = %config.environment, operation = %operation, "Calling");

            let client = BergenClient::new(config);
            let result = client.invoke_named(operation, params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
