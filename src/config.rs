//! read configuration from a file, the environment or AWS Secrets Manager

use std::fmt;
use std::time::Duration;

use aws_config::BehaviorVersion;

use crate::endpoint::Endpoint;
use crate::errors::Error;

/// Login-with-Amazon token issuance endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";
/// Renew the access token this long before it actually expires.
pub const DEFAULT_EXPIRY_DELTA_SECS: u64 = 60;

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Region name (`na`, `eu`, `fe`, `sandbox-*`) or an absolute base URL.
    pub endpoint: String,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub expiry_delta_secs: Option<u64>,
}

impl Config {
    pub async fn load(loc: ConfigLocation) -> Result<Self, Error> {
        match loc {
            ConfigLocation::File(path) => Self::from_file(path),
            ConfigLocation::Env => Self::from_env(),
            ConfigLocation::Secret => read_config_from_secret().await,
        }
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn from_env() -> Result<Self, Error> {
        let expiry_delta_secs = match std::env::var("SP_API_EXPIRY_DELTA_SECS") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|e| {
                Error::Config(format!("Invalid SP_API_EXPIRY_DELTA_SECS '{}': {}", raw, e))
            })?),
            Err(_) => None,
        };
        Ok(Config {
            client_id: required_env("SP_API_CLIENT_ID")?,
            client_secret: required_env("SP_API_CLIENT_SECRET")?,
            refresh_token: required_env("SP_API_REFRESH_TOKEN")?,
            endpoint: required_env("SP_API_ENDPOINT")?,
            token_url: std::env::var("SP_API_TOKEN_URL").ok(),
            expiry_delta_secs,
        })
    }

    pub fn endpoint(&self) -> Result<Endpoint, Error> {
        self.endpoint.parse()
    }

    pub fn token_url(&self) -> &str {
        self.token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL)
    }

    pub fn expiry_delta(&self) -> Duration {
        Duration::from_secs(self.expiry_delta_secs.unwrap_or(DEFAULT_EXPIRY_DELTA_SECS))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("token_url", &self.token_url)
            .field("expiry_delta_secs", &self.expiry_delta_secs)
            .finish()
    }
}

fn required_env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::Config(format!("Missing {} env var", name)))
}

async fn read_config_from_secret() -> Result<Config, Error> {
    let secret_arn = std::env::var("SP_API_CONFIG_SECRET_ARN")
        .map_err(|_| Error::Config("Missing SP_API_CONFIG_SECRET_ARN env var".to_string()))?;
    let client = aws_sdk_secretsmanager::Client::new(
        &aws_config::load_defaults(BehaviorVersion::latest()).await,
    );
    let resp = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
    let secret = resp
        .secret_string()
        .ok_or_else(|| Error::Config("Failed to get secret string, returned None".to_string()))?;
    Ok(serde_json::from_str(secret)?)
}
