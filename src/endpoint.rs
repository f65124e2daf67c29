use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Selects the API host for a region or environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    NorthAmerica,
    Europe,
    FarEast,
    SandboxNorthAmerica,
    SandboxEurope,
    SandboxFarEast,
    /// Absolute base URL, e.g. a proxy or a local mock server.
    Custom(String),
}

impl Endpoint {
    pub fn base_url(&self) -> &str {
        match self {
            Endpoint::NorthAmerica => "https://sellingpartnerapi-na.amazon.com",
            Endpoint::Europe => "https://sellingpartnerapi-eu.amazon.com",
            Endpoint::FarEast => "https://sellingpartnerapi-fe.amazon.com",
            Endpoint::SandboxNorthAmerica => "https://sandbox.sellingpartnerapi-na.amazon.com",
            Endpoint::SandboxEurope => "https://sandbox.sellingpartnerapi-eu.amazon.com",
            Endpoint::SandboxFarEast => "https://sandbox.sellingpartnerapi-fe.amazon.com",
            Endpoint::Custom(url) => url.trim_end_matches('/'),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_url())
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(Endpoint::Custom(trimmed.to_string()));
        }
        match trimmed.to_lowercase().as_str() {
            "na" | "north-america" => Ok(Endpoint::NorthAmerica),
            "eu" | "europe" => Ok(Endpoint::Europe),
            "fe" | "far-east" => Ok(Endpoint::FarEast),
            "sandbox-na" => Ok(Endpoint::SandboxNorthAmerica),
            "sandbox-eu" => Ok(Endpoint::SandboxEurope),
            "sandbox-fe" => Ok(Endpoint::SandboxFarEast),
            other => Err(Error::Config(format!(
                "Unknown endpoint '{}'; expected a region (na, eu, fe, sandbox-na, sandbox-eu, sandbox-fe) or an absolute URL",
                other
            ))),
        }
    }
}
