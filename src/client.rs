use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::{
    call::{Call, CallResponse},
    config::Config,
    errors::Error,
    token::{CredentialRefresher, RefresherConfig},
    transport::{HttpTransport, Transport},
};

/// Wires a background [`CredentialRefresher`] into an [`HttpTransport`].
pub struct SellingPartnerClient {
    refresher: Arc<CredentialRefresher>,
    transport: HttpTransport,
}

impl SellingPartnerClient {
    /// Create a new SellingPartnerClient
    /// # Arguments
    /// * `config` - Explicit configuration (`Config`), typically loaded via `Config::from_file` or `Config::from_env`.
    /// # ENV Vars (when using `Config::from_env`)
    /// * `SP_API_CLIENT_ID` - Login-with-Amazon client id
    /// * `SP_API_CLIENT_SECRET` - Login-with-Amazon client secret
    /// * `SP_API_REFRESH_TOKEN` - Long-lived refresh token of the selling partner
    /// * `SP_API_ENDPOINT` - Region (`na`, `eu`, `fe`, `sandbox-*`) or base URL
    pub async fn new(config: Config) -> Result<Self, Error> {
        let endpoint = config.endpoint()?;
        let refresher = Arc::new(CredentialRefresher::new(RefresherConfig::from_config(&config)).await?);
        refresher.run_in_background()?;

        let transport = HttpTransport::new(endpoint).with_token_source(refresher.clone());
        info!("selling partner client ready: endpoint='{}'", transport.endpoint());
        Ok(Self {
            refresher,
            transport,
        })
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn refresher(&self) -> &CredentialRefresher {
        &self.refresher
    }

    pub async fn execute<T: DeserializeOwned>(&self, call: Call<T>) -> Result<CallResponse<T>, Error> {
        call.execute(&self.transport).await
    }

    /// Stops background token updates.
    pub async fn close(&self) {
        self.refresher.shutdown().await;
        info!("selling partner client closed");
    }
}

