use std::future::Future;
use std::sync::Arc;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, Request, Response};

use crate::endpoint::Endpoint;
use crate::errors::Error;

/// Header carrying the access token, or a restricted data token when one was issued.
pub const ACCESS_TOKEN_HEADER: &str = "x-amz-access-token";

const USER_AGENT_VALUE: &str = concat!("selling-partner-api-rust/", env!("CARGO_PKG_VERSION"));

/// Sends prepared requests and tells calls which host to address.
pub trait Transport: Send + Sync {
    fn endpoint(&self) -> &Endpoint;

    fn send(&self, request: Request) -> impl Future<Output = Result<Response, Error>> + Send;
}

/// Anything that can hand out the current access token.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> String;
}

/// reqwest-backed transport that stamps the current access token onto every request.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Endpoint,
    token_source: Option<Arc<dyn AccessTokenSource>>,
}

impl HttpTransport {
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            token_source: None,
        }
    }

    pub fn with_token_source(mut self, source: Arc<dyn AccessTokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }
}

impl Transport for HttpTransport {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn send(&self, mut request: Request) -> Result<Response, Error> {
        let headers = request.headers_mut();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        // A restricted data token set by the call wins over the regular access token.
        if let Some(source) = &self.token_source
            && !headers.contains_key(ACCESS_TOKEN_HEADER)
        {
            headers.insert(
                ACCESS_TOKEN_HEADER,
                HeaderValue::from_str(&source.access_token())?,
            );
        }
        Ok(self.client.execute(request).await?)
    }
}
