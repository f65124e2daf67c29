//! Declarative API calls: build a request from typed parameters, send it through a
//! [`Transport`] and decode the answer into `T` or an [`ErrorList`].

use std::marker::PhantomData;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Body, Method, Request, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::errors::Error;
use crate::transport::{ACCESS_TOKEN_HEADER, Transport};

mod response;

pub use response::{ApiError, CallResponse, ErrorList};

/// One request awaiting execution, expecting a `T` on success.
#[derive(Debug, Clone)]
pub struct Call<T> {
    _marker: PhantomData<fn() -> T>,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    restricted_data_token: Option<String>,
    parse_error_list: bool,
}

impl<T: DeserializeOwned> Call<T> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            _marker: PhantomData,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            restricted_data_token: None,
            parse_error_list: false,
        }
    }

    /// Appends query parameters, keeping the order in which they are supplied.
    /// Repeated keys are sent once per value.
    pub fn with_query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attaches a serialized request body. An empty body means none is sent.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    pub fn with_json_body<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, Error> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self.with_body(bytes))
    }

    /// Sends `token` in the access token header instead of the regular access token.
    pub fn with_restricted_data_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.restricted_data_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    pub fn with_parse_error_list_on_error(mut self, parse: bool) -> Self {
        self.parse_error_list = parse;
        self
    }

    /// Builds the outgoing request against `endpoint` without sending it.
    pub fn build_request(&self, endpoint: &Endpoint) -> Result<Request, Error> {
        let url = self.compose_url(endpoint)?;
        let mut request = Request::new(self.method.clone(), url);
        if let Some(body) = &self.body {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(Body::from(body.clone()));
        }
        if let Some(token) = &self.restricted_data_token {
            request
                .headers_mut()
                .insert(ACCESS_TOKEN_HEADER, HeaderValue::from_str(token)?);
        }
        Ok(request)
    }

    /// Sends the call and decodes the response.
    ///
    /// Transport failures and undecodable bodies are returned as `Err`; an error
    /// envelope from the API comes back as [`CallResponse::Failure`] when error
    /// list parsing is enabled.
    pub async fn execute<Tr: Transport>(self, transport: &Tr) -> Result<CallResponse<T>, Error> {
        let request = self.build_request(transport.endpoint())?;
        debug!(method = %self.method, url = %request.url(), "call.execute");

        let response = transport.send(request).await?;
        let status = response.status();
        let body = response.bytes().await?;
        self.decode(status, &body)
    }

    fn compose_url(&self, endpoint: &Endpoint) -> Result<Url, Error> {
        let mut url = endpoint.base_url().to_string();
        if !self.path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&self.path);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&self.query));
        }
        Url::parse(&url).map_err(|e| Error::InvalidUrl(format!("'{}': {}", url, e)))
    }

    fn decode(&self, status: StatusCode, body: &[u8]) -> Result<CallResponse<T>, Error> {
        if status.is_success() {
            if body.is_empty() {
                return Ok(CallResponse::Empty);
            }
            return Ok(CallResponse::Success(serde_json::from_slice(body)?));
        }

        if self.parse_error_list && !body.is_empty() {
            let errors: ErrorList = serde_json::from_slice(body)?;
            // Bodies without any error entries keep their status and text below.
            if !errors.errors.is_empty() {
                warn!(
                    method = %self.method,
                    path = %self.path,
                    status = status.as_u16(),
                    errors = %errors,
                    "call.failed"
                );
                return Ok(CallResponse::Failure(errors));
            }
        }

        let body = String::from_utf8_lossy(body).into_owned();
        warn!(
            method = %self.method,
            path = %self.path,
            status = status.as_u16(),
            body_len = body.len(),
            "call.failed"
        );
        Err(Error::UnexpectedStatus(status, body))
    }
}

fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
