pub mod call;
mod client;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod telemetry;
pub mod token;
pub mod transport;

pub use call::{ApiError, Call, CallResponse, ErrorList};
pub use client::SellingPartnerClient;
pub use config::{Config, ConfigLocation};
pub use endpoint::Endpoint;
pub use errors::Error;
pub use token::{AccessTokenState, CredentialRefresher, RefresherConfig};
pub use transport::{ACCESS_TOKEN_HEADER, AccessTokenSource, HttpTransport, Transport};
