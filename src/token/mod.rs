mod policy;
mod refresher;
pub mod schedule;
mod state;

pub use policy::RefreshPolicy;
pub use refresher::{
    AccessTokenResponse, CredentialRefresher, RefresherConfig, fetch_access_token,
};
pub use state::AccessTokenState;
