#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use selling_partner_api::RefresherConfig;
use wiremock::{MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/auth/o2/token";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn token_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), TOKEN_PATH)
}

pub fn refresher_config(server: &MockServer, expiry_delta_secs: u64) -> RefresherConfig {
    RefresherConfig::new("Atzr|refresh", "amzn1.application-oa2-client.test", "secret")
        .with_token_url(token_url(server))
        .with_expiry_delta(Duration::from_secs(expiry_delta_secs))
}

pub fn token_body(token: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": token,
        "refresh_token": "Atzr|refresh",
        "token_type": "bearer",
        "expires_in": expires_in,
    }))
}
