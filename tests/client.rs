mod common;

use reqwest::Method;
use serde::Deserialize;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use selling_partner_api::{ACCESS_TOKEN_HEADER, Call, Config, Error, SellingPartnerClient};

use common::{TOKEN_PATH, token_body, token_url};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportList {
    reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    report_id: String,
    processing_status: String,
}

fn config(server: &MockServer) -> Config {
    serde_json::from_value(serde_json::json!({
        "client_id": "amzn1.application-oa2-client.test",
        "client_secret": "secret",
        "refresh_token": "Atzr|refresh",
        "endpoint": server.uri(),
        "token_url": token_url(server),
    }))
    .expect("valid config")
}

#[tokio::test]
async fn client_stamps_refreshed_token_on_calls() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_body("Atza|lwa-token", 3600))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/2021-06-30/reports"))
        .and(query_param("reportTypes", "GET_MERCHANT_LISTINGS_ALL_DATA"))
        .and(header(ACCESS_TOKEN_HEADER, "Atza|lwa-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "reports": [
                {"reportId": "4711", "processingStatus": "DONE", "reportType": "GET_MERCHANT_LISTINGS_ALL_DATA"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SellingPartnerClient::new(config(&server))
        .await
        .expect("client new failed");
    assert_eq!(client.refresher().get_access_token(), "Atza|lwa-token");

    let resp = client
        .execute(
            Call::<ReportList>::new(Method::GET, "/reports/2021-06-30/reports")
                .with_query_params([("reportTypes", "GET_MERCHANT_LISTINGS_ALL_DATA")])
                .with_parse_error_list_on_error(true),
        )
        .await
        .expect("call succeeds");

    let reports = resp.into_result().expect("no api errors").expect("body");
    assert_eq!(reports.reports.len(), 1);
    assert_eq!(reports.reports[0].report_id, "4711");
    assert_eq!(reports.reports[0].processing_status, "DONE");

    client.close().await;
}

#[tokio::test]
async fn client_creation_fails_without_initial_token() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_client",
            "error_description": "Client authentication failed",
        })))
        .mount(&server)
        .await;

    match SellingPartnerClient::new(config(&server)).await {
        Ok(_) => panic!("expected initialization error"),
        Err(Error::Initialization(_)) => {}
        Err(other) => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn client_rejects_unknown_endpoint_before_any_request() {
    common::init_logging();
    let server = MockServer::start().await;
    let mut cfg = config(&server);
    cfg.endpoint = "atlantis".into();

    match SellingPartnerClient::new(cfg).await {
        Ok(_) => panic!("expected config error"),
        Err(Error::Config(msg)) => assert!(msg.contains("atlantis")),
        Err(other) => panic!("unexpected error: {:?}", other),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}
