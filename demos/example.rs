use reqwest::Method;
use selling_partner_api::{Call, Config, SellingPartnerClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Load configuration from a JSON file placed next to the binary
    let cfg = Config::from_file("config.json")?;
    let client = SellingPartnerClient::new(cfg).await?;

    let resp = client
        .execute(
            Call::<serde_json::Value>::new(Method::GET, "/reports/2021-06-30/reports")
                .with_query_params([("reportTypes", "GET_MERCHANT_LISTINGS_ALL_DATA")])
                .with_parse_error_list_on_error(true),
        )
        .await?;
    match resp.into_result() {
        Ok(Some(body)) => println!("{}", serde_json::to_string_pretty(&body)?),
        Ok(None) => println!("empty response"),
        Err(errors) => eprintln!("api errors: {}", errors),
    }

    client.close().await;
    Ok(())
}
