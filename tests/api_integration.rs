use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use goldtrack::config::{AppConfig, ExchangeApiConfig, GoldApiConfig, ProvidersConfig};
use goldtrack::store::memory::MemoryStore;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils {
    use super::*;

    pub async fn mock_gold_server(response: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/XAU/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&server)
            .await;
        server
    }

    pub async fn mock_rate_server(rates: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": "success", "rates": rates})),
            )
            .mount(&server)
            .await;
        server
    }

    pub async fn failing_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    }

    pub fn test_server(gold_url: &str, rate_url: &str) -> TestServer {
        let config = AppConfig {
            providers: ProvidersConfig {
                goldapi: Some(GoldApiConfig {
                    base_url: gold_url.to_string(),
                    api_key: Some("test-key".to_string()),
                }),
                exchange: Some(ExchangeApiConfig {
                    base_url: rate_url.to_string(),
                }),
            },
            ..AppConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        let state = goldtrack::build_state(&config, store).expect("Failed to build state");
        TestServer::new(goldtrack::api::create_router(state)).expect("Failed to start test server")
    }

    pub fn sample_purchase() -> Value {
        json!({
            "purchase_date": "2024-01-15",
            "purchase_price": 250.0,
            "grams": 10.0,
            "description": "coins"
        })
    }
}

#[test_log::test(tokio::test)]
async fn test_current_price_round_trip() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server.get("/api/current-price").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["price_usd"], json!(85.0));
    assert_eq!(body["exchange_rate"], json!(3.75));
    assert_eq!(body["price"], json!(318.75));
    assert_eq!(body["currency"], json!("SAR"));
    assert!(body["timestamp"].is_number());
    assert!(body["last_updated"].is_string());
    assert_eq!(body["cached"], json!(true));
}

#[tokio::test]
async fn test_fresh_price_not_refetched() {
    let gold = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/XAU/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price_gram_24k": 85.0})))
        .expect(1)
        .mount(&gold)
        .await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    server.get("/api/current-price").await;
    server.get("/api/current-price").await;
    // Mock expectation of exactly 1 call verified when `gold` drops
}

#[tokio::test]
async fn test_force_refresh_hits_upstream_again() {
    let gold = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/XAU/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price_gram_24k": 85.0})))
        .expect(2)
        .mount(&gold)
        .await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    server.get("/api/current-price").await;
    let response = server.get("/api/current-price?refresh=true").await;

    let body: Value = response.json();
    assert_eq!(body["cached"], json!(false));
}

#[tokio::test]
async fn test_per_ounce_price_is_converted_to_grams() {
    let gold = test_utils::mock_gold_server(json!({"price": 3110.35})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let body: Value = server.get("/api/current-price").await.json();
    assert_eq!(body["price_usd"], json!(100.0));
}

#[test_log::test(tokio::test)]
async fn test_price_failure_surfaces_as_error() {
    let gold = test_utils::failing_server().await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server.get("/api/current-price").await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Failed to get gold price data"));
}

#[tokio::test]
async fn test_rate_failure_falls_back_to_fixed_constant() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::failing_server().await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server.get("/api/current-price").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["exchange_rate"], json!(3.75));
}

#[test_log::test(tokio::test)]
async fn test_purchase_lifecycle_with_valuation() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let created: Value = server
        .post("/api/purchases")
        .json(&test_utils::sample_purchase())
        .await
        .json();
    assert_eq!(created["success"], json!(true));
    let id = created["purchase"]["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    // Current price: 85.0 * 3.75 = 318.75 SAR/g
    let body: Value = server.get("/api/purchases").await.json();
    assert_eq!(body["success"], json!(true));

    let purchases = body["purchases"].as_array().unwrap();
    assert_eq!(purchases.len(), 1);
    let row = &purchases[0];
    assert_eq!(row["id"].as_str().unwrap(), id);
    assert_eq!(row["purchase_value"], json!(2500.0));
    assert_eq!(row["current_value"], json!(3187.5));
    assert_eq!(row["profit_loss"], json!(687.5));
    assert_eq!(row["profit_loss_percentage"], json!(27.5));
    assert_eq!(row["is_profit"], json!(true));
    assert_eq!(row["current_price"], json!(318.75));

    let summary = &body["summary"];
    assert_eq!(summary["total_investment"], json!(2500.0));
    assert_eq!(summary["total_current_value"], json!(3187.5));
    assert_eq!(summary["total_profit_loss"], json!(687.5));
    assert_eq!(summary["total_profit_loss_percentage"], json!(27.5));
    assert_eq!(summary["is_profit"], json!(true));
    assert_eq!(summary["exchange_rate"], json!(3.75));

    let response = server.delete(&format!("/api/purchases/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["success"], json!(true));

    let response = server.delete(&format!("/api/purchases/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Purchase not found")
    );
}

#[tokio::test]
async fn test_purchases_fail_without_price_data_and_store_is_untouched() {
    let gold = test_utils::failing_server().await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    server
        .post("/api/purchases")
        .json(&test_utils::sample_purchase())
        .await;

    let response = server.get("/api/purchases").await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["success"], json!(false));

    // The stored record is still there: export works
    let response = server.get("/api/export").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_add_purchase_rejects_malformed_input() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server
        .post("/api/purchases")
        .json(&json!({"purchase_date": "15/01/2024", "purchase_price": 250.0, "grams": 10.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], json!(false));

    let response = server
        .post("/api/purchases")
        .json(&json!({"purchase_date": "2024-01-15", "purchase_price": "lots", "grams": 10.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Numbers in strings are coerced, as some clients send them quoted
    let response = server
        .post("/api/purchases")
        .json(&json!({"purchase_date": "2024-01-15", "purchase_price": "250.0", "grams": "10"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn test_historical_price_uses_cached_rate() {
    let gold = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/XAU/USD/20240115"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price_gram_24k": 65.0})))
        .mount(&gold)
        .await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server.get("/api/historical-price?date=2024-01-15").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["price_usd"], json!(65.0));
    assert_eq!(body["exchange_rate"], json!(3.75));
    assert_eq!(body["price"], json!(243.75));
    assert_eq!(body["date"], json!("2024-01-15"));
}

#[tokio::test]
async fn test_historical_price_requires_parseable_date() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server.get("/api/historical-price").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("Date parameter is required")
    );

    let response = server.get("/api/historical-price?date=january").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_historical_upstream_error_is_reported() {
    let gold = test_utils::failing_server().await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server.get("/api/historical-price?date=2024-01-15").await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}

#[tokio::test]
async fn test_export_with_no_data_returns_json_error() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let response = server.get("/api/export").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("No purchase data to export")
    );
}

#[test_log::test(tokio::test)]
async fn test_export_then_import_round_trip() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    server
        .post("/api/purchases")
        .json(&test_utils::sample_purchase())
        .await;
    server
        .post("/api/purchases")
        .json(&json!({
            "purchase_date": "2024-02-20",
            "purchase_price": 265.5,
            "grams": 2.5
        }))
        .await;

    let response = server.get("/api/export").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let disposition = response.header("content-disposition");
    assert!(disposition.to_str().unwrap().contains("gold_purchases_"));
    let csv = response.text();
    assert!(csv.starts_with("id,purchase_date,purchase_price,grams,description"));

    // Re-import into a fresh instance; ids are regenerated
    let fresh = test_utils::test_server(&gold.uri(), &rates.uri());
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(csv.into_bytes())
            .file_name("gold_purchases.csv")
            .mime_type("text/csv"),
    );
    let response = fresh.post("/api/import").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["imported_count"], json!(2));
    assert_eq!(body["error_count"], json!(0));

    let listed: Value = fresh.get("/api/purchases").await.json();
    let purchases = listed["purchases"].as_array().unwrap();
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[0]["purchase_date"], json!("2024-01-15"));
    assert_eq!(purchases[1]["grams"], json!(2.5));
}

#[tokio::test]
async fn test_import_isolates_bad_rows() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let csv = "purchase_date,purchase_price,grams,description\n\
               2024-01-15,250.0,,missing grams\n\
               2024-02-20,265.5,2.5,ok\n";
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(csv.as_bytes().to_vec())
            .file_name("import.csv")
            .mime_type("text/csv"),
    );

    let body: Value = server.post("/api/import").multipart(form).await.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["imported_count"], json!(1));
    assert_eq!(body["error_count"], json!(1));
    assert!(body["message"].as_str().unwrap().contains("1 errors"));
}

#[tokio::test]
async fn test_import_rejects_non_csv_and_missing_columns() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"not a csv".to_vec())
            .file_name("data.txt")
            .mime_type("text/plain"),
    );
    let response = server.post("/api/import").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("Only CSV files are supported")
    );

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"purchase_date,purchase_price\n2024-01-15,250.0\n".to_vec())
            .file_name("import.csv")
            .mime_type("text/csv"),
    );
    let response = server.post("/api/import").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("Missing required field: grams")
    );
}

#[tokio::test]
async fn test_health_check() {
    let gold = test_utils::mock_gold_server(json!({"price_gram_24k": 85.0})).await;
    let rates = test_utils::mock_rate_server(json!({"SAR": 3.75})).await;
    let server = test_utils::test_server(&gold.uri(), &rates.uri());

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], json!("healthy"));
    assert!(body["timestamp"].is_string());
}
