//! Tests against a running server backed by Redis

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
#[ignore]
async fn test_register_and_route() {
    let client = Client::new();
    let id = format!("live-{}", std::process::id());

    let response = client
        .post(format!("{}/api/targets", BASE_URL))
        .json(&json!({
            "id": id,
            "url": "http://live.example.com",
            "value": "1000000",
            "maxAcceptsPerDay": "1",
            "accept": {
                "geoState": { "$in": ["zz"] },
                "hour": { "$in": ["13"] }
            }
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let event = json!({
        "geoState": "zz",
        "publisher": "live",
        "timestamp": "2018-07-19T13:28:59.513Z"
    });

    let body: Value = client
        .post(format!("{}/route", BASE_URL))
        .json(&event)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["decision"], "accept");
    assert_eq!(body["url"], "http://live.example.com");

    let body: Value = client
        .post(format!("{}/route", BASE_URL))
        .json(&event)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["decision"], "reject");

    let response = client
        .delete(format!("{}/api/target/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}
