mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use futures::future::join_all;
use serde_json::json;

/// Stock can never go negative under concurrent usage recording: with 10
/// units on the shelf and 20 simultaneous single-unit draws, exactly 10
/// succeed and the rest are turned away.
#[tokio::test]
async fn concurrent_usage_never_oversells() {
    let app = TestApp::new().await;
    let created = app
        .seed_supply(json!({
            "name": "Toner cartridges",
            "category": "Printing",
            "quantity": 10,
            "unit": "piece",
            "primary_supplier": "PrintCo"
        }))
        .await;
    let id = created["id"].as_i64().unwrap();

    let attempts = (0..20).map(|_| {
        app.request_as_admin(
            Method::POST,
            "/api/v1/usage",
            Some(json!({ "supply_id": id, "quantity_used": 1 })),
        )
    });
    let responses = join_all(attempts).await;

    let mut created_count = 0;
    let mut conflict_count = 0;
    for response in responses {
        match response.status() {
            StatusCode::CREATED => created_count += 1,
            StatusCode::CONFLICT => conflict_count += 1,
            other => panic!("unexpected status under contention: {}", other),
        }
    }
    assert_eq!(created_count, 10);
    assert_eq!(conflict_count, 10);

    let response = app
        .request_as_admin(Method::GET, &format!("/api/v1/supplies/{}", id), None)
        .await;
    let supply = read_json(response).await;
    assert_eq!(supply["quantity"], 0);

    let response = app
        .request_as_admin(Method::GET, &format!("/api/v1/usage?supply_id={}", id), None)
        .await;
    let history = read_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 10);
}
