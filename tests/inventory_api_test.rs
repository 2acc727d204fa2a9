mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;

fn pens_payload() -> serde_json::Value {
    json!({
        "name": "Ballpoint pens",
        "category": "Writing",
        "quantity": 120,
        "unit": "box",
        "primary_supplier": "OfficeMart",
        "cost_per_unit": "2.50"
    })
}

#[tokio::test]
async fn status_and_health_are_open() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["service"], "stockroom-api");

    let response = app.request(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}

#[tokio::test]
async fn supplies_require_authentication() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/supplies", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/v1/supplies", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_can_create_and_fetch_a_supply() {
    let app = TestApp::new().await;

    let created = app.seed_supply(pens_payload()).await;
    assert_eq!(created["name"], "Ballpoint pens");
    assert_eq!(created["quantity"], 120);
    // SQLite stores the decimal as REAL, so the scale is not preserved;
    // compare the value, not the string.
    let cost: f64 = created["cost_per_unit"]
        .as_str()
        .expect("cost serialized as a string")
        .parse()
        .expect("cost parses as a number");
    assert_eq!(cost, 2.5);
    let id = created["id"].as_i64().expect("created supply has an id");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/supplies/{}", id),
            None,
            Some(app.employee_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = read_json(response).await;
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["primary_supplier"], "OfficeMart");
}

#[tokio::test]
async fn employee_cannot_mutate_supplies() {
    let app = TestApp::new().await;
    let created = app.seed_supply(pens_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/supplies",
            Some(pens_payload()),
            Some(app.employee_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/supplies/{}", id),
            Some(json!({ "quantity": 5 })),
            Some(app.employee_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/supplies/{}", id),
            None,
            Some(app.employee_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_rejects_invalid_payloads() {
    let app = TestApp::new().await;

    let mut payload = pens_payload();
    payload["name"] = json!("");
    let response = app
        .request_as_admin(Method::POST, "/api/v1/supplies", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut payload = pens_payload();
    payload["quantity"] = json!(-5);
    let response = app
        .request_as_admin(Method::POST, "/api/v1/supplies", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_unit_cost_is_rejected() {
    let app = TestApp::new().await;

    let mut payload = pens_payload();
    payload["cost_per_unit"] = json!("-2.50");
    let response = app
        .request_as_admin(Method::POST, "/api/v1/supplies", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let created = app.seed_supply(pens_payload()).await;
    let id = created["id"].as_i64().unwrap();
    let response = app
        .request_as_admin(
            Method::PUT,
            &format!("/api/v1/supplies/{}", id),
            Some(json!({ "cost_per_unit": "-1.00" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_supports_pagination_and_category_filter() {
    let app = TestApp::new().await;

    app.seed_supply(pens_payload()).await;
    app.seed_supply(json!({
        "name": "Printer paper",
        "category": "Paper",
        "quantity": 40,
        "unit": "ream",
        "primary_supplier": "PaperCo"
    }))
    .await;
    app.seed_supply(json!({
        "name": "Sticky notes",
        "category": "Paper",
        "quantity": 15,
        "unit": "pad",
        "primary_supplier": "PaperCo"
    }))
    .await;

    let response = app
        .request_as_admin(Method::GET, "/api/v1/supplies", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let response = app
        .request_as_admin(Method::GET, "/api/v1/supplies?category=Paper", None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["pagination"]["total"], 2);

    let response = app
        .request_as_admin(Method::GET, "/api/v1/supplies?page=2&per_page=2", None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn update_changes_only_the_named_fields() {
    let app = TestApp::new().await;
    let created = app.seed_supply(pens_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request_as_admin(
            Method::PUT,
            &format!("/api/v1/supplies/{}", id),
            Some(json!({ "quantity": 80, "primary_supplier": "NewVendor" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["quantity"], 80);
    assert_eq!(updated["primary_supplier"], "NewVendor");
    assert_eq!(updated["name"], "Ballpoint pens");
}

#[tokio::test]
async fn missing_supply_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_as_admin(Method::GET, "/api/v1/supplies/9999", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request_as_admin(
            Method::PUT,
            "/api/v1/supplies/9999",
            Some(json!({ "quantity": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request_as_admin(Method::DELETE, "/api/v1/supplies/9999", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recording_usage_decrements_stock() {
    let app = TestApp::new().await;
    let created = app.seed_supply(pens_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/usage",
            Some(json!({ "supply_id": id, "quantity_used": 20 })),
            Some(app.employee_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["supply_id"], id);
    assert_eq!(body["quantity_used"], 20);
    assert_eq!(body["remaining_quantity"], 100);

    let response = app
        .request_as_admin(Method::GET, &format!("/api/v1/supplies/{}", id), None)
        .await;
    let supply = read_json(response).await;
    assert_eq!(supply["quantity"], 100);
}

#[tokio::test]
async fn usage_exceeding_stock_is_rejected_and_leaves_state_unchanged() {
    let app = TestApp::new().await;
    let created = app
        .seed_supply(json!({
            "name": "Staplers",
            "category": "Tools",
            "quantity": 5,
            "unit": "piece",
            "primary_supplier": "OfficeMart"
        }))
        .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/v1/usage",
            Some(json!({ "supply_id": id, "quantity_used": 10 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Neither the stock level nor the history moved.
    let response = app
        .request_as_admin(Method::GET, &format!("/api/v1/supplies/{}", id), None)
        .await;
    let supply = read_json(response).await;
    assert_eq!(supply["quantity"], 5);

    let response = app
        .request_as_admin(Method::GET, &format!("/api/v1/usage?supply_id={}", id), None)
        .await;
    let history = read_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn usage_against_unknown_supply_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/v1/usage",
            Some(json!({ "supply_id": 424242, "quantity_used": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn usage_quantity_must_be_positive() {
    let app = TestApp::new().await;
    let created = app.seed_supply(pens_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/v1/usage",
            Some(json!({ "supply_id": id, "quantity_used": 0 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn usage_listing_filters_by_supply() {
    let app = TestApp::new().await;
    let pens = app.seed_supply(pens_payload()).await;
    let paper = app
        .seed_supply(json!({
            "name": "Printer paper",
            "category": "Paper",
            "quantity": 40,
            "unit": "ream",
            "primary_supplier": "PaperCo"
        }))
        .await;
    let pens_id = pens["id"].as_i64().unwrap();
    let paper_id = paper["id"].as_i64().unwrap();

    for (id, used) in [(pens_id, 3), (pens_id, 4), (paper_id, 2)] {
        let response = app
            .request_as_admin(
                Method::POST,
                "/api/v1/usage",
                Some(json!({ "supply_id": id, "quantity_used": used })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request_as_admin(Method::GET, "/api/v1/usage", None)
        .await;
    let all = read_json(response).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let response = app
        .request_as_admin(
            Method::GET,
            &format!("/api/v1/usage?supply_id={}", pens_id),
            None,
        )
        .await;
    let filtered = read_json(response).await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|e| e["supply_id"] == pens_id));
}

#[tokio::test]
async fn deleting_a_supply_cascades_its_history() {
    let app = TestApp::new().await;
    let created = app.seed_supply(pens_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/v1/usage",
            Some(json!({ "supply_id": id, "quantity_used": 2 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request_as_admin(Method::DELETE, &format!("/api/v1/supplies/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request_as_admin(Method::GET, &format!("/api/v1/supplies/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // History endpoint reports the supply as gone rather than an empty list.
    let response = app
        .request_as_admin(Method::GET, &format!("/api/v1/usage?supply_id={}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
