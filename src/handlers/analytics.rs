use crate::errors::ServiceError;
use crate::services::analytics::{OrderRecommendation, SavingsEstimate, WasteAlert};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", get(get_recommendations))
        .route("/alerts", get(get_alerts))
        .route("/savings", get(get_savings))
}

/// Reorder recommendations derived from the trailing 30 days of usage
#[utoipa::path(
    get,
    path = "/api/v1/recommendations",
    responses(
        (status = 200, description = "One recommendation per supply", body = [OrderRecommendation]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "analytics"
)]
pub async fn get_recommendations(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderRecommendation>>, ServiceError> {
    let recommendations = state.services.analytics.order_recommendations().await?;
    Ok(Json(recommendations))
}

/// Overstock, low-stock and slow-expiration alerts
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    responses(
        (status = 200, description = "Active waste alerts", body = [WasteAlert]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "analytics"
)]
pub async fn get_alerts(
    State(state): State<AppState>,
) -> Result<Json<Vec<WasteAlert>>, ServiceError> {
    let alerts = state.services.analytics.waste_alerts().await?;
    Ok(Json(alerts))
}

/// Estimated holding-cost savings per supply
#[utoipa::path(
    get,
    path = "/api/v1/savings",
    responses(
        (status = 200, description = "Savings estimates", body = [SavingsEstimate]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "analytics"
)]
pub async fn get_savings(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavingsEstimate>>, ServiceError> {
    let savings = state.services.analytics.cost_savings().await?;
    Ok(Json(savings))
}
