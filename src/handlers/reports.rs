use crate::errors::ServiceError;
use crate::services::reports::{DailyUsageSeries, MonthlySavingsSeries, SupplyUsageReport};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};

pub fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/usage/history", get(get_usage_history_series))
        .route("/savings/history", get(get_savings_history))
        .route("/reports/usage", get(get_usage_report))
}

/// Usage totals grouped by calendar day
#[utoipa::path(
    get,
    path = "/api/v1/usage/history",
    responses(
        (status = 200, description = "Daily usage series", body = DailyUsageSeries),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_usage_history_series(
    State(state): State<AppState>,
) -> Result<Json<DailyUsageSeries>, ServiceError> {
    let series = state.services.reports.daily_usage_series().await?;
    Ok(Json(series))
}

/// Estimated savings per calendar month
#[utoipa::path(
    get,
    path = "/api/v1/savings/history",
    responses(
        (status = 200, description = "Monthly savings series", body = MonthlySavingsSeries),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_savings_history(
    State(state): State<AppState>,
) -> Result<Json<MonthlySavingsSeries>, ServiceError> {
    let series = state.services.reports.monthly_savings_series().await?;
    Ok(Json(series))
}

/// Per-supply usage statistics
#[utoipa::path(
    get,
    path = "/api/v1/reports/usage",
    responses(
        (status = 200, description = "Usage statistics per supply", body = [SupplyUsageReport]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_usage_report(
    State(state): State<AppState>,
) -> Result<Json<Vec<SupplyUsageReport>>, ServiceError> {
    let report = state.services.reports.usage_statistics().await?;
    Ok(Json(report))
}
