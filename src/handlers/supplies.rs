use crate::auth::AuthUser;
use crate::entities::{supplies, usage_history};
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::services::supplies::{NewSupply, SupplyPatch};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupplyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 50))]
    pub unit: String,
    pub expiration_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 200))]
    pub primary_supplier: String,
    pub cost_per_unit: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(length(min = 1, max = 50))]
    pub unit: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 200))]
    pub primary_supplier: Option<String>,
    pub cost_per_unit: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordUsageRequest {
    pub supply_id: i32,
    #[validate(range(min = 1))]
    pub quantity_used: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSuppliesQuery {
    pub category: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ListSuppliesQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsageQuery {
    pub supply_id: Option<i32>,
    pub since: Option<DateTime<Utc>>,
}

/// Usage recording result: the appended event plus the stock level it
/// left behind.
#[derive(Debug, Serialize, ToSchema)]
pub struct UsageRecordedResponse {
    #[serde(flatten)]
    pub usage: usage_history::Model,
    pub remaining_quantity: i32,
}

/// Routes for supply CRUD and usage recording. Mutating supply routes
/// check for the admin role in the handler.
pub fn supplies_routes() -> Router<AppState> {
    Router::new()
        .route("/supplies", get(list_supplies).post(create_supply))
        .route(
            "/supplies/:id",
            get(get_supply).put(update_supply).delete(delete_supply),
        )
        .route("/usage", post(record_usage).get(list_usage))
}

fn require_admin(user: &AuthUser) -> Result<(), ServiceError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "admin role required".to_string(),
        ))
    }
}

/// List supplies with optional category filter
#[utoipa::path(
    get,
    path = "/api/v1/supplies",
    params(ListSuppliesQuery),
    responses(
        (status = 200, description = "Supplies returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "supplies"
)]
pub async fn list_supplies(
    State(state): State<AppState>,
    Query(query): Query<ListSuppliesQuery>,
) -> Result<Response, ServiceError> {
    let pagination = query.pagination();
    let page = pagination.page();
    let per_page = pagination.per_page();

    let (items, total) = state
        .services
        .supplies
        .list_supplies(query.category, page, per_page)
        .await?;

    Ok(success_response(PaginatedResponse::new(
        items, page, per_page, total,
    )))
}

/// Fetch a single supply
#[utoipa::path(
    get,
    path = "/api/v1/supplies/{id}",
    params(("id" = i32, Path, description = "Supply id")),
    responses(
        (status = 200, description = "Supply returned", body = supplies::Model),
        (status = 404, description = "Supply not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "supplies"
)]
pub async fn get_supply(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<supplies::Model>, ServiceError> {
    let supply = state.services.supplies.get_supply(id).await?;
    Ok(Json(supply))
}

/// Create a supply (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/supplies",
    request_body = CreateSupplyRequest,
    responses(
        (status = 201, description = "Supply created", body = supplies::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "supplies"
)]
pub async fn create_supply(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateSupplyRequest>,
) -> Result<Response, ServiceError> {
    require_admin(&user)?;
    validate_input(&payload)?;

    let supply = state
        .services
        .supplies
        .create_supply(NewSupply {
            name: payload.name,
            category: payload.category,
            quantity: payload.quantity,
            unit: payload.unit,
            expiration_date: payload.expiration_date,
            primary_supplier: payload.primary_supplier,
            cost_per_unit: payload.cost_per_unit,
        })
        .await?;

    Ok(created_response(supply))
}

/// Update supply fields (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/supplies/{id}",
    params(("id" = i32, Path, description = "Supply id")),
    request_body = UpdateSupplyRequest,
    responses(
        (status = 200, description = "Supply updated", body = supplies::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supply not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "supplies"
)]
pub async fn update_supply(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateSupplyRequest>,
) -> Result<Json<supplies::Model>, ServiceError> {
    require_admin(&user)?;
    validate_input(&payload)?;

    let supply = state
        .services
        .supplies
        .update_supply(
            id,
            SupplyPatch {
                name: payload.name,
                category: payload.category,
                quantity: payload.quantity,
                unit: payload.unit,
                expiration_date: payload.expiration_date,
                primary_supplier: payload.primary_supplier,
                cost_per_unit: payload.cost_per_unit,
            },
        )
        .await?;

    Ok(Json(supply))
}

/// Delete a supply (admin only); its usage history cascades
#[utoipa::path(
    delete,
    path = "/api/v1/supplies/{id}",
    params(("id" = i32, Path, description = "Supply id")),
    responses(
        (status = 204, description = "Supply deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supply not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "supplies"
)]
pub async fn delete_supply(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ServiceError> {
    require_admin(&user)?;
    state.services.supplies.delete_supply(id).await?;
    Ok(no_content_response())
}

/// Record consumption against a supply
#[utoipa::path(
    post,
    path = "/api/v1/usage",
    request_body = RecordUsageRequest,
    responses(
        (status = 201, description = "Usage recorded", body = UsageRecordedResponse),
        (status = 404, description = "Supply not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Insufficient quantity", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "usage"
)]
pub async fn record_usage(
    State(state): State<AppState>,
    Json(payload): Json<RecordUsageRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let (usage, remaining) = state
        .services
        .supplies
        .record_usage(payload.supply_id, payload.quantity_used)
        .await?;

    Ok(created_response(UsageRecordedResponse {
        usage,
        remaining_quantity: remaining,
    }))
}

/// List usage events, optionally filtered by supply and start time
#[utoipa::path(
    get,
    path = "/api/v1/usage",
    params(ListUsageQuery),
    responses(
        (status = 200, description = "Usage events returned", body = [usage_history::Model]),
        (status = 404, description = "Supply not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "usage"
)]
pub async fn list_usage(
    State(state): State<AppState>,
    Query(query): Query<ListUsageQuery>,
) -> Result<Json<Vec<usage_history::Model>>, ServiceError> {
    let events = state
        .services
        .supplies
        .list_usage(query.supply_id, query.since)
        .await?;
    Ok(Json(events))
}
