use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.3.0",
        description = r#"
# Office-Supply Inventory & Analytics API

Tracks office-supply stock levels and consumption, and derives reorder
recommendations, waste alerts, cost-savings estimates and usage reports
from the recorded history.

## Authentication

All inventory and analytics endpoints require a JWT bearer token obtained
from `/api/v1/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

Supply mutations additionally require the `admin` role.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "supplies", description = "Supply stock management"),
        (name = "usage", description = "Consumption recording and history"),
        (name = "analytics", description = "Recommendations, alerts and savings"),
        (name = "reports", description = "Usage statistics and series"),
        (name = "health", description = "Service status endpoints")
    ),
    paths(
        crate::handlers::supplies::list_supplies,
        crate::handlers::supplies::get_supply,
        crate::handlers::supplies::create_supply,
        crate::handlers::supplies::update_supply,
        crate::handlers::supplies::delete_supply,
        crate::handlers::supplies::record_usage,
        crate::handlers::supplies::list_usage,
        crate::handlers::analytics::get_recommendations,
        crate::handlers::analytics::get_alerts,
        crate::handlers::analytics::get_savings,
        crate::handlers::reports::get_usage_history_series,
        crate::handlers::reports::get_savings_history,
        crate::handlers::reports::get_usage_report,
    ),
    components(
        schemas(
            crate::entities::supplies::Model,
            crate::entities::usage_history::Model,
            crate::handlers::supplies::CreateSupplyRequest,
            crate::handlers::supplies::UpdateSupplyRequest,
            crate::handlers::supplies::RecordUsageRequest,
            crate::handlers::supplies::UsageRecordedResponse,
            crate::services::analytics::OrderRecommendation,
            crate::services::analytics::AlternativeSupply,
            crate::services::analytics::WasteAlert,
            crate::services::analytics::SavingsEstimate,
            crate::services::reports::SupplyUsageReport,
            crate::services::reports::DailyUsageSeries,
            crate::services::reports::MonthlySavingsSeries,
            crate::auth::RegisterRequest,
            crate::auth::LoginRequest,
            crate::auth::TokenResponse,
            crate::auth::UserResponse,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
