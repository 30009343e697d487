use axum::{routing::get, Json, Router};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Procurement API",
        version = "1.0.0",
        description = r#"
# Purchase Orders

Create, revise and track purchase orders and their line items.

## Derived amounts

Line `total_price`, `vds` and `tds` are computed from quantity, unit price,
discount and the VDS/TDS percentages unless a value is supplied, in which case
it is stored as given. Order totals are always recomputed from the stored lines.

## Authentication

Everything except sign-up, login and health needs a bearer token:

```
Authorization: Bearer <token>
```

## Pagination

List and search return `{items, pagination: {totalItems, currentPage, pageSize, totalPages}}`.
Query parameters are `page` (1-based) and `limit`.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "purchase-orders", description = "Purchase order lifecycle"),
        (name = "purchase-order-details", description = "Line items of a purchase order"),
        (name = "auth", description = "Accounts and tokens"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Purchase orders
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::search_purchase_orders,
        crate::handlers::purchase_orders::next_purchase_order_number,
        crate::handlers::purchase_orders::export_purchase_orders,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,
        crate::handlers::purchase_orders::list_child_orders,

        // Line items
        crate::handlers::details::list_details,
        crate::handlers::details::create_detail,
        crate::handlers::details::update_detail,
        crate::handlers::details::delete_detail,

        // Auth
        crate::handlers::auth::sign_up,
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::handlers::common::Pagination,
            crate::handlers::purchase_orders::NextNumberResponse,
            crate::entities::purchase_order::Model,
            crate::entities::purchase_order_detail::Model,
            crate::services::CreatePurchaseOrderRequest,
            crate::services::UpdatePurchaseOrderRequest,
            crate::services::DetailInput,
            crate::services::PurchaseOrderWithDetails,
            crate::services::ExportRow,
            crate::pricing::OrderTotals,
            crate::handlers::auth::SignUpRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::UserResponse,
            crate::auth::TokenResponse,
            crate::handlers::health::HealthResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerSecurity)
)]
pub struct ApiDocV1;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}

/// Serves the generated document at `/api-docs/openapi.json`.
pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}
