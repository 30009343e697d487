use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams, SearchParams,
};
use crate::{
    auth::AuthenticatedUser,
    entities::purchase_order,
    errors::ApiError,
    handlers::AppState,
    services::{
        CreatePurchaseOrderRequest, ExportRow, PurchaseOrderWithDetails,
        UpdatePurchaseOrderRequest,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NextNumberResponse {
    #[schema(example = "PO8")]
    pub po_no: String,
}

/// List purchase orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of purchase orders", body = PaginatedResponse<purchase_order::Model>),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .services
        .purchase_orders
        .list(params.page, params.limit)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::from(page)))
}

/// Search purchase orders by number, type, pay mode or company code
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching purchase orders", body = PaginatedResponse<purchase_order::Model>),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn search_purchase_orders(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .services
        .purchase_orders
        .search(&params.query, params.page, params.limit)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::from(page)))
}

/// Number the next created purchase order would receive
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/next-number",
    responses(
        (status = 200, description = "Next purchase order number", body = NextNumberResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn next_purchase_order_number(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let po_no = state
        .services
        .purchase_orders
        .next_po_number()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(NextNumberResponse { po_no }))
}

/// Flattened export rows, one per line item
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/export",
    responses(
        (status = 200, description = "Export rows", body = [ExportRow])
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn export_purchase_orders(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .services
        .purchase_orders
        .export_rows()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

/// Create a new purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created", body = PurchaseOrderWithDetails),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Parent order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Number taken by a concurrent create", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .purchase_orders
        .create(payload, Some(user.user_id.as_str()))
        .await
        .map_err(map_service_error)?;

    info!(po_id = created.order.id, po_no = %created.order.po_no, "Purchase order created");
    Ok(created_response(created))
}

/// Get a purchase order with its line items
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i32, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order", body = PurchaseOrderWithDetails),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// Update a purchase order and, optionally, its line items
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i32, Path, description = "Purchase order id")),
    request_body = UpdatePurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order updated", body = PurchaseOrderWithDetails),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Purchase order number already in use", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .purchase_orders
        .update(id, payload, Some(user.user_id.as_str()))
        .await
        .map_err(map_service_error)?;
    Ok(success_response(updated))
}

/// Delete a purchase order, its line items, and detach its children
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i32, Path, description = "Purchase order id")),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .purchase_orders
        .delete(id)
        .await
        .map_err(map_service_error)?;

    info!(po_id = id, user_id = %user.user_id, "Purchase order deleted");
    Ok(no_content_response())
}

/// Orders whose parent is this order
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/children",
    params(("id" = i32, Path, description = "Parent purchase order id")),
    responses(
        (status = 200, description = "Child orders", body = [purchase_order::Model]),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-orders"
)]
pub async fn list_child_orders(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let children = state
        .services
        .purchase_orders
        .children(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(children))
}

/// Creates the router for purchase order endpoints
pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_purchase_orders).post(create_purchase_order),
        )
        .route("/search", get(search_purchase_orders))
        .route("/next-number", get(next_purchase_order_number))
        .route("/export", get(export_purchase_orders))
        .route(
            "/:id",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
        .route("/:id/children", get(list_child_orders))
        .merge(super::details::detail_routes())
}
