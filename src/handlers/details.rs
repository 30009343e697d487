use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthenticatedUser, entities::purchase_order_detail, errors::ApiError,
    handlers::AppState, services::DetailInput,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};

/// List the line items of a purchase order
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}/details",
    params(("id" = i32, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Line items", body = [purchase_order_detail::Model]),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-order-details"
)]
pub async fn list_details(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(po_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let details = state
        .services
        .details
        .list(po_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(details))
}

/// Add a line item; order totals are recomputed
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/details",
    params(("id" = i32, Path, description = "Purchase order id")),
    request_body = DetailInput,
    responses(
        (status = 201, description = "Line item created", body = purchase_order_detail::Model),
        (status = 400, description = "Invalid amounts", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-order-details"
)]
pub async fn create_detail(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(po_id): Path<i32>,
    Json(payload): Json<DetailInput>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .details
        .create(po_id, payload, Some(user.user_id.as_str()))
        .await
        .map_err(map_service_error)?;
    Ok(created_response(detail))
}

/// Replace a line item; order totals are recomputed
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}/details/{detail_id}",
    params(
        ("id" = i32, Path, description = "Purchase order id"),
        ("detail_id" = i32, Path, description = "Line item id")
    ),
    request_body = DetailInput,
    responses(
        (status = 200, description = "Line item updated", body = purchase_order_detail::Model),
        (status = 400, description = "Invalid amounts", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or line item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-order-details"
)]
pub async fn update_detail(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((po_id, detail_id)): Path<(i32, i32)>,
    Json(payload): Json<DetailInput>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .details
        .update(po_id, detail_id, payload, Some(user.user_id.as_str()))
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Remove a line item; order totals are recomputed
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}/details/{detail_id}",
    params(
        ("id" = i32, Path, description = "Purchase order id"),
        ("detail_id" = i32, Path, description = "Line item id")
    ),
    responses(
        (status = 204, description = "Line item deleted"),
        (status = 404, description = "Order or line item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "purchase-order-details"
)]
pub async fn delete_detail(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((po_id, detail_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .details
        .delete(po_id, detail_id, Some(user.user_id.as_str()))
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn detail_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/details", get(list_details).post(create_detail))
        .route(
            "/:id/details/:detail_id",
            put(update_detail).delete(delete_detail),
        )
}
