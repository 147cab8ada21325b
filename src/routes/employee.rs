use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, patch, put},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderWithItems, SetStockRequest, UpdateShippingRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, Product},
    response::ApiResponse,
    routes::params::{ApiPath, OrderListQuery},
    services::employee_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_any_order).delete(cancel_order))
        .route("/orders/{id}/shipping", patch(update_shipping))
        .route("/products/{id}/stock", put(set_stock))
}

#[utoipa::path(
    get,
    path = "/api/employee/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("shipping_status" = Option<String>, Query, description = "Filter by shipping status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = employee_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/employee/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Any order with items", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_any_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = employee_service::get_any_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/employee/orders/{id}/shipping",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateShippingRequest,
    responses(
        (status = 200, description = "Shipping metadata updated", body = ApiResponse<Order>),
        (status = 400, description = "Nothing to update"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_shipping(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    Json(payload): Json<UpdateShippingRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = employee_service::update_shipping(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/employee/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled and stock restored", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = employee_service::cancel_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/employee/products/{id}/stock",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetStockRequest,
    responses(
        (status = 200, description = "Stock set", body = ApiResponse<Product>),
        (status = 400, description = "Negative quantity"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    Json(payload): Json<SetStockRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = employee_service::set_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
