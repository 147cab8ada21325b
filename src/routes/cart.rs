use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartList, RemoveCartItemsRequest, RemovedCount},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartItem,
    response::ApiResponse,
    routes::params::{ApiPath, Pagination},
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list).post(add_to_cart))
        .route("/remove", post(remove_many))
        .route("/{line_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Cart lines with live product data", body = ApiResponse<CartList>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let resp = cart_service::list_cart(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Cart line created or merged", body = ApiResponse<CartItem>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_to_cart(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{line_id}",
    params(
        ("line_id" = Uuid, Path, description = "Cart line ID")
    ),
    responses(
        (status = 200, description = "Removed count, 0 when the line was absent", body = ApiResponse<RemovedCount>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(line_id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<RemovedCount>>> {
    let resp = cart_service::remove_from_cart(&state, &user, line_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/remove",
    request_body = RemoveCartItemsRequest,
    responses(
        (status = 200, description = "Removed count", body = ApiResponse<RemovedCount>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_many(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RemoveCartItemsRequest>,
) -> AppResult<Json<ApiResponse<RemovedCount>>> {
    let resp = cart_service::remove_many(&state, &user, payload).await?;
    Ok(Json(resp))
}
