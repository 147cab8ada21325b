use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::{
        checkout::{CommitRequest, Quote, QuoteRequest},
        orders::OrderWithItems,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(quote))
        .route("/commit", post(commit))
}

#[utoipa::path(
    post,
    path = "/api/checkout/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Charges for the selected cart lines", body = ApiResponse<Quote>),
        (status = 422, description = "No selected line is in the cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn quote(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<ApiResponse<Quote>>> {
    let resp = checkout_service::quote(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/commit",
    request_body = CommitRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid shipping choice"),
        (status = 404, description = "Address or card not found"),
        (status = 409, description = "Insufficient stock"),
        (status = 422, description = "No selected line is in the cart"),
        (status = 503, description = "Temporary failure, safe to retry"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn commit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CommitRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = checkout_service::commit(&state, &user, payload).await?;
    Ok(Json(resp))
}
