use axum::{
    Json, Router,
    extract::State,
    routing::{delete, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::RemovedCount,
        promotions::{CreatePromotionSlotRequest, SlotCreated},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::SectionType,
    response::ApiResponse,
    routes::params::ApiPath,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/promotions", post(insert_slot))
        .route("/promotions/{section}/{id}", delete(delete_slot))
}

#[utoipa::path(
    post,
    path = "/api/admin/promotions",
    request_body = CreatePromotionSlotRequest,
    responses(
        (status = 200, description = "Slot added", body = ApiResponse<SlotCreated>),
        (status = 400, description = "Invalid slot"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Section is full"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn insert_slot(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePromotionSlotRequest>,
) -> AppResult<Json<ApiResponse<SlotCreated>>> {
    let resp = promotion_service::insert_slot(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/promotions/{section}/{id}",
    params(
        ("section" = SectionType, Path, description = "Carousel or Recommendation"),
        ("id" = Uuid, Path, description = "Slot ID")
    ),
    responses(
        (status = 200, description = "Removed count, 0 when absent", body = ApiResponse<RemovedCount>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_slot(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((section, id)): ApiPath<(SectionType, Uuid)>,
) -> AppResult<Json<ApiResponse<RemovedCount>>> {
    let resp = promotion_service::delete_slot(&state, &user, section, id).await?;
    Ok(Json(resp))
}
