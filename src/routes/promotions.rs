use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::promotions::PromotionSections,
    error::AppResult,
    models::SectionType,
    response::ApiResponse,
    routes::params::ApiPath,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_slots))
        .route("/{section}/{id}/image", get(slot_image))
}

#[utoipa::path(
    get,
    path = "/api/promotions",
    responses(
        (status = 200, description = "Carousel and recommendation slots", body = ApiResponse<PromotionSections>)
    ),
    tag = "Promotions"
)]
pub async fn list_slots(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PromotionSections>>> {
    let resp = promotion_service::list_slots(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/promotions/{section}/{id}/image",
    params(
        ("section" = SectionType, Path, description = "Carousel or Recommendation"),
        ("id" = Uuid, Path, description = "Slot ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Promotions"
)]
pub async fn slot_image(
    State(state): State<AppState>,
    ApiPath((section, id)): ApiPath<(SectionType, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let image = promotion_service::slot_image(&state, section, id).await?;
    let headers = [
        (header::CONTENT_TYPE, image.mime_type),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
    ];
    Ok((headers, image.data))
}
