use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        cart::RemovedCount,
        promotions::{CreatePromotionSlotRequest, PromotionSections, SlotCreated},
    },
    entity::promotion_slots::{ActiveModel as SlotActive, Column as SlotCol, Entity as PromotionSlots},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::SectionType,
    response::{ApiResponse, Meta},
    services::{account_service::ensure_active, convert::slot_from_entity},
    state::AppState,
};

#[derive(Debug)]
pub struct SlotImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Home page sections, oldest slot first.
pub async fn list_slots(state: &AppState) -> AppResult<ApiResponse<PromotionSections>> {
    let slots = PromotionSlots::find()
        .order_by_asc(SlotCol::CreatedAt)
        .order_by_asc(SlotCol::Id)
        .all(&state.orm)
        .await?;

    let mut sections = PromotionSections {
        carousel: Vec::new(),
        recommendations: Vec::new(),
    };
    for slot in slots.into_iter().filter_map(slot_from_entity) {
        match slot.section_type {
            SectionType::Carousel => sections.carousel.push(slot),
            SectionType::Recommendation => sections.recommendations.push(slot),
        }
    }

    Ok(ApiResponse::success("Promotions", sections, Some(Meta::empty())))
}

pub async fn slot_image(state: &AppState, section: SectionType, id: Uuid) -> AppResult<SlotImage> {
    let slot = PromotionSlots::find()
        .filter(SlotCol::Id.eq(id))
        .filter(SlotCol::SectionType.eq(section.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if slot.image_data.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(SlotImage {
        mime_type: slot.image_mime_type,
        data: slot.image_data,
    })
}

/// Inserts a slot unless its section is already at capacity.
///
/// The count and the insert run under a transaction-scoped advisory lock for the section, so
/// concurrent inserts cannot both observe room for one more slot.
pub async fn insert_slot(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePromotionSlotRequest,
) -> AppResult<ApiResponse<SlotCreated>> {
    ensure_admin(user)?;
    let slot = payload.validate()?;
    ensure_active(&state.orm, user).await?;
    let section = slot.section_type;

    let txn = state.orm.begin().await?;

    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [section.lock_key().into()],
    ))
    .await?;

    let current = PromotionSlots::find()
        .filter(SlotCol::SectionType.eq(section.as_str()))
        .count(&txn)
        .await?;
    if current >= section.capacity() {
        tracing::info!(%section, current, "promotion slot rejected: section full");
        return Err(AppError::CapacityExceeded { section });
    }

    let created = SlotActive {
        id: Set(Uuid::new_v4()),
        section_type: Set(section.as_str().to_string()),
        name: Set(slot.name),
        category: Set(slot.category),
        sub_category: Set(slot.sub_category),
        description: Set(slot.description),
        price: Set(slot.price),
        image_data: Set(slot.image_data),
        image_mime_type: Set(slot.image_mime_type),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(%section, slot_id = %created.id, "promotion slot added");
    audit::record(
        &state.pool,
        user.user_id,
        "promotion_insert",
        "promotion_slots",
        serde_json::json!({ "slot_id": created.id, "section": section.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Promotion added",
        SlotCreated { id: created.id },
        Some(Meta::empty()),
    ))
}

/// Removing a missing slot is not an error.
pub async fn delete_slot(
    state: &AppState,
    user: &AuthUser,
    section: SectionType,
    id: Uuid,
) -> AppResult<ApiResponse<RemovedCount>> {
    ensure_admin(user)?;
    ensure_active(&state.orm, user).await?;

    let result = PromotionSlots::delete_many()
        .filter(SlotCol::Id.eq(id))
        .filter(SlotCol::SectionType.eq(section.as_str()))
        .exec(&state.orm)
        .await?;

    if result.rows_affected > 0 {
        audit::record(
            &state.pool,
            user.user_id,
            "promotion_delete",
            "promotion_slots",
            serde_json::json!({ "slot_id": id, "section": section.as_str() }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Promotion removed",
        RemovedCount {
            removed: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}
