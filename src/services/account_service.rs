//! Read-only view of the identity provider and the account records it owns.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        credit_cards::{Column as CardCol, Entity as CreditCards},
        disabled_users::Entity as DisabledUsers,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, PaymentCard},
    services::convert::{address_from_entity, card_from_entity},
};

pub async fn is_disabled<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<bool> {
    let disabled = DisabledUsers::find_by_id(user_id).one(conn).await?;
    Ok(disabled.is_some())
}

/// Reject disabled accounts before any cart, checkout or order work happens.
pub async fn ensure_active<C: ConnectionTrait>(conn: &C, user: &AuthUser) -> AppResult<()> {
    if is_disabled(conn, user.user_id).await? {
        tracing::info!(user_id = %user.user_id, "rejected disabled account");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub async fn addresses_for<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Vec<Address>> {
    let items = Addresses::find()
        .filter(AddressCol::UserId.eq(user_id))
        .order_by_asc(AddressCol::City)
        .all(conn)
        .await?
        .into_iter()
        .map(address_from_entity)
        .collect();
    Ok(items)
}

pub async fn cards_for<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Vec<PaymentCard>> {
    let items = CreditCards::find()
        .filter(CardCol::UserId.eq(user_id))
        .order_by_asc(CardCol::ExpiryYear)
        .all(conn)
        .await?
        .into_iter()
        .map(card_from_entity)
        .collect();
    Ok(items)
}

/// Foreign or missing addresses are both `NotFound`.
pub async fn owned_address<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    address_id: Uuid,
) -> AppResult<Address> {
    Addresses::find()
        .filter(AddressCol::Id.eq(address_id))
        .filter(AddressCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .map(address_from_entity)
        .ok_or(AppError::NotFound)
}

pub async fn owned_card<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    card_id: Uuid,
) -> AppResult<PaymentCard> {
    CreditCards::find()
        .filter(CardCol::Id.eq(card_id))
        .filter(CardCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .map(card_from_entity)
        .ok_or(AppError::NotFound)
}
