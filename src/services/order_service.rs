use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderWithItems},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        account_service::ensure_active,
        convert::{order_from_entity, order_item_from_entity},
    },
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_customer(user)?;
    ensure_active(&state.orm, user).await?;
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    let (orders, meta) = page_orders(state, condition, query).await?;
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Another user's order is reported as missing.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_customer(user)?;
    ensure_active(&state.orm, user).await?;
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Shared by the customer and employee listings; `condition` scopes the rows.
pub(crate) async fn page_orders(
    state: &AppState,
    mut condition: Condition,
    query: OrderListQuery,
) -> AppResult<(Vec<Order>, Meta)> {
    let (page, limit, offset) = query.pagination().normalize()?;
    if let Some(status) = query.shipping_status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::ShippingStatus.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok((orders, Meta::new(page, limit, total)))
}

pub(crate) async fn with_items<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderWithItems> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(OrderWithItems {
        order: order_from_entity(order),
        items,
    })
}
