use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{OrderList, OrderWithItems, SetStockRequest, UpdateShippingRequest},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_employee},
    models::{Order, Product},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{
        account_service::ensure_active,
        convert::{order_from_entity, product_from_entity},
        order_service::{page_orders, with_items},
    },
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_employee(user)?;
    ensure_active(&state.orm, user).await?;
    let (orders, meta) = page_orders(state, Condition::all(), query).await?;
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_any_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_employee(user)?;
    ensure_active(&state.orm, user).await?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = with_items(&state.orm, order).await?;
    Ok(ApiResponse::success(
        "Order found",
        data,
        Some(Meta::empty()),
    ))
}

/// Touches only the shipping metadata; money fields and items are never rewritten.
pub async fn update_shipping(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateShippingRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_employee(user)?;
    let update = payload.validate()?;
    ensure_active(&state.orm, user).await?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: OrderActive = existing.into();
    if let Some(status) = update.shipping_status {
        active.shipping_status = Set(Some(status));
    }
    if let Some(courier) = update.courier {
        active.courier = Set(courier);
    }
    if let Some(tracking_number) = update.tracking_number {
        active.tracking_number = Set(tracking_number);
    }
    if let Some(remarks) = update.remarks {
        active.remarks = Set(remarks);
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, status = ?order.shipping_status, "shipping updated");
    audit::record(
        &state.pool,
        user.user_id,
        "order_shipping_update",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "shipping_status": order.shipping_status,
            "courier": order.courier,
            "tracking_number": order.tracking_number,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Deletes an order with its items and puts the purchased units back into stock.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_employee(user)?;
    ensure_active(&state.orm, user).await?;

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let snapshot = with_items(&txn, order.clone()).await?;

    // Same lock order as commit: ascending product id.
    let mut restock: Vec<(Uuid, i32)> = snapshot
        .items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();
    restock.sort_by_key(|(product_id, _)| *product_id);

    for (product_id, quantity) in restock {
        Products::update_many()
            .col_expr(ProdCol::Quantity, Expr::col(ProdCol::Quantity).add(quantity))
            .filter(ProdCol::Id.eq(product_id))
            .exec(&txn)
            .await?;
    }

    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    order.delete(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %id, items = snapshot.items.len(), "order cancelled");
    audit::record(
        &state.pool,
        user.user_id,
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order cancelled",
        snapshot,
        Some(Meta::empty()),
    ))
}

pub async fn set_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetStockRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_employee(user)?;
    if payload.quantity < 0 {
        return Err(AppError::BadRequest("quantity cannot be negative".into()));
    }
    ensure_active(&state.orm, user).await?;

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let previous = product.quantity;
    let mut active: ProductActive = product.into();
    active.quantity = Set(payload.quantity);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(product_id = %updated.id, previous, quantity = updated.quantity, "stock set");
    audit::record(
        &state.pool,
        user.user_id,
        "stock_update",
        "products",
        serde_json::json!({ "product_id": updated.id, "previous": previous, "quantity": updated.quantity }),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock updated",
        product_from_entity(updated),
        Some(Meta::empty()),
    ))
}
