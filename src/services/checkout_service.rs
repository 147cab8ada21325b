//! Quoting a selection of cart lines and committing it as an order.

use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        checkout::{CommitRequest, Quote, QuoteLine, QuoteRequest},
        dedup_ids,
        orders::OrderWithItems,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::ActiveModel as OrderItemActive,
        orders::ActiveModel as OrderActive,
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    pricing::{self, Charges, PAYMENT_METHOD_CARD, line_total, shipping_options},
    response::{ApiResponse, Meta},
    services::{
        account_service::{addresses_for, cards_for, ensure_active, owned_address, owned_card},
        convert::{order_from_entity, order_item_from_entity, product_from_entity},
    },
    state::AppState,
};

/// Shipping status given to every freshly committed order.
pub const INITIAL_SHIPPING_STATUS: &str = "Pending";

/// Prices the selected cart lines at current catalog prices.
///
/// Selected ids that are not in the caller's cart are ignored. Lines that exceed current stock
/// are flagged, not rejected; the authoritative check happens on commit.
pub async fn quote(
    state: &AppState,
    user: &AuthUser,
    payload: QuoteRequest,
) -> AppResult<ApiResponse<Quote>> {
    ensure_customer(user)?;
    ensure_active(&state.orm, user).await?;

    let line_ids = dedup_ids(&payload.line_ids);
    if line_ids.is_empty() {
        return Err(AppError::EmptySelection);
    }

    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::Id.is_in(line_ids))
        .order_by_desc(CartCol::AddedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let items: Vec<QuoteLine> = rows
        .into_iter()
        .filter_map(|(line, product)| product.map(|product| (line, product)))
        .map(|(line, product)| QuoteLine {
            line_id: line.id,
            quantity: line.quantity,
            line_total: line_total(line.quantity, product.price),
            in_stock: line.quantity <= product.quantity,
            product: product_from_entity(product),
        })
        .collect();

    if items.is_empty() {
        return Err(AppError::EmptySelection);
    }

    let subtotal = pricing::subtotal(items.iter().map(|i| (i.quantity, i.product.price)));
    let charges = Charges::quote(subtotal, state.tax_rate);

    let addresses = addresses_for(&state.orm, user.user_id).await?;
    let cards = cards_for(&state.orm, user.user_id).await?;

    let quote = Quote {
        user_email: user.email.clone(),
        addresses,
        cards,
        items,
        subtotal: charges.subtotal,
        tax_rate: state.tax_rate,
        tax: charges.tax,
        total: charges.total,
        shipping_options: shipping_options(),
    };

    Ok(ApiResponse::success("Quote", quote, Some(Meta::empty())))
}

/// Turns the selected cart lines into an order, all or nothing.
///
/// Cart lines and their products are locked for the rest of the transaction, so a concurrent
/// commit either sees the lines already gone or waits for the stock this one debits.
pub async fn commit(
    state: &AppState,
    user: &AuthUser,
    payload: CommitRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_customer(user)?;
    let command = payload.validate()?;
    ensure_active(&state.orm, user).await?;

    let txn = state.orm.begin().await?;

    let address = owned_address(&txn, user.user_id, command.address_id).await?;
    let card = owned_card(&txn, user.user_id, command.card_id).await?;

    let lines = if command.line_ids.is_empty() {
        Vec::new()
    } else {
        CartItems::find()
            .filter(CartCol::UserId.eq(user.user_id))
            .filter(CartCol::Id.is_in(command.line_ids.clone()))
            .order_by_asc(CartCol::Id)
            .lock(LockType::Update)
            .all(&txn)
            .await?
    };

    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let mut product_ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    product_ids.sort();
    product_ids.dedup();

    // Ascending id order keeps lock acquisition consistent across concurrent commits.
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let mut priced = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = products.get(&line.product_id).ok_or(AppError::NotFound)?;
        if line.quantity > product.quantity {
            tracing::info!(
                user_id = %user.user_id,
                product_id = %product.id,
                requested = line.quantity,
                available = product.quantity,
                "commit rejected: insufficient stock"
            );
            return Err(AppError::InsufficientStock {
                product_id: product.id,
            });
        }
        priced.push((line, product.price));
    }

    let subtotal = pricing::subtotal(priced.iter().map(|(line, price)| (line.quantity, *price)));
    let charges = Charges::with_shipping(subtotal, state.tax_rate, command.shipping_fee);

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        user_email: Set(user.email.clone()),
        address_id: Set(address.id),
        subtotal: Set(charges.subtotal),
        shipping_fee: Set(charges.shipping_fee),
        tax: Set(charges.tax),
        total: Set(charges.total),
        shipping_method: Set(command.shipping.label().to_string()),
        payment_method: Set(PAYMENT_METHOD_CARD.to_string()),
        shipping_status: Set(Some(INITIAL_SHIPPING_STATUS.to_string())),
        courier: Set(None),
        tracking_number: Set(None),
        remarks: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items = Vec::with_capacity(priced.len());
    for (line, unit_price) in &priced {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(*unit_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(order_item_from_entity(item));

        Products::update_many()
            .col_expr(
                ProdCol::Quantity,
                Expr::col(ProdCol::Quantity).sub(line.quantity),
            )
            .filter(ProdCol::Id.eq(line.product_id))
            .exec(&txn)
            .await?;
    }

    // Only the purchased lines leave the cart.
    let consumed: Vec<Uuid> = lines.iter().map(|line| line.id).collect();
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::Id.is_in(consumed.clone()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        order_id = %order.id,
        lines = consumed.len(),
        total = %order.total,
        "order committed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "line_ids": consumed,
            "card_last4": card.last4,
            "total": order.total.to_string(),
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}
