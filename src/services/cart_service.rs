use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        cart::{AddToCartRequest, CartLine, CartList, RemoveCartItemsRequest, RemovedCount},
        dedup_ids,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::{CartItem, Product},
    pricing::line_total,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::account_service::ensure_active,
    state::AppState,
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    added_at: DateTime<Utc>,
    product_id: Uuid,
    name: String,
    category: String,
    sub_category: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
    created_at: DateTime<Utc>,
}

impl From<CartWithProductRow> for CartLine {
    fn from(row: CartWithProductRow) -> Self {
        CartLine {
            id: row.cart_id,
            quantity: row.quantity,
            added_at: row.added_at,
            line_total: line_total(row.quantity, row.price),
            product: Product {
                id: row.product_id,
                name: row.name,
                category: row.category,
                sub_category: row.sub_category,
                description: row.description,
                price: row.price,
                quantity: row.stock,
                created_at: row.created_at,
            },
        }
    }
}

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    ensure_customer(user)?;
    ensure_active(&state.orm, user).await?;

    let (page, limit, offset) = pagination.normalize()?;
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity, ci.added_at,
               p.id AS product_id, p.name, p.category, p.sub_category, p.description,
               p.price, p.quantity AS stock, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.added_at DESC, ci.id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    let items = rows.into_iter().map(CartLine::from).collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Adds `quantity` of a product, merging into the user's existing line for it.
///
/// The merge is a single upsert against the `(user_id, product_id)` unique key, so concurrent
/// adds cannot produce duplicate lines. Stock is checked against the merged total but not
/// reserved; commit re-validates it.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_customer(user)?;
    payload.validate()?;
    ensure_active(&state.orm, user).await?;

    let mut tx = state.pool.begin().await?;

    let stock: Option<(i32,)> =
        sqlx::query_as("SELECT quantity FROM products WHERE id = $1 FOR SHARE")
            .bind(payload.product_id)
            .fetch_optional(&mut *tx)
            .await?;
    let (stock,) = stock.ok_or(AppError::NotFound)?;

    if payload.quantity > stock {
        return Err(AppError::InsufficientStock {
            product_id: payload.product_id,
        });
    }

    let cart_item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING id, user_id, product_id, quantity, added_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .fetch_one(&mut *tx)
    .await?;

    if cart_item.quantity > stock {
        tx.rollback().await?;
        return Err(AppError::InsufficientStock {
            product_id: payload.product_id,
        });
    }

    tx.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        product_id = %payload.product_id,
        quantity = cart_item.quantity,
        "cart line updated"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "added": payload.quantity, "quantity": cart_item.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", cart_item, Some(Meta::empty())))
}

/// Removing a line that is absent or belongs to someone else is a no-op.
pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<RemovedCount>> {
    remove_lines(state, user, &[line_id]).await
}

pub async fn remove_many(
    state: &AppState,
    user: &AuthUser,
    payload: RemoveCartItemsRequest,
) -> AppResult<ApiResponse<RemovedCount>> {
    let line_ids = dedup_ids(&payload.line_ids);
    remove_lines(state, user, &line_ids).await
}

async fn remove_lines(
    state: &AppState,
    user: &AuthUser,
    line_ids: &[Uuid],
) -> AppResult<ApiResponse<RemovedCount>> {
    ensure_customer(user)?;
    ensure_active(&state.orm, user).await?;

    if line_ids.is_empty() {
        return Ok(ApiResponse::ok(RemovedCount { removed: 0 }));
    }

    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)")
        .bind(user.user_id)
        .bind(line_ids)
        .execute(&state.pool)
        .await?;
    let removed = result.rows_affected();

    if removed > 0 {
        audit::record(
            &state.pool,
            user.user_id,
            "cart_remove",
            "cart_items",
            serde_json::json!({ "line_ids": line_ids, "removed": removed }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        RemovedCount { removed },
        Some(Meta::empty()),
    ))
}
