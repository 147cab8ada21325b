#![allow(dead_code)]

use rust_decimal::Decimal;
use storefront_checkout::{
    db::{create_pool, run_migrations},
    middleware::auth::AuthUser,
    models::Role,
    state::AppState,
};
use uuid::Uuid;

/// Connects to the test database, or returns `None` so the caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 8).await?;
    run_migrations(&pool).await?;

    Ok(Some(AppState::new(pool, Decimal::new(10, 2))))
}

pub async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    let email = format!("{}-{}@example.com", role.as_str(), id.simple());
    sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(&email)
        .bind(role.as_str())
        .execute(&state.pool)
        .await?;

    Ok(AuthUser {
        user_id: id,
        email,
        role,
    })
}

pub async fn disable_user(state: &AppState, user: &AuthUser) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO disabled_users (user_id, email, original_role) VALUES ($1, $2, $3)")
        .bind(user.user_id)
        .bind(&user.email)
        .bind(user.role.as_str())
        .execute(&state.pool)
        .await?;
    Ok(())
}

pub async fn create_address(state: &AppState, user: &AuthUser) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO addresses (id, user_id, address_line, city, state, postal_code)
        VALUES ($1, $2, '1 Test Lane', 'Springfield', 'IL', '62701')
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .execute(&state.pool)
    .await?;
    Ok(id)
}

pub async fn create_card(state: &AppState, user: &AuthUser) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO credit_cards (id, user_id, card_holder, last4, expiry_month, expiry_year, card_type)
        VALUES ($1, $2, 'Test Holder', '1111', 1, 2031, 'Visa')
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .execute(&state.pool)
    .await?;
    Ok(id)
}

pub async fn create_product(state: &AppState, price: Decimal, stock: i32) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO products (id, name, category, sub_category, price, quantity)
        VALUES ($1, $2, 'Books', 'Fiction', $3, $4)
        "#,
    )
    .bind(id)
    .bind(format!("Test Book {}", id.simple()))
    .bind(price)
    .bind(stock)
    .execute(&state.pool)
    .await?;
    Ok(id)
}

pub async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let (quantity,): (i32,) = sqlx::query_as("SELECT quantity FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(quantity)
}

pub async fn cart_line_ids(state: &AppState, user: &AuthUser) -> anyhow::Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM cart_items WHERE user_id = $1 ORDER BY added_at, id")
            .bind(user.user_id)
            .fetch_all(&state.pool)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn line_for(state: &AppState, user: &AuthUser, product_id: Uuid) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) =
        sqlx::query_as("SELECT id FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .fetch_one(&state.pool)
            .await?;
    Ok(id)
}
