use chrono::Duration;
use rust_decimal::Decimal;
use storefront_checkout::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    middleware::auth::issue_token,
    models::Role,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", Role::Admin).await?;
    let employee_id = ensure_user(&pool, "employee@example.com", Role::Employee).await?;
    let customer_id = ensure_user(&pool, "customer@example.com", Role::Customer).await?;
    seed_customer_account(&pool, customer_id).await?;
    seed_products(&pool).await?;

    println!("Seed completed.");

    // Tokens stand in for the identity provider during local development.
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        for (id, email, role) in [
            (admin_id, "admin@example.com", Role::Admin),
            (employee_id, "employee@example.com", Role::Employee),
            (customer_id, "customer@example.com", Role::Customer),
        ] {
            let token = issue_token(&secret, id, email, role, Duration::days(7))?;
            println!("{} ({}): {token}", email, role.as_str());
        }
    } else {
        println!("JWT_SECRET not set; skipping dev tokens");
    }

    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, role: Role) -> anyhow::Result<Uuid> {
    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user_id)
}

async fn seed_customer_account(pool: &sqlx::PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO addresses (id, user_id, address_line, city, state, postal_code)
        VALUES ($1, $2, '12 Harbour St', 'Sydney', 'NSW', '2000')
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO credit_cards (id, user_id, card_holder, last4, expiry_month, expiry_year, card_type)
        VALUES ($1, $2, 'Demo Customer', '4242', 12, 2030, 'Visa')
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;

    println!("Seeded customer address and card");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        ("The Long Road", "Books", "Fiction", Decimal::new(1999, 2), 40),
        ("Night Drive OST", "Music", "Soundtrack", Decimal::new(1450, 2), 25),
        ("Harbour Lights", "Movies", "Drama", Decimal::new(2499, 2), 12),
        ("Pocket Chess", "Games", "Board", Decimal::new(999, 2), 3),
    ];

    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Products already present");
        return Ok(());
    }

    for (name, category, sub_category, price, quantity) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, sub_category, price, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(category)
        .bind(sub_category)
        .bind(price)
        .bind(quantity)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
