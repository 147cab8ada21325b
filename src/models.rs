use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Featured-item section on the storefront home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SectionType {
    Carousel,
    Recommendation,
}

impl SectionType {
    pub const ALL: [SectionType; 2] = [SectionType::Carousel, SectionType::Recommendation];

    pub fn capacity(&self) -> u64 {
        match self {
            SectionType::Carousel => 4,
            SectionType::Recommendation => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Carousel => "Carousel",
            SectionType::Recommendation => "Recommendation",
        }
    }

    /// Key for `pg_advisory_xact_lock`, distinct per section.
    pub fn lock_key(&self) -> i64 {
        const BASE: i64 = 0x5107_0000;
        match self {
            SectionType::Carousel => BASE + 1,
            SectionType::Recommendation => BASE + 2,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Carousel" => Ok(SectionType::Carousel),
            "Recommendation" => Ok(SectionType::Recommendation),
            other => Err(format!("unknown section type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub address_id: Uuid,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub shipping_fee: Decimal,
    #[schema(value_type = String)]
    pub tax: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub shipping_method: String,
    pub payment_method: String,
    pub shipping_status: Option<String>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A saved card as shown to its owner; only the last four digits are ever stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentCard {
    pub id: Uuid,
    pub card_holder: String,
    pub last4: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub card_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromotionSlot {
    pub id: Uuid,
    pub section_type: SectionType,
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub image_mime_type: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}
