use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Product,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl AddToCartRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveCartItemsRequest {
    pub line_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
    pub product: Product,
    #[schema(value_type = String)]
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemovedCount {
    pub removed: u64,
}
