use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::dedup_ids,
    error::{AppError, AppResult},
    models::{Address, PaymentCard, Product},
    pricing::{ShippingMethod, ShippingOption},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub line_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteLine {
    pub line_id: Uuid,
    pub quantity: i32,
    pub product: Product,
    #[schema(value_type = String)]
    pub line_total: Decimal,
    /// False when the line asks for more than the product currently has.
    pub in_stock: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Quote {
    pub user_email: String,
    pub addresses: Vec<Address>,
    pub cards: Vec<PaymentCard>,
    pub items: Vec<QuoteLine>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub tax_rate: Decimal,
    #[schema(value_type = String)]
    pub tax: Decimal,
    /// Subtotal plus tax; shipping is only added when the order is committed.
    #[schema(value_type = String)]
    pub total: Decimal,
    pub shipping_options: Vec<ShippingOption>,
}

/// Either `shipping_method` or the legacy numeric `shipping_fee` must be given.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommitRequest {
    pub line_ids: Vec<Uuid>,
    pub address_id: Uuid,
    pub card_id: Uuid,
    pub shipping_method: Option<ShippingMethod>,
    #[schema(value_type = Option<String>)]
    pub shipping_fee: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCommand {
    pub line_ids: Vec<Uuid>,
    pub address_id: Uuid,
    pub card_id: Uuid,
    pub shipping: ShippingMethod,
    /// The fee the caller chose; a legacy fee is charged as sent.
    pub shipping_fee: Decimal,
}

impl CommitRequest {
    pub fn validate(self) -> AppResult<CommitCommand> {
        let (shipping, shipping_fee) = match (self.shipping_method, self.shipping_fee) {
            (Some(method), None) => (method, method.fee()),
            (None, Some(fee)) => {
                let method = ShippingMethod::from_fee(fee).ok_or_else(|| {
                    AppError::BadRequest("shipping_fee must not be negative".to_string())
                })?;
                (method, fee)
            }
            (Some(method), Some(fee)) => {
                if ShippingMethod::from_fee(fee) != Some(method) {
                    return Err(AppError::BadRequest(
                        "shipping_fee does not match shipping_method".to_string(),
                    ));
                }
                (method, fee)
            }
            (None, None) => {
                return Err(AppError::BadRequest(
                    "shipping_method is required".to_string(),
                ));
            }
        };

        Ok(CommitCommand {
            line_ids: dedup_ids(&self.line_ids),
            address_id: self.address_id,
            card_id: self.card_id,
            shipping,
            shipping_fee,
        })
    }
}
