use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Order, OrderItem},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Absent fields are left unchanged; an empty courier, tracking number or remark clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateShippingRequest {
    pub shipping_status: Option<String>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingUpdate {
    pub shipping_status: Option<String>,
    pub courier: Option<Option<String>>,
    pub tracking_number: Option<Option<String>>,
    pub remarks: Option<Option<String>>,
}

fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim();
        if v.is_empty() { None } else { Some(v.to_string()) }
    })
}

impl UpdateShippingRequest {
    pub fn validate(self) -> AppResult<ShippingUpdate> {
        let shipping_status = match self.shipping_status {
            Some(status) if status.trim().is_empty() => {
                return Err(AppError::BadRequest(
                    "shipping_status must not be empty".to_string(),
                ));
            }
            Some(status) => Some(status.trim().to_string()),
            None => None,
        };

        let update = ShippingUpdate {
            shipping_status,
            courier: clearable(self.courier),
            tracking_number: clearable(self.tracking_number),
            remarks: clearable(self.remarks),
        };

        if update.shipping_status.is_none()
            && update.courier.is_none()
            && update.tracking_number.is_none()
            && update.remarks.is_none()
        {
            return Err(AppError::BadRequest("nothing to update".to_string()));
        }

        Ok(update)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStockRequest {
    pub quantity: i32,
}
