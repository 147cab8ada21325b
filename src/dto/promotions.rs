use base64::{Engine as _, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{PromotionSlot, SectionType},
};

const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Raster formats served back inline; scriptable types such as SVG are refused.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromotionSlotRequest {
    pub section_type: SectionType,
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub description: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    /// Standard base64 of the image bytes.
    pub image_base64: String,
    pub image_mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromotionSlot {
    pub section_type: SectionType,
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub description: String,
    pub price: Decimal,
    pub image_data: Vec<u8>,
    pub image_mime_type: String,
}

fn required(field: &str, value: String) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value)
}

impl CreatePromotionSlotRequest {
    pub fn validate(self) -> AppResult<NewPromotionSlot> {
        let name = required("name", self.name)?;
        let category = required("category", self.category)?;
        let sub_category = required("sub_category", self.sub_category)?;
        let description = required("description", self.description)?;
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::BadRequest(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }

        let max_price = Decimal::new(9_999_999, 2);
        if self.price <= Decimal::ZERO || self.price > max_price {
            return Err(AppError::BadRequest(
                "price must be between 0.01 and 99999.99".to_string(),
            ));
        }

        let image_mime_type = required("image_mime_type", self.image_mime_type)?.to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&image_mime_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "image_mime_type must be one of {}",
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }
        let image_data = STANDARD
            .decode(self.image_base64.trim())
            .map_err(|_| AppError::BadRequest("image_base64 is not valid base64".to_string()))?;
        if image_data.is_empty() {
            return Err(AppError::BadRequest("image is required".to_string()));
        }

        Ok(NewPromotionSlot {
            section_type: self.section_type,
            name,
            category,
            sub_category,
            description,
            price: self.price,
            image_data,
            image_mime_type,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromotionSections {
    pub carousel: Vec<PromotionSlot>,
    pub recommendations: Vec<PromotionSlot>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotCreated {
    pub id: Uuid,
}
