use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Role;

/// Claims issued by the identity provider.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}
