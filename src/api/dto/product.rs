//! Product-related DTOs for API requests and responses.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::Product;

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating or replacing a product.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    #[schema(min_length = 1, max_length = 255, example = "Widget")]
    pub name: String,
    #[validate(range(
        exclusive_min = 0.0,
        max = 99_999_999.99,
        message = "Price must be greater than 0 and at most 99999999.99"
    ))]
    #[schema(exclusive_minimum = 0.0, maximum = 99_999_999.99, example = 9.99)]
    pub price: f64,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    #[schema(minimum = 0, example = 5)]
    pub stock: i32,
}

impl ProductRequest {
    /// Converts the JSON number to a two-decimal price.
    ///
    /// Goes through the shortest decimal rendering of the float so `9.99`
    /// stays `9.99` instead of its binary expansion.
    pub fn decimal_price(&self) -> AppResult<BigDecimal> {
        let price = BigDecimal::from_str(&self.price.to_string())
            .map_err(|_| AppError::validation("price", "Price must be a finite number"))?;
        Ok(price.round(2))
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response body for product data.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price.to_f64().unwrap_or_default(),
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
