//! Product service for business logic operations.
//!
//! Owns the product field rules, which apply to both create and update:
//! the name must be non-empty after trimming, the price strictly positive and
//! the stock non-negative. A rejected request never reaches the repository.

use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};

use crate::error::{AppError, AppResult};
use crate::models::{NewProduct, Product};
use crate::repositories::ProductRepository;

/// Product service for handling product-related business logic.
#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    /// Creates a new ProductService with the given repository.
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    /// Creates a new product after validating its fields.
    ///
    /// # Errors
    /// `AppError::Validation` if a field rule fails; store errors unchanged.
    pub async fn create_product(&self, name: String, price: BigDecimal, stock: i32) -> AppResult<Product> {
        validate_fields(&name, &price, stock)?;

        let product = self.repo.create(NewProduct { name, price, stock }).await?;
        tracing::debug!(product_id = product.id, "Product created");
        Ok(product)
    }

    /// Gets a product by its ID. `None` if missing or deleted.
    pub async fn get_product(&self, id: i64) -> AppResult<Option<Product>> {
        self.repo.find_by_id(id).await
    }

    /// Lists all products that have not been deleted.
    pub async fn get_all_products(&self) -> AppResult<Vec<Product>> {
        self.repo.find_all().await
    }

    /// Replaces name, price and stock of an existing product.
    ///
    /// The product is read first; a missing product fails with
    /// `AppError::NotFound` and no write is issued.
    pub async fn update_product(
        &self,
        id: i64,
        name: String,
        price: BigDecimal,
        stock: i32,
    ) -> AppResult<Product> {
        validate_fields(&name, &price, stock)?;

        let mut product = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found_by_id("product", id))?;

        product.replace_fields(name, price, stock);
        let updated = self.repo.update(product).await?;
        tracing::debug!(product_id = id, "Product updated");
        Ok(updated)
    }

    /// Soft-deletes a product.
    ///
    /// # Errors
    /// `AppError::NotFound` if no live product has this id.
    pub async fn delete_product(&self, id: i64) -> AppResult<()> {
        let affected = self.repo.delete(id).await?;
        if affected == 0 {
            return Err(AppError::not_found_by_id("product", id));
        }
        tracing::debug!(product_id = id, "Product deleted");
        Ok(())
    }
}

fn validate_fields(name: &str, price: &BigDecimal, stock: i32) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name", "Product name must not be empty"));
    }
    if price <= &BigDecimal::zero() {
        return Err(AppError::validation("price", "Price must be greater than 0"));
    }
    if stock < 0 {
        return Err(AppError::validation("stock", "Stock must not be negative"));
    }
    Ok(())
}
