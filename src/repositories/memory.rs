//! In-memory repositories for tests.
//!
//! They follow the same contract as the Diesel implementations, including
//! soft delete, and count write calls so tests can assert that validation
//! failures never reach the store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jiff::Zoned;

use crate::error::AppError;
use crate::models::{NewProduct, NewUser, Product, User};
use crate::repositories::{ProductRepository, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
    writes: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let user = User {
            id: rows.len() as i64 + 1,
            name: new_user.name,
            email: new_user.email,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == user_id).cloned())
    }
}

struct StoredProduct {
    product: Product,
    deleted: bool,
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: Mutex<Vec<StoredProduct>>,
    writes: AtomicUsize,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of rows including soft-deleted ones.
    pub fn stored(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let now = Zoned::now().datetime();
        let product = Product {
            id: rows.len() as i64 + 1,
            name: new_product.name,
            price: new_product.price,
            stock: new_product.stock,
            created_at: now,
            updated_at: now,
        };
        rows.push(StoredProduct {
            product: product.clone(),
            deleted: false,
        });
        Ok(product)
    }

    async fn find_by_id(&self, product_id: i64) -> Result<Option<Product>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|row| !row.deleted && row.product.id == product_id)
            .map(|row| row.product.clone()))
    }

    async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| !row.deleted)
            .map(|row| row.product.clone())
            .collect())
    }

    async fn update(&self, product: Product) -> Result<Product, AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| !row.deleted && row.product.id == product.id)
            .ok_or_else(|| AppError::not_found_by_id("product", product.id))?;

        row.product.name = product.name;
        row.product.price = product.price;
        row.product.stock = product.stock;
        row.product.updated_at = Zoned::now().datetime();
        Ok(row.product.clone())
    }

    async fn delete(&self, product_id: i64) -> Result<usize, AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|row| !row.deleted && row.product.id == product_id)
        {
            Some(row) => {
                row.deleted = true;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
