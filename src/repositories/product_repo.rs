//! Product repository for async database operations.
//!
//! Deletion is soft: it stamps `deleted_at`, and every read or update here
//! only considers rows where `deleted_at IS NULL`.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use diesel::dsl::{self, now};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{NewProduct, Product};
use crate::schema::products;

/// Persistence operations for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a product and returns it with id and timestamps filled in.
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError>;

    /// Finds a live product by id. `None` when missing or soft-deleted.
    async fn find_by_id(&self, product_id: i64) -> Result<Option<Product>, AppError>;

    /// Lists all live products ordered by id.
    async fn find_all(&self) -> Result<Vec<Product>, AppError>;

    /// Replaces name, price and stock of the product with `product.id`.
    ///
    /// Does not check existence beforehand; a row that is gone by the time the
    /// statement runs yields `AppError::NotFound`.
    async fn update(&self, product: Product) -> Result<Product, AppError>;

    /// Soft-deletes a product and returns the number of affected rows.
    async fn delete(&self, product_id: i64) -> Result<usize, AppError>;
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct ProductRow {
    id: i64,
    name: String,
    price: BigDecimal,
    stock: i32,
    created_at: jiff_diesel::DateTime,
    updated_at: jiff_diesel::DateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
struct NewProductRow {
    name: String,
    price: BigDecimal,
    stock: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
struct ProductChangeset {
    name: String,
    price: BigDecimal,
    stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at.to_jiff(),
            updated_at: row.updated_at.to_jiff(),
        }
    }
}

impl From<NewProduct> for NewProductRow {
    fn from(product: NewProduct) -> Self {
        Self {
            name: product.name,
            price: product.price,
            stock: product.stock,
        }
    }
}

type LiveProducts = dsl::Filter<products::table, dsl::IsNull<products::deleted_at>>;
type LiveProduct = dsl::Filter<LiveProducts, dsl::Eq<products::id, i64>>;
type ProductChanges = (ProductChangeset, dsl::Eq<products::updated_at, now>);
type SoftDeleteChanges = (
    dsl::Eq<products::deleted_at, dsl::Nullable<now>>,
    dsl::Eq<products::updated_at, now>,
);

/// Every statement below starts from here, so soft-deleted rows stay invisible.
fn live_products() -> LiveProducts {
    products::table.filter(products::deleted_at.is_null())
}

fn live_product(product_id: i64) -> LiveProduct {
    live_products().filter(products::id.eq(product_id))
}

fn find_by_id_query(product_id: i64) -> dsl::Select<LiveProduct, dsl::AsSelect<ProductRow, Pg>> {
    live_product(product_id).select(ProductRow::as_select())
}

fn find_all_query()
-> dsl::Select<dsl::Order<LiveProducts, dsl::Asc<products::id>>, dsl::AsSelect<ProductRow, Pg>> {
    live_products()
        .order(products::id.asc())
        .select(ProductRow::as_select())
}

fn update_statement(
    product_id: i64,
    changes: ProductChangeset,
) -> dsl::Update<LiveProduct, ProductChanges> {
    diesel::update(live_product(product_id)).set((changes, products::updated_at.eq(now)))
}

fn soft_delete_statement(product_id: i64) -> dsl::Update<LiveProduct, SoftDeleteChanges> {
    diesel::update(live_product(product_id)).set((
        products::deleted_at.eq(now.nullable()),
        products::updated_at.eq(now),
    ))
}

/// An update that matched no live row means the product is gone.
fn updated_or_missing(row: Option<ProductRow>, product_id: i64) -> Result<Product, AppError> {
    row.map(Product::from)
        .ok_or_else(|| AppError::not_found_by_id("product", product_id))
}

/// Diesel-backed product repository holding an async connection pool.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: AsyncDbPool,
}

impl DieselProductRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(products::table)
            .values(NewProductRow::from(new_product))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Product::from)
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, product_id: i64) -> Result<Option<Product>, AppError> {
        let mut conn = self.pool.get().await?;

        find_by_id_query(product_id)
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Product::from))
            .map_err(AppError::from)
    }

    async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        let mut conn = self.pool.get().await?;

        let rows = find_all_query().load(&mut conn).await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update(&self, product: Product) -> Result<Product, AppError> {
        let mut conn = self.pool.get().await?;

        let product_id = product.id;
        let changeset = ProductChangeset {
            name: product.name,
            price: product.price,
            stock: product.stock,
        };

        let row = update_statement(product_id, changeset)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        updated_or_missing(row, product_id)
    }

    async fn delete(&self, product_id: i64) -> Result<usize, AppError> {
        let mut conn = self.pool.get().await?;

        soft_delete_statement(product_id)
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
