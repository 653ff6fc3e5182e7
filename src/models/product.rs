use bigdecimal::BigDecimal;
use jiff::civil::DateTime;

/// A product as seen by the service layer.
///
/// Soft-deleted products never reach this type: every repository read filters
/// them out, so `deleted_at` is not part of the domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Unit price, stored as `NUMERIC(10,2)`.
    pub price: BigDecimal,
    pub stock: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Product data for insertion; timestamps and id come from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
}

impl Product {
    /// Overwrites the mutable fields in place. Id and timestamps are untouched.
    pub fn replace_fields(&mut self, name: String, price: BigDecimal, stock: i32) {
        self.name = name;
        self.price = price;
        self.stock = stock;
    }
}
