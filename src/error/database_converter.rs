use crate::error::AppError;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// Check and not-null violations become `Validation` errors naming the
/// offending column; everything else is a `Database` error whose source is
/// kept for logging but never rendered to clients.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info, operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: Box<dyn DatabaseErrorInformation + Send + Sync>,
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let table = info.table_name();

        match kind {
            DatabaseErrorKind::CheckViolation => {
                match info
                    .constraint_name()
                    .and_then(|name| Self::parse_check_constraint(name, table))
                {
                    Some((entity, field)) => AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {}", entity),
                    },
                    None => AppError::Database {
                        operation: operation.to_string(),
                        source: anyhow::anyhow!("Check constraint violation: {}", message),
                    },
                }
            }
            DatabaseErrorKind::NotNullViolation => match info.column_name() {
                Some(column) => AppError::Validation {
                    field: column.to_string(),
                    reason: format!("Field is required for {}", table.unwrap_or("resource")),
                },
                None => AppError::Database {
                    operation: operation.to_string(),
                    source: anyhow::anyhow!("Not null constraint violation: {}", message),
                },
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!("Database error: {}", message),
            },
        }
    }

    /// Splits a Postgres check constraint name such as `products_price_check`
    /// into `(table, column)`.
    ///
    /// When the table name is known it is stripped as a prefix, which keeps
    /// multi-word columns (`products_unit_price_check`) intact.
    pub fn parse_check_constraint(constraint: &str, table: Option<&str>) -> Option<(String, String)> {
        let stem = constraint.strip_suffix("_check")?;

        let (entity, field) = match table {
            Some(table) => (table, stem.strip_prefix(table)?.strip_prefix('_')?),
            None => stem.split_once('_')?,
        };

        if entity.is_empty() || field.is_empty() {
            return None;
        }
        Some((entity.to_string(), field.to_string()))
    }
}
