//! User repository for async database operations.

use async_trait::async_trait;
use diesel::dsl;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::schema::users;

/// Persistence operations for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns it with the store-assigned id.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Finds a user by id. `None` when no such row exists.
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AppError>;
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
struct NewUserRow {
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        Self {
            name: user.name,
            email: user.email,
        }
    }
}

fn find_by_id_query(
    user_id: i64,
) -> dsl::Select<dsl::Filter<users::table, dsl::Eq<users::id, i64>>, dsl::AsSelect<UserRow, Pg>> {
    users::table
        .filter(users::id.eq(user_id))
        .select(UserRow::as_select())
}

/// Diesel-backed user repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: AsyncDbPool,
}

impl DieselUserRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(NewUserRow::from(new_user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.get().await?;

        find_by_id_query(user_id)
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    #[test]
    fn test_find_by_id_selects_single_user() {
        let query = debug_query::<Pg, _>(&find_by_id_query(11)).to_string();

        assert!(query.starts_with("SELECT"), "{}", query);
        assert!(query.contains(r#"FROM "users""#), "{}", query);
        assert!(query.contains(r#""users"."id" = $1"#), "{}", query);
        assert!(query.contains("binds: [11]"), "{}", query);
    }

    #[test]
    fn test_insert_returns_generated_columns() {
        let statement = diesel::insert_into(users::table)
            .values(NewUserRow::from(NewUser::new("Ada", "ada@example.com")))
            .returning(UserRow::as_returning());
        let sql = debug_query::<Pg, _>(&statement).to_string();

        assert!(sql.starts_with(r#"INSERT INTO "users" ("name", "email")"#), "{}", sql);
        assert!(sql.contains(r#"RETURNING "users"."id""#), "{}", sql);
    }
}
