//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserId, UserRole, UserStatus};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserPersistenceError::duplicate("unique constraint violated")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        _ => UserPersistenceError::query("database error"),
    }
}

/// Convert a database row to a domain user.
///
/// Unrecognised role/status strings degrade to the defaults with a warning
/// rather than failing the whole query.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::new(&row.email).map_err(|err| {
        UserPersistenceError::query(format!("stored email failed validation: {err}"))
    })?;

    let role = row.role.parse::<UserRole>().unwrap_or_else(|_| {
        warn!(value = row.role, user_id = %row.id, "unrecognised role, defaulting to user");
        UserRole::User
    });
    let status = row.status.parse::<UserStatus>().unwrap_or_else(|_| {
        warn!(value = row.status, user_id = %row.id, "unrecognised status, defaulting to active");
        UserStatus::Active
    });

    // Display names are validated on the way in; tolerate legacy rows that
    // no longer satisfy the policy by dropping the name.
    let display_name = row
        .display_name
        .and_then(|name| crate::domain::DisplayName::new(name).ok());

    let mut builder = User::builder(UserId::from_uuid(row.id), email)
        .role(role)
        .status(status)
        .purchase_count(row.purchase_count)
        .created_at(row.created_at);
    if let Some(name) = display_name {
        builder = builder.display_name(name);
    }
    if let Some(hash) = row.password_hash {
        builder = builder.password_hash(hash);
    }
    if let Some(google_id) = row.google_id {
        builder = builder.google_id(google_id);
    }
    if let Some(avatar) = row.avatar_url {
        builder = builder.avatar_url(avatar);
    }
    if let Some(genre) = row.favourite_genre {
        builder = builder.favourite_genre(genre);
    }
    if let Some(store) = row.preferred_store {
        builder = builder.preferred_store(store);
    }
    if let Some(last_login) = row.last_login_at {
        builder = builder.last_login_at(last_login);
    }
    Ok(builder.build())
}

fn user_to_row(user: &User) -> NewUserRow<'_> {
    NewUserRow {
        id: *user.id.as_uuid(),
        email: user.email.as_ref(),
        display_name: user.display_name.as_ref().map(AsRef::as_ref),
        password_hash: user.password_hash.as_deref(),
        role: user.role.as_str(),
        status: user.status.as_str(),
        google_id: user.google_id.as_deref(),
        avatar_url: user.avatar_url.as_deref(),
        favourite_genre: user.favourite_genre.as_deref(),
        preferred_store: user.preferred_store.as_deref(),
        purchase_count: user.purchase_count,
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(user_to_row(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(user_to_row(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(UserPersistenceError::query("user not found for update"));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::google_id.eq(google_id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::last_login_at.eq(Some(at)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn increment_purchase_count(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::purchase_count.eq(users::purchase_count + 1))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the row conversions and error mapping.
    use super::*;
    use uuid::Uuid;

    fn row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            display_name: Some("Ada Lovelace".to_owned()),
            password_hash: Some("$2b$12$hash".to_owned()),
            role: "admin".to_owned(),
            status: "active".to_owned(),
            google_id: None,
            avatar_url: None,
            favourite_genre: Some("RPG".to_owned()),
            preferred_store: None,
            purchase_count: 4,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn row_converts_to_domain_user() {
        let user = row_to_user(row()).expect("valid row converts");
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.purchase_count, 4);
        assert_eq!(user.favourite_genre.as_deref(), Some("RPG"));
    }

    #[test]
    fn unknown_role_defaults_to_user() {
        let mut bad = row();
        bad.role = "superuser".to_owned();
        let user = row_to_user(bad).expect("row still converts");
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn invalid_stored_email_is_a_query_error() {
        let mut bad = row();
        bad.email = "not-an-email".to_owned();
        let err = row_to_user(bad).expect_err("invalid email must fail");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[test]
    fn unique_violations_map_to_duplicate() {
        let err = map_diesel_error(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        ));
        assert!(matches!(err, UserPersistenceError::Duplicate { .. }));
    }

    #[test]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }
}
