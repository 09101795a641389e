//! PostgreSQL-backed `ReviewRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{GameReview, NewReview, Rating, Review, ReviewComment, UserId};

use super::diesel_user_repository::row_to_user;
use super::models::{NewReviewRow, ReviewRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{reviews, users};

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ReviewPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    debug!(error = %error, "diesel operation failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ReviewPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => ReviewPersistenceError::query("record not found"),
        _ => ReviewPersistenceError::query("database error"),
    }
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewPersistenceError> {
    let rating = Rating::new(row.rating).map_err(|err| {
        ReviewPersistenceError::query(format!("stored rating failed validation: {err}"))
    })?;
    let comment = ReviewComment::new(row.comment).map_err(|err| {
        ReviewPersistenceError::query(format!("stored comment failed validation: {err}"))
    })?;

    Ok(Review {
        id: row.id,
        game_id: row.game_id,
        user_id: row.user_id.map(UserId::from_uuid),
        rating,
        comment,
        created_at: row.created_at,
    })
}

fn rows_to_game_review(
    review: ReviewRow,
    author: Option<UserRow>,
) -> Result<GameReview, ReviewPersistenceError> {
    let author = author
        .map(|row| {
            row_to_user(row).map_err(|err| {
                ReviewPersistenceError::query(format!("author row failed conversion: {err}"))
            })
        })
        .transpose()?;
    Ok(GameReview {
        review: row_to_review(review)?,
        author,
    })
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn upsert(&self, review: &NewReview) -> Result<Review, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Replace the author's existing review of this game, if any.
        let updated: Option<ReviewRow> = diesel::update(
            reviews::table.filter(
                reviews::user_id
                    .eq(Some(*review.user_id.as_uuid()))
                    .and(reviews::game_id.eq(&review.game_id)),
            ),
        )
        .set((
            reviews::rating.eq(review.rating.value()),
            reviews::comment.eq(review.comment.as_ref()),
        ))
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(row) = updated {
            return row_to_review(row);
        }

        let new_row = NewReviewRow {
            id: Uuid::new_v4(),
            game_id: &review.game_id,
            user_id: Some(*review.user_id.as_uuid()),
            rating: review.rating.value(),
            comment: review.comment.as_ref(),
        };
        let inserted: ReviewRow = diesel::insert_into(reviews::table)
            .values(&new_row)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_review(inserted)
    }

    async fn list_with_authors(&self) -> Result<Vec<GameReview>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(ReviewRow, Option<UserRow>)> = reviews::table
            .left_join(users::table)
            .order(reviews::created_at.desc())
            .select((ReviewRow::as_select(), Option::<UserRow>::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(review, author)| rows_to_game_review(review, author))
            .collect()
    }

    async fn for_game(&self, game_id: &str) -> Result<Vec<GameReview>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(ReviewRow, Option<UserRow>)> = reviews::table
            .left_join(users::table)
            .filter(reviews::game_id.eq(game_id))
            .order(reviews::created_at.desc())
            .select((ReviewRow::as_select(), Option::<UserRow>::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(review, author)| rows_to_game_review(review, author))
            .collect()
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::user_id.eq(Some(*user_id.as_uuid())))
            .order(reviews::created_at.desc())
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_review).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReviewRow> = reviews::table
            .filter(reviews::id.eq(id))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_review).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(reviews::table.filter(reviews::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = reviews::table
            .filter(reviews::user_id.eq(Some(*user_id.as_uuid())))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the row conversions.
    use super::*;
    use chrono::Utc;

    #[test]
    fn row_converts_to_domain_review() {
        let row = ReviewRow {
            id: Uuid::new_v4(),
            game_id: "cs_612".to_owned(),
            user_id: Some(Uuid::new_v4()),
            rating: 5,
            comment: "excellent".to_owned(),
            created_at: Utc::now(),
        };
        let review = row_to_review(row).expect("valid row converts");
        assert_eq!(review.rating.value(), 5);
        assert_eq!(review.comment.as_ref(), "excellent");
    }

    #[test]
    fn out_of_range_stored_rating_is_a_query_error() {
        let row = ReviewRow {
            id: Uuid::new_v4(),
            game_id: "cs_612".to_owned(),
            user_id: None,
            rating: 11,
            comment: "tampered".to_owned(),
            created_at: Utc::now(),
        };
        let err = row_to_review(row).expect_err("invalid rating must fail");
        assert!(matches!(err, ReviewPersistenceError::Query { .. }));
    }
}
