//! Port for review persistence.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{GameReview, NewReview, Review, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review repository query failed: {message}",
    }
}

impl From<ReviewPersistenceError> for crate::domain::Error {
    fn from(value: ReviewPersistenceError) -> Self {
        match value {
            ReviewPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("review repository unavailable: {message}"))
            }
            ReviewPersistenceError::Query { message } => {
                Self::internal(format!("review repository error: {message}"))
            }
        }
    }
}

/// Port for review storage and retrieval.
///
/// `upsert` implements the one-review-per-`(user, game)` rule: a second
/// submission replaces the rating and comment of the first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Create a review, or replace the author's existing review of the game.
    async fn upsert(&self, review: &NewReview) -> Result<Review, ReviewPersistenceError>;

    /// All reviews paired with their authors, newest first.
    async fn list_with_authors(&self) -> Result<Vec<GameReview>, ReviewPersistenceError>;

    /// Reviews for one game paired with their authors, newest first.
    async fn for_game(&self, game_id: &str) -> Result<Vec<GameReview>, ReviewPersistenceError>;

    /// Reviews written by one user, newest first.
    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Review>, ReviewPersistenceError>;

    /// Fetch a single review.
    async fn find(&self, id: Uuid) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Delete a review; returns `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, ReviewPersistenceError>;

    /// Number of reviews written by one user.
    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, ReviewPersistenceError>;
}

/// In-memory repository used by tests and database-less development runs.
///
/// Authors are resolved against a caller-supplied user list snapshot; the
/// Diesel adapter performs a left join instead.
#[derive(Debug, Default)]
pub struct InMemoryReviewRepository {
    rows: Mutex<Vec<Review>>,
    authors: Mutex<Vec<User>>,
}

impl InMemoryReviewRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register users so their reviews resolve an author.
    pub fn set_authors(&self, users: Vec<User>) {
        if let Ok(mut authors) = self.authors.lock() {
            *authors = users;
        }
    }

    fn author_for(&self, user_id: Option<UserId>) -> Option<User> {
        let user_id = user_id?;
        self.authors
            .lock()
            .ok()?
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Review>>, ReviewPersistenceError> {
        self.rows
            .lock()
            .map_err(|_| ReviewPersistenceError::query("review store poisoned"))
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn upsert(&self, review: &NewReview) -> Result<Review, ReviewPersistenceError> {
        let mut rows = self.lock()?;

        if let Some(existing) = rows.iter_mut().find(|row| {
            row.user_id == Some(review.user_id) && row.game_id == review.game_id
        }) {
            existing.rating = review.rating;
            existing.comment = review.comment.clone();
            return Ok(existing.clone());
        }

        let stored = Review {
            id: Uuid::new_v4(),
            game_id: review.game_id.clone(),
            user_id: Some(review.user_id),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_with_authors(&self) -> Result<Vec<GameReview>, ReviewPersistenceError> {
        let mut rows: Vec<Review> = self.lock()?.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .map(|review| {
                let author = self.author_for(review.user_id);
                GameReview { review, author }
            })
            .collect())
    }

    async fn for_game(&self, game_id: &str) -> Result<Vec<GameReview>, ReviewPersistenceError> {
        let all = self.list_with_authors().await?;
        Ok(all
            .into_iter()
            .filter(|entry| entry.review.game_id == game_id)
            .collect())
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut rows: Vec<Review> = self
            .lock()?
            .iter()
            .filter(|row| row.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, ReviewPersistenceError> {
        Ok(self.lock()?.iter().find(|row| row.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ReviewPersistenceError> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, ReviewPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|row| row.user_id.as_ref() == Some(user_id))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory repository.
    use super::*;
    use crate::domain::{EmailAddress, Rating, ReviewComment};

    fn submission(user_id: UserId, game_id: &str, rating: i32, comment: &str) -> NewReview {
        NewReview {
            game_id: game_id.to_owned(),
            user_id,
            rating: Rating::new(rating).expect("valid rating"),
            comment: ReviewComment::new(comment).expect("valid comment"),
        }
    }

    #[tokio::test]
    async fn second_submission_replaces_first() {
        let repo = InMemoryReviewRepository::new();
        let author = UserId::random();

        let first = repo
            .upsert(&submission(author, "cs_612", 3, "decent"))
            .await
            .expect("first upsert");
        let second = repo
            .upsert(&submission(author, "cs_612", 5, "actually great"))
            .await
            .expect("second upsert");

        assert_eq!(first.id, second.id);
        assert_eq!(second.rating.value(), 5);
        let all = repo.list_with_authors().await.expect("list");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn authors_resolve_from_registered_users() {
        let repo = InMemoryReviewRepository::new();
        let author = User::builder(
            UserId::random(),
            EmailAddress::new("ada@example.com").expect("email"),
        )
        .build();
        repo.set_authors(vec![author.clone()]);

        repo.upsert(&submission(author.id, "cs_612", 4, "fun"))
            .await
            .expect("upsert");
        repo.upsert(&submission(UserId::random(), "cs_612", 2, "meh"))
            .await
            .expect("upsert");

        let reviews = repo.for_game("cs_612").await.expect("list");
        assert_eq!(reviews.len(), 2);
        let with_author = reviews
            .iter()
            .filter(|entry| entry.author.is_some())
            .count();
        assert_eq!(with_author, 1);
    }

    #[tokio::test]
    async fn delete_and_count_track_rows() {
        let repo = InMemoryReviewRepository::new();
        let author = UserId::random();
        let stored = repo
            .upsert(&submission(author, "cs_1", 4, "fine"))
            .await
            .expect("upsert");
        repo.upsert(&submission(author, "cs_2", 2, "rough"))
            .await
            .expect("upsert");

        assert_eq!(repo.count_for_user(&author).await.expect("count"), 2);
        assert!(repo.delete(stored.id).await.expect("delete"));
        assert!(!repo.delete(stored.id).await.expect("delete again"));
        assert_eq!(repo.count_for_user(&author).await.expect("count"), 1);
    }
}
