//! Game review model.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{User, UserId};

/// Inclusive rating bounds.
pub const RATING_MIN: i32 = 1;
/// Inclusive rating bounds.
pub const RATING_MAX: i32 = 5;
/// Minimum comment length.
pub const COMMENT_MIN: usize = 1;
/// Maximum comment length.
pub const COMMENT_MAX: usize = 200;

/// Validation errors for review payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    RatingOutOfRange { min: i32, max: i32 },
    CommentTooShort { min: usize },
    CommentTooLong { max: usize },
    EmptyGameId,
}

impl std::fmt::Display for ReviewValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RatingOutOfRange { min, max } => {
                write!(f, "rating must be between {min} and {max}")
            }
            Self::CommentTooShort { min } => {
                write!(f, "comment must be at least {min} character")
            }
            Self::CommentTooLong { max } => {
                write!(f, "comment must be at most {max} characters")
            }
            Self::EmptyGameId => write!(f, "game id must not be empty"),
        }
    }
}

impl std::error::Error for ReviewValidationError {}

/// Star rating constrained to `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(i32);

impl Rating {
    /// Validate and construct a rating.
    pub fn new(value: i32) -> Result<Self, ReviewValidationError> {
        if (RATING_MIN..=RATING_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReviewValidationError::RatingOutOfRange {
                min: RATING_MIN,
                max: RATING_MAX,
            })
        }
    }

    /// Numeric rating value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

/// Review text constrained to `1..=200` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewComment(String);

impl ReviewComment {
    /// Validate and construct a comment.
    pub fn new(comment: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let comment = comment.into();
        let length = comment.chars().count();
        if length < COMMENT_MIN {
            return Err(ReviewValidationError::CommentTooShort { min: COMMENT_MIN });
        }
        if length > COMMENT_MAX {
            return Err(ReviewValidationError::CommentTooLong { max: COMMENT_MAX });
        }
        Ok(Self(comment))
    }
}

impl AsRef<str> for ReviewComment {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ReviewComment> for String {
    fn from(value: ReviewComment) -> Self {
        value.0
    }
}

/// A stored game review.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Stable identifier.
    pub id: Uuid,
    /// The reviewed game (namespaced upstream id).
    pub game_id: String,
    /// The author; `None` once the account has been deleted.
    pub user_id: Option<UserId>,
    /// Star rating.
    pub rating: Rating,
    /// Review text.
    pub comment: ReviewComment,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// A new review prior to persistence.
///
/// Submitting a second review for the same `(user, game)` pair replaces the
/// first rather than creating a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub game_id: String,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: ReviewComment,
}

impl NewReview {
    /// Validate raw request parts into a review submission.
    pub fn try_from_parts(
        game_id: &str,
        user_id: UserId,
        rating: i32,
        comment: &str,
    ) -> Result<Self, ReviewValidationError> {
        let game_id = game_id.trim();
        if game_id.is_empty() {
            return Err(ReviewValidationError::EmptyGameId);
        }
        Ok(Self {
            game_id: game_id.to_owned(),
            user_id,
            rating: Rating::new(rating)?,
            comment: ReviewComment::new(comment)?,
        })
    }
}

/// A review paired with its author, when the author still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct GameReview {
    pub review: Review,
    pub author: Option<User>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::low(0, false)]
    #[case::min(1, true)]
    #[case::max(5, true)]
    #[case::high(6, false)]
    fn rating_enforces_bounds(#[case] value: i32, #[case] ok: bool) {
        assert_eq!(Rating::new(value).is_ok(), ok);
    }

    #[rstest]
    #[case::empty("", false)]
    #[case::single_char("!", true)]
    #[case::at_limit(&"x".repeat(COMMENT_MAX), true)]
    #[case::over_limit(&"x".repeat(COMMENT_MAX + 1), false)]
    fn comment_enforces_length(#[case] comment: &str, #[case] ok: bool) {
        assert_eq!(ReviewComment::new(comment).is_ok(), ok);
    }

    #[test]
    fn new_review_rejects_blank_game_id() {
        let err = NewReview::try_from_parts("  ", UserId::random(), 4, "great game")
            .expect_err("blank game id");
        assert_eq!(err, ReviewValidationError::EmptyGameId);
    }

    #[test]
    fn new_review_trims_game_id() {
        let review = NewReview::try_from_parts(" cs_612 ", UserId::random(), 4, "great game")
            .expect("valid review");
        assert_eq!(review.game_id, "cs_612");
        assert_eq!(review.rating.value(), 4);
    }
}
