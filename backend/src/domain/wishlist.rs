//! Wishlist entries with deal-snapshot fields.
//!
//! Entries capture the price at the moment the game was wished for, so the
//! client can show "price when added" without re-fetching the upstream deal.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::UserId;

/// A stored wishlist entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEntry {
    pub id: Uuid,
    pub user_id: UserId,
    /// Namespaced upstream game id.
    pub game_id: String,
    pub game_title: String,
    pub image_url: Option<String>,
    /// Sale price at the time of adding.
    pub price: Option<f64>,
    /// Pre-discount price at the time of adding.
    pub original_price: Option<f64>,
    /// Discount percentage at the time of adding.
    pub discount_percent: Option<i32>,
    /// CheapShark store id of the snapshotted deal.
    pub store_id: Option<String>,
    /// CheapShark deal id of the snapshotted deal.
    pub deal_id: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Validation errors for wishlist submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistValidationError {
    EmptyGameId,
    EmptyTitle,
}

impl std::fmt::Display for WishlistValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGameId => write!(f, "game id must not be empty"),
            Self::EmptyTitle => write!(f, "game title must not be empty"),
        }
    }
}

impl std::error::Error for WishlistValidationError {}

/// A new wishlist entry prior to persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWishlistEntry {
    pub user_id: UserId,
    pub game_id: String,
    pub game_title: String,
    pub image_url: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount_percent: Option<i32>,
    pub store_id: Option<String>,
    pub deal_id: Option<String>,
}

impl NewWishlistEntry {
    /// Validate the identifying fields of a submission.
    pub fn validate(&self) -> Result<(), WishlistValidationError> {
        if self.game_id.trim().is_empty() {
            return Err(WishlistValidationError::EmptyGameId);
        }
        if self.game_title.trim().is_empty() {
            return Err(WishlistValidationError::EmptyTitle);
        }
        Ok(())
    }
}
