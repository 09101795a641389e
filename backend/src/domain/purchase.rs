//! Purchase records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::UserId;

/// Default page size for the recent-purchases listing.
pub const PURCHASES_DEFAULT_LIMIT: i64 = 10;
/// Upper bound on the recent-purchases listing.
pub const PURCHASES_MAX_LIMIT: i64 = 50;

/// A stored purchase record.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: UserId,
    /// Namespaced upstream game id.
    pub game_id: String,
    pub game_title: String,
    pub image_url: Option<String>,
    /// Comma-separated genre labels, as submitted by the client.
    pub genre: Option<String>,
    pub price: Option<f64>,
    pub store: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

/// Validation errors for purchase submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseValidationError {
    EmptyGameId,
    EmptyTitle,
}

impl std::fmt::Display for PurchaseValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGameId => write!(f, "game id must not be empty"),
            Self::EmptyTitle => write!(f, "game title must not be empty"),
        }
    }
}

impl std::error::Error for PurchaseValidationError {}

/// A new purchase prior to persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    pub user_id: UserId,
    pub game_id: String,
    pub game_title: String,
    pub image_url: Option<String>,
    pub genre: Option<String>,
    pub price: Option<f64>,
    pub store: Option<String>,
}

impl NewPurchase {
    /// Validate the identifying fields of a submission.
    pub fn validate(&self) -> Result<(), PurchaseValidationError> {
        if self.game_id.trim().is_empty() {
            return Err(PurchaseValidationError::EmptyGameId);
        }
        if self.game_title.trim().is_empty() {
            return Err(PurchaseValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Clamp a client-supplied listing limit to the allowed range.
pub fn clamp_purchase_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(PURCHASES_DEFAULT_LIMIT)
        .clamp(1, PURCHASES_MAX_LIMIT)
}
