//! Domain primitives, aggregates, ports, and services.
//!
//! Types here are transport and persistence agnostic. Inbound adapters map
//! them to wire payloads; outbound adapters implement the ports in
//! [`ports`].

pub mod auth;
pub mod catalog;
pub mod error;
pub mod ports;
pub mod profile;
pub mod purchase;
pub mod review;
pub mod user;
pub mod wishlist;

mod accounts_service;
mod catalog_service;

pub use self::accounts_service::AccountsService;
pub use self::auth::{GoogleIdentity, LoginCredentials, LoginValidationError};
pub use self::catalog::{
    CatalogGame, Deal, DealSort, Game, GamePrice, DEAL_FETCH_CAP, IGDB_GAME_LIMIT, UNKNOWN_GENRE,
};
pub use self::catalog_service::CatalogService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::profile::{
    ActivityEntry, PreferencesUpdate, ProfileData, ProfilePreferences, ProfileStatistics,
    ProfileUpdate, ProfileView,
};
pub use self::purchase::{
    clamp_purchase_limit, NewPurchase, Purchase, PurchaseValidationError,
    PURCHASES_DEFAULT_LIMIT, PURCHASES_MAX_LIMIT,
};
pub use self::review::{
    GameReview, NewReview, Rating, Review, ReviewComment, ReviewValidationError, COMMENT_MAX,
    COMMENT_MIN, RATING_MAX, RATING_MIN,
};
pub use self::user::{
    validate_password, DisplayName, EmailAddress, User, UserBuilder, UserId, UserRole, UserStatus,
    UserValidationError, DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, PASSWORD_MAX, PASSWORD_MIN,
};
pub use self::wishlist::{NewWishlistEntry, WishlistEntry, WishlistValidationError};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use levelup_backend::domain::{ApiResult, Error};
///
/// fn guarded() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
