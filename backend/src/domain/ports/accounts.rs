//! Driving port for account use-cases.
//!
//! Inbound adapters call this port to register and authenticate users
//! without knowing the backing infrastructure. Token issuance is an adapter
//! concern; the port works in users.

use async_trait::async_trait;

use crate::domain::{
    DisplayName, EmailAddress, Error, LoginCredentials, PreferencesUpdate, ProfileUpdate, User,
    UserId,
};

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: EmailAddress,
    pub display_name: Option<DisplayName>,
    /// Plain-text password, already validated against the length policy.
    pub password: String,
}

/// Domain use-case port for account management.
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Create a new account. Duplicate emails yield a conflict error.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;

    /// Authenticate credentials and stamp the login.
    ///
    /// Unknown emails and wrong passwords are deliberately
    /// indistinguishable in the returned error.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Verify a Google ID token and log in, linking or creating an account.
    async fn login_with_google(&self, id_token: &str) -> Result<User, Error>;

    /// Fetch an account by id, erroring when it no longer exists.
    async fn fetch_user(&self, id: &UserId) -> Result<User, Error>;

    /// Apply a partial profile update, re-hashing any new password.
    ///
    /// Changing the email to one held by another account yields a conflict
    /// error.
    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Apply a partial gaming-preferences update.
    async fn update_preferences(
        &self,
        id: &UserId,
        update: PreferencesUpdate,
    ) -> Result<User, Error>;
}
