//! Account domain service.
//!
//! Implements the [`Accounts`] driving port over the user repository and the
//! Google token verifier. Password hashing uses bcrypt, matching the stored
//! hash format.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::ports::{
    Accounts, GoogleTokenVerifier, RegistrationRequest, TokenVerificationError, UserRepository,
};
use crate::domain::{
    DisplayName, Error, GoogleIdentity, LoginCredentials, PreferencesUpdate, ProfileUpdate, User,
    UserId, UserStatus,
};

/// Message returned for both unknown emails and wrong passwords.
const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Account service implementing the [`Accounts`] driving port.
#[derive(Clone)]
pub struct AccountsService {
    users: Arc<dyn UserRepository>,
    google: Arc<dyn GoogleTokenVerifier>,
}

impl AccountsService {
    /// Create a new service over the given ports.
    pub fn new(users: Arc<dyn UserRepository>, google: Arc<dyn GoogleTokenVerifier>) -> Self {
        Self { users, google }
    }

    fn hash_password(password: &str) -> Result<String, Error> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    fn verify_password(candidate: &str, stored_hash: &str) -> bool {
        match bcrypt::verify(candidate, stored_hash) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(error = %err, "stored password hash could not be verified");
                false
            }
        }
    }

    fn require_active(user: &User) -> Result<(), Error> {
        if user.status == UserStatus::Suspended {
            return Err(Error::forbidden("account is suspended"));
        }
        Ok(())
    }

    async fn stamp_login(&self, user: &mut User) -> Result<(), Error> {
        let now = Utc::now();
        self.users.record_login(&user.id, now).await?;
        user.last_login_at = Some(now);
        Ok(())
    }

    fn display_name_from_claim(name: Option<&str>) -> Option<DisplayName> {
        // Google names may contain characters our policy rejects; treat a
        // rejected name as absent rather than failing the login.
        name.and_then(|raw| DisplayName::new(raw).ok())
    }

    async fn link_google_subject(&self, user: &mut User, subject: &str) -> Result<(), Error> {
        if user.google_id.is_none() {
            user.google_id = Some(subject.to_owned());
            self.users.update(user).await?;
        }
        Ok(())
    }

    async fn provision_google_user(&self, identity: &GoogleIdentity) -> Result<User, Error> {
        let mut builder = User::builder(UserId::random(), identity.email.clone())
            .google_id(identity.subject.clone());
        if let Some(name) = Self::display_name_from_claim(identity.name.as_deref()) {
            builder = builder.display_name(name);
        }
        if let Some(picture) = &identity.picture {
            builder = builder.avatar_url(picture.clone());
        }
        let user = builder.build();
        self.users.insert(&user).await?;
        debug!(user_id = %user.id, "provisioned account from Google identity");
        Ok(user)
    }
}

#[async_trait]
impl Accounts for AccountsService {
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(Error::conflict("email already registered"));
        }

        let mut builder = User::builder(UserId::random(), request.email)
            .password_hash(Self::hash_password(&request.password)?);
        if let Some(name) = request.display_name {
            builder = builder.display_name(name);
        }
        let user = builder.build();
        self.users.insert(&user).await?;
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(mut user) = self.users.find_by_email(credentials.email()).await? else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let Some(stored_hash) = user.password_hash.clone() else {
            // OAuth-only account; password login is not available for it,
            // but do not reveal that to the caller.
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if !Self::verify_password(credentials.password(), &stored_hash) {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        Self::require_active(&user)?;
        self.stamp_login(&mut user).await?;
        Ok(user)
    }

    async fn login_with_google(&self, id_token: &str) -> Result<User, Error> {
        let identity = self.google.verify(id_token).await.map_err(|err| match err {
            TokenVerificationError::InvalidToken { .. } => {
                Error::unauthorized("invalid Google token")
            }
            TokenVerificationError::Transport { message } => {
                Error::upstream(format!("Google token verification failed: {message}"))
            }
        })?;

        let existing = match self.users.find_by_email(&identity.email).await? {
            Some(user) => Some(user),
            None => self.users.find_by_google_id(&identity.subject).await?,
        };

        let mut user = match existing {
            Some(mut user) => {
                self.link_google_subject(&mut user, &identity.subject).await?;
                user
            }
            None => self.provision_google_user(&identity).await?,
        };

        Self::require_active(&user)?;
        self.stamp_login(&mut user).await?;
        Ok(user)
    }

    async fn fetch_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self.fetch_user(id).await?;

        if let Some(email) = update.email {
            if email != user.email {
                if let Some(holder) = self.users.find_by_email(&email).await? {
                    if holder.id != user.id {
                        return Err(Error::conflict("email already exists"));
                    }
                }
                user.email = email;
            }
        }
        if let Some(name) = update.name {
            user.display_name = Some(name);
        }
        if let Some(password) = update.password {
            user.password_hash = Some(Self::hash_password(&password)?);
        }
        if let Some(avatar) = update.avatar {
            user.avatar_url = Some(avatar);
        }

        self.users.update(&user).await?;
        Ok(user)
    }

    async fn update_preferences(
        &self,
        id: &UserId,
        update: PreferencesUpdate,
    ) -> Result<User, Error> {
        let mut user = self.fetch_user(id).await?;

        if let Some(genre) = update.favourite_genre {
            user.favourite_genre = Some(genre);
        }
        if let Some(store) = update.preferred_store {
            user.preferred_store = Some(store);
        }

        self.users.update(&user).await?;
        Ok(user)
    }
}
