//! Bearer-token issuing and verification for HTTP handlers.
//!
//! The codec wraps `jsonwebtoken` so handlers only deal with domain-friendly
//! operations: issue a token for a user, or extract the authenticated caller
//! from the `Authorization` header.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, User, UserId, UserRole};
use crate::inbound::http::state::HttpState;

/// Default access-token lifetime.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

/// JWT claim set carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Role claim used for admin guards.
    pub role: UserRole,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// Encodes and decodes bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the configured signing secret.
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::minutes(ACCESS_TOKEN_TTL_MINUTES))
    }

    /// Create a codec with an explicit token lifetime.
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue an access token for the user.
    pub fn issue(&self, user: &User) -> Result<String, Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))
    }

    /// Decode and validate a bearer token.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, Error> {
        decode::<AccessClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::unauthorized("could not validate credentials"))
    }
}

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Handlers take this extractor to require authentication; missing or
/// invalid tokens produce `401 Unauthorized` before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Require the admin role or return `403 Forbidden`.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }
}

fn extract_bearer(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not configured"))?;
    let token = extract_bearer(req)?;
    let claims = state.tokens.verify(token)?;
    let user_id = UserId::new(&claims.sub)
        .map_err(|_| Error::unauthorized("could not validate credentials"))?;
    Ok(AuthenticatedUser {
        user_id,
        role: claims.role,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{EmailAddress, ErrorCode};

    fn user(role: UserRole) -> User {
        User::builder(
            UserId::random(),
            EmailAddress::new("ada@example.com").expect("email"),
        )
        .role(role)
        .build()
    }

    #[test]
    fn tokens_round_trip_subject_and_role() {
        let codec = TokenCodec::new("test-secret");
        let admin = user(UserRole::Admin);

        let token = codec.issue(&admin).expect("token issues");
        let claims = codec.verify(&token).expect("token verifies");

        assert_eq!(claims.sub, admin.id.to_string());
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verification_rejects_wrong_secret() {
        let issuer = TokenCodec::new("secret-a");
        let verifier = TokenCodec::new("secret-b");
        let token = issuer.issue(&user(UserRole::User)).expect("token issues");

        let err = verifier.verify(&token).expect_err("must reject");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn verification_rejects_expired_tokens() {
        let codec = TokenCodec::with_ttl("test-secret", Duration::minutes(-5));
        let token = codec.issue(&user(UserRole::User)).expect("token issues");

        let err = codec.verify(&token).expect_err("expired token must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn verification_rejects_garbage() {
        let codec = TokenCodec::new("test-secret");
        let err = codec
            .verify("not-a-jwt")
            .expect_err("garbage token must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn admin_guard_checks_role() {
        let caller = AuthenticatedUser {
            user_id: UserId::random(),
            role: UserRole::User,
        };
        let err = caller.require_admin().expect_err("non-admin must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let admin = AuthenticatedUser {
            user_id: UserId::random(),
            role: UserRole::Admin,
        };
        assert!(admin.require_admin().is_ok());
    }
}
