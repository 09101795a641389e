//! Port for Google ID-token verification.

use async_trait::async_trait;

use crate::domain::GoogleIdentity;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token verifier adapters.
    pub enum TokenVerificationError {
        /// The token is expired, malformed, or not issued for this client.
        InvalidToken { message: String } =>
            "Google token rejected: {message}",
        /// The verification endpoint could not be reached.
        Transport { message: String } =>
            "Google token verification transport failure: {message}",
    }
}

/// Port for verifying Google ID tokens into identity claims.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoogleTokenVerifier: Send + Sync {
    /// Verify an ID token and return the identity it asserts.
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, TokenVerificationError>;
}

/// Fixture verifier accepting a single well-known token.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGoogleTokenVerifier;

/// Token value the fixture verifier accepts.
pub const FIXTURE_GOOGLE_TOKEN: &str = "fixture-google-token";

#[async_trait]
impl GoogleTokenVerifier for FixtureGoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, TokenVerificationError> {
        if id_token != FIXTURE_GOOGLE_TOKEN {
            return Err(TokenVerificationError::invalid_token(
                "unrecognised fixture token",
            ));
        }
        GoogleIdentity::new(
            "fixture-google-sub",
            "oauth.user@example.com",
            Some("OAuth User".to_owned()),
            None,
        )
        .map_err(|err| TokenVerificationError::invalid_token(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_verifier_accepts_known_token() {
        let verifier = FixtureGoogleTokenVerifier;
        let identity = verifier
            .verify(FIXTURE_GOOGLE_TOKEN)
            .await
            .expect("fixture token verifies");
        assert_eq!(identity.subject, "fixture-google-sub");
        assert_eq!(identity.email.as_ref(), "oauth.user@example.com");
    }

    #[tokio::test]
    async fn fixture_verifier_rejects_other_tokens() {
        let verifier = FixtureGoogleTokenVerifier;
        let err = verifier
            .verify("forged")
            .await
            .expect_err("unknown token must fail");
        assert!(matches!(err, TokenVerificationError::InvalidToken { .. }));
    }
}
