//! Google ID-token verification adapter.
//!
//! Verifies tokens against Google's `tokeninfo` endpoint and checks the
//! audience claim against the configured OAuth client id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::ports::{GoogleTokenVerifier, TokenVerificationError};
use crate::domain::GoogleIdentity;

/// Google's token introspection endpoint.
pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
/// Fixed request timeout for verification calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
struct TokenInfoDto {
    #[serde(default)]
    aud: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// HTTP-backed implementation of the `GoogleTokenVerifier` port.
pub struct GoogleTokenInfoVerifier {
    client: Client,
    endpoint: Url,
    client_id: String,
}

impl GoogleTokenInfoVerifier {
    /// Build a verifier for the given OAuth client id.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(client_id: impl Into<String>) -> Result<Self, reqwest::Error> {
        let endpoint = Url::parse(DEFAULT_TOKENINFO_URL).unwrap_or_else(|error| {
            panic!("default tokeninfo URL failed to parse: {error}")
        });
        Self::with_endpoint(client_id, endpoint, DEFAULT_TIMEOUT)
    }

    /// Build a verifier with an explicit endpoint and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(
        client_id: impl Into<String>,
        endpoint: Url,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            client_id: client_id.into(),
        })
    }

    fn identity_from_claims(
        &self,
        claims: TokenInfoDto,
    ) -> Result<GoogleIdentity, TokenVerificationError> {
        if claims.aud.as_deref() != Some(self.client_id.as_str()) {
            return Err(TokenVerificationError::invalid_token(
                "token was not issued for this client",
            ));
        }
        if claims.email_verified.as_deref() != Some("true") {
            return Err(TokenVerificationError::invalid_token(
                "token email is not verified",
            ));
        }

        let subject = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| TokenVerificationError::invalid_token("token missing subject"))?;
        let email = claims
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| TokenVerificationError::invalid_token("token missing email"))?;

        GoogleIdentity::new(subject, &email, claims.name, claims.picture)
            .map_err(|err| TokenVerificationError::invalid_token(err.to_string()))
    }
}

#[async_trait]
impl GoogleTokenVerifier for GoogleTokenInfoVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, TokenVerificationError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|err| TokenVerificationError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // Google answers 4xx for expired or malformed tokens.
            return Err(TokenVerificationError::invalid_token(format!(
                "tokeninfo returned status {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(TokenVerificationError::transport(format!(
                "tokeninfo returned status {}",
                status.as_u16()
            )));
        }

        let claims: TokenInfoDto = response.json().await.map_err(|err| {
            TokenVerificationError::transport(format!("invalid tokeninfo payload: {err}"))
        })?;
        self.identity_from_claims(claims)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the claim checks.
    use super::*;

    fn verifier() -> GoogleTokenInfoVerifier {
        GoogleTokenInfoVerifier::new("client-123").expect("client builds")
    }

    fn claims(aud: &str, verified: &str) -> TokenInfoDto {
        TokenInfoDto {
            aud: Some(aud.to_owned()),
            sub: Some("sub-1".to_owned()),
            email: Some("ada@example.com".to_owned()),
            email_verified: Some(verified.to_owned()),
            name: Some("Ada".to_owned()),
            picture: None,
        }
    }

    #[test]
    fn accepts_matching_audience_with_verified_email() {
        let identity = verifier()
            .identity_from_claims(claims("client-123", "true"))
            .expect("claims accepted");
        assert_eq!(identity.subject, "sub-1");
        assert_eq!(identity.email.as_ref(), "ada@example.com");
    }

    #[test]
    fn rejects_foreign_audience() {
        let err = verifier()
            .identity_from_claims(claims("client-999", "true"))
            .expect_err("foreign audience must fail");
        assert!(matches!(err, TokenVerificationError::InvalidToken { .. }));
    }

    #[test]
    fn rejects_unverified_email() {
        let err = verifier()
            .identity_from_claims(claims("client-123", "false"))
            .expect_err("unverified email must fail");
        assert!(matches!(err, TokenVerificationError::InvalidToken { .. }));
    }
}
