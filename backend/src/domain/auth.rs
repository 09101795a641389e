//! Authentication value objects.

use crate::domain::{EmailAddress, UserValidationError};

/// Validated login credentials.
///
/// The password is held as plain text only for the duration of the
/// authentication call; it is never stored or logged.
#[derive(Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: String,
}

/// Validation errors for login payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    InvalidEmail,
    EmptyPassword,
}

impl std::fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl LoginCredentials {
    /// Validate and construct credentials from raw request parts.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: password.to_owned(),
        })
    }

    /// Login email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password candidate.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

// Keep passwords out of debug output.
impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity claims extracted from a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// Google subject identifier (`sub` claim).
    pub subject: String,
    /// Verified email address.
    pub email: EmailAddress,
    /// Display name, when Google provides one.
    pub name: Option<String>,
    /// Avatar URL, when Google provides one.
    pub picture: Option<String>,
}

impl GoogleIdentity {
    /// Construct an identity, validating the email claim.
    pub fn new(
        subject: impl Into<String>,
        email: &str,
        name: Option<String>,
        picture: Option<String>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            subject: subject.into(),
            email: EmailAddress::new(email)?,
            name,
            picture,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bad_email("not-an-email", "secret", LoginValidationError::InvalidEmail)]
    #[case::empty_password("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn credentials_reject_invalid_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn credentials_normalise_email() {
        let creds =
            LoginCredentials::try_from_parts("Ada@Example.com", "secret").expect("valid parts");
        assert_eq!(creds.email().as_ref(), "ada@example.com");
        assert_eq!(creds.password(), "secret");
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds =
            LoginCredentials::try_from_parts("ada@example.com", "secret").expect("valid parts");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn google_identity_validates_email() {
        let err = GoogleIdentity::new("sub-1", "broken", None, None).expect_err("invalid email");
        assert_eq!(err, UserValidationError::InvalidEmail);
    }
}
