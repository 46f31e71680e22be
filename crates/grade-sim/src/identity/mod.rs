//! Sign-in boundary. The grade engine never sees credentials; callers resolve an
//! [`AuthenticatedUser`] here and hand its [`UserId`] to the simulation service.

mod memory;

pub use memory::InMemoryIdentityProvider;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::simulations::UserId;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// User resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub uid: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Email/password pair as typed on the login form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Rejects credentials that cannot possibly succeed before reaching the provider.
    pub fn validate(&self) -> Result<(), CredentialError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(CredentialError::EmailRequired);
        }
        if !is_valid_email(email) {
            return Err(CredentialError::EmailInvalid);
        }
        if self.password.trim().is_empty() {
            return Err(CredentialError::PasswordRequired);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialError::PasswordTooShort);
        }
        Ok(())
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("an email address is required")]
    EmailRequired,
    #[error("the email address is not valid")]
    EmailInvalid,
    #[error("a password is required")]
    PasswordRequired,
    #[error("the password must be at least 6 characters long")]
    PasswordTooShort,
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordIssue {
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
}

impl PasswordIssue {
    pub fn message(&self) -> &'static str {
        match self {
            PasswordIssue::TooShort => "must be at least 6 characters long",
            PasswordIssue::MissingUppercase => "must contain an uppercase letter",
            PasswordIssue::MissingLowercase => "must contain a lowercase letter",
            PasswordIssue::MissingDigit => "must contain a digit",
        }
    }
}

/// Advisory strength check shown on sign-up; an empty list means strong enough.
pub fn password_strength(password: &str) -> Vec<PasswordIssue> {
    let mut issues = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        issues.push(PasswordIssue::TooShort);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        issues.push(PasswordIssue::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        issues.push(PasswordIssue::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(PasswordIssue::MissingDigit);
    }
    issues
}

/// Failures reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("the email address is not valid")]
    InvalidEmail,
    #[error("this account has been disabled")]
    UserDisabled,
    #[error("no account exists for this email address")]
    UserNotFound,
    #[error("incorrect password")]
    WrongPassword,
    #[error("invalid credentials, check your email and password")]
    InvalidCredential,
    #[error("this email address is already registered")]
    EmailAlreadyInUse,
    #[error("operation not allowed")]
    OperationNotAllowed,
    #[error("the password must be at least 6 characters long")]
    WeakPassword,
    #[error("too many failed attempts, try again later")]
    TooManyRequests,
    #[error("connection error, check your network")]
    Network,
    #[error("the operation failed, please try again")]
    Other(String),
}

impl AuthError {
    /// Maps a provider error code such as `auth/wrong-password`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/invalid-email" => AuthError::InvalidEmail,
            "auth/user-disabled" => AuthError::UserDisabled,
            "auth/user-not-found" => AuthError::UserNotFound,
            "auth/wrong-password" => AuthError::WrongPassword,
            "auth/invalid-credential" => AuthError::InvalidCredential,
            "auth/email-already-in-use" => AuthError::EmailAlreadyInUse,
            "auth/operation-not-allowed" => AuthError::OperationNotAllowed,
            "auth/weak-password" => AuthError::WeakPassword,
            "auth/too-many-requests" => AuthError::TooManyRequests,
            "auth/network-request-failed" => AuthError::Network,
            other => AuthError::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthError::Credentials(CredentialError::EmailRequired)
            | AuthError::Credentials(CredentialError::EmailInvalid)
            | AuthError::InvalidEmail => "auth/invalid-email",
            AuthError::Credentials(CredentialError::PasswordRequired)
            | AuthError::InvalidCredential => "auth/invalid-credential",
            AuthError::Credentials(CredentialError::PasswordTooShort)
            | AuthError::WeakPassword => "auth/weak-password",
            AuthError::UserDisabled => "auth/user-disabled",
            AuthError::UserNotFound => "auth/user-not-found",
            AuthError::WrongPassword => "auth/wrong-password",
            AuthError::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthError::OperationNotAllowed => "auth/operation-not-allowed",
            AuthError::TooManyRequests => "auth/too-many-requests",
            AuthError::Network => "auth/network-request-failed",
            AuthError::Other(code) => code,
        }
    }
}

/// Identity provider seam; implementations publish the signed-in user through a watch channel.
pub trait IdentityProvider: Send + Sync {
    fn sign_up(
        &self,
        credentials: &Credentials,
        display_name: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthError>;
    fn sign_in(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    fn current_user(&self) -> Option<AuthenticatedUser>;
    /// Receiver that observes every sign-in and sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<AuthenticatedUser>>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("ana@uni.edu.pe"));
        assert!(!is_valid_email("ana@uni"));
        assert!(!is_valid_email("ana uni@edu.pe"));
        assert!(!is_valid_email("@uni.edu"));
        assert!(!is_valid_email("ana@@uni.edu"));
    }

    #[test]
    fn credentials_require_six_character_password() {
        assert_eq!(
            Credentials::new("ana@uni.edu", "12345").validate(),
            Err(CredentialError::PasswordTooShort)
        );
        assert_eq!(
            Credentials::new("  ", "secret1").validate(),
            Err(CredentialError::EmailRequired)
        );
        let padded = Credentials::new(" ana@uni.edu ", "secret1");
        assert!(padded.validate().is_ok());
    }

    #[test]
    fn password_strength_lists_every_issue() {
        assert_eq!(
            password_strength("abc"),
            vec![
                PasswordIssue::TooShort,
                PasswordIssue::MissingUppercase,
                PasswordIssue::MissingDigit
            ]
        );
        assert!(password_strength("Secret12").is_empty());
    }

    #[test]
    fn provider_codes_round_trip_and_unknown_codes_are_generic() {
        let error = AuthError::from_code("auth/wrong-password");
        assert_eq!(error, AuthError::WrongPassword);
        assert_eq!(error.code(), "auth/wrong-password");

        let unknown = AuthError::from_code("auth/popup-blocked");
        assert_eq!(
            unknown.to_string(),
            "the operation failed, please try again"
        );
    }
}
