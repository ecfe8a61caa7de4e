use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::AppError,
    store::{normalize_email, Location, User},
};

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Request body for `POST /api/auth/signup`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub location: Option<Location>,
}

impl SignupRequest {
    /// Normalizes in place, then checks required fields.
    pub fn validate(&mut self) -> Result<(), AppError> {
        self.email = normalize_email(&self.email);
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self
            .last_name
            .take()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if self.first_name.is_empty() {
            return Err(AppError::Validation("First name is required".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation("Invalid email".into()));
        }
        validate_password(&self.password)
    }
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by signup and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub email: String,
    pub location: Location,
    pub token: String,
}

/// The authenticated user without credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub location: Location,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            location: u.location,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(first: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            first_name: first.into(),
            last_name: Some("  ".into()),
            email: email.into(),
            password: password.into(),
            location: None,
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn validate_normalizes_fields() {
        let mut req = signup(" Ada ", "  Ada@Example.com ", "long-enough");
        req.validate().expect("valid");
        assert_eq!(req.email, "ada@example.com");
        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.last_name, None);
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert!(signup("", "ada@example.com", "long-enough").validate().is_err());
        assert!(signup("Ada", "nope", "long-enough").validate().is_err());
        assert!(signup("Ada", "ada@example.com", "short").validate().is_err());
    }

    #[test]
    fn public_user_has_no_password() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: None,
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            location: Location::default(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("\"_id\""));
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("secret"));
    }
}
