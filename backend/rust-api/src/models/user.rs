use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::EntityId;

/// Domain appended to usernames for accounts created at login.
pub const DEFAULT_EMAIL_DOMAIN: &str = "pylearn.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub points: i64,
}

/// Insert payload for a user. Points always start at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// Profile for a first-time login: `alice` becomes `Alice <alice@pylearn.com>`.
    pub fn from_username(username: &str) -> Self {
        Self {
            username: username.to_string(),
            name: display_name(username),
            email: format!("{}@{}", username, DEFAULT_EMAIL_DOMAIN),
        }
    }
}

/// Upper-cases the first character, leaves the rest untouched.
pub fn display_name(username: &str) -> String {
    let mut chars = username.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 64, message = "Username must be at most 64 characters")
    )]
    pub username: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Username is required".into()));
    }
    Ok(())
}

/// First human-readable message out of a validation failure.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| format!("Validation error: {}", errors))
}
