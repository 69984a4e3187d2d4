//! Input validation helpers.
//!
//! Structural checks shared by repositories and services. Everything
//! surfaces as [`SymposiaError::Validation`]; nothing here touches the
//! store.

use chrono::NaiveDate;

use crate::error::{SymposiaError, SymposiaResult};

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 200;

fn validation(message: impl Into<String>) -> SymposiaError {
    SymposiaError::Validation {
        message: message.into(),
    }
}

/// Usernames: 3–30 characters, alphanumeric plus `_` and `-`.
pub fn validate_username(username: &str) -> SymposiaResult<()> {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(validation(format!(
            "username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(validation("username contains invalid characters"));
    }
    Ok(())
}

/// Minimal structural email check: one `@` with a dot somewhere after it.
pub fn validate_email(email: &str) -> SymposiaResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(validation("invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> SymposiaResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> SymposiaResult<()> {
    if title.trim().len() < MIN_TITLE_LENGTH || title.len() > MAX_TITLE_LENGTH {
        return Err(validation(format!(
            "title must be between {MIN_TITLE_LENGTH} and {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Conference invariant: the range must not be inverted.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> SymposiaResult<()> {
    if end < start {
        return Err(validation("end date must not be before start date"));
    }
    Ok(())
}

/// Derive a URL-safe slug from a title: lowercase alphanumeric runs
/// joined by single dashes. Uniqueness is the store's concern.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
