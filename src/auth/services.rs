use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::RegisterRequest;
use crate::error::AppError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases the email, trims the username, then checks both
/// plus the password length.
pub(crate) fn normalize_registration(
    mut payload: RegisterRequest,
) -> Result<RegisterRequest, AppError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        return Err(AppError::bad_request("Invalid email"));
    }

    let name_len = payload.username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&name_len) {
        return Err(AppError::bad_request(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }

    if payload.password.chars().count() < PASSWORD_MIN {
        return Err(AppError::bad_request(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        )));
    }

    Ok(payload)
}
