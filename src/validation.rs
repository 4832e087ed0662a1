//! Field validators for the login and registration forms.
//!
//! Each validator returns the message to show under the field, or an empty
//! string when the value is acceptable.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::expect_used)]
static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]+$").expect("username regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}$")
        .expect("email regex is valid") // Static pattern, safe to panic
});

/// Characters that count as "special" for password complexity.
const PASSWORD_SPECIALS: &str = "`~<>?,./!@#$%^&*()-_+=\"|'{}[];:\\";

const MIN_USERNAME_LEN: usize = 2;
const MAX_USERNAME_LEN: usize = 12;
const MIN_PASSWORD_LEN: usize = 8;

/// Validates a username: letters, digits and underscore, 2 to 12 characters.
#[must_use]
pub fn validate_username(username: &str) -> String {
    if !USERNAME_PATTERN.is_match(username) {
        "Usernames can only contain numbers and letters".to_string()
    } else if username.len() < MIN_USERNAME_LEN {
        "Usernames must be at least 2 characters long".to_string()
    } else if username.len() > MAX_USERNAME_LEN {
        "Usernames cannot be longer than 12 characters".to_string()
    } else {
        String::new()
    }
}

/// Validates the shape of an email address.
#[must_use]
pub fn validate_email(email: &str) -> String {
    if EMAIL_PATTERN.is_match(email) {
        String::new()
    } else {
        "Please enter a valid email address".to_string()
    }
}

/// Validates password complexity.
///
/// Requires an upper-case letter, a lower-case letter, a digit, a special
/// character and at least 8 characters. Line breaks are never accepted.
#[must_use]
pub fn validate_password(password: &str) -> String {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    let single_line = !password.contains(['\n', '\r', '\u{2028}', '\u{2029}']);
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;

    if has_upper && has_lower && has_digit && has_special && single_line && long_enough {
        String::new()
    } else {
        "Password must be at least 8 characters long, contain at least 1 uppercase letter, 1 lowercase letter, 1 digit, and 1 special character".to_string()
    }
}

/// Checks that both password fields match; only enforced on registration.
#[must_use]
pub fn validate_confirm_password(
    password: &str,
    confirm_password: &str,
    is_register_form: bool,
) -> String {
    if is_register_form && confirm_password != password {
        "Passwords do not match".to_string()
    } else {
        String::new()
    }
}

/// Which form the credentials were entered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
}

/// Transient form input. Only the email and the resulting token ever persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

/// A validation failure attached to a named form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl Credentials {
    /// Runs every validator that applies to `form`, returning the failures.
    #[must_use]
    pub fn validate(&self, form: FormKind) -> Vec<FieldError> {
        let is_register = form == FormKind::Register;
        let mut checks = Vec::with_capacity(4);
        if is_register {
            checks.push(("username", validate_username(&self.username)));
        }
        checks.push(("email", validate_email(&self.email)));
        checks.push(("password", validate_password(&self.password)));
        checks.push((
            "confirmPassword",
            validate_confirm_password(&self.password, &self.confirm_password, is_register),
        ));

        checks
            .into_iter()
            .filter(|(_, message)| !message.is_empty())
            .map(|(field, message)| FieldError { field, message })
            .collect()
    }
}
