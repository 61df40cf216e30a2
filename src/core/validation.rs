//! Cleanup and checks for credentials typed into the sign-in and sign-up forms.
//!
//! Sanitizers are idempotent. Validators never fail: they always hand back a
//! [`ValidationResult`] listing every problem in a fixed order.

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 50;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,}$").unwrap()
});

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L} .\-]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Concatenate two results, keeping `self`'s messages first.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.is_valid = self.errors.is_empty();
        self
    }
}

/// Lowercase and keep only characters that may appear in an address.
pub fn sanitize_email(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '+' | '-'))
        .collect()
}

/// Drop markup-significant and control characters and collapse whitespace.
pub fn sanitize_display_name(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '<' | '>' | '"' | '\'' | '&' | '`'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn validate_email(input: &str) -> ValidationResult {
    let email = input.trim();
    let mut errors = Vec::new();

    if email.is_empty() {
        errors.push("Email is required".to_string());
        return ValidationResult::from_errors(errors);
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        errors.push(format!("Email must be at most {} characters", MAX_EMAIL_LEN));
    }
    if !EMAIL_RE.is_match(&email.to_lowercase()) {
        errors.push("Email address is not valid".to_string());
    }

    ValidationResult::from_errors(errors)
}

pub fn validate_password(input: &str) -> ValidationResult {
    let mut errors = Vec::new();

    if input.is_empty() {
        errors.push("Password is required".to_string());
        return ValidationResult::from_errors(errors);
    }

    let len = input.chars().count();
    if len < MIN_PASSWORD_LEN {
        errors.push(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
    if len > MAX_PASSWORD_LEN {
        errors.push(format!("Password must be at most {} characters", MAX_PASSWORD_LEN));
    }
    if !input.chars().any(|c| c.is_lowercase()) {
        errors.push("Password must contain a lowercase letter".to_string());
    }
    if !input.chars().any(|c| c.is_uppercase()) {
        errors.push("Password must contain an uppercase letter".to_string());
    }
    if !input.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit".to_string());
    }
    if !input.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        errors.push("Password must contain a symbol".to_string());
    }

    ValidationResult::from_errors(errors)
}

/// Checks the name as it will be stored, i.e. after sanitizing.
pub fn validate_display_name(input: &str) -> ValidationResult {
    let name = sanitize_display_name(input);
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push("Name is required".to_string());
        return ValidationResult::from_errors(errors);
    }

    let len = name.chars().count();
    if len < MIN_NAME_LEN {
        errors.push(format!("Name must be at least {} characters", MIN_NAME_LEN));
    }
    if len > MAX_NAME_LEN {
        errors.push(format!("Name must be at most {} characters", MAX_NAME_LEN));
    }
    if !NAME_RE.is_match(&name) {
        errors.push("Name may only contain letters, spaces, dots and hyphens".to_string());
    }

    ValidationResult::from_errors(errors)
}

/// Email problems first, then password problems.
pub fn validate_credentials(email: &str, password: &str) -> ValidationResult {
    validate_email(email).merge(validate_password(password))
}
