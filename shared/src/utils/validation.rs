//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Pragmatic address check: one @, no whitespace, dotted domain
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").unwrap()
});

/// Maximum address length accepted by RFC 5321
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Check if an email address is syntactically valid
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}
