//! Pattern-based extraction from login widget pages.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AuthError, Result};
use crate::types::UserProfile;

lazy_static! {
    static ref HASH_REGEX: Regex = Regex::new(r"hash=([a-z0-9]+)").unwrap();

    // First brace-delimited run without semicolons or whitespace; the widget
    // inlines the profile object into a script call.
    static ref PROFILE_REGEX: Regex = Regex::new(r"\{[^;\s]*\}").unwrap();
}

/// First `hash=<token>` in `body`, returning just the token.
pub fn extract_hash(body: &str) -> Option<String> {
    HASH_REGEX
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode the first embedded profile object in `body`.
pub fn extract_profile(body: &str) -> Result<UserProfile> {
    let fragment = PROFILE_REGEX
        .find(body)
        .ok_or_else(|| AuthError::Parse("no user object in profile page".into()))?;

    serde_json::from_str(fragment.as_str())
        .map_err(|e| AuthError::Parse(format!("invalid user object: {}", e)))
}
