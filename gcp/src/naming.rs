//! Resource name canonicalization.
//!
//! The provider only accepts names of 1-63 characters that start with a
//! lowercase letter, continue with lowercase letters, digits, or dashes, and
//! do not end in a dash. User-supplied names and host instance ids routinely
//! violate this (underscores, uppercase, length), so every name passes
//! through [`canonicalize`] before it reaches the wire.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;

/// Maximum length the provider accepts for a resource name.
const MAX_NAME_LEN: usize = 63;

/// When truncating, keep this much of the head for human recognition; the
/// tail keeps the last characters for collision resistance.
const TRUNCATED_HEAD_LEN: usize = 57;
const TRUNCATED_TAIL_LEN: usize = 6;

const NAME_RULE: &str = "^[a-z]([-a-z0-9]*[a-z0-9])?$";

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(NAME_RULE).expect("name rule regex is valid");
}

/// Rewrite `name` into a provider-acceptable form. Idempotent: applying this
/// to its own output returns the output unchanged.
pub fn canonicalize(name: &str) -> String {
    // Underscores become dashes; anything else outside [A-Za-z0-9-] is
    // dropped entirely.
    let mut body: String = name
        .chars()
        .map(|c| if c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if !body.chars().next().map_or(false, |c| c.is_ascii_alphabetic()) {
        body.insert(0, 'a');
    }

    if body.len() > MAX_NAME_LEN {
        let head = &body[..TRUNCATED_HEAD_LEN];
        let tail = &body[body.len() - TRUNCATED_TAIL_LEN..];
        body = format!("{}{}", head, tail);
    }

    let trimmed = body.trim_end_matches('-');
    trimmed.to_lowercase()
}

/// The name a resource will carry: the user-supplied name when present,
/// otherwise the host's instance id, canonicalized either way.
pub fn final_name(user_name: Option<&str>, instance_id: &str) -> String {
    match user_name {
        Some(name) if !name.is_empty() => canonicalize(name),
        _ => canonicalize(instance_id),
    }
}

/// Enforce that an externally supplied identifier already satisfies the
/// provider's naming rule. Adoption must never silently rewrite the id the
/// user pointed at.
pub fn validate_identity(name: &str) -> Result<()> {
    let canonical = canonicalize(name);
    if canonical != name {
        return Err(Error::InvalidName {
            name: name.to_string(),
            rule: NAME_RULE.to_string(),
            canonical,
        });
    }
    Ok(())
}

/// Whether a name already satisfies the provider rule.
pub fn is_canonical(name: &str) -> bool {
    NAME_RE.is_match(name)
}
