//! Field validation shared by every card and link write path.
//!
//! Email is checked against the address shape the rest of the system
//! relies on (local part, `@`, dotted domain). Phone numbers tolerate
//! the usual separators and must leave 10–15 digits once stripped.
//! Social-link URLs must parse and use http or https.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::{Error, Result};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
  )
  .expect("email regex")
});

pub fn is_valid_email(email: &str) -> bool {
  let email = email.trim();
  !email.is_empty() && EMAIL_RE.is_match(email)
}

/// Characters users are allowed to sprinkle into phone numbers.
/// They are ignored for validation; the digits in between must number
/// 10 to 15.
fn is_phone_separator(c: char) -> bool {
  matches!(c, ' ' | '-' | '(' | ')' | '+')
}

pub fn is_valid_phone(phone_number: &str) -> bool {
  let digits: String = phone_number
    .chars()
    .filter(|c| !is_phone_separator(*c))
    .collect();
  (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_url(url: &str) -> bool {
  match Url::parse(url) {
    Ok(u) => matches!(u.scheme(), "http" | "https"),
    Err(_) => false,
  }
}

/// Trim a URL and reject anything that is not http(s).
pub fn checked_url(url: &str) -> Result<String> {
  let url = url.trim();
  if !is_valid_url(url) {
    return Err(Error::validation("Invalid URL format"));
  }
  Ok(url.to_owned())
}

/// Trim an optional free-text field; empty input clears the field.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}
