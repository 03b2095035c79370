//! Share-token generation.
//!
//! A token is `<millis base36>-<13 random lowercase alphanumerics>` —
//! an opaque capability string that is the only credential needed for a
//! public card lookup.

use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_LEN: usize = 13;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Attempt bound for collision retries during creation and
/// regeneration. Exhaustion is a terminal error, never a silent
/// fallthrough to a possibly colliding token.
pub const GENERATION_ATTEMPTS: usize = 5;

/// Generate a fresh share token stamped with `now`.
pub fn generate(now: DateTime<Utc>) -> String {
  let mut rng = rand::thread_rng();
  let suffix: String = (0..SUFFIX_LEN)
    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
    .collect();
  format!("{}-{suffix}", base36(now.timestamp_millis().max(0) as u64))
}

fn base36(mut n: u64) -> String {
  if n == 0 {
    return "0".to_owned();
  }
  let mut digits = Vec::new();
  while n > 0 {
    digits.push(ALPHABET[(n % 36) as usize] as char);
    n /= 36;
  }
  digits.reverse();
  digits.into_iter().collect()
}
