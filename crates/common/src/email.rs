//! Email address validation.

use once_cell::sync::Lazy;
use regex::Regex;

/// WHATWG HTML5 email pattern. Pragmatic rather than RFC 5322 complete,
/// which is what browsers enforce on `input type="email"`.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Maximum total length accepted for an address.
const MAX_EMAIL_LEN: usize = 254;

/// Returns true if `address` is an acceptable email address.
pub fn is_valid(address: &str) -> bool {
    !address.is_empty() && address.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(address)
}
