//! Identity of the account that owns a roster.

use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Opaque account identifier resolved from a bearer token.
///
/// Restricted to ASCII letters, digits, `-` and `_` so it can be embedded in
/// a token without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ACCOUNT_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
