//! Authenticated administrator identity.

/// The administrator behind a valid API token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub token_id: i64,
    pub name: String,
}
