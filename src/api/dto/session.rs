//! DTO for the admin session endpoint.

use serde::Serialize;

use crate::domain::entities::Principal;

/// The administrator behind the presented Bearer token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token_id: i64,
    pub name: String,
}

impl From<Principal> for SessionResponse {
    fn from(principal: Principal) -> Self {
        Self {
            token_id: principal.token_id,
            name: principal.name,
        }
    }
}
