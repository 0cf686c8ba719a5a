//! Administrator authentication via Bearer API tokens.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::Principal;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses the same
/// function when issuing tokens, so both sides must share the secret.
pub fn hash_token(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates a 48-character alphanumeric token (~286 bits of entropy).
pub fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Short, non-secret prefix of a token for log lines, e.g. `AbCd***`.
pub fn token_hint(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}***")
}

fn invalid_token() -> AppError {
    AppError::unauthorized(
        "Unauthorized",
        json!({"reason": "Invalid or revoked token"}),
    )
}

/// Identity provider for the admin API.
///
/// Only HMACs of tokens are stored, so read access to the token table is not
/// enough to forge a credential without the server-side secret.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// `signing_secret` must match the value used when tokens were created.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Resolves a raw token to the administrator it belongs to.
    ///
    /// Touches `last_used_at` on success; failing to do so is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for unknown or revoked tokens and
    /// propagates store faults.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(api_token) = self.repository.find_active(&token_hash).await? else {
            return Err(invalid_token());
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            warn!(token_id = api_token.id, error = %e, "Failed to update token last_used_at");
        }

        Ok(Principal {
            token_id: api_token.id,
            name: api_token.name,
        })
    }

    /// Ends the session by revoking the presented token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is not active.
    pub async fn sign_out(&self, token: &str) -> Result<Principal, AppError> {
        let principal = self.authenticate(token).await?;
        self.repository.revoke_token(principal.token_id).await?;
        info!(token_id = principal.token_id, name = %principal.name, "Session signed out");
        Ok(principal)
    }
}
