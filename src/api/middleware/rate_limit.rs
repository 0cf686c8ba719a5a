//! Rate limiting middleware using token bucket algorithm.
//!
//! Public routes allow 2 requests per second with a burst of 100; admin routes
//! allow 1 per second with a burst of 10. Requests over the limit receive
//! `429 Too Many Requests`.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::state::AppState;

/// How client IPs are identified for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    /// No limiting; used by tests and when a front proxy limits instead.
    Disabled,
    /// Key on the socket peer address.
    PeerIp,
    /// Key on `X-Forwarded-For` / `X-Real-IP` / `Forwarded`, falling back to the
    /// peer address. Only safe behind a trusted reverse proxy.
    Proxy,
}

impl RateLimit {
    pub fn from_config(behind_proxy: bool) -> Self {
        if behind_proxy {
            Self::Proxy
        } else {
            Self::PeerIp
        }
    }

    /// Applies the public limit to `router`.
    pub fn public(self, router: Router<AppState>) -> Router<AppState> {
        self.apply(router, 2, 100)
    }

    /// Applies the stricter admin limit to `router`.
    pub fn secure(self, router: Router<AppState>) -> Router<AppState> {
        self.apply(router, 1, 10)
    }

    fn apply(self, router: Router<AppState>, per_second: u64, burst: u32) -> Router<AppState> {
        match self {
            Self::Disabled => router,
            Self::PeerIp => router.layer(governor_layer(PeerIpKeyExtractor, per_second, burst)),
            Self::Proxy => router.layer(governor_layer(SmartIpKeyExtractor, per_second, burst)),
        }
    }
}

fn governor_layer<K>(
    key_extractor: K,
    per_second: u64,
    burst: u32,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .expect("rate limit quota is non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        assert_eq!(RateLimit::from_config(true), RateLimit::Proxy);
        assert_eq!(RateLimit::from_config(false), RateLimit::PeerIp);
    }
}
