//! Slug resolution: the public read path.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::entities::RedirectRecord;
use crate::domain::repositories::RedirectRepository;
use crate::error::AppError;

/// Looks up redirect records for visitors.
///
/// Resolution never fails: an absent slug and a broken store both come back as
/// `None`. They differ only in what gets logged and counted, so operators can
/// tell misconfiguration apart from ordinary 404 traffic.
pub struct ResolveService<R: RedirectRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: RedirectRepository + ?Sized> ResolveService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Resolves `slug` exactly as received, without case folding or trimming.
    ///
    /// Stored values are returned as-is; no defaults are filled in here.
    pub async fn resolve(&self, slug: &str) -> Option<RedirectRecord> {
        match self.repository.get(slug).await {
            Ok(Some(record)) => {
                debug!(slug, "Redirection resolved");
                metrics::counter!("redirect_resolve_total", "outcome" => "found").increment(1);
                Some(record)
            }
            Ok(None) => {
                debug!(slug, "Redirection not found");
                metrics::counter!("redirect_resolve_total", "outcome" => "not_found").increment(1);
                None
            }
            Err(e) if e.is_infrastructure() => {
                let fault = match e {
                    AppError::StoreUnavailable { .. } => "store_unavailable",
                    _ => "store_error",
                };
                error!(slug, fault, error = %e, "Record store fault while resolving slug");
                metrics::counter!("redirect_resolve_total", "outcome" => fault).increment(1);
                None
            }
            Err(e) => {
                warn!(slug, error = %e, "Record store rejected slug lookup");
                metrics::counter!("redirect_resolve_total", "outcome" => "rejected").increment(1);
                None
            }
        }
    }
}
