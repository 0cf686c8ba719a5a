//! Shared application state injected into all handlers.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::application::services::{
    AuthService, ClickDispatcher, ClickService, RedirectAdminService, RedirectEngine,
    ResolveService, WriterDefaults,
};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{RedirectRepository, TokenRepository};

/// Server-wide shutdown notice for long-lived responses such as event streams.
///
/// Clones share one flag. Holding a `Shutdown` does not keep any other part of
/// the state alive.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(false)),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once [`Shutdown::trigger`] has been called, immediately if it already was.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|&stopping| stopping).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Services wired over the configured record store.
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub redirect_engine: Arc<RedirectEngine<dyn RedirectRepository>>,
    pub admin_service: Arc<RedirectAdminService<dyn RedirectRepository>>,
    pub click_service: Arc<ClickService<dyn RedirectRepository>>,
    pub auth_service: Arc<AuthService<dyn TokenRepository>>,
    pub repository: Arc<dyn RedirectRepository>,
    pub click_sender: ClickDispatcher,
    /// Base for absolute follow URLs; relative URLs are used when absent.
    pub public_base_url: Option<String>,
    pub shutdown: Shutdown,
}

impl AppState {
    /// Wires all services over one record store and one token store.
    ///
    /// `click_tx` is the sending half of the queue consumed by
    /// [`crate::domain::click_worker::run_click_worker`].
    pub fn new(
        repository: Arc<dyn RedirectRepository>,
        tokens: Arc<dyn TokenRepository>,
        click_tx: mpsc::Sender<ClickEvent>,
        token_signing_secret: String,
        defaults: WriterDefaults,
        public_base_url: Option<String>,
    ) -> Self {
        let click_sender = ClickDispatcher::new(click_tx);
        let resolver = Arc::new(ResolveService::new(Arc::clone(&repository)));

        Self {
            redirect_engine: Arc::new(RedirectEngine::new(resolver, click_sender.clone())),
            admin_service: Arc::new(RedirectAdminService::new(
                Arc::clone(&repository),
                defaults,
            )),
            click_service: Arc::new(ClickService::new(Arc::clone(&repository))),
            auth_service: Arc::new(AuthService::new(tokens, token_signing_secret)),
            repository,
            click_sender,
            public_base_url,
            shutdown: Shutdown::new(),
        }
    }

    /// Path (or absolute URL) of the preview of a slug.
    pub fn preview_url(&self, slug: &str) -> String {
        let path = format!("/redirections/{slug}");
        match &self.public_base_url {
            Some(base) => format!("{base}{path}"),
            None => path,
        }
    }

    /// Path (or absolute URL) a visitor follows to be redirected.
    pub fn follow_url(&self, slug: &str) -> String {
        format!("{}?redirect=true", self.preview_url(slug))
    }
}
