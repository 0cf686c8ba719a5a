//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_service;
pub mod redirect_admin_service;
pub mod redirect_engine;
pub mod resolve_service;

pub use auth_service::{AuthService, generate_token, hash_token, token_hint};
pub use click_service::{AccountingFailure, Acknowledged, ClickDispatcher, ClickService};
pub use redirect_admin_service::{
    CreateRedirect, RedirectAdminService, RedirectPage, WriterDefaults,
};
pub use redirect_engine::{Intent, Outcome, PreviewPayload, RedirectEngine, RedirectTarget};
pub use resolve_service::ResolveService;
