//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP handlers
//! and the background click worker.
//!
//! # Available Services
//!
//! - [`services::ResolveService`] - slug lookup for visitors
//! - [`services::RedirectEngine`] - preview/follow decision
//! - [`services::ClickService`] / [`services::ClickDispatcher`] - click accounting
//! - [`services::RedirectAdminService`] - record management for administrators
//! - [`services::AuthService`] - API token authentication

pub mod services;
