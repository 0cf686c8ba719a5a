//! Request middleware.
//!
//! - [`auth`] - Bearer token check on the admin API
//! - [`rate_limit`] - Per-IP token buckets for public and admin routes
//! - [`tracing`] - Request spans without query strings

pub mod auth;
pub mod rate_limit;
pub mod tracing;
