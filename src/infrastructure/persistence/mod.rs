//! Record store and token store implementations.
//!
//! # Repositories
//!
//! - [`PgRedirectRepository`] / [`PgTokenRepository`] - PostgreSQL via SQLx
//! - [`MemoryRedirectRepository`] / [`MemoryTokenRepository`] - in-process, single instance
//! - [`UnavailableRedirectRepository`] - stand-in when no store is configured

pub mod memory_redirect_repository;
pub mod memory_token_repository;
pub mod pg_redirect_repository;
pub mod pg_token_repository;
pub mod pool;
pub mod unavailable_redirect_repository;

pub use memory_redirect_repository::MemoryRedirectRepository;
pub use memory_token_repository::MemoryTokenRepository;
pub use pg_redirect_repository::PgRedirectRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pool::connect_with_retry;
pub use unavailable_redirect_repository::UnavailableRedirectRepository;
