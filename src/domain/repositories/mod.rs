//! Repository trait definitions for the domain layer.
//!
//! The traits are the contracts of the external collaborators the core consumes:
//! the record store ([`RedirectRepository`]) and the token store behind the
//! identity provider ([`TokenRepository`]). Implementations live in
//! `crate::infrastructure::persistence`; mocks are generated via `mockall` for tests.

pub mod redirect_repository;
pub mod token_repository;

pub use redirect_repository::{ChangeStream, RedirectRepository};
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use redirect_repository::MockRedirectRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
