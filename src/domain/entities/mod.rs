//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`RedirectRecord`] - A slug mapped to a destination URL plus preview metadata
//! - [`Principal`] - An authenticated administrator
//!
//! Creation and edit inputs live next to the entity they produce:
//! [`NewRedirect`] for inserts and [`RedirectPatch`] for partial updates.

pub mod principal;
pub mod redirect;

pub use principal::Principal;
pub use redirect::{
    ChangeEvent, ChangeKind, ContentType, ListFilter, ListSort, NewRedirect, RedirectPatch,
    RedirectRecord,
};
