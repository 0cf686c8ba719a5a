//! Helper functions shared across layers.
//!
//! - [`slug`] - Slug validation and generation from titles

pub mod slug;
