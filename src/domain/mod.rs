//! Domain layer: entities, store contracts and the click pipeline.
//!
//! # Architecture
//!
//! - [`entities`] - Redirect records and their create/patch inputs
//! - [`repositories`] - Record store and token store contracts
//! - [`click_event`] - Click accounting request passed to the worker
//! - [`click_worker`] - Background worker performing the increments
//!
//! # Click Processing Flow
//!
//! 1. The redirect engine decides to follow a slug
//! 2. A [`click_event::ClickEvent`] is offered to a bounded channel (never blocking)
//! 3. [`click_worker::run_click_worker`] picks it up and makes one increment attempt
//! 4. The store applies `clicks + 1` atomically; failures are logged and dropped

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
