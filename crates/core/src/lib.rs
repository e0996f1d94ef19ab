//! Core business logic for vitrine.
//!
//! Hosts the counter-and-feed subsystem (counter store, graph mutation
//! observer, view tracker, action feed, aggregate reader) and the edge
//! mutation services that call into it explicitly after each write.

pub mod services;

pub use services::*;
