//! HTTP `Accept` header content negotiation.
//!
//! - [`mediatype`] parses media ranges and scores candidates
//! - [`registry`] maps value kinds and media types to converters
//! - [`negotiate`] runs the negotiation state machine
//! - [`api`] adapts it all to axum

pub mod api;
pub mod config;
pub mod mediatype;
pub mod negotiate;
pub mod observability;
pub mod registry;
