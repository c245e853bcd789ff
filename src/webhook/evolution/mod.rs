//! Evolution-API webhook integration
//!
//! ## Submodules
//!
//! - [`handler`] - Inbound pipeline: extraction, classification, rule matching and storage
//! - [`routes`] - HTTP endpoint receiving the provider events
//! - [`schemas`] - Processing outcomes and the acknowledgement sent back
//! - [`security`] - Shared token verification

pub mod handler;
pub mod routes;
pub mod schemas;
pub mod security;

pub use routes::receive;
