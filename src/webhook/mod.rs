//! Webhook handlers for external integrations
//!
//! ## Modules
//!
//! - [`evolution`] - Evolution-API style WhatsApp message events
//! - [`routes`] - Route registration for the webhook endpoints

pub mod evolution;
pub mod routes;
