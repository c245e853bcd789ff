//! # API Module
//!
//! Business logic of the tracker. Each submodule handles one step of the
//! inbound pipeline or one administrative concern; HTTP handling lives in
//! [`crate::webhook`] and [`crate::front`].
//!
//! ## Modules
//!
//! - [`extractor`] - Pulls sender, name and text out of provider payloads
//! - [`phone`] - Address normalization and tracking decision
//! - [`rules`] - Keyword rule matching and rule administration
//! - [`conversation`] - Conversation upsert and inbound message log
//! - [`instance`] - Instance registration and click-to-chat links

pub mod conversation;
pub mod extractor;
pub mod instance;
pub mod phone;
pub mod rules;
