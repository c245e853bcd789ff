//! # WhatsApp Lead Tracker
//!
//! Receives Evolution-API message events, classifies the sender and the
//! message text against keyword rules and keeps one conversation per
//! (phone, instance) with its origin and status.

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod metric;
pub mod models;
pub mod repo;
pub mod utils;
pub mod webhook;
