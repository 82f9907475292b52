//! Batchline - manufacturing batch tracking backend
//!
//! This crate implements the authentication core: credential verification,
//! signed-token issuance and validation, persisted sessions, and a revocation
//! list enforced on every authenticated request. Domain persistence (batches,
//! alarms, programs, results) lives behind the store traits in [`store`].

pub mod auth;
pub mod config;
pub mod store;
