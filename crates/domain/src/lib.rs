//! Domain layer for the squadmap backend.
//!
//! This crate contains:
//! - Domain models (User, Team, Location, TrustRecord)
//! - Identifier types shared by the store and the trust API client
//! - Domain error types

pub mod errors;
pub mod models;
