//! Service layer for external integrations.

pub mod trust;

pub use trust::{AgentStore, TrustClient, TrustError};
