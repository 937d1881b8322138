//! HTTP route handlers.

pub mod features;
pub mod health;
pub mod locations;
pub mod teams;
pub mod users;
