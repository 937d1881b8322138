//! Shared utilities for the squadmap backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Coordinate validation
//! - Team member color validation

pub mod validation;
