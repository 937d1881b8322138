//! Repository implementations for database operations.

pub mod location;
pub mod team;
pub mod user;

pub use location::{LocationError, LocationRepository};
pub use team::TeamRepository;
pub use user::UserRepository;
