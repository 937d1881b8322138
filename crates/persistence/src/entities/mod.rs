//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod location;
pub mod team;
pub mod user;

pub use location::LocationEntity;
pub use team::{MemberStateDb, RosterEntryEntity, TeamEntity};
pub use user::{PollTargetEntity, UserEntity};
