//! Domain models for squadmap.

pub mod location;
pub mod team;
pub mod trust;
pub mod user;

pub use location::{Location, LocationSource};
pub use team::{MemberState, RosterEntry, Team};
pub use trust::{TrustAgent, TrustRecord};
pub use user::{AgentIdentifier, ExternalId, PollTarget, User, UserId};
