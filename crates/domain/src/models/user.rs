//! User domain models and identifier types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Primary identifier of a user, issued by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier issued by the trust API, distinct from [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExternalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Any identifier the trust API accepts for an agent lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentIdentifier {
    /// The user's primary identifier.
    User(UserId),
    /// An identifier previously issued by the trust API.
    External(ExternalId),
    /// A numeric messaging-platform account id.
    Messaging(i64),
}

impl AgentIdentifier {
    /// Renders the identifier the way it appears in a lookup URL.
    ///
    /// The result depends only on the textual value, never on the variant.
    pub fn lookup_key(&self) -> String {
        match self {
            AgentIdentifier::User(id) => id.as_str().to_string(),
            AgentIdentifier::External(id) => id.as_str().to_string(),
            AgentIdentifier::Messaging(id) => id.to_string(),
        }
    }
}

impl From<UserId> for AgentIdentifier {
    fn from(id: UserId) -> Self {
        AgentIdentifier::User(id)
    }
}

impl From<ExternalId> for AgentIdentifier {
    fn from(id: ExternalId) -> Self {
        AgentIdentifier::External(id)
    }
}

impl From<i64> for AgentIdentifier {
    fn from(id: i64) -> Self {
        AgentIdentifier::Messaging(id)
    }
}

impl fmt::Display for AgentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lookup_key())
    }
}

/// Represents a user of the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub external_id: Option<ExternalId>,
    pub level: i32,
    pub verified: bool,
    pub blacklisted: bool,
    /// Opt-in for background location refresh from the status service.
    pub status_polling: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user who opted into status polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    pub user_id: UserId,
    pub external_id: Option<ExternalId>,
}

/// Request payload for registering or renaming the calling user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertUserRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Display name must be between 1 and 100 characters"
    ))]
    pub display_name: String,
}

/// Request payload for toggling status polling.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetStatusPollingRequest {
    pub enabled: bool,
}
