//! Trust API records.
//!
//! These are never persisted as-is; selected fields of a successful record are
//! merged into the user row.

use serde::{Deserialize, Serialize};

use crate::models::user::ExternalId;

/// Status value the trust API uses for a successful lookup.
pub const TRUST_STATUS_OK: &str = "ok";

/// Envelope returned by the trust API's agent lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustRecord {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: TrustAgent,
}

impl TrustRecord {
    /// Whether the remote service reported success.
    pub fn is_ok(&self) -> bool {
        self.status == TRUST_STATUS_OK
    }

    /// Whether this record carries agent data worth merging into a user.
    pub fn is_applicable(&self) -> bool {
        self.is_ok() && !self.data.agent.is_empty()
    }
}

/// Agent data inside a [`TrustRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustAgent {
    #[serde(rename = "enlid")]
    pub external_id: String,
    pub vlevel: f64,
    pub vpoints: f64,
    pub agent: String,
    pub level: f64,
    pub quarantine: bool,
    pub active: bool,
    pub blacklisted: bool,
    pub verified: bool,
    pub flagged: bool,
    #[serde(rename = "banned_by_nia")]
    pub banned: bool,
    pub cellid: String,
}

impl TrustAgent {
    /// The external identifier, if the record carried one.
    pub fn external_id(&self) -> Option<ExternalId> {
        if self.external_id.is_empty() {
            None
        } else {
            Some(ExternalId::new(self.external_id.clone()))
        }
    }

    /// Agent level as stored on the user row.
    pub fn level_i32(&self) -> i32 {
        self.level.round() as i32
    }
}
