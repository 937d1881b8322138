//! Trust API client.
//!
//! Wraps the agent lookup API (verification and reputation data) and the
//! status API (last reported location). The status API is poorly documented
//! and fails often; callers treat its errors as routine.

use domain::models::{AgentIdentifier, ExternalId, TrustAgent, TrustRecord, UserId};
use persistence::repositories::UserRepository;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TrustConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when talking to the trust API.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("Trust API key not configured")]
    NotConfigured,

    #[error("Invalid trust API endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Transport(reqwest::Error),

    #[error("Invalid response from trust API: {0}")]
    Decode(String),

    #[error("Trust API error: {0}")]
    Remote(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

// Request URLs carry the API key, so they never end up in the error.
impl From<reqwest::Error> for TrustError {
    fn from(err: reqwest::Error) -> Self {
        TrustError::Transport(err.without_url())
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Status API response structure.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<CoordinateValue>,
    #[serde(default)]
    lon: Option<CoordinateValue>,
    #[serde(default)]
    time: Option<String>,
}

/// The status API has been seen sending coordinates both as strings and numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    fn to_f64(&self, field: &str) -> Result<f64, TrustError> {
        match self {
            CoordinateValue::Number(n) => Ok(*n),
            CoordinateValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| TrustError::Decode(format!("{} is not a number: {:?}", field, s))),
        }
    }
}

/// Decode an agent lookup response body.
fn parse_agent_response(body: &str) -> Result<TrustRecord, TrustError> {
    let record: TrustRecord =
        serde_json::from_str(body).map_err(|e| TrustError::Decode(e.to_string()))?;

    if !record.is_ok() {
        let message = record
            .message
            .clone()
            .unwrap_or_else(|| format!("status {}", record.status));
        return Err(TrustError::Remote(message));
    }

    Ok(record)
}

/// Decode a status response body into `(latitude, longitude)`.
fn parse_status_response(external_id: &ExternalId, body: &str) -> Result<(f64, f64), TrustError> {
    let response: StatusResponse =
        serde_json::from_str(body).map_err(|e| TrustError::Decode(e.to_string()))?;

    if response.status != 0 {
        return Err(TrustError::Remote(format!(
            "polling {} returned message: {}",
            external_id,
            response.message.unwrap_or_default()
        )));
    }

    let (lat, lon) = match (&response.lat, &response.lon) {
        (Some(lat), Some(lon)) => (lat.to_f64("lat")?, lon.to_f64("lon")?),
        _ => {
            return Err(TrustError::Decode(
                "status response is missing lat/lon".to_string(),
            ))
        }
    };

    debug!(external_id = %external_id, time = ?response.time, "Status location received");
    Ok((lat, lon))
}

// ============================================================================
// Store seam
// ============================================================================

/// Where successful agent records are written.
#[async_trait::async_trait]
pub trait AgentStore: Send + Sync {
    /// Overwrite the user's trust fields. Returns false if the user is unknown.
    async fn apply_trust_record(
        &self,
        user_id: &UserId,
        agent: &TrustAgent,
    ) -> Result<bool, sqlx::Error>;
}

#[async_trait::async_trait]
impl AgentStore for UserRepository {
    async fn apply_trust_record(
        &self,
        user_id: &UserId,
        agent: &TrustAgent,
    ) -> Result<bool, sqlx::Error> {
        UserRepository::apply_trust_record(self, user_id, agent).await
    }
}

// ============================================================================
// Trust Client
// ============================================================================

/// Client for the trust and status APIs.
///
/// Configuration is fixed at construction. An instance without an API key is
/// valid but unconfigured: every operation returns [`TrustError::NotConfigured`]
/// without any network activity.
pub struct TrustClient {
    /// HTTP client with the request timeout applied.
    client: Client,
    api_key: Option<String>,
    agent_endpoint: Url,
    status_endpoint: Url,
}

impl TrustClient {
    /// Create a new trust client.
    pub fn new(config: &TrustConfig) -> Result<Self, TrustError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(TrustError::from)?;

        let agent_endpoint = parse_endpoint(&config.agent_endpoint)?;
        let status_endpoint = parse_endpoint(&config.status_endpoint)?;

        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        if api_key.is_some() {
            info!(endpoint = %agent_endpoint, "Trust API configured");
        } else {
            debug!("Trust API key not set; trust features disabled");
        }

        Ok(Self {
            client,
            api_key,
            agent_endpoint,
            status_endpoint,
        })
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, TrustError> {
        self.api_key.as_deref().ok_or(TrustError::NotConfigured)
    }

    /// `{agent_endpoint}/agent/{id}/trust?apikey={key}`
    pub fn agent_url(&self, id: &AgentIdentifier) -> Result<Url, TrustError> {
        let api_key = self.api_key()?;
        let lookup_key = id.lookup_key();
        build_url(
            &self.agent_endpoint,
            &["agent", lookup_key.as_str(), "trust"],
            api_key,
        )
    }

    /// `{status_endpoint}/{external_id}?apikey={key}`
    pub fn status_url(&self, external_id: &ExternalId) -> Result<Url, TrustError> {
        let api_key = self.api_key()?;
        build_url(&self.status_endpoint, &[external_id.as_str()], api_key)
    }

    /// Look up an agent. Single attempt, no retries.
    pub async fn lookup_agent(&self, id: &AgentIdentifier) -> Result<TrustRecord, TrustError> {
        let url = self.agent_url(id)?;
        let body = self.get_body(url).await?;

        parse_agent_response(&body).map_err(|e| {
            info!(agent = %id, error = %e, "Agent lookup failed");
            e
        })
    }

    /// Merge a successful lookup result into the user's row.
    ///
    /// Records that report failure or carry no agent name are ignored and
    /// `Ok(false)` is returned; the lookup already surfaced that failure.
    pub async fn sync_agent<S>(
        &self,
        store: &S,
        user_id: &UserId,
        record: &TrustRecord,
    ) -> Result<bool, TrustError>
    where
        S: AgentStore + ?Sized,
    {
        self.api_key()?;

        if !record.is_applicable() {
            debug!(user_id = %user_id, status = %record.status, "Ignoring inapplicable trust record");
            return Ok(false);
        }

        debug!(user_id = %user_id, agent = %record.data.agent, "Updating trust data");
        let updated = store.apply_trust_record(user_id, &record.data).await?;
        Ok(updated)
    }

    /// Fetch the last reported location of an agent from the status API.
    pub async fn lookup_status(&self, external_id: &ExternalId) -> Result<(f64, f64), TrustError> {
        let url = self.status_url(external_id)?;
        let body = self.get_body(url).await?;
        parse_status_response(external_id, &body)
    }

    async fn get_body(&self, url: Url) -> Result<String, TrustError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            // The body may still carry a JSON error envelope; let the decoder decide.
            debug!(http_status = %status, "Trust API returned non-success status");
        }
        Ok(body)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, TrustError> {
    let url = Url::parse(raw).map_err(|e| TrustError::InvalidEndpoint(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(TrustError::InvalidEndpoint(raw.to_string()));
    }
    Ok(url)
}

/// Append path segments (each percent-encoded) and the API key to a base URL.
fn build_url(base: &Url, segments: &[&str], api_key: &str) -> Result<Url, TrustError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| TrustError::InvalidEndpoint(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut().append_pair("apikey", api_key);
    Ok(url)
}
