//! Status polling background job.
//!
//! Periodically asks the status API for the last reported location of every
//! user that opted into polling and stores it.

use std::sync::Arc;
use std::time::Duration;

use domain::models::{ExternalId, LocationSource, PollTarget, UserId};
use metrics::counter;
use persistence::repositories::{LocationError, LocationRepository, UserRepository};
use tracing::{debug, info, warn};

use super::scheduler::{Job, JobScheduler};
use crate::services::{TrustClient, TrustError};

/// Source tag written with every location this job stores.
pub const STATUS_POLL_SOURCE: LocationSource = LocationSource::StatusPoll;

/// Lists the users to poll.
#[async_trait::async_trait]
pub trait PollTargetSource: Send + Sync {
    async fn poll_targets(&self) -> Result<Vec<PollTarget>, sqlx::Error>;
}

/// Resolves an external identifier to a position.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn lookup_status(&self, external_id: &ExternalId) -> Result<(f64, f64), TrustError>;
}

/// Stores a polled position.
#[async_trait::async_trait]
pub trait LocationSink: Send + Sync {
    async fn set_location(
        &self,
        user_id: &UserId,
        latitude: f64,
        longitude: f64,
        source: LocationSource,
    ) -> Result<(), LocationError>;
}

#[async_trait::async_trait]
impl PollTargetSource for UserRepository {
    async fn poll_targets(&self) -> Result<Vec<PollTarget>, sqlx::Error> {
        UserRepository::status_poll_targets(self).await
    }
}

#[async_trait::async_trait]
impl StatusSource for TrustClient {
    async fn lookup_status(&self, external_id: &ExternalId) -> Result<(f64, f64), TrustError> {
        TrustClient::lookup_status(self, external_id).await
    }
}

#[async_trait::async_trait]
impl LocationSink for LocationRepository {
    async fn set_location(
        &self,
        user_id: &UserId,
        latitude: f64,
        longitude: f64,
        source: LocationSource,
    ) -> Result<(), LocationError> {
        LocationRepository::set_location(self, user_id, latitude, longitude, source).await
    }
}

/// Outcome counts of one polling iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Users with polling enabled.
    pub polled: usize,
    pub updated: usize,
    /// Users without an external identifier.
    pub skipped: usize,
    pub failed: usize,
}

/// Background job refreshing locations from the status API.
pub struct StatusPollJob {
    targets: Arc<dyn PollTargetSource>,
    status: Arc<dyn StatusSource>,
    sink: Arc<dyn LocationSink>,
    interval: Duration,
}

impl StatusPollJob {
    pub fn new(
        targets: Arc<dyn PollTargetSource>,
        status: Arc<dyn StatusSource>,
        sink: Arc<dyn LocationSink>,
        interval: Duration,
    ) -> Self {
        Self {
            targets,
            status,
            sink,
            interval,
        }
    }

    /// Register the job unless the trust client is unconfigured.
    ///
    /// Returns whether the job was registered.
    pub fn register(
        scheduler: &mut JobScheduler,
        trust: Arc<TrustClient>,
        users: UserRepository,
        locations: LocationRepository,
        interval: Duration,
    ) -> bool {
        if !trust.is_configured() {
            debug!("Trust API key not set, not polling status service");
            return false;
        }

        scheduler.register(Self::new(
            Arc::new(users),
            trust,
            Arc::new(locations),
            interval,
        ));
        true
    }

    /// Run one polling pass over every opted-in user.
    ///
    /// Per-user failures are logged and counted; only failing to list the
    /// users fails the pass.
    pub async fn poll_once(&self) -> Result<PollSummary, sqlx::Error> {
        let targets = self.targets.poll_targets().await?;
        let mut summary = PollSummary {
            polled: targets.len(),
            ..PollSummary::default()
        };

        for target in targets {
            let Some(external_id) = target.external_id else {
                info!(user_id = %target.user_id, "User has status polling enabled but no external id");
                summary.skipped += 1;
                continue;
            };

            let (latitude, longitude) = match self.status.lookup_status(&external_id).await {
                Ok(position) => position,
                Err(e) => {
                    warn!(user_id = %target.user_id, external_id = %external_id, error = %e, "Status lookup failed");
                    counter!("status_poll_failures_total", "stage" => "lookup").increment(1);
                    summary.failed += 1;
                    continue;
                }
            };

            match self
                .sink
                .set_location(&target.user_id, latitude, longitude, STATUS_POLL_SOURCE)
                .await
            {
                Ok(()) => {
                    counter!("status_poll_locations_updated_total").increment(1);
                    summary.updated += 1;
                }
                Err(e) => {
                    warn!(user_id = %target.user_id, error = %e, "Storing polled location failed");
                    counter!("status_poll_failures_total", "stage" => "store").increment(1);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[async_trait::async_trait]
impl Job for StatusPollJob {
    fn name(&self) -> &'static str {
        "status_poll"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .poll_once()
            .await
            .map_err(|e| format!("Failed to list status poll targets: {}", e))?;

        info!(
            polled = summary.polled,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Status poll finished"
        );
        Ok(())
    }
}
