//! Background job scheduler and job implementations.

mod scheduler;
mod status_poll;

pub use scheduler::{Job, JobScheduler};
pub use status_poll::{
    LocationSink, PollSummary, PollTargetSource, StatusPollJob, StatusSource,
    STATUS_POLL_SOURCE,
};
