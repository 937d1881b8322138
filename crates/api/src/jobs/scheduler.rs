//! Job scheduler infrastructure for background tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Trait for implementing background jobs.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// The name of this job (used for logging).
    fn name(&self) -> &'static str;

    /// Time between the end of one run and the start of the next.
    fn interval(&self) -> Duration;

    /// Whether the first run happens at startup instead of after one interval.
    fn run_on_start(&self) -> bool {
        false
    }

    /// Execute the job. Returns Ok(()) on success, Err with message on failure.
    async fn execute(&self) -> Result<(), String>;
}

/// Background job scheduler.
///
/// Each job runs in its own task and sleeps for its interval after every run.
/// Shutdown is observed while a job waits for its next run; a run already in
/// progress is allowed to finish.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    /// Create a new job scheduler.
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            shutdown_rx,
            handles: Vec::new(),
        }
    }

    /// Register a job with the scheduler.
    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    /// Number of registered jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Start all registered jobs.
    pub fn start(&mut self) {
        info!("Starting job scheduler with {} jobs", self.jobs.len());

        for job in &self.jobs {
            let job = Arc::clone(job);
            let mut shutdown_rx = self.shutdown_rx.clone();

            let handle = tokio::spawn(async move {
                let name = job.name();
                let period = job.interval();
                let mut run_now = job.run_on_start();

                info!(job = name, interval_secs = period.as_secs(), "Job scheduled");

                loop {
                    if *shutdown_rx.borrow() {
                        break;
                    }

                    if run_now {
                        run_job(job.as_ref()).await;
                    }
                    run_now = true;

                    // The wait starts only once the run has finished
                    tokio::select! {
                        _ = tokio::time::sleep(period) => {}
                        changed = shutdown_rx.changed() => {
                            if changed.is_err() || *shutdown_rx.borrow() {
                                break;
                            }
                        }
                    }
                }

                info!(job = name, "Job shutting down");
            });

            self.handles.push(handle);
        }
    }

    /// Initiate graceful shutdown of all jobs.
    /// Returns immediately after signaling shutdown.
    pub fn shutdown(&self) {
        info!("Initiating job scheduler shutdown");
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for all jobs to complete with timeout.
    ///
    /// Returns true if every job stopped before the timeout.
    pub async fn wait_for_shutdown(self, timeout: Duration) -> bool {
        info!("Waiting for jobs to complete (timeout: {:?})", timeout);

        let shutdown_future = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    warn!("Job task panicked: {}", e);
                }
            }
        };

        match tokio::time::timeout(timeout, shutdown_future).await {
            Ok(()) => {
                info!("All jobs completed gracefully");
                true
            }
            Err(_) => {
                warn!("Job shutdown timed out after {:?}", timeout);
                false
            }
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(job: &dyn Job) {
    let name = job.name();
    let start = std::time::Instant::now();
    info!(job = name, "Job starting");

    match job.execute().await {
        Ok(()) => {
            info!(
                job = name,
                elapsed_ms = start.elapsed().as_millis(),
                "Job completed successfully"
            );
        }
        Err(e) => {
            error!(
                job = name,
                elapsed_ms = start.elapsed().as_millis(),
                error = %e,
                "Job failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;

    struct TestJob {
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
        interval: Duration,
        run_on_start: bool,
        work: Duration,
        should_fail: bool,
        runs: Arc<Mutex<Vec<(Instant, Instant)>>>,
    }

    impl TestJob {
        fn new(interval: Duration, run_on_start: bool) -> Self {
            Self {
                started: Arc::new(AtomicUsize::new(0)),
                finished: Arc::new(AtomicUsize::new(0)),
                interval,
                run_on_start,
                work: Duration::ZERO,
                should_fail: false,
                runs: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait::async_trait]
    impl Job for TestJob {
        fn name(&self) -> &'static str {
            "test_job"
        }

        fn interval(&self) -> Duration {
            self.interval
        }

        fn run_on_start(&self) -> bool {
            self.run_on_start
        }

        async fn execute(&self) -> Result<(), String> {
            let began = Instant::now();
            self.started.fetch_add(1, Ordering::SeqCst);
            if !self.work.is_zero() {
                tokio::time::sleep(self.work).await;
            }
            self.runs.lock().unwrap().push((began, Instant::now()));
            self.finished.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                Err("Test failure".to_string())
            } else {
                Ok(())
            }
        }
    }

    async fn wait_until(counter: &AtomicUsize, at_least: usize) {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) >= at_least {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("counter never reached {}", at_least);
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler = JobScheduler::new();
        assert!(scheduler.jobs.is_empty());
        assert!(scheduler.handles.is_empty());
    }

    #[test]
    fn test_scheduler_register() {
        let mut scheduler = JobScheduler::new();
        scheduler.register(TestJob::new(Duration::from_secs(1), false));
        assert_eq!(scheduler.job_count(), 1);
    }

    #[test]
    fn test_scheduler_default() {
        let scheduler = JobScheduler::default();
        assert_eq!(scheduler.job_count(), 0);
    }

    #[tokio::test]
    async fn test_job_without_run_on_start_waits_one_interval() {
        let job = TestJob::new(Duration::from_secs(3600), false);
        let started = Arc::clone(&job.started);

        let mut scheduler = JobScheduler::new();
        scheduler.register(job);
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(started.load(Ordering::SeqCst), 0);

        scheduler.shutdown();
        assert!(scheduler.wait_for_shutdown(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_run_on_start_then_shutdown_interrupts_wait() {
        let job = TestJob::new(Duration::from_secs(3600), true);
        let finished = Arc::clone(&job.finished);

        let mut scheduler = JobScheduler::new();
        scheduler.register(job);
        scheduler.start();

        wait_until(&finished, 1).await;

        // The next run is an hour away; shutdown must not wait for it.
        scheduler.shutdown();
        assert!(scheduler.wait_for_shutdown(Duration::from_secs(2)).await);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_lets_running_job_finish() {
        let mut job = TestJob::new(Duration::from_secs(3600), true);
        job.work = Duration::from_millis(300);
        let started = Arc::clone(&job.started);
        let finished = Arc::clone(&job.finished);

        let mut scheduler = JobScheduler::new();
        scheduler.register(job);
        scheduler.start();

        wait_until(&started, 1).await;
        scheduler.shutdown();
        assert!(scheduler.wait_for_shutdown(Duration::from_secs(2)).await);

        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_job_keeps_running() {
        let mut job = TestJob::new(Duration::from_millis(20), true);
        job.should_fail = true;
        let finished = Arc::clone(&job.finished);

        let mut scheduler = JobScheduler::new();
        scheduler.register(job);
        scheduler.start();

        wait_until(&finished, 3).await;

        scheduler.shutdown();
        assert!(scheduler.wait_for_shutdown(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_full_interval_elapses_after_each_run() {
        let interval = Duration::from_millis(300);
        let mut job = TestJob::new(interval, true);
        job.work = Duration::from_millis(250);
        let started = Arc::clone(&job.started);
        let runs = Arc::clone(&job.runs);

        let mut scheduler = JobScheduler::new();
        scheduler.register(job);
        scheduler.start();

        wait_until(&started, 2).await;
        scheduler.shutdown();
        assert!(scheduler.wait_for_shutdown(Duration::from_secs(2)).await);

        let runs = runs.lock().unwrap();
        assert!(runs.len() >= 2);
        let gap = runs[1].0.duration_since(runs[0].1);
        assert!(gap >= interval, "gap between runs was {:?}", gap);
    }
}
