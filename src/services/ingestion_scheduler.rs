//! Ingestion scheduler.
//!
//! Runs each ingestor on its own timer in its own task:
//! - A scan always runs to completion before the loop sleeps
//! - A failed or panicking scan puts the loop in `error` and it sleeps the
//!   shorter backoff interval before returning to `idle`
//! - Cancellation is observed only between scans, so `stop()` may wait up
//!   to one full scan

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::IngestError;
use crate::domain::models::{
    FileOutcome, IngestorState, IngestorStatus, IntakeConfig, ScanReport, ServiceState,
    ServiceStatus,
};
use crate::domain::ports::Ingestor;

/// Timing for both loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub roster_poll_interval: Duration,
    pub document_poll_interval: Duration,
    /// Sleep after a failed scan, shorter than either poll interval
    pub error_backoff: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&IntakeConfig::default())
    }
}

impl From<&IntakeConfig> for SchedulerConfig {
    fn from(config: &IntakeConfig) -> Self {
        Self {
            roster_poll_interval: config.roster_poll_interval(),
            document_poll_interval: config.document_poll_interval(),
            error_backoff: config.error_backoff(),
        }
    }
}

#[derive(Default)]
struct Lifecycle {
    token: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
}

/// Runs the roster and document ingestors on independent polling loops.
pub struct IngestionScheduler {
    roster: Arc<dyn Ingestor>,
    document: Arc<dyn Ingestor>,
    config: SchedulerConfig,
    overall: Arc<RwLock<ServiceState>>,
    roster_status: Arc<RwLock<IngestorStatus>>,
    document_status: Arc<RwLock<IngestorStatus>>,
    lifecycle: Mutex<Lifecycle>,
}

impl IngestionScheduler {
    pub fn new(roster: Arc<dyn Ingestor>, document: Arc<dyn Ingestor>, config: SchedulerConfig) -> Self {
        let roster_status = Arc::new(RwLock::new(IngestorStatus::new(roster.kind())));
        let document_status = Arc::new(RwLock::new(IngestorStatus::new(document.kind())));
        Self {
            roster,
            document,
            config,
            overall: Arc::new(RwLock::new(ServiceState::Stopped)),
            roster_status,
            document_status,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Spawn both loops. Calling this while not stopped only logs a warning.
    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        {
            let mut overall = self.overall.write().await;
            if *overall != ServiceState::Stopped {
                tracing::warn!(state = overall.as_str(), "scheduler already started, ignoring start");
                return;
            }
            *overall = ServiceState::Starting;
        }

        let token = CancellationToken::new();
        lifecycle.handles = vec![
            tokio::spawn(run_loop(LoopContext {
                ingestor: Arc::clone(&self.roster),
                status: Arc::clone(&self.roster_status),
                poll_interval: self.config.roster_poll_interval,
                error_backoff: self.config.error_backoff,
                token: token.clone(),
            })),
            tokio::spawn(run_loop(LoopContext {
                ingestor: Arc::clone(&self.document),
                status: Arc::clone(&self.document_status),
                poll_interval: self.config.document_poll_interval,
                error_backoff: self.config.error_backoff,
                token: token.clone(),
            })),
        ];
        lifecycle.token = Some(token);

        *self.overall.write().await = ServiceState::Running;
        tracing::info!(
            roster_poll_secs = self.config.roster_poll_interval.as_secs_f64(),
            document_poll_secs = self.config.document_poll_interval.as_secs_f64(),
            "ingestion scheduler started"
        );
    }

    /// Signal both loops and wait until they have exited.
    ///
    /// A loop in the middle of a scan finishes that scan first.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        {
            let mut overall = self.overall.write().await;
            if *overall != ServiceState::Running {
                tracing::debug!(state = overall.as_str(), "scheduler not running, ignoring stop");
                return;
            }
            *overall = ServiceState::Stopping;
        }

        if let Some(token) = lifecycle.token.take() {
            token.cancel();
        }
        for handle in lifecycle.handles.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "ingestion loop task ended abnormally");
            }
        }

        *self.overall.write().await = ServiceState::Stopped;
        tracing::info!("ingestion scheduler stopped");
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            overall: *self.overall.read().await,
            ingestors: vec![
                self.roster_status.read().await.clone(),
                self.document_status.read().await.clone(),
            ],
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.overall.read().await == ServiceState::Running
    }
}

struct LoopContext {
    ingestor: Arc<dyn Ingestor>,
    status: Arc<RwLock<IngestorStatus>>,
    poll_interval: Duration,
    error_backoff: Duration,
    token: CancellationToken,
}

impl LoopContext {
    async fn set_state(&self, state: IngestorState) {
        self.status.write().await.state = state;
    }

    /// Fold a scan result into the loop status. Returns true if the scan failed.
    async fn record(&self, result: Result<ScanReport, IngestError>) -> bool {
        let mut status = self.status.write().await;
        status.last_scan_at = Some(Utc::now());

        let error = match result {
            Ok(report) => {
                status.scans_completed += 1;
                status.lifetime_processed += report.accepted() as u64;
                status.lifetime_rejected += report.rejected() as u64;

                if !report.is_empty() {
                    tracing::info!(
                        kind = %report.kind,
                        accepted = report.accepted(),
                        rejected = report.rejected(),
                        deferred = report.deferred(),
                        failed = report.failed(),
                        "scan completed"
                    );
                }

                report.files.iter().find_map(|file| match &file.outcome {
                    FileOutcome::Failed { error } => Some(format!("{}: {error}", file.name)),
                    _ => None,
                })
            }
            Err(e) => {
                tracing::error!(kind = %status.kind, error = %e, "scan failed");
                Some(e.to_string())
            }
        };

        match error {
            Some(error) => {
                status.state = IngestorState::Error;
                status.consecutive_failures += 1;
                status.last_error = Some(error);
                true
            }
            None => {
                status.state = IngestorState::Idle;
                status.consecutive_failures = 0;
                false
            }
        }
    }
}

async fn run_loop(ctx: LoopContext) {
    let kind = ctx.ingestor.kind();
    tracing::info!(kind = %kind, "ingestion loop started");

    while !ctx.token.is_cancelled() {
        ctx.set_state(IngestorState::Processing).await;

        let result = AssertUnwindSafe(ctx.ingestor.scan())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(IngestError::Panicked(panic_message(panic.as_ref()))));

        let failed = ctx.record(result).await;
        let delay = if failed {
            tracing::warn!(kind = %kind, backoff_ms = ctx.error_backoff.as_millis() as u64, "backing off after failed scan");
            ctx.error_backoff
        } else {
            ctx.poll_interval
        };

        tokio::select! {
            () = ctx.token.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        if failed {
            ctx.set_state(IngestorState::Idle).await;
        }
    }

    ctx.set_state(IngestorState::Idle).await;
    tracing::info!(kind = %kind, "ingestion loop stopped");
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FileKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingIngestor {
        kind: FileKind,
        scans: AtomicU32,
    }

    #[async_trait]
    impl Ingestor for CountingIngestor {
        fn kind(&self) -> FileKind {
            self.kind
        }

        async fn scan(&self) -> Result<ScanReport, IngestError> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            Ok(ScanReport::new(self.kind))
        }
    }

    fn counting(kind: FileKind) -> Arc<CountingIngestor> {
        Arc::new(CountingIngestor {
            kind,
            scans: AtomicU32::new(0),
        })
    }

    #[test]
    fn test_config_from_intake() {
        let config = SchedulerConfig::default();
        assert_eq!(config.roster_poll_interval, Duration::from_secs(30));
        assert_eq!(config.document_poll_interval, Duration::from_secs(60));
        assert_eq!(config.error_backoff, Duration::from_secs(10));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let roster = counting(FileKind::Roster);
        let document = counting(FileKind::Document);
        let scheduler = IngestionScheduler::new(roster.clone(), document.clone(), SchedulerConfig::default());

        assert_eq!(scheduler.status().await.overall, ServiceState::Stopped);

        scheduler.start().await;
        assert!(scheduler.is_running().await);

        // Each loop scans once on start, then sleeps the long poll interval
        tokio::time::timeout(Duration::from_secs(5), async {
            while roster.scans.load(Ordering::SeqCst) == 0 || document.scans.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("both loops should scan after start");

        scheduler.stop().await;
        let status = scheduler.status().await;
        assert_eq!(status.overall, ServiceState::Stopped);
        assert!(status.ingestors.iter().all(|s| s.state == IngestorState::Idle));
        assert!(status.ingestors.iter().all(|s| s.scans_completed == 1));
        assert_eq!(roster.scans.load(Ordering::SeqCst), 1);
        assert_eq!(document.scans.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_when_stopped_is_noop() {
        let scheduler = IngestionScheduler::new(
            counting(FileKind::Roster),
            counting(FileKind::Document),
            SchedulerConfig::default(),
        );
        scheduler.stop().await;
        assert_eq!(scheduler.status().await.overall, ServiceState::Stopped);
    }
}
