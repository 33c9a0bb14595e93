//! Integration tests for the ingestion scheduler lifecycle and loop recovery.

mod common;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{setup_test_logging, wait_for, wait_for_status, write_document, write_roster, Harness};
use payslip_intake::domain::models::{DocumentConfig, RosterConfig};
use payslip_intake::{
    DocumentIngestor, DropZone, FileKind, FileOutcome, IngestError, IngestionScheduler, Ingestor,
    IngestorState, InMemoryDirectoryStore, RosterIngestor, ScanReport, SchedulerConfig,
    ServiceState,
};

fn fast_config() -> SchedulerConfig {
    SchedulerConfig {
        roster_poll_interval: Duration::from_millis(40),
        document_poll_interval: Duration::from_millis(60),
        error_backoff: Duration::from_millis(20),
    }
}

/// What a scripted ingestor does on each scan.
#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail,
    Panic,
    FailFile,
}

struct ScriptedIngestor {
    kind: FileKind,
    behaviour: Behaviour,
    /// Scans that misbehave before the ingestor recovers
    misbehaving_scans: u32,
    scans: AtomicU32,
    delay: Duration,
    in_flight: AtomicBool,
}

impl ScriptedIngestor {
    fn new(kind: FileKind, behaviour: Behaviour, misbehaving_scans: u32) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behaviour,
            misbehaving_scans,
            scans: AtomicU32::new(0),
            delay: Duration::ZERO,
            in_flight: AtomicBool::new(false),
        })
    }

    fn healthy(kind: FileKind) -> Arc<Self> {
        Self::new(kind, Behaviour::Succeed, 0)
    }

    fn slow(kind: FileKind, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behaviour: Behaviour::Succeed,
            misbehaving_scans: 0,
            scans: AtomicU32::new(0),
            delay,
            in_flight: AtomicBool::new(false),
        })
    }

    fn scans(&self) -> u32 {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ingestor for ScriptedIngestor {
    fn kind(&self) -> FileKind {
        self.kind
    }

    async fn scan(&self) -> Result<ScanReport, IngestError> {
        let scan = self.scans.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.store(false, Ordering::SeqCst);

        let mut report = ScanReport::new(self.kind);
        if scan >= self.misbehaving_scans {
            report.record(
                format!("file-{scan}"),
                FileOutcome::Accepted {
                    upserted: None,
                    skipped_rows: 0,
                },
            );
            return Ok(report);
        }

        match self.behaviour {
            Behaviour::Succeed => Ok(report),
            Behaviour::Fail => Err(IngestError::Listing {
                path: PathBuf::from("/srv/drop"),
                source: io::Error::other("simulated listing failure"),
            }),
            Behaviour::Panic => panic!("scan exploded"),
            Behaviour::FailFile => {
                report.record(
                    "stuck.pdf",
                    FileOutcome::Failed {
                        error: "disk unavailable".to_string(),
                    },
                );
                Ok(report)
            }
        }
    }
}

#[tokio::test]
async fn test_start_and_stop_transitions() {
    setup_test_logging();
    let roster = ScriptedIngestor::healthy(FileKind::Roster);
    let document = ScriptedIngestor::healthy(FileKind::Document);
    let scheduler = IngestionScheduler::new(roster.clone(), document.clone(), fast_config());

    assert_eq!(scheduler.status().await.overall, ServiceState::Stopped);
    scheduler.start().await;
    assert_eq!(scheduler.status().await.overall, ServiceState::Running);

    assert!(wait_for(|| roster.scans() >= 3 && document.scans() >= 2, 5_000).await);

    scheduler.stop().await;
    let status = scheduler.status().await;
    assert_eq!(status.overall, ServiceState::Stopped);
    assert!(!scheduler.is_running().await);

    let roster_status = status.ingestor(FileKind::Roster).unwrap();
    assert_eq!(u64::from(roster.scans()), roster_status.scans_completed);
    assert_eq!(roster_status.lifetime_processed, u64::from(roster.scans()));
    assert_eq!(roster_status.state, IngestorState::Idle);

    // No scans after stop returns
    let after_stop = roster.scans();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(roster.scans(), after_stop);
}

#[tokio::test]
async fn test_start_twice_is_a_noop() {
    let roster = ScriptedIngestor::healthy(FileKind::Roster);
    let document = ScriptedIngestor::healthy(FileKind::Document);
    let config = SchedulerConfig {
        roster_poll_interval: Duration::from_secs(60),
        document_poll_interval: Duration::from_secs(60),
        error_backoff: Duration::from_secs(10),
    };
    let scheduler = IngestionScheduler::new(roster.clone(), document.clone(), config);

    scheduler.start().await;
    scheduler.start().await;
    assert!(wait_for(|| roster.scans() == 1 && document.scans() == 1, 5_000).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // A second set of loops would have scanned again immediately
    assert_eq!(roster.scans(), 1);
    assert_eq!(document.scans(), 1);
    assert_eq!(scheduler.status().await.overall, ServiceState::Running);

    scheduler.stop().await;
}

#[tokio::test]
async fn test_failed_scan_backs_off_and_recovers() {
    let roster = ScriptedIngestor::new(FileKind::Roster, Behaviour::Fail, 2);
    let document = ScriptedIngestor::healthy(FileKind::Document);
    let config = SchedulerConfig {
        roster_poll_interval: Duration::from_secs(60),
        document_poll_interval: Duration::from_secs(60),
        error_backoff: Duration::from_millis(30),
    };
    let scheduler = IngestionScheduler::new(roster.clone(), document, config);

    scheduler.start().await;

    // Two failures separated by the short backoff, then a success; the
    // third scan can only happen that soon through the backoff path
    assert!(
        wait_for_status(
            &scheduler,
            |s| s.ingestor(FileKind::Roster).is_some_and(|r| r.lifetime_processed == 1),
            5_000
        )
        .await
    );

    let status = scheduler.status().await;
    let roster_status = status.ingestor(FileKind::Roster).unwrap();
    assert_eq!(roster.scans(), 3);
    assert_eq!(roster_status.consecutive_failures, 0);
    assert_eq!(roster_status.scans_completed, 1);
    assert_eq!(roster_status.state, IngestorState::Idle);
    assert!(roster_status
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("simulated listing failure")));

    scheduler.stop().await;
}

#[tokio::test]
async fn test_error_state_is_visible_during_backoff() {
    let roster = ScriptedIngestor::new(FileKind::Roster, Behaviour::FailFile, u32::MAX);
    let document = ScriptedIngestor::healthy(FileKind::Document);
    let config = SchedulerConfig {
        roster_poll_interval: Duration::from_secs(60),
        document_poll_interval: Duration::from_secs(60),
        error_backoff: Duration::from_secs(30),
    };
    let scheduler = IngestionScheduler::new(roster.clone(), document, config);

    scheduler.start().await;
    assert!(
        wait_for_status(
            &scheduler,
            |s| s.ingestor(FileKind::Roster).is_some_and(|r| r.state == IngestorState::Error),
            5_000
        )
        .await
    );

    let status = scheduler.status().await;
    let roster_status = status.ingestor(FileKind::Roster).unwrap();
    assert_eq!(roster_status.consecutive_failures, 1);
    assert_eq!(roster_status.last_error.as_deref(), Some("stuck.pdf: disk unavailable"));
    assert_eq!(status.ingestor(FileKind::Document).unwrap().state, IngestorState::Idle);

    // Stop interrupts the backoff sleep, not a scan
    tokio::time::timeout(Duration::from_secs(5), scheduler.stop())
        .await
        .expect("stop should not wait for the backoff to elapse");
    assert_eq!(roster.scans(), 1);
}

#[tokio::test]
async fn test_panicking_scan_does_not_kill_loop() {
    let roster = ScriptedIngestor::new(FileKind::Roster, Behaviour::Panic, 1);
    let document = ScriptedIngestor::healthy(FileKind::Document);
    let config = SchedulerConfig {
        roster_poll_interval: Duration::from_secs(60),
        document_poll_interval: Duration::from_secs(60),
        error_backoff: Duration::from_millis(20),
    };
    let scheduler = IngestionScheduler::new(roster.clone(), document, config);

    scheduler.start().await;
    assert!(
        wait_for_status(
            &scheduler,
            |s| s.ingestor(FileKind::Roster).is_some_and(|r| r.lifetime_processed == 1),
            5_000
        )
        .await
    );

    let status = scheduler.status().await;
    let roster_status = status.ingestor(FileKind::Roster).unwrap();
    assert!(roster_status
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("scan exploded")));
    assert_eq!(roster.scans(), 2);

    scheduler.stop().await;
    assert_eq!(scheduler.status().await.overall, ServiceState::Stopped);
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_scan() {
    let roster = ScriptedIngestor::slow(FileKind::Roster, Duration::from_millis(200));
    let document = ScriptedIngestor::healthy(FileKind::Document);
    let scheduler = IngestionScheduler::new(roster.clone(), document, fast_config());

    scheduler.start().await;
    assert!(wait_for(|| roster.in_flight.load(Ordering::SeqCst), 5_000).await);

    scheduler.stop().await;

    assert!(!roster.in_flight.load(Ordering::SeqCst), "scan must complete before stop returns");
    let status = scheduler.status().await;
    assert_eq!(status.ingestor(FileKind::Roster).unwrap().scans_completed, 1);
}

#[tokio::test]
async fn test_restart_keeps_lifetime_counts() {
    let roster = ScriptedIngestor::healthy(FileKind::Roster);
    let document = ScriptedIngestor::healthy(FileKind::Document);
    let scheduler = IngestionScheduler::new(roster.clone(), document.clone(), fast_config());

    scheduler.start().await;
    assert!(wait_for(|| roster.scans() >= 1 && document.scans() >= 1, 5_000).await);
    scheduler.stop().await;
    let first = scheduler.status().await;

    scheduler.start().await;
    assert!(wait_for(|| roster.scans() >= 3, 5_000).await);
    scheduler.stop().await;
    let second = scheduler.status().await;

    let before = first.ingestor(FileKind::Roster).unwrap().lifetime_processed;
    let after = second.ingestor(FileKind::Roster).unwrap().lifetime_processed;
    assert!(after > before);
    assert_eq!(after, u64::from(roster.scans()));
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    setup_test_logging();
    let harness_dir = common::temp_dir();
    let root = harness_dir.path();
    let store = Arc::new(InMemoryDirectoryStore::new());
    let zone = DropZone::new(root);
    let roster = Arc::new(RosterIngestor::new(store.clone(), zone.clone(), RosterConfig::default()));
    let document = Arc::new(DocumentIngestor::new(store, zone, &DocumentConfig::default()).unwrap());
    let scheduler = IngestionScheduler::new(roster, document, fast_config());

    write_roster(
        &root.join("staff.xlsx"),
        &["Emp ID", "National ID", "Name"],
        &[&["E100", "N900", "Jane Doe"]],
    );
    scheduler.start().await;
    assert!(wait_for(|| root.join("processed").join("staff.xlsx").exists(), 5_000).await);

    write_document(root, "Payslip_E100_07.pdf");
    write_document(root, "Payslip_E404_07.pdf");
    assert!(
        wait_for(
            || root.join("processed").join("Payslip_E100_07.pdf").exists()
                && root.join("invalid").join("Payslip_E404_07.pdf").exists(),
            5_000
        )
        .await
    );

    scheduler.stop().await;
    let status = scheduler.status().await;
    let documents = status.ingestor(FileKind::Document).unwrap();
    assert_eq!(documents.lifetime_processed, 1);
    assert_eq!(documents.lifetime_rejected, 1);
    assert_eq!(status.ingestor(FileKind::Roster).unwrap().lifetime_processed, 1);
}

#[tokio::test]
async fn test_harness_ingestors_share_one_store() {
    let harness = Harness::with_employees(&[]);
    write_roster(
        &harness.root().join("staff.xlsx"),
        &["Emp ID", "National ID", "Name"],
        &[&["E100", "N900", "Jane Doe"]],
    );
    write_document(harness.root(), "Payslip_E100_01.pdf");

    // Document first: the employee is not known yet
    let early = harness.document.scan().await.unwrap();
    assert_eq!(early.rejected(), 1);

    harness.roster.scan().await.unwrap();
    write_document(harness.root(), "Payslip_E100_02.pdf");
    let late = harness.document.scan().await.unwrap();
    assert_eq!(late.accepted(), 1);
}
