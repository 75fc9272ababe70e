//! Queue scenarios: admission ceiling, dedup, guard trips, failure isolation.
//!
//! All scenarios run the real control loop against a scripted agent that
//! performs genuine marker/artifact transitions in a temp directory.

mod common;

use std::time::Duration;

use bulkdl_core::config::BatchOptions;
use bulkdl_core::dedup::DedupFilter;
use bulkdl_core::guard::RateLimitGuard;
use bulkdl_core::job::{build_jobs, Candidate, Job, JobStatus, MediaExt};
use bulkdl_core::queue::AdmissionQueue;
use bulkdl_core::transfer::MARKER_SUFFIX;

use common::fake_agent::{FakeAgent, Script};

fn source(n: usize) -> String {
    format!("https://example.com/show/ep{n:02}.mkv")
}

fn make_jobs(count: usize, target_dir: &std::path::Path) -> Vec<Job> {
    let candidates: Vec<Candidate> = (1..=count)
        .map(|n| Candidate::from_url(&source(n), MediaExt::Mkv).unwrap())
        .collect();
    build_jobs(&candidates, target_dir)
}

fn fast_options(max_concurrent: usize) -> BatchOptions {
    BatchOptions {
        max_concurrent,
        poll_interval: Duration::from_millis(10),
        stall_poll_limit: 50,
    }
}

#[tokio::test]
async fn five_candidates_two_slots_all_complete() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::new(Script::Succeed {
        bytes: 1024,
        growth_polls: 3,
    });
    let mut jobs = make_jobs(5, dir.path());

    let queue = AdmissionQueue::new(&agent, RateLimitGuard::new(), fast_options(2));
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert!(summary.accounts_for(5));
    assert_eq!(summary.done, 5);
    assert_eq!(agent.started(), 5);
    // The ceiling is reached but never exceeded.
    assert_eq!(agent.peak_active(), 2);

    for job in &jobs {
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.bytes_observed, 1024);
        assert!(job.target_path.exists());
        let marker = format!("{}{}", job.target_path.display(), MARKER_SUFFIX);
        assert!(!std::path::Path::new(&marker).exists());
    }
}

#[tokio::test]
async fn existing_artifact_is_skipped_others_proceed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ep03.mkv"), b"already here").unwrap();

    let agent = FakeAgent::new(Script::Succeed {
        bytes: 64,
        growth_polls: 2,
    });
    let mut jobs = make_jobs(5, dir.path());

    let filter = DedupFilter::snapshot(dir.path(), MARKER_SUFFIX).unwrap();
    assert_eq!(filter.apply(&mut jobs), 1);

    let queue = AdmissionQueue::new(&agent, RateLimitGuard::new(), fast_options(2));
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert!(summary.accounts_for(5));
    assert_eq!(summary.done, 4);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.skipped_jobs, vec!["ep03.mkv".to_string()]);
    assert_eq!(agent.started(), 4);
    // The pre-existing artifact is untouched.
    let content = std::fs::read(dir.path().join("ep03.mkv")).unwrap();
    assert_eq!(content, b"already here");
}

#[tokio::test]
async fn guard_trip_mid_run_parks_pending_and_lets_running_finish() {
    let dir = tempfile::tempdir().unwrap();
    // Long enough that the first two are still running when the guard trips.
    let agent = FakeAgent::new(Script::Succeed {
        bytes: 256,
        growth_polls: 30,
    });
    let mut jobs = make_jobs(5, dir.path());

    let guard = RateLimitGuard::new();
    let tripper = guard.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(80)).await;
        tripper.observe();
    });

    let queue = AdmissionQueue::new(&agent, guard, fast_options(2));
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert!(summary.accounts_for(5));
    assert_eq!(summary.done, 2);
    assert_eq!(summary.paused, 3);
    assert_eq!(agent.started(), 2);
    for job in &jobs[2..] {
        assert_eq!(job.status, JobStatus::Paused);
    }
}

#[tokio::test]
async fn tripped_guard_admits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::new(Script::Succeed {
        bytes: 64,
        growth_polls: 2,
    });
    let mut jobs = make_jobs(3, dir.path());

    let guard = RateLimitGuard::new();
    guard.observe();

    let queue = AdmissionQueue::new(&agent, guard, fast_options(2));
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert_eq!(agent.started(), 0);
    assert_eq!(summary.paused, 3);
    assert!(jobs.iter().all(|j| j.status == JobStatus::Paused));
}

#[tokio::test]
async fn rate_limited_transfer_pauses_job_and_trips_guard() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::new(Script::Succeed {
        bytes: 64,
        growth_polls: 10,
    })
    .script(&source(1), Script::RateLimit { polls: 2 });
    let mut jobs = make_jobs(3, dir.path());

    let guard = RateLimitGuard::new();
    let queue = AdmissionQueue::new(&agent, guard.clone(), fast_options(2));
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert!(guard.is_tripped());
    assert!(summary.accounts_for(3));
    // Job 1 hit the redirect, job 3 never got a slot; job 2 ran to the end.
    assert_eq!(jobs[0].status, JobStatus::Paused);
    assert_eq!(jobs[1].status, JobStatus::Done);
    assert_eq!(jobs[2].status, JobStatus::Paused);
    assert_eq!(agent.started(), 2);
}

#[tokio::test]
async fn nonzero_exit_fails_one_job_only() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::new(Script::Succeed {
        bytes: 64,
        growth_polls: 2,
    })
    .script(&source(2), Script::ExitNonZero { code: 22, polls: 2 });
    let mut jobs = make_jobs(3, dir.path());

    let queue = AdmissionQueue::new(&agent, RateLimitGuard::new(), fast_options(2));
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert!(summary.accounts_for(3));
    assert_eq!(summary.done, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(jobs[1].status, JobStatus::Failed);
    let reason = jobs[1].error.as_deref().unwrap();
    assert!(reason.contains("22"), "diagnostic should name the exit code: {reason}");
    assert_eq!(jobs[0].status, JobStatus::Done);
    assert_eq!(jobs[2].status, JobStatus::Done);
}

#[tokio::test]
async fn transfer_that_never_starts_fails_after_inactivity_bound() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::new(Script::NeverStarts);
    let mut jobs = make_jobs(1, dir.path());

    let opts = BatchOptions {
        stall_poll_limit: 3,
        ..fast_options(1)
    };
    let queue = AdmissionQueue::new(&agent, RateLimitGuard::new(), opts);
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert_eq!(summary.failed, 1);
    let reason = jobs[0].error.as_deref().unwrap();
    assert!(reason.contains("no artifact appeared"), "{reason}");
}

#[tokio::test]
async fn no_job_is_left_pending_or_running() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::new(Script::Succeed {
        bytes: 32,
        growth_polls: 2,
    })
    .script(&source(3), Script::ExitNonZero { code: 1, polls: 1 })
    .script(&source(5), Script::NeverStarts);
    let mut jobs = make_jobs(6, dir.path());

    let opts = BatchOptions {
        stall_poll_limit: 4,
        ..fast_options(3)
    };
    let queue = AdmissionQueue::new(&agent, RateLimitGuard::new(), opts);
    let summary = queue.admit(&mut jobs).await.unwrap();

    assert!(summary.accounts_for(6));
    assert!(jobs.iter().all(|j| j.status.is_terminal()));
}

#[tokio::test]
async fn invalid_concurrency_is_fatal_before_any_start() {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgent::new(Script::NeverStarts);
    let mut jobs = make_jobs(2, dir.path());

    let opts = BatchOptions {
        max_concurrent: 0,
        ..fast_options(1)
    };
    let queue = AdmissionQueue::new(&agent, RateLimitGuard::new(), opts);
    assert!(queue.admit(&mut jobs).await.is_err());
    assert_eq!(agent.started(), 0);
    assert!(jobs.iter().all(|j| j.status == JobStatus::Pending));
}
